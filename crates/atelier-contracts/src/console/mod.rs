mod command_registry;
mod intent_parser;

pub use command_registry::CONSOLE_HELP_COMMANDS;
pub use intent_parser::{parse_command, ConsoleIntent};
