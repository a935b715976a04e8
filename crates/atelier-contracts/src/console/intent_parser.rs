use std::collections::BTreeMap;

use serde_json::Value;

use super::command_registry::{
    CommandSpec, ID_ARG_COMMANDS, NO_ARG_COMMANDS, PRESET_COMMAND, RENAME_COMMAND, RESET_COMMAND,
    TEXT_ARG_COMMANDS, VALUE_ARG_COMMANDS,
};

/// A parsed console line. Bare text is a positive free-text tag submission;
/// slash commands map onto builder inputs by `action`.
#[derive(Debug, Clone, PartialEq)]
pub struct ConsoleIntent {
    pub action: String,
    pub raw: String,
    pub args: BTreeMap<String, Value>,
}

impl ConsoleIntent {
    fn new(action: &str, raw: &str) -> Self {
        Self {
            action: action.to_string(),
            raw: raw.to_string(),
            args: BTreeMap::new(),
        }
    }
}

fn find_action(command: &str, specs: &[CommandSpec]) -> Option<&'static str> {
    specs
        .iter()
        .find(|spec| spec.command == command)
        .map(|spec| spec.action)
}

/// Normalize a free-form argument: honor quoting, collapse stray
/// whitespace, fall back to a plain split when the quoting is unbalanced.
fn parse_text_arg(arg: &str) -> String {
    let parts = match shell_words::split(arg) {
        Ok(parts) => parts,
        Err(_) => arg.split_whitespace().map(str::to_string).collect(),
    };
    parts
        .into_iter()
        .filter(|value| !value.is_empty())
        .collect::<Vec<String>>()
        .join(" ")
}

fn parse_id_arg(arg: &str) -> String {
    arg.split_whitespace().next().unwrap_or("").to_string()
}

pub fn parse_command(text: &str) -> ConsoleIntent {
    let raw_trimmed = text.trim();
    if raw_trimmed.is_empty() {
        return ConsoleIntent::new("noop", text);
    }

    if let Some(slash_tail) = raw_trimmed.strip_prefix('/') {
        let command_len = slash_tail
            .chars()
            .take_while(|ch| ch.is_ascii_alphanumeric() || *ch == '_')
            .count();
        if command_len > 0 {
            let command = slash_tail[..command_len].to_ascii_lowercase();
            let remainder = &slash_tail[command_len..];
            let arg = if remainder.is_empty() {
                ""
            } else {
                remainder.trim()
            };

            if let Some(action) = find_action(&command, TEXT_ARG_COMMANDS) {
                let mut intent = ConsoleIntent::new(action, text);
                intent
                    .args
                    .insert("text".to_string(), Value::String(parse_text_arg(arg)));
                return intent;
            }

            if let Some(action) = find_action(&command, ID_ARG_COMMANDS) {
                let mut intent = ConsoleIntent::new(action, text);
                intent
                    .args
                    .insert("id".to_string(), Value::String(parse_id_arg(arg)));
                return intent;
            }

            if let Some(action) = find_action(&command, VALUE_ARG_COMMANDS) {
                let mut intent = ConsoleIntent::new(action, text);
                let value = arg
                    .split_whitespace()
                    .next()
                    .and_then(|token| token.parse::<i64>().ok())
                    .map(Value::from)
                    .unwrap_or(Value::Null);
                intent.args.insert("value".to_string(), value);
                return intent;
            }

            if command == PRESET_COMMAND {
                if arg.is_empty() {
                    return ConsoleIntent::new("preset_tab", text);
                }
                let mut intent = ConsoleIntent::new("select_preset", text);
                intent
                    .args
                    .insert("preset".to_string(), Value::String(parse_id_arg(arg)));
                return intent;
            }

            if command == RENAME_COMMAND.command {
                let mut intent = ConsoleIntent::new(RENAME_COMMAND.action, text);
                let id = parse_id_arg(arg);
                let name = arg
                    .strip_prefix(&id)
                    .map(str::trim)
                    .unwrap_or("")
                    .to_string();
                intent.args.insert("id".to_string(), Value::String(id));
                intent
                    .args
                    .insert("name".to_string(), Value::String(parse_text_arg(&name)));
                return intent;
            }

            if command == RESET_COMMAND.command {
                let mut intent = ConsoleIntent::new(RESET_COMMAND.action, text);
                let scope = match arg.to_ascii_lowercase().as_str() {
                    "" | "all" => "all",
                    "pos" | "positive" => "positive",
                    "neg" | "negative" => "negative",
                    "resemblance" => "resemblance",
                    _ => "unknown",
                };
                intent
                    .args
                    .insert("scope".to_string(), Value::String(scope.to_string()));
                return intent;
            }

            if let Some(action) = find_action(&command, NO_ARG_COMMANDS) {
                return ConsoleIntent::new(action, text);
            }

            let mut intent = ConsoleIntent::new("unknown", text);
            intent
                .args
                .insert("command".to_string(), Value::String(command));
            intent
                .args
                .insert("arg".to_string(), Value::String(arg.to_string()));
            return intent;
        }
    }

    let mut intent = ConsoleIntent::new("add_positive", text);
    intent.args.insert(
        "text".to_string(),
        Value::String(raw_trimmed.to_string()),
    );
    intent
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::parse_command;

    #[test]
    fn parse_tag_commands_join_quoted_words() {
        let intent = parse_command("/tag golden hour lighting");
        assert_eq!(intent.action, "add_positive");
        assert_eq!(intent.args["text"], json!("golden hour lighting"));

        let quoted = parse_command("/neg \"washed out\"   colors");
        assert_eq!(quoted.action, "add_negative");
        assert_eq!(quoted.args["text"], json!("washed out colors"));
    }

    #[test]
    fn parse_id_commands_take_the_first_token() {
        let intent = parse_command("/pick pos-003 trailing junk");
        assert_eq!(intent.action, "toggle_catalog");
        assert_eq!(intent.args["id"], json!("pos-003"));

        assert_eq!(parse_command("/delete p-1").action, "delete_profile");
        assert_eq!(parse_command("/load p-1").args["id"], json!("p-1"));
        assert_eq!(parse_command("/untag t-9").action, "remove_positive");
        assert_eq!(parse_command("/unneg t-9").action, "remove_negative");
    }

    #[test]
    fn parse_value_commands_accept_integers_only() {
        let intent = parse_command("/resemblance 40");
        assert_eq!(intent.action, "set_resemblance");
        assert_eq!(intent.args["value"], json!(40));

        assert_eq!(parse_command("/page 2").args["value"], json!(2));
        assert_eq!(parse_command("/resemblance soft").args["value"], json!(null));
    }

    #[test]
    fn parse_preset_with_and_without_argument() {
        let select = parse_command("/preset noir");
        assert_eq!(select.action, "select_preset");
        assert_eq!(select.args["preset"], json!("noir"));

        assert_eq!(parse_command("/preset").action, "preset_tab");
        assert_eq!(parse_command("/custom").action, "custom_tab");
    }

    #[test]
    fn parse_rename_splits_id_from_the_new_name() {
        let intent = parse_command("/rename p-1 Warm Evenings");
        assert_eq!(intent.action, "rename_profile");
        assert_eq!(intent.args["id"], json!("p-1"));
        assert_eq!(intent.args["name"], json!("Warm Evenings"));
    }

    #[test]
    fn parse_reset_scopes() {
        assert_eq!(parse_command("/reset").args["scope"], json!("all"));
        assert_eq!(parse_command("/reset pos").args["scope"], json!("positive"));
        assert_eq!(parse_command("/reset neg").args["scope"], json!("negative"));
        assert_eq!(
            parse_command("/reset resemblance").args["scope"],
            json!("resemblance")
        );
        assert_eq!(parse_command("/reset both").args["scope"], json!("unknown"));
    }

    #[test]
    fn bare_text_is_a_positive_tag_submission() {
        let intent = parse_command("  moody atmosphere  ");
        assert_eq!(intent.action, "add_positive");
        assert_eq!(intent.args["text"], json!("moody atmosphere"));
    }

    #[test]
    fn parse_unknown_and_noop() {
        let unknown = parse_command("/magic foo");
        assert_eq!(unknown.action, "unknown");
        assert_eq!(unknown.args["command"], json!("magic"));
        assert_eq!(unknown.args["arg"], json!("foo"));

        assert_eq!(parse_command("   ").action, "noop");
    }
}
