#[derive(Clone, Copy, Debug)]
pub(crate) struct CommandSpec {
    pub command: &'static str,
    pub action: &'static str,
}

/// Commands whose remainder is one free-form text argument.
pub(crate) const TEXT_ARG_COMMANDS: &[CommandSpec] = &[
    CommandSpec {
        command: "tag",
        action: "add_positive",
    },
    CommandSpec {
        command: "neg",
        action: "add_negative",
    },
    CommandSpec {
        command: "save",
        action: "save_profile",
    },
    CommandSpec {
        command: "find",
        action: "search_catalog",
    },
];

/// Commands taking a single id token.
pub(crate) const ID_ARG_COMMANDS: &[CommandSpec] = &[
    CommandSpec {
        command: "untag",
        action: "remove_positive",
    },
    CommandSpec {
        command: "unneg",
        action: "remove_negative",
    },
    CommandSpec {
        command: "pick",
        action: "toggle_catalog",
    },
    CommandSpec {
        command: "load",
        action: "apply_profile",
    },
    CommandSpec {
        command: "delete",
        action: "delete_profile",
    },
];

/// Commands taking a single integer value.
pub(crate) const VALUE_ARG_COMMANDS: &[CommandSpec] = &[
    CommandSpec {
        command: "resemblance",
        action: "set_resemblance",
    },
    CommandSpec {
        command: "page",
        action: "select_page",
    },
];

pub(crate) const NO_ARG_COMMANDS: &[CommandSpec] = &[
    CommandSpec {
        command: "custom",
        action: "custom_tab",
    },
    CommandSpec {
        command: "image",
        action: "image_dropped",
    },
    CommandSpec {
        command: "generate",
        action: "generate",
    },
    CommandSpec {
        command: "profiles",
        action: "list_profiles",
    },
    CommandSpec {
        command: "status",
        action: "status",
    },
    CommandSpec {
        command: "help",
        action: "help",
    },
    CommandSpec {
        command: "quit",
        action: "quit",
    },
];

/// `/preset` with an id selects it; bare `/preset` returns to the tab.
pub(crate) const PRESET_COMMAND: &str = "preset";

/// `/rename <id> <name...>`.
pub(crate) const RENAME_COMMAND: CommandSpec = CommandSpec {
    command: "rename",
    action: "rename_profile",
};

/// `/reset [pos|neg|all|resemblance]`.
pub(crate) const RESET_COMMAND: CommandSpec = CommandSpec {
    command: "reset",
    action: "reset",
};

pub const CONSOLE_HELP_COMMANDS: &[&str] = &[
    "/tag",
    "/neg",
    "/untag",
    "/unneg",
    "/pick",
    "/find",
    "/preset",
    "/custom",
    "/resemblance",
    "/reset",
    "/save",
    "/profiles",
    "/page",
    "/rename",
    "/delete",
    "/load",
    "/image",
    "/generate",
    "/status",
    "/help",
    "/quit",
];
