//! # Messages
//!
//! Constant strings and format functions for user-facing replies.

pub const ASK_FAILED: &str =
    "Could not generate an answer ●︿●\nTry making your question more specific.";
pub const SEARCH_FAILED: &str = "Could not find a result to your query, try !ask ●︿●";
pub const LLM_DISCLAIMER: &str = "\nThe above response was generated by a Large Language Model, so take it with a grain of salt!";
pub const DOCS_DISABLED: &str = "Documentation lookups are not configured.";

pub const ASK_USAGE: &str = "Usage: `!ask <question>`";
pub const SEARCH_USAGE: &str = "Usage: `!searchdocs <query>`";
pub const ADD_USAGE: &str = "Usage: `!add <command> \"<reply>\"`";
pub const DELETE_USAGE: &str = "Usage: `!delete <command>`";
pub const TITLE_USAGE: &str = "Usage: `!title <new title>`";

pub const ADD_QUOTE_HINT: &str = "If you want to use spaces, please put the text in quotes";
pub const ADD_TEMP_NOTICE: &str =
    "This is only for temp use. Please consider adding it to the command registry.";

pub const TITLE_NOT_THREAD: &str = "You can't change the title here since it's not a thread";
pub const CLOSE_NOT_THREAD: &str = "You can't close this since it's not a thread";
pub const THREAD_NOT_MANAGED: &str = "I did not open this thread, so I can't change it";
pub const THREAD_ALREADY_CLOSED: &str = "This thread is already archived";
pub const THREAD_CLOSING: &str = "Archiving thread";

pub fn title_changing(title: &str) -> String {
    format!("Changing title to '{title}'")
}

pub fn command_exists(name: &str) -> String {
    format!(
        "Command '{name}' already exists as a temp command. Please use !delete {name} or !delcom {name} first"
    )
}

pub fn command_added(name: &str, reply: &str) -> String {
    format!("Command '{name}' with reply '{reply}' has been added")
}

pub fn command_deleted(name: &str) -> String {
    format!("Command '{name}' was successfully deleted from my memory")
}

pub fn registry_command_readonly(name: &str) -> String {
    format!("'{name}' is a registry command and can only be edited in the registry")
}

pub fn not_dynamic_command(name: &str) -> String {
    format!("Command '{name}' is not a dynamic command")
}
