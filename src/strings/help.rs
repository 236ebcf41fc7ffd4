//! # Help Text
//!
//! Help message for the native commands. Dynamic and registry command names are
//! appended at runtime by the `help` command.

pub const MAIN: &str = concat!(
    "**🥷 NinjaBot Help**\n",
    "Use: !command _args_\n",
    "\n",
    "**📚 Docs**\n",
    "* ask [question]: Ask the documentation\n",
    "* searchdocs [query]: Search the documentation (alias: docs)\n",
    "\n",
    "**🛠️ Moderators**\n",
    "* add [command] \"[reply]\": Add a temporary command (alias: addcom)\n",
    "* delete [command]: Remove a temporary command (alias: delcom)\n",
    "* title [new title]: Rename the current support thread\n",
    "* close: Archive the current support thread\n",
);

pub fn command_list(title: &str, names: &[String]) -> String {
    if names.is_empty() {
        return String::new();
    }
    format!("\n**{}**\n{}\n", title, names.join(", "))
}
