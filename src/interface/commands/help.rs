//! # Help Command
//!
//! Lists native commands followed by whatever the dynamic and registry tables hold.

use anyhow::Result;

use crate::application::dynamic_commands::DynamicCommands;
use crate::application::registry_commands::RegistryCommands;
use crate::domain::traits::{ChatProvider, CommandResolver};
use crate::strings::help;

pub async fn handle_help(
    dynamic: &DynamicCommands,
    registry: &RegistryCommands,
    chat: &dyn ChatProvider,
) -> Result<()> {
    let mut text = help::MAIN.to_string();
    text.push_str(&help::command_list("⏱️ Temp commands", &dynamic.command_names().await));
    text.push_str(&help::command_list("📖 Registry commands", &registry.command_names().await));

    chat.send_message(&text)
        .await
        .map(|_| ())
        .map_err(|e| anyhow::anyhow!(e))
}
