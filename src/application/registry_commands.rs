//! # Registry Commands
//!
//! Curated command replies fetched once at startup from the command registry.
//! Static for the lifetime of the process; second in the dispatch chain.

use async_trait::async_trait;
use std::collections::HashMap;

use crate::domain::traits::{ChatProvider, Claim, CommandResolver, CommandSource, Invocation};

#[derive(Debug, Default)]
pub struct RegistryCommands {
    table: HashMap<String, String>,
}

impl RegistryCommands {
    pub fn new(entries: HashMap<String, String>) -> Self {
        Self {
            table: entries
                .into_iter()
                .map(|(name, reply)| (name.to_lowercase(), reply))
                .collect(),
        }
    }

    /// Fetches the table; an unreachable registry leaves the bot running with an empty one.
    pub async fn fetch(source: &dyn CommandSource) -> Self {
        match source.fetch_commands().await {
            Ok(entries) => {
                tracing::info!("Loaded {} registry commands", entries.len());
                Self::new(entries)
            }
            Err(e) => {
                tracing::error!("Failed to load registry commands: {:#}", e);
                Self::default()
            }
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.table.contains_key(&name.to_lowercase())
    }
}

#[async_trait]
impl CommandResolver for RegistryCommands {
    fn name(&self) -> &'static str {
        "registry"
    }

    async fn try_handle(&self, invocation: &Invocation, chat: &dyn ChatProvider) -> Claim {
        let Some(reply) = self.table.get(&invocation.name) else {
            return Claim::Declined;
        };
        match chat.send_message(reply).await {
            Ok(_) => Claim::Handled,
            Err(e) => Claim::Failed(anyhow::anyhow!(e)),
        }
    }

    async fn command_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.table.keys().cloned().collect();
        names.sort();
        names
    }
}
