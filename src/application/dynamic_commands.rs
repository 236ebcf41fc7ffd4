//! # Dynamic Commands
//!
//! Command replies added at runtime by moderators, persisted to `data/commands.json`.
//! The in-memory table is reloaded from disk after every mutation so it always mirrors
//! what a restart would see. First in the dispatch chain.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tokio::sync::RwLock;

use crate::domain::traits::{ChatProvider, Claim, CommandResolver, Invocation};

pub struct DynamicCommands {
    path: PathBuf,
    table: RwLock<BTreeMap<String, String>>,
}

impl DynamicCommands {
    pub async fn load(path: PathBuf) -> Result<Self> {
        let commands = Self {
            path,
            table: RwLock::new(BTreeMap::new()),
        };
        commands.reload().await?;
        Ok(commands)
    }

    pub async fn reload(&self) -> Result<()> {
        let table = self.read_file().await?;
        *self.table.write().await = table;
        Ok(())
    }

    async fn read_file(&self) -> Result<BTreeMap<String, String>> {
        tracing::debug!("Loading dynamic commands from {}", self.path.display());
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => {
                let stored: BTreeMap<String, String> = serde_json::from_str(&content)
                    .with_context(|| format!("Failed to parse {}", self.path.display()))?;
                Ok(stored
                    .into_iter()
                    .map(|(name, reply)| (name.to_lowercase(), reply))
                    .collect())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e).with_context(|| format!("Failed to read {}", self.path.display())),
        }
    }

    pub async fn get(&self, name: &str) -> Option<String> {
        self.table.read().await.get(&name.to_lowercase()).cloned()
    }

    pub async fn contains(&self, name: &str) -> bool {
        self.get(name).await.is_some()
    }

    /// Adds a command. Returns `false` when the name is already taken.
    pub async fn add(&self, name: &str, reply: &str) -> Result<bool> {
        let name = name.to_lowercase();
        let mut table = self.table.write().await;
        if table.contains_key(&name) {
            return Ok(false);
        }
        let mut updated = table.clone();
        updated.insert(name, reply.to_string());
        self.save(&updated).await?;
        *table = self.read_file().await?;
        Ok(true)
    }

    /// Removes a command. Returns `false` when it did not exist.
    pub async fn remove(&self, name: &str) -> Result<bool> {
        let name = name.to_lowercase();
        let mut table = self.table.write().await;
        if !table.contains_key(&name) {
            return Ok(false);
        }
        let mut updated = table.clone();
        updated.remove(&name);
        self.save(&updated).await?;
        *table = self.read_file().await?;
        Ok(true)
    }

    async fn save(&self, table: &BTreeMap<String, String>) -> Result<()> {
        tracing::debug!("Saving dynamic commands to {}", self.path.display());
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let content = serde_json::to_string_pretty(table)?;
        tokio::fs::write(&self.path, content)
            .await
            .with_context(|| format!("Failed to write {}", self.path.display()))
    }
}

#[async_trait]
impl CommandResolver for DynamicCommands {
    fn name(&self) -> &'static str {
        "dynamic"
    }

    async fn try_handle(&self, invocation: &Invocation, chat: &dyn ChatProvider) -> Claim {
        let Some(reply) = self.get(&invocation.name).await else {
            return Claim::Declined;
        };
        match chat.send_message(&reply).await {
            Ok(_) => Claim::Handled,
            Err(e) => Claim::Failed(anyhow::anyhow!(e)),
        }
    }

    async fn command_names(&self) -> Vec<String> {
        self.table.read().await.keys().cloned().collect()
    }
}
