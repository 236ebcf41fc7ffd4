//! # Bot State
//!
//! Flat key/value store persisted to `data/state.json`.
//! Holds small scalars that must survive a restart, most importantly the feed checkpoint.
//! Every `set` rewrites the file before returning.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tokio::sync::Mutex;

use crate::domain::traits::ConfigStore;

pub struct JsonStateStore {
    path: PathBuf,
    values: Mutex<BTreeMap<String, String>>,
}

impl JsonStateStore {
    /// Loads the store from disk, starting empty when the file is missing or unreadable.
    pub async fn load(path: PathBuf) -> Self {
        let values = match tokio::fs::read_to_string(&path).await {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!("Ignoring corrupt state file {}: {}", path.display(), e);
                BTreeMap::new()
            }),
            Err(_) => BTreeMap::new(),
        };
        Self {
            path,
            values: Mutex::new(values),
        }
    }

    async fn save(&self, values: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .context("Failed to create state directory")?;
        }
        let content = serde_json::to_string_pretty(values)?;
        // write-then-rename, the file is never observed half-written
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, content)
            .await
            .with_context(|| format!("Failed to write {}", tmp.display()))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .with_context(|| format!("Failed to replace {}", self.path.display()))?;
        Ok(())
    }
}

#[async_trait]
impl ConfigStore for JsonStateStore {
    async fn get(&self, key: &str) -> Option<String> {
        self.values.lock().await.get(key).cloned()
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self.values.lock().await;
        values.insert(key.to_string(), value.to_string());
        self.save(&values).await
    }
}
