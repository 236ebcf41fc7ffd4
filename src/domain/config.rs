//! # Configuration
//!
//! Manages the loading and parsing of the application's configuration file (`config.yaml`).
//! Defines the structs for the chat connection, the external services the bot aggregates,
//! and the command gate.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

/// Main application configuration structure.
/// Matches the layout of `data/config.yaml`.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub services: ServicesConfig,
    #[serde(default)]
    pub commands: CommandsConfig,
    #[serde(default)]
    pub system: SystemConfig,
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(content).context("Failed to parse config.yaml")?;
        config.validate().context("Invalid config.yaml")?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if let Some(feed) = &self.services.feed {
            anyhow::ensure!(feed.interval_secs > 0, "services.feed.interval_secs must be at least 1");
            anyhow::ensure!(feed.limit > 0, "services.feed.limit must be at least 1");
        }
        Ok(())
    }
}

/// Configuration for the connected services.
#[derive(Debug, Deserialize, Clone)]
pub struct ServicesConfig {
    pub matrix: MatrixConfig,
    #[serde(default)]
    pub docs: Option<DocsConfig>,
    #[serde(default)]
    pub feed: Option<FeedConfig>,
    #[serde(default)]
    pub registry: Option<RegistryConfig>,
}

/// Specific configuration for the Matrix service.
#[derive(Debug, Deserialize, Clone)]
pub struct MatrixConfig {
    pub username: String,
    pub password: String,
    pub homeserver: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

/// Documentation content API (GitBook).
#[derive(Debug, Deserialize, Clone)]
pub struct DocsConfig {
    #[serde(default = "default_docs_api_url")]
    pub api_url: String,
    /// Public site the resolved page paths are appended to
    pub public_url: String,
    pub space_id: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub api_key_env: Option<String>, // e.g. "GITBOOK_API_KEY"
    #[serde(default = "default_cache_ttl_days")]
    pub cache_ttl_days: i64,
}

impl DocsConfig {
    pub fn resolve_api_key(&self) -> Option<String> {
        resolve_secret(self.api_key.as_deref(), self.api_key_env.as_deref())
    }
}

/// Discussion forum feed (Reddit) polled into a chat room.
#[derive(Debug, Deserialize, Clone)]
pub struct FeedConfig {
    pub subreddit: String,
    /// Room the new submissions are posted to
    pub channel: String,
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub client_secret: Option<String>,
    #[serde(default)]
    pub client_secret_env: Option<String>,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_feed_interval")]
    pub interval_secs: u64,
    #[serde(default = "default_feed_limit")]
    pub limit: usize,
    #[serde(default = "default_feed_pacing")]
    pub pacing_secs: u64,
}

impl FeedConfig {
    pub fn resolve_client_secret(&self) -> Option<String> {
        resolve_secret(
            self.client_secret.as_deref(),
            self.client_secret_env.as_deref(),
        )
    }
}

/// Remote registry serving the curated command replies.
#[derive(Debug, Deserialize, Clone)]
pub struct RegistryConfig {
    pub url: String,
}

/// Gate for inbound command messages.
#[derive(Debug, Deserialize, Clone)]
pub struct CommandsConfig {
    #[serde(default = "default_prefix")]
    pub prefix: String,
    /// Channels whose messages are turned into support threads and never parsed as commands
    #[serde(default)]
    pub auto_thread_channels: Vec<String>,
    /// Posted into every support thread; `<USERMENTION>` becomes a mention of the author.
    /// Without it no threads are opened.
    #[serde(default)]
    pub auto_thread_welcome: Option<String>,
    /// Other bots sharing the rooms
    #[serde(default)]
    pub bot_accounts: Vec<String>,
    /// Users allowed to add and delete dynamic commands
    #[serde(default)]
    pub moderators: Vec<String>,
}

impl Default for CommandsConfig {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
            auto_thread_channels: Vec::new(),
            auto_thread_welcome: None,
            bot_accounts: Vec::new(),
            moderators: Vec::new(),
        }
    }
}

/// System-level settings for the bot.
#[derive(Debug, Deserialize, Clone)]
pub struct SystemConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

fn resolve_secret(inline: Option<&str>, env: Option<&str>) -> Option<String> {
    if let Some(value) = inline.filter(|v| !v.is_empty()) {
        return Some(value.to_string());
    }
    env.and_then(|name| std::env::var(name).ok())
        .filter(|v| !v.is_empty())
}

fn default_prefix() -> String {
    "!".to_string()
}

fn default_data_dir() -> String {
    crate::domain::paths::DEFAULT_DATA_DIR.to_string()
}

fn default_docs_api_url() -> String {
    "https://api.gitbook.com/v1/".to_string()
}

fn default_cache_ttl_days() -> i64 {
    crate::application::cache::DEFAULT_TTL_DAYS
}

fn default_user_agent() -> String {
    "linux:ninjabot:v0.1".to_string()
}

fn default_feed_interval() -> u64 {
    300
}

fn default_feed_limit() -> usize {
    5
}

fn default_feed_pacing() -> u64 {
    2
}
