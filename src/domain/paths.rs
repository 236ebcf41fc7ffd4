//! # Data Paths
//!
//! Centralized definitions for the files the bot keeps inside its data directory.
//! Acts as the single source of truth for where state, commands and logs live.

use std::path::{Path, PathBuf};

pub const DEFAULT_DATA_DIR: &str = "data";
pub const CONFIG_FILE: &str = "config.yaml";
pub const STATE_FILE: &str = "state.json";
pub const DYNAMIC_COMMANDS_FILE: &str = "commands.json";
pub const LOG_FILE: &str = "ninjabot.log";

/// Default location of the YAML configuration (e.g. "data/config.yaml")
pub fn default_config_path() -> PathBuf {
    Path::new(DEFAULT_DATA_DIR).join(CONFIG_FILE)
}

/// Key/value store backing the feed checkpoint and other small scalars
pub fn state_path(data_dir: &str) -> PathBuf {
    Path::new(data_dir).join(STATE_FILE)
}

/// Commands added at runtime through `add`
pub fn dynamic_commands_path(data_dir: &str) -> PathBuf {
    Path::new(data_dir).join(DYNAMIC_COMMANDS_FILE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_live_in_data_dir() {
        assert_eq!(state_path("data"), PathBuf::from("data/state.json"));
        assert_eq!(
            dynamic_commands_path("/var/lib/bot"),
            PathBuf::from("/var/lib/bot/commands.json")
        );
        assert_eq!(default_config_path(), PathBuf::from("data/config.yaml"));
    }
}
