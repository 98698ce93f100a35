//! Configuration types

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration for Tally
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Task-set polling configuration
    pub poll: PollConfig,

    /// Profile merging configuration
    pub profiles: ProfilesConfig,
}

/// Task-set polling configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PollConfig {
    /// Path to the task-state query tool
    pub query_tool: Option<PathBuf>,

    /// Endpoint of the remote execution service
    pub server: Option<String>,

    /// Optional credential file handed to the query tool
    pub auth_json: Option<PathBuf>,

    /// Upper bound for the delay between poll rounds
    pub max_backoff_secs: u64,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            query_tool: None,
            server: None,
            auth_json: None,
            max_backoff_secs: super::defaults::DEFAULT_MAX_BACKOFF_SECS,
        }
    }
}

/// Profile merging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfilesConfig {
    /// Merge tool executable (name on PATH or absolute path)
    pub merge_tool: String,

    /// How many exclusion rounds are allowed after the first failure
    pub max_retries: u32,

    /// Pass `-sparse=true` to the merge tool
    pub sparse: bool,

    /// File name suffix of profile fragments
    pub extension: String,

    /// Optional regex a fragment's file name must match
    pub filename_pattern: Option<String>,
}

impl Default for ProfilesConfig {
    fn default() -> Self {
        Self {
            merge_tool: super::defaults::DEFAULT_MERGE_TOOL.to_string(),
            max_retries: super::defaults::DEFAULT_MAX_RETRIES,
            sparse: true,
            extension: super::defaults::DEFAULT_PROFILE_EXTENSION.to_string(),
            filename_pattern: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.poll.max_backoff_secs, 120);
        assert_eq!(config.profiles.max_retries, 3);
        assert_eq!(config.profiles.extension, ".profdata");
        assert!(config.profiles.sparse);
        assert!(config.poll.query_tool.is_none());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: Config = toml::from_str("[profiles]\nsparse = false\n").unwrap();
        assert!(!config.profiles.sparse);
        assert_eq!(config.profiles.merge_tool, "llvm-profdata");
        assert_eq!(config.poll.max_backoff_secs, 120);
    }
}
