//! Default configuration values

/// Default configuration file name (TOML)
pub const DEFAULT_CONFIG_TOML: &str = "tally.toml";

/// Default configuration file name (YAML)
pub const DEFAULT_CONFIG_YAML: &str = "tally.yaml";

/// Longest pause between two poll rounds, in seconds
pub const DEFAULT_MAX_BACKOFF_SECS: u64 = 120;

/// Exclusion rounds allowed for a single profile merge
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Profile merge tool looked up on PATH
pub const DEFAULT_MERGE_TOOL: &str = "llvm-profdata";

/// Suffix of already-indexed profile fragments
pub const DEFAULT_PROFILE_EXTENSION: &str = ".profdata";

/// Suffix of raw per-shard profile fragments
pub const RAW_PROFILE_EXTENSION: &str = ".profraw";

/// Get list of config file names to search for
pub fn config_file_names() -> Vec<&'static str> {
    vec![
        DEFAULT_CONFIG_TOML,
        DEFAULT_CONFIG_YAML,
        ".tally.toml",
        ".tally.yaml",
    ]
}
