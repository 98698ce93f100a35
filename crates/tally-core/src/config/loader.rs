//! Configuration loading

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::{ConfigError, Result};

use super::defaults::config_file_names;
use super::types::Config;
use super::validation::validate_config;

/// Load configuration from a file
pub fn load_config(path: &Path) -> Result<Config> {
    let format = if path.extension().is_some_and(|e| e == "toml") {
        "TOML"
    } else {
        "YAML"
    };
    info!(path = %path.display(), format, "loading config");

    if !path.exists() {
        return Err(ConfigError::NotFound(path.to_path_buf()).into());
    }

    let content = std::fs::read_to_string(path).map_err(ConfigError::Io)?;

    let config: Config = if format == "TOML" {
        toml::from_str(&content).map_err(ConfigError::TomlError)?
    } else {
        serde_yaml::from_str(&content).map_err(ConfigError::YamlError)?
    };

    validate_config(&config)?;
    debug!(path = %path.display(), "config loaded and validated");
    Ok(config)
}

/// Find a configuration file in `start_dir` or any of its parents.
///
/// The first name from [`config_file_names`] present at the closest level wins.
pub fn find_config(start_dir: &Path) -> Option<PathBuf> {
    debug!(start_dir = %start_dir.display(), "searching for config file");
    let mut current = start_dir.to_path_buf();

    loop {
        for name in config_file_names() {
            let config_path = current.join(name);
            if config_path.exists() {
                info!(path = %config_path.display(), "found config file");
                return Some(config_path);
            }
        }

        if !current.pop() {
            break;
        }
    }

    debug!("no config file found");
    None
}

/// Load configuration or use defaults.
///
/// A file that exists but fails to parse or validate is still an error.
pub fn load_config_or_default(dir: &Path) -> Result<(Config, Option<PathBuf>)> {
    match find_config(dir) {
        Some(path) => {
            let config = load_config(&path)?;
            Ok((config, Some(path)))
        }
        None => {
            warn!(dir = %dir.display(), "no config found, using defaults");
            Ok((Config::default(), None))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TallyError;
    use tempfile::TempDir;

    #[test]
    fn test_find_config_toml() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("tally.toml");
        std::fs::write(&config_path, "[poll]\nmax_backoff_secs = 60").unwrap();

        let found = find_config(temp.path());
        assert_eq!(found, Some(config_path));
    }

    #[test]
    fn test_find_config_prefers_toml_over_yaml() {
        let temp = TempDir::new().unwrap();
        let toml_path = temp.path().join("tally.toml");
        let yaml_path = temp.path().join("tally.yaml");
        std::fs::write(&toml_path, "[poll]\nmax_backoff_secs = 60").unwrap();
        std::fs::write(&yaml_path, "poll:\n  max_backoff_secs: 30").unwrap();

        let found = find_config(temp.path()).unwrap();
        assert_eq!(found, toml_path);
    }

    #[test]
    fn test_find_config_in_parent_dir() {
        let temp = TempDir::new().unwrap();
        let nested = temp.path().join("out").join("shard-0");
        std::fs::create_dir_all(&nested).unwrap();
        let config_path = temp.path().join(".tally.yaml");
        std::fs::write(&config_path, "profiles:\n  sparse: false\n").unwrap();

        let found = find_config(&nested).unwrap();
        assert_eq!(found, config_path);
    }

    #[test]
    fn test_load_config_toml() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("tally.toml");
        std::fs::write(
            &config_path,
            "[poll]\nserver = \"https://tasks.example.com\"\nmax_backoff_secs = 30\n\n[profiles]\nmax_retries = 5\n",
        )
        .unwrap();

        let config = load_config(&config_path).unwrap();
        assert_eq!(config.poll.server.as_deref(), Some("https://tasks.example.com"));
        assert_eq!(config.poll.max_backoff_secs, 30);
        assert_eq!(config.profiles.max_retries, 5);
    }

    #[test]
    fn test_load_config_yaml() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("tally.yaml");
        std::fs::write(
            &config_path,
            "profiles:\n  extension: .profraw\n  filename_pattern: 'unit_tests.*'\n",
        )
        .unwrap();

        let config = load_config(&config_path).unwrap();
        assert_eq!(config.profiles.extension, ".profraw");
        assert_eq!(config.profiles.filename_pattern.as_deref(), Some("unit_tests.*"));
    }

    #[test]
    fn test_load_config_rejects_invalid_values() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("tally.toml");
        std::fs::write(&config_path, "[poll]\nmax_backoff_secs = 0\n").unwrap();

        let err = load_config(&config_path).unwrap_err();
        assert!(matches!(
            err,
            TallyError::Config(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_load_config_or_default_without_file() {
        let temp = TempDir::new().unwrap();
        let (config, path) = load_config_or_default(temp.path()).unwrap();
        assert!(path.is_none());
        assert_eq!(config.profiles.max_retries, 3);
    }
}
