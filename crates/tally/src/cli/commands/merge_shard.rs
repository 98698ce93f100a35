//! Merge-shard command

use std::path::PathBuf;

use clap::Args;
use tracing::info;

use tally_core::config::RAW_PROFILE_EXTENSION;
use tally_profiles::{LlvmProfdata, ProfileFilter, ProfileMerger};
use tally_results::load_shard_results;

use super::merge_results::{merge_and_write, print_summary};
use super::{ensure_parent, print_profile_result, report_invalid_profiles, resolve_merge_tool};
use crate::cli::Cli;

/// Merge one shard set's test results and raw coverage profiles
#[derive(Debug, Args)]
pub struct MergeShardCommand {
    /// Where to write the merged test results
    #[arg(short, long)]
    pub output: PathBuf,

    /// Directory holding the shards' raw profiles
    #[arg(long, requires = "profdata_output")]
    pub profdata_dir: Option<PathBuf>,

    /// Where to write the merged profile
    #[arg(long, requires = "profdata_dir")]
    pub profdata_output: Option<PathBuf>,

    /// Merge tool to run instead of the configured one
    #[arg(long)]
    pub merge_tool: Option<PathBuf>,

    /// Where to list excluded profiles (default: <profdata-dir>/invalid_profiles.json)
    #[arg(long)]
    pub invalid_profiles_json: Option<PathBuf>,

    /// Shard result files; missing or empty ones are skipped
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,
}

impl MergeShardCommand {
    /// Execute the merge-shard command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(
            inputs = self.inputs.len(),
            output = %self.output.display(),
            profdata_dir = ?self.profdata_dir,
            "executing merge-shard command"
        );
        let config = cli.load_config()?;

        let loaded = load_shard_results(&self.inputs)?;
        let merged = merge_and_write(&loaded.trees, &self.output)?;
        print_summary(cli, &merged, &self.output, self.inputs.len(), &loaded.skipped)?;

        let (Some(dir), Some(profdata_output)) = (&self.profdata_dir, &self.profdata_output) else {
            return Ok(());
        };

        let tool = resolve_merge_tool(self.merge_tool.as_deref(), &config.profiles.merge_tool)?;
        ensure_parent(profdata_output)?;

        let merger = ProfileMerger::new(LlvmProfdata::new(tool).with_sparse(config.profiles.sparse))
            .with_max_retries(config.profiles.max_retries);
        let invalid = merger.merge_dir(dir, profdata_output, &ProfileFilter::new(RAW_PROFILE_EXTENSION))?;

        let report = self
            .invalid_profiles_json
            .clone()
            .unwrap_or_else(|| dir.join("invalid_profiles.json"));
        report_invalid_profiles(cli, &report, &invalid)?;
        print_profile_result(cli, profdata_output);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::fs;
    use tempfile::TempDir;

    const SHARD: &str = r#"{"version": 3, "path_delimiter": ".", "seconds_since_epoch": 5.0,
        "tests": {"a": {"b": {"expected": "PASS", "actual": "PASS"}}}}"#;

    #[test]
    fn test_profile_flags_require_each_other() {
        let result = Cli::try_parse_from([
            "tally",
            "merge-shard",
            "-o",
            "out.json",
            "--profdata-dir",
            "profiles",
            "shard.json",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_merge_shard_skips_missing_results() {
        let temp = TempDir::new().unwrap();
        let present = temp.path().join("0.json");
        fs::write(&present, SHARD).unwrap();
        let missing = temp.path().join("1.json");
        let out = temp.path().join("output.json");
        let config = temp.path().join("tally.toml");
        fs::write(&config, "").unwrap();

        let cli = Cli::try_parse_from([
            "tally",
            "-q",
            "--config",
            config.to_str().unwrap(),
            "merge-shard",
            "-o",
            out.to_str().unwrap(),
            present.to_str().unwrap(),
            missing.to_str().unwrap(),
        ])
        .unwrap();
        cli.execute().unwrap();

        let merged = tally_results::load_tree(&out).unwrap();
        assert_eq!(merged.test_count(), 1);
    }

    #[test]
    fn test_merge_shard_without_raw_profiles() {
        let temp = TempDir::new().unwrap();
        let shard = temp.path().join("0.json");
        fs::write(&shard, SHARD).unwrap();
        let profiles = temp.path().join("profiles");
        fs::create_dir_all(&profiles).unwrap();
        let profdata = temp.path().join("coverage").join("shard.profdata");
        let config = temp.path().join("tally.toml");
        fs::write(&config, "").unwrap();

        let cli = Cli::try_parse_from([
            "tally",
            "--config",
            config.to_str().unwrap(),
            "merge-shard",
            "-o",
            temp.path().join("output.json").to_str().unwrap(),
            "--profdata-dir",
            profiles.to_str().unwrap(),
            "--profdata-output",
            profdata.to_str().unwrap(),
            "--merge-tool",
            "/nonexistent/llvm-profdata",
            shard.to_str().unwrap(),
        ])
        .unwrap();
        cli.execute().unwrap();

        assert!(!profdata.exists());
        assert!(!profiles.join("invalid_profiles.json").exists());
    }
}
