//! Merge-profiles command

use std::path::PathBuf;

use clap::Args;
use tracing::info;

use tally_profiles::{LlvmProfdata, ProfileFilter, ProfileMerger};

use super::{ensure_parent, print_profile_result, report_invalid_profiles, resolve_merge_tool};
use crate::cli::{Cli, OutputFormat};

/// Merge indexed coverage profiles found under a directory
#[derive(Debug, Args)]
pub struct MergeProfilesCommand {
    /// Directory searched recursively for profiles
    #[arg(long)]
    pub input_dir: PathBuf,

    /// Where to write the merged profile
    #[arg(long)]
    pub output_file: PathBuf,

    /// Merge tool to run instead of the configured one
    #[arg(long)]
    pub merge_tool: Option<PathBuf>,

    /// Profile file name suffix
    #[arg(long)]
    pub extension: Option<String>,

    /// Only merge profiles whose file name matches this regex
    #[arg(long)]
    pub filename_pattern: Option<String>,

    /// Exclusion rounds allowed after the first failed merge
    #[arg(long)]
    pub max_retries: Option<u32>,

    /// Do not pass -sparse=true to the merge tool
    #[arg(long)]
    pub no_sparse: bool,

    /// Where to list excluded profiles (default: <input-dir>/invalid_profiles.json)
    #[arg(long)]
    pub invalid_profiles_json: Option<PathBuf>,
}

impl MergeProfilesCommand {
    /// Execute the merge-profiles command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(
            input_dir = %self.input_dir.display(),
            output_file = %self.output_file.display(),
            "executing merge-profiles command"
        );
        let config = cli.load_config()?.profiles;

        let extension = self.extension.clone().unwrap_or(config.extension);
        let mut filter = ProfileFilter::new(extension);
        if let Some(pattern) = self.filename_pattern.as_ref().or(config.filename_pattern.as_ref()) {
            filter = filter.with_pattern(pattern)?;
        }
        let sparse = config.sparse && !self.no_sparse;
        let max_retries = self.max_retries.unwrap_or(config.max_retries);

        let tool = resolve_merge_tool(self.merge_tool.as_deref(), &config.merge_tool)?;
        ensure_parent(&self.output_file)?;

        let merger = ProfileMerger::new(LlvmProfdata::new(tool).with_sparse(sparse))
            .with_max_retries(max_retries);
        let invalid = merger.merge_dir(&self.input_dir, &self.output_file, &filter)?;

        let report = self
            .invalid_profiles_json
            .clone()
            .unwrap_or_else(|| self.input_dir.join("invalid_profiles.json"));
        report_invalid_profiles(cli, &report, &invalid)?;

        match cli.format {
            OutputFormat::Json => {
                let summary = serde_json::json!({
                    "output_file": self.output_file.to_string_lossy(),
                    "written": self.output_file.exists(),
                    "invalid_profiles": invalid.iter().map(|p| p.to_string_lossy()).collect::<Vec<_>>(),
                });
                println!("{}", serde_json::to_string_pretty(&summary)?);
            }
            OutputFormat::Text => print_profile_result(cli, &self.output_file),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::fs;
    use tempfile::TempDir;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_flag_defaults() {
        let cli = parse(&[
            "tally",
            "merge-profiles",
            "--input-dir",
            "in",
            "--output-file",
            "out.profdata",
        ]);
        let crate::cli::Commands::MergeProfiles(cmd) = cli.command else {
            panic!("wrong command");
        };
        assert_eq!(cmd.extension, None);
        assert_eq!(cmd.max_retries, None);
        assert!(!cmd.no_sparse);
    }

    #[test]
    fn test_empty_directory_runs_nothing() {
        let temp = TempDir::new().unwrap();
        let input = temp.path().join("profiles");
        fs::create_dir_all(&input).unwrap();
        let out = temp.path().join("merged").join("all.profdata");
        let config = temp.path().join("tally.toml");
        fs::write(&config, "").unwrap();

        let cli = parse(&[
            "tally",
            "-q",
            "--config",
            config.to_str().unwrap(),
            "merge-profiles",
            "--input-dir",
            input.to_str().unwrap(),
            "--output-file",
            out.to_str().unwrap(),
            "--merge-tool",
            "/nonexistent/llvm-profdata",
        ]);
        cli.execute().unwrap();

        assert!(!out.exists());
        assert!(!input.join("invalid_profiles.json").exists());
    }

    #[test]
    fn test_bad_filename_pattern() {
        let temp = TempDir::new().unwrap();
        let config = temp.path().join("tally.toml");
        fs::write(&config, "").unwrap();

        let cli = parse(&[
            "tally",
            "-q",
            "--config",
            config.to_str().unwrap(),
            "merge-profiles",
            "--input-dir",
            temp.path().to_str().unwrap(),
            "--output-file",
            "out.profdata",
            "--filename-pattern",
            "([",
            "--merge-tool",
            "/nonexistent/llvm-profdata",
        ]);
        let err = cli.execute().unwrap_err();
        assert!(err.to_string().contains("(["));
    }
}
