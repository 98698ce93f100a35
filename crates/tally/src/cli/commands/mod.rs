//! CLI commands

mod merge_profiles;
mod merge_results;
mod merge_shard;
mod wait;

pub use merge_profiles::MergeProfilesCommand;
pub use merge_results::MergeResultsCommand;
pub use merge_shard::MergeShardCommand;
pub use wait::WaitCommand;

use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::{debug, warn};

use crate::cli::{output, Cli};

/// Locate the merge tool: an explicit path as given, otherwise the configured
/// name looked up on `PATH`.
pub(crate) fn resolve_merge_tool(explicit: Option<&Path>, configured: &str) -> anyhow::Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }
    let path = which::which(configured)
        .with_context(|| format!("merge tool '{}' not found on PATH", configured))?;
    debug!(tool = %path.display(), "resolved merge tool");
    Ok(path)
}

/// Create the parent directory of an output file
pub(crate) fn ensure_parent(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    Ok(())
}

/// Tell whether a profile merge produced `output`
pub(crate) fn print_profile_result(cli: &Cli, output_file: &Path) {
    if !cli.is_chatty() {
        return;
    }
    match merged_profile_message(output_file) {
        Some(message) => output::success(&message),
        None => output::info("No profiles found to merge"),
    }
}

fn merged_profile_message(output_file: &Path) -> Option<String> {
    output_file
        .exists()
        .then(|| format!("Merged profiles into {}", output::path(output_file)))
}

/// Record profiles excluded from a merge.
///
/// Writes them as a JSON array to `report` and warns about each one. Nothing
/// is written when no profile was excluded.
pub(crate) fn report_invalid_profiles(
    cli: &Cli,
    report: &Path,
    invalid: &[PathBuf],
) -> anyhow::Result<()> {
    if invalid.is_empty() {
        return Ok(());
    }

    let paths: Vec<String> = invalid
        .iter()
        .map(|p| p.to_string_lossy().into_owned())
        .collect();
    ensure_parent(report)?;
    std::fs::write(report, serde_json::to_string_pretty(&paths)?)
        .with_context(|| format!("failed to write {}", report.display()))?;

    for path in invalid {
        warn!(path = %path.display(), "excluded invalid profile");
        if cli.is_chatty() {
            output::warning(&format!("Invalid profile excluded: {}", output::path(path)));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tempfile::TempDir;

    #[test]
    fn test_explicit_merge_tool_is_not_looked_up() {
        let tool = resolve_merge_tool(Some(Path::new("/opt/llvm/bin/llvm-profdata")), "ignored")
            .unwrap();
        assert_eq!(tool, PathBuf::from("/opt/llvm/bin/llvm-profdata"));
    }

    #[test]
    fn test_unknown_merge_tool() {
        let err = resolve_merge_tool(None, "no-such-profdata-tool-xyz").unwrap_err();
        assert!(err.to_string().contains("no-such-profdata-tool-xyz"));
    }

    #[test]
    fn test_profile_message_only_when_output_written() {
        let temp = TempDir::new().unwrap();
        let merged = temp.path().join("merged.profdata");

        assert_eq!(merged_profile_message(&merged), None);

        std::fs::write(&merged, b"profile").unwrap();
        let message = merged_profile_message(&merged).unwrap();
        assert!(message.contains("merged.profdata"));
    }

    #[test]
    fn test_invalid_profiles_report() {
        let temp = TempDir::new().unwrap();
        let cli = Cli::try_parse_from(["tally", "-q", "merge-results", "-o", "o.json", "a.json"])
            .unwrap();
        let report = temp.path().join("invalid_profiles.json");
        let invalid = vec![PathBuf::from("/b/1.profdata"), PathBuf::from("/b/2.profdata")];

        report_invalid_profiles(&cli, &report, &invalid).unwrap();

        let written: Vec<String> =
            serde_json::from_str(&std::fs::read_to_string(&report).unwrap()).unwrap();
        assert_eq!(written, vec!["/b/1.profdata", "/b/2.profdata"]);
    }

    #[test]
    fn test_no_report_without_invalid_profiles() {
        let temp = TempDir::new().unwrap();
        let cli = Cli::try_parse_from(["tally", "merge-results", "-o", "o.json", "a.json"])
            .unwrap();
        let report = temp.path().join("invalid_profiles.json");

        report_invalid_profiles(&cli, &report, &[]).unwrap();

        assert!(!report.exists());
    }
}
