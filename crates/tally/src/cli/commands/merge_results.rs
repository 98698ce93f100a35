//! Merge-results command

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;
use tracing::info;

use tally_results::{load_tree, merge, write_tree, TestResultTree};

use crate::cli::{output, Cli, OutputFormat};

/// Merge shard test result files into one
#[derive(Debug, Args)]
pub struct MergeResultsCommand {
    /// Where to write the merged results
    #[arg(short, long)]
    pub output: PathBuf,

    /// Shard result files, in shard order
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,
}

impl MergeResultsCommand {
    /// Execute the merge-results command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(
            inputs = self.inputs.len(),
            output = %self.output.display(),
            "executing merge-results command"
        );

        let trees = self
            .inputs
            .iter()
            .map(|path| load_tree(path).with_context(|| format!("failed to read {}", path.display())))
            .collect::<anyhow::Result<Vec<_>>>()?;

        let merged = merge_and_write(&trees, &self.output)?;
        print_summary(cli, &merged, &self.output, self.inputs.len(), &[])
    }
}

/// Merge result trees and write the merged document
pub(crate) fn merge_and_write(trees: &[TestResultTree], output: &Path) -> anyhow::Result<TestResultTree> {
    let merged = merge(trees)?;
    write_tree(&merged, output)
        .with_context(|| format!("failed to write {}", output.display()))?;
    Ok(merged)
}

/// Report a finished result merge
pub(crate) fn print_summary(
    cli: &Cli,
    merged: &TestResultTree,
    output: &Path,
    shards: usize,
    skipped: &[PathBuf],
) -> anyhow::Result<()> {
    match cli.format {
        OutputFormat::Json => {
            let summary = serde_json::json!({
                "output": output.to_string_lossy(),
                "shards": shards,
                "skipped": skipped.iter().map(|p| p.to_string_lossy()).collect::<Vec<_>>(),
                "tests": merged.test_count(),
                "interrupted": merged.interrupted,
                "num_failures_by_type": merged.num_failures_by_type,
            });
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        OutputFormat::Text => {
            if !cli.quiet {
                for path in skipped {
                    output::warning(&format!("No results from {}", output::path(path)));
                }
                output::success(&format!(
                    "Merged {} tests from {} shards into {}",
                    merged.test_count(),
                    shards - skipped.len(),
                    output::path(output)
                ));
                if merged.interrupted {
                    output::warning("At least one shard was interrupted");
                }
            }
        }
    }
    Ok(())
}
