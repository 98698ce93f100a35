//! Tally Profiles - Merging of sharded coverage profiles
//!
//! Every shard of an instrumented test run leaves profile fragments behind.
//! This crate merges them with an external tool and, when the tool rejects
//! some of them, isolates and drops the offending fragments instead of
//! failing the whole merge.

pub mod discovery;
pub mod error;
pub mod merger;
pub mod reporter;
pub mod tool;

use std::path::{Path, PathBuf};

pub use discovery::{find_profiles, ProfileFilter};
pub use error::{ProfileError, Result};
pub use merger::{ProfileMerger, DEFAULT_MAX_RETRIES};
pub use reporter::{CollectingReporter, ProfileEvent, ProfileReporter, TracingReporter};
pub use tool::{LlvmProfdata, MergeTool};

/// Merge all files under `input_dir` ending in `extension` into `output_file`
/// with the `llvm-profdata` binary at `tool_path`, in sparse mode.
///
/// Returns the fragments excluded as invalid.
pub fn merge_profiles(
    input_dir: &Path,
    output_file: &Path,
    extension: &str,
    tool_path: &Path,
    max_retries: u32,
) -> Result<Vec<PathBuf>> {
    ProfileMerger::new(LlvmProfdata::new(tool_path))
        .with_max_retries(max_retries)
        .merge_dir(input_dir, output_file, &ProfileFilter::new(extension))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_merge_profiles_without_fragments() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("notes.txt"), "not a profile").unwrap();
        let output = temp.path().join("merged.profdata");

        let excluded = merge_profiles(
            temp.path(),
            &output,
            ".profdata",
            Path::new("/nonexistent/llvm-profdata"),
            DEFAULT_MAX_RETRIES,
        )
        .unwrap();

        assert!(excluded.is_empty());
        assert!(!output.exists());
    }
}
