//! Profile merging with isolation of corrupt inputs

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{info, warn};

use crate::discovery::{find_profiles, ProfileFilter};
use crate::error::{ProfileError, Result};
use crate::reporter::{ProfileEvent, ProfileReporter, TracingReporter};
use crate::tool::MergeTool;

/// Default number of exclusion rounds after the first failed merge
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Merges profile fragments, dropping inputs the tool blames for a failure.
///
/// Each failed run whose output names one or more candidate paths removes
/// those paths and retries with the rest, so the tool runs at most
/// `max_retries + 1` times. Inputs of the successful run are deleted.
pub struct ProfileMerger<T> {
    tool: T,
    max_retries: u32,
    reporter: Arc<dyn ProfileReporter>,
}

impl<T: MergeTool> ProfileMerger<T> {
    pub fn new(tool: T) -> Self {
        Self {
            tool,
            max_retries: DEFAULT_MAX_RETRIES,
            reporter: Arc::new(TracingReporter),
        }
    }

    /// Set the number of exclusion rounds
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set the progress reporter
    pub fn with_reporter(mut self, reporter: Arc<dyn ProfileReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Merge every fragment under `input_dir` selected by `filter` into `output`.
    ///
    /// Returns the inputs excluded as invalid. `output` itself is never
    /// treated as an input, even when it lives under `input_dir`.
    pub fn merge_dir(
        &self,
        input_dir: &Path,
        output: &Path,
        filter: &ProfileFilter,
    ) -> Result<Vec<PathBuf>> {
        let inputs: Vec<PathBuf> = find_profiles(input_dir, filter)?
            .into_iter()
            .filter(|path| !same_file(path, output))
            .collect();
        self.merge_files(inputs, output)
    }

    /// Merge `inputs` into `output`, returning the inputs excluded as invalid.
    ///
    /// With no inputs the tool is not run and no output is written.
    pub fn merge_files(&self, inputs: Vec<PathBuf>, output: &Path) -> Result<Vec<PathBuf>> {
        if inputs.is_empty() {
            info!(output = %output.display(), "no profiles to merge");
            return Ok(Vec::new());
        }

        let mut candidates = inputs;
        let mut excluded = Vec::new();
        let mut retries_left = self.max_retries;

        loop {
            self.reporter.report(&ProfileEvent::Attempt {
                inputs: candidates.len(),
                retries_left,
            });

            let (exit_code, tool_output) = match self.tool.merge(output, &candidates) {
                Ok(()) => break,
                Err(ProfileError::MergeFailed { exit_code, output }) => (exit_code, output),
                Err(e) => return Err(e),
            };

            if candidates.len() == 1 || retries_left == 0 {
                return Err(ProfileError::MergeFailed {
                    exit_code,
                    output: tool_output,
                });
            }

            let invalid = invalid_inputs(&candidates, &tool_output);
            if invalid.is_empty() || invalid.len() == candidates.len() {
                return Err(ProfileError::MergeFailed {
                    exit_code,
                    output: tool_output,
                });
            }

            for path in &invalid {
                self.reporter.report(&ProfileEvent::Excluded { path: path.clone() });
            }
            candidates.retain(|path| !invalid.contains(path));
            excluded.extend(invalid);
            retries_left -= 1;
        }

        for path in &candidates {
            if let Err(e) = fs::remove_file(path) {
                warn!(path = %path.display(), error = %e, "failed to remove merged profile");
            }
        }

        self.reporter.report(&ProfileEvent::Merged {
            inputs: candidates.len(),
            excluded: excluded.len(),
        });
        Ok(excluded)
    }
}

/// Candidates whose path appears verbatim in the tool's output
fn invalid_inputs(candidates: &[PathBuf], tool_output: &str) -> Vec<PathBuf> {
    candidates
        .iter()
        .filter(|path| tool_output.contains(&*path.to_string_lossy()))
        .cloned()
        .collect()
}

fn same_file(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
