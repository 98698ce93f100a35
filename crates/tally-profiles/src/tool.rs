//! External profile merge tool

use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::debug;

use crate::error::{ProfileError, Result};

/// Merges profile files into one output file.
///
/// A tool failure attributable to bad inputs must be reported as
/// [`ProfileError::MergeFailed`] carrying the tool's full output; any other
/// error stops the merge without fault isolation.
pub trait MergeTool {
    fn merge(&self, output: &Path, inputs: &[PathBuf]) -> Result<()>;
}

impl<T: MergeTool + ?Sized> MergeTool for &T {
    fn merge(&self, output: &Path, inputs: &[PathBuf]) -> Result<()> {
        (**self).merge(output, inputs)
    }
}

/// `llvm-profdata merge` invoked as a child process
#[derive(Debug, Clone)]
pub struct LlvmProfdata {
    path: PathBuf,
    sparse: bool,
}

impl LlvmProfdata {
    /// Create an invoker for the tool at `path`, in sparse mode
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            sparse: true,
        }
    }

    /// Toggle `-sparse=true`
    pub fn with_sparse(mut self, sparse: bool) -> Self {
        self.sparse = sparse;
        self
    }

    /// Arguments for one merge invocation
    pub fn args(&self, output: &Path, inputs: &[PathBuf]) -> Vec<String> {
        let mut args = vec![
            "merge".to_string(),
            "-o".to_string(),
            output.to_string_lossy().into_owned(),
        ];
        if self.sparse {
            args.push("-sparse=true".to_string());
        }
        args.extend(inputs.iter().map(|p| p.to_string_lossy().into_owned()));
        args
    }
}

impl MergeTool for LlvmProfdata {
    fn merge(&self, output: &Path, inputs: &[PathBuf]) -> Result<()> {
        debug!(tool = %self.path.display(), inputs = inputs.len(), "running profile merge");

        let result = Command::new(&self.path)
            .args(self.args(output, inputs))
            .output()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => ProfileError::ToolNotFound(self.path.clone()),
                _ => ProfileError::Io(e),
            })?;

        if result.status.success() {
            return Ok(());
        }

        let mut combined = String::from_utf8_lossy(&result.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&result.stderr));
        Err(ProfileError::MergeFailed {
            exit_code: result.status.code(),
            output: combined,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sparse_args() {
        let tool = LlvmProfdata::new("/usr/bin/llvm-profdata");
        let args = tool.args(
            Path::new("out/merged.profdata"),
            &[PathBuf::from("a.profdata"), PathBuf::from("b.profdata")],
        );
        assert_eq!(
            args,
            vec![
                "merge",
                "-o",
                "out/merged.profdata",
                "-sparse=true",
                "a.profdata",
                "b.profdata",
            ]
        );
    }

    #[test]
    fn test_non_sparse_args() {
        let tool = LlvmProfdata::new("llvm-profdata").with_sparse(false);
        let args = tool.args(Path::new("m.profdata"), &[PathBuf::from("x.profraw")]);
        assert_eq!(args, vec!["merge", "-o", "m.profdata", "x.profraw"]);
    }

    #[test]
    fn test_missing_tool() {
        let tool = LlvmProfdata::new("/nonexistent/llvm-profdata");
        let err = tool
            .merge(Path::new("out.profdata"), &[PathBuf::from("a.profdata")])
            .unwrap_err();
        assert!(matches!(err, ProfileError::ToolNotFound(_)));
    }

    #[cfg(unix)]
    #[test]
    fn test_nonzero_exit_is_merge_failure() {
        let tool = LlvmProfdata::new("false");
        let err = tool
            .merge(Path::new("out.profdata"), &[PathBuf::from("a.profdata")])
            .unwrap_err();
        assert!(matches!(
            err,
            ProfileError::MergeFailed {
                exit_code: Some(1),
                ..
            }
        ));
    }
}
