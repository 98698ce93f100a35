//! Reading shard result files and writing the merged document

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{ResultsError, Result};
use crate::tree::TestResultTree;

/// Shard documents read from disk
#[derive(Debug, Default)]
pub struct LoadedShards {
    /// Parsed documents, in the order the paths were given
    pub trees: Vec<TestResultTree>,
    /// Files that were missing or empty
    pub skipped: Vec<PathBuf>,
}

/// Read and parse one results file
pub fn load_tree(path: &Path) -> Result<TestResultTree> {
    let contents = fs::read(path)?;
    serde_json::from_slice(&contents).map_err(|e| ResultsError::InvalidShard {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Read every shard's results file.
///
/// A shard that produced no file, or an empty one, is skipped with a
/// warning. Malformed JSON is an error naming the file.
pub fn load_shard_results(paths: &[PathBuf]) -> Result<LoadedShards> {
    let mut loaded = LoadedShards::default();

    for path in paths {
        let is_empty = match fs::metadata(path) {
            Ok(meta) => meta.len() == 0,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(path = %path.display(), "shard results file is missing");
                loaded.skipped.push(path.clone());
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        if is_empty {
            warn!(path = %path.display(), "shard results file is empty");
            loaded.skipped.push(path.clone());
            continue;
        }

        debug!(path = %path.display(), "loading shard results");
        loaded.trees.push(load_tree(path)?);
    }

    if loaded.trees.is_empty() {
        return Err(ResultsError::NoInputs);
    }

    Ok(loaded)
}

/// Write a document as JSON, creating parent directories
pub fn write_tree(tree: &TestResultTree, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(tree)?;
    fs::write(path, json)?;
    Ok(())
}
