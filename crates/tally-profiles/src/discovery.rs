//! Locating profile fragments under a directory

use std::path::{Path, PathBuf};

use regex::Regex;
use tracing::debug;
use walkdir::WalkDir;

use crate::error::{ProfileError, Result};

/// Which files count as profile fragments
#[derive(Debug, Clone)]
pub struct ProfileFilter {
    extension: String,
    pattern: Option<Regex>,
}

impl ProfileFilter {
    /// Match files whose name ends with `extension`
    pub fn new(extension: impl Into<String>) -> Self {
        Self {
            extension: extension.into(),
            pattern: None,
        }
    }

    /// Additionally require the file name to match `pattern` from its start
    pub fn with_pattern(mut self, pattern: &str) -> Result<Self> {
        let anchored = format!("^(?:{})", pattern);
        let regex = Regex::new(&anchored).map_err(|e| ProfileError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;
        self.pattern = Some(regex);
        Ok(self)
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Whether a file name is selected
    pub fn matches(&self, file_name: &str) -> bool {
        file_name.ends_with(&self.extension)
            && self
                .pattern
                .as_ref()
                .map_or(true, |re| re.is_match(file_name))
    }
}

/// Recursively find profile fragments under `dir`, sorted by path
pub fn find_profiles(dir: &Path, filter: &ProfileFilter) -> Result<Vec<PathBuf>> {
    let mut found = Vec::new();

    for entry in WalkDir::new(dir) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(name) = entry.file_name().to_str() else {
            debug!(path = %entry.path().display(), "skipping file with non-UTF-8 name");
            continue;
        };
        if filter.matches(name) {
            found.push(entry.into_path());
        }
    }

    found.sort();
    debug!(
        dir = %dir.display(),
        extension = filter.extension(),
        count = found.len(),
        "found profile fragments"
    );
    Ok(found)
}
