//! JSON test results document

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The only results format version understood by the merger
pub const SUPPORTED_VERSION: u32 = 3;

/// A test results document as written by one shard.
///
/// `tests` is a trie keyed by test path segments; its leaves are objects
/// carrying `expected` and `actual`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestResultTree {
    pub version: u32,

    pub path_delimiter: String,

    #[serde(default)]
    pub interrupted: bool,

    /// Wall-clock start of the run
    pub seconds_since_epoch: f64,

    #[serde(default)]
    pub num_failures_by_type: BTreeMap<String, u64>,

    #[serde(default)]
    pub tests: Map<String, Value>,

    /// Top-level keys outside the schema, carried through untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TestResultTree {
    /// An empty document for the given delimiter
    pub fn new(path_delimiter: impl Into<String>, seconds_since_epoch: f64) -> Self {
        Self {
            version: SUPPORTED_VERSION,
            path_delimiter: path_delimiter.into(),
            interrupted: false,
            seconds_since_epoch,
            num_failures_by_type: BTreeMap::new(),
            tests: Map::new(),
            extra: Map::new(),
        }
    }

    /// Count of leaves in `tests`
    pub fn test_count(&self) -> usize {
        fn count(map: &Map<String, Value>) -> usize {
            map.values()
                .map(|value| match value {
                    Value::Object(child) if is_leaf(child) => 1,
                    Value::Object(child) => count(child),
                    _ => 0,
                })
                .sum()
        }
        count(&self.tests)
    }
}

/// A node is a leaf when it records both the expected and the actual result.
pub fn is_leaf(node: &Map<String, Value>) -> bool {
    node.contains_key("expected") && node.contains_key("actual")
}
