//! Merging of per-shard test result documents

use serde_json::map::Entry;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::{ResultsError, Result};
use crate::tree::{is_leaf, TestResultTree, SUPPORTED_VERSION};

/// Merge shard documents into one.
///
/// All inputs must share `version` and `path_delimiter`. Failure counts are
/// summed per status, `interrupted` is OR-ed and the earliest start time is
/// kept. `tests` tries are unioned; when two inputs disagree on a leaf the
/// later input wins. Extra top-level keys keep the first input's value.
pub fn merge(trees: &[TestResultTree]) -> Result<TestResultTree> {
    let (first, rest) = trees.split_first().ok_or(ResultsError::NoInputs)?;

    for tree in rest {
        if tree.version != first.version {
            return Err(ResultsError::SchemaMismatch {
                field: "version",
                first: first.version.to_string(),
                other: tree.version.to_string(),
            });
        }
        if tree.path_delimiter != first.path_delimiter {
            return Err(ResultsError::SchemaMismatch {
                field: "path_delimiter",
                first: first.path_delimiter.clone(),
                other: tree.path_delimiter.clone(),
            });
        }
    }

    if first.version != SUPPORTED_VERSION {
        return Err(ResultsError::UnsupportedVersion {
            found: first.version,
            expected: SUPPORTED_VERSION,
        });
    }

    let mut merged = TestResultTree::new(first.path_delimiter.clone(), first.seconds_since_epoch);
    let mut path = Vec::new();

    for tree in trees {
        merged.interrupted |= tree.interrupted;
        merged.seconds_since_epoch = merged.seconds_since_epoch.min(tree.seconds_since_epoch);

        for (status, count) in &tree.num_failures_by_type {
            let total = merged.num_failures_by_type.entry(status.clone()).or_insert(0);
            *total = total
                .checked_add(*count)
                .ok_or_else(|| ResultsError::CountOverflow {
                    status: status.clone(),
                })?;
        }

        merge_tests(&mut merged.tests, &tree.tests, &mut path, &first.path_delimiter);

        for (key, value) in &tree.extra {
            merged
                .extra
                .entry(key.clone())
                .or_insert_with(|| value.clone());
        }
    }

    debug!(
        inputs = trees.len(),
        tests = merged.test_count(),
        interrupted = merged.interrupted,
        "merged test results"
    );
    Ok(merged)
}

fn merge_tests(
    dest: &mut Map<String, Value>,
    src: &Map<String, Value>,
    path: &mut Vec<String>,
    delimiter: &str,
) {
    for (key, incoming) in src {
        path.push(key.clone());

        match dest.entry(key.clone()) {
            Entry::Vacant(slot) => {
                slot.insert(incoming.clone());
            }
            Entry::Occupied(mut slot) => match (slot.get_mut(), incoming) {
                (Value::Object(existing), Value::Object(incoming))
                    if !is_leaf(existing) && !is_leaf(incoming) =>
                {
                    merge_tests(existing, incoming, path, delimiter);
                }
                (existing, incoming) => {
                    if existing != incoming {
                        warn!(
                            test = %path.join(delimiter),
                            "conflicting results for test, keeping the later shard's"
                        );
                    }
                    *existing = incoming.clone();
                }
            },
        }

        path.pop();
    }
}
