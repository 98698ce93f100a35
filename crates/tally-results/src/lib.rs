//! Tally Results - Merging of sharded JSON test results
//!
//! Each shard of a test run writes a results document whose `tests` field is
//! a trie of test path segments. This crate validates that a set of such
//! documents share a schema and folds them into a single document.

pub mod error;
pub mod loader;
pub mod merge;
pub mod tree;

pub use error::{Result, ResultsError};
pub use loader::{load_shard_results, load_tree, write_tree, LoadedShards};
pub use merge::merge;
pub use tree::{TestResultTree, SUPPORTED_VERSION};
