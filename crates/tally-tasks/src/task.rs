//! Task identifiers, task sets and task states

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque identifier of one remote execution unit
#[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    /// Create a new task ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw identifier
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TaskId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// All shards of one logical job, in submission order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskSet(Vec<TaskId>);

impl TaskSet {
    /// Create a task set from its shard IDs
    pub fn new<I, T>(ids: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<TaskId>,
    {
        Self(ids.into_iter().map(Into::into).collect())
    }

    /// Shard IDs of this set
    pub fn ids(&self) -> &[TaskId] {
        &self.0
    }

    /// A set is finished when it has shards and every one of them is in `finished`.
    pub fn is_finished_in(&self, finished: &HashSet<TaskId>) -> bool {
        !self.0.is_empty() && self.0.iter().all(|id| finished.contains(id))
    }
}

impl From<Vec<TaskId>> for TaskSet {
    fn from(ids: Vec<TaskId>) -> Self {
        Self(ids)
    }
}

/// State of a task as reported by the query service
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskState {
    /// Waiting for a bot
    Pending,
    /// Executing on a bot
    Running,
    /// Any other reported state; the task will not change anymore
    Terminal(String),
}

impl TaskState {
    /// Parse a state string as reported by the query tool
    pub fn parse(s: &str) -> Self {
        match s {
            "PENDING" => Self::Pending,
            "RUNNING" => Self::Running,
            other => Self::Terminal(other.to_string()),
        }
    }

    /// Whether the task has stopped, regardless of outcome
    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Terminal(_))
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "PENDING",
            Self::Running => "RUNNING",
            Self::Terminal(s) => s,
        }
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_state_parse() {
        assert_eq!(TaskState::parse("PENDING"), TaskState::Pending);
        assert_eq!(TaskState::parse("RUNNING"), TaskState::Running);
        assert!(!TaskState::parse("PENDING").is_finished());
        assert!(!TaskState::parse("RUNNING").is_finished());

        for terminal in ["COMPLETED", "TIMED_OUT", "BOT_DIED", "EXPIRED", "KILLED", "CANCELED"] {
            let state = TaskState::parse(terminal);
            assert!(state.is_finished(), "{terminal} should be finished");
            assert_eq!(state.as_str(), terminal);
        }
    }

    #[test]
    fn test_lowercase_state_is_terminal() {
        assert!(TaskState::parse("pending").is_finished());
    }

    #[test]
    fn test_task_set_finished() {
        let set = TaskSet::new(["a", "b"]);
        let mut finished = HashSet::new();
        finished.insert(TaskId::new("a"));
        assert!(!set.is_finished_in(&finished));

        finished.insert(TaskId::new("b"));
        assert!(set.is_finished_in(&finished));
    }

    #[test]
    fn test_empty_task_set_never_finished() {
        let set = TaskSet::new(Vec::<TaskId>::new());
        assert!(!set.is_finished_in(&HashSet::new()));
    }

    #[test]
    fn test_task_sets_deserialize_from_nested_lists() {
        let sets: Vec<TaskSet> = serde_json::from_str(r#"[["t1", "t2"], ["t3"]]"#).unwrap();
        assert_eq!(sets.len(), 2);
        assert_eq!(sets[0].ids(), &[TaskId::new("t1"), TaskId::new("t2")]);
        assert_eq!(serde_json::to_string(&sets[1]).unwrap(), r#"["t3"]"#);
    }
}
