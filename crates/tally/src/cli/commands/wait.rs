//! Wait command

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;
use serde::Serialize;
use tracing::info;

use tally_tasks::{
    Backoff, CollectError, QueryTool, Sleeper, TaskSet, TaskSetPoller, TaskStateQuery,
};

use super::ensure_parent;
use crate::cli::{output, Cli, OutputFormat};

/// Wait until at least one set of shard tasks has finished
#[derive(Debug, Args)]
pub struct WaitCommand {
    /// Task state query tool (default: poll.query_tool from config)
    #[arg(long)]
    pub query_tool: Option<PathBuf>,

    /// Remote execution service endpoint (default: poll.server from config)
    #[arg(long)]
    pub server: Option<String>,

    /// Service account credentials handed to the query tool
    #[arg(long)]
    pub auth_json: Option<PathBuf>,

    /// JSON file holding a list of task ID lists, one per task set
    #[arg(long)]
    pub input_json: PathBuf,

    /// Where to write the finished sets and the attempt counter
    #[arg(long)]
    pub output_json: PathBuf,

    /// Attempt counter carried over from an earlier wait
    #[arg(long, default_value_t = 0)]
    pub attempts: u32,
}

/// Document written to `--output-json`
#[derive(Debug, Serialize)]
struct WaitOutput<'a> {
    sets: &'a [TaskSet],
    attempts: u32,
}

impl WaitCommand {
    /// Execute the wait command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(
            input_json = %self.input_json.display(),
            attempts = self.attempts,
            "executing wait command"
        );
        let config = cli.load_config()?.poll;

        let tool = self
            .query_tool
            .clone()
            .or(config.query_tool)
            .context("no task state query tool given (--query-tool or poll.query_tool)")?;
        let server = self
            .server
            .clone()
            .or(config.server)
            .context("no query server given (--server or poll.server)")?;

        let mut query = QueryTool::new(tool, server);
        if let Some(auth) = self.auth_json.clone().or(config.auth_json) {
            query = query.with_auth_json(auth);
        }

        let task_sets = read_task_sets(&self.input_json)?;
        let poller = TaskSetPoller::new(query).with_backoff(Backoff::new(config.max_backoff_secs));
        let sets = wait_for_sets(&poller, &task_sets, self.attempts, &self.output_json)?;

        match cli.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&sets)?);
            }
            OutputFormat::Text => {
                if !cli.quiet {
                    output::success(&format!(
                        "{} of {} task sets finished",
                        sets.len(),
                        task_sets.len()
                    ));
                }
            }
        }
        Ok(())
    }
}

/// Read the submitted task sets
fn read_task_sets(path: &Path) -> anyhow::Result<Vec<TaskSet>> {
    let contents =
        std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_slice(&contents)
        .with_context(|| format!("{} is not a list of task ID lists", path.display()))
}

/// Poll until a set finishes and record the result in `output_json`.
///
/// A failed poll still writes the attempt counter it reached, with no sets,
/// so a restarted wait can continue the backoff schedule.
fn wait_for_sets<Q: TaskStateQuery, S: Sleeper>(
    poller: &TaskSetPoller<Q, S>,
    task_sets: &[TaskSet],
    attempts: u32,
    output_json: &Path,
) -> anyhow::Result<Vec<TaskSet>> {
    let (sets, attempts, failure) = match poller.collect(task_sets, attempts) {
        Ok(outcome) => (outcome.finished_sets, outcome.attempts, None),
        Err(CollectError { attempts, error }) => (Vec::new(), attempts, Some(error)),
    };

    ensure_parent(output_json)?;
    let document = WaitOutput {
        sets: &sets,
        attempts,
    };
    std::fs::write(output_json, serde_json::to_string_pretty(&document)?)
        .with_context(|| format!("failed to write {}", output_json.display()))?;

    match failure {
        Some(error) => Err(anyhow::Error::new(error).context("waiting for task sets failed")),
        None => Ok(sets),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tally_tasks::{PollError, TaskId, TaskState};
    use tempfile::TempDir;

    /// Reports every task finished except those listed
    struct FixedQuery {
        pending: Vec<&'static str>,
    }

    impl TaskStateQuery for FixedQuery {
        fn query_states(&self, ids: &[TaskId]) -> tally_tasks::Result<Vec<TaskState>> {
            Ok(ids
                .iter()
                .map(|id| {
                    if self.pending.iter().any(|p| *p == id.as_str()) {
                        TaskState::Pending
                    } else {
                        TaskState::Terminal("COMPLETED".to_string())
                    }
                })
                .collect())
        }
    }

    struct BrokenQuery;

    impl TaskStateQuery for BrokenQuery {
        fn query_states(&self, _ids: &[TaskId]) -> tally_tasks::Result<Vec<TaskState>> {
            Err(PollError::QueryToolFailure {
                command: "swarming query".to_string(),
                exit_code: Some(1),
                output: "server unavailable".to_string(),
            })
        }
    }

    fn written(path: &Path) -> serde_json::Value {
        serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
    }

    #[test]
    fn test_read_task_sets() {
        let temp = TempDir::new().unwrap();
        let input = temp.path().join("input.json");
        fs::write(&input, r#"[["a1", "a2"], ["b1"]]"#).unwrap();

        let sets = read_task_sets(&input).unwrap();

        assert_eq!(sets, vec![TaskSet::new(["a1", "a2"]), TaskSet::new(["b1"])]);
    }

    #[test]
    fn test_read_task_sets_rejects_wrong_shape() {
        let temp = TempDir::new().unwrap();
        let input = temp.path().join("input.json");
        fs::write(&input, r#"{"sets": []}"#).unwrap();

        assert!(read_task_sets(&input).is_err());
    }

    #[test]
    fn test_finished_sets_are_written() {
        let temp = TempDir::new().unwrap();
        let out = temp.path().join("out").join("sets.json");
        let poller = TaskSetPoller::new(FixedQuery { pending: vec!["a2"] });
        let sets = vec![TaskSet::new(["a1", "a2"]), TaskSet::new(["b1"])];

        let found = wait_for_sets(&poller, &sets, 4, &out).unwrap();

        assert_eq!(found, vec![TaskSet::new(["b1"])]);
        assert_eq!(
            written(&out),
            serde_json::json!({"sets": [["b1"]], "attempts": 4})
        );
    }

    #[test]
    fn test_query_failure_still_records_attempts() {
        let temp = TempDir::new().unwrap();
        let out = temp.path().join("sets.json");
        let poller = TaskSetPoller::new(BrokenQuery);

        let err = wait_for_sets(&poller, &[TaskSet::new(["a1"])], 2, &out).unwrap_err();

        assert!(format!("{:#}", err).contains("server unavailable"));
        assert_eq!(written(&out), serde_json::json!({"sets": [], "attempts": 2}));
    }
}
