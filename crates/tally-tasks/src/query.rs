//! Batched task-state queries through an external tool

use std::path::PathBuf;
use std::process::Command;

use serde::Deserialize;
use tracing::debug;

use crate::error::{PollError, Result};
use crate::task::{TaskId, TaskState};

/// Source of task states for a batch of IDs.
///
/// Implementations return one state per requested ID, in request order.
pub trait TaskStateQuery {
    fn query_states(&self, ids: &[TaskId]) -> Result<Vec<TaskState>>;
}

/// Response printed by the query tool on stdout
#[derive(Debug, Deserialize)]
struct StatesResponse {
    states: Vec<String>,
}

/// Runs the task-state query tool as a child process
#[derive(Debug, Clone)]
pub struct QueryTool {
    tool: PathBuf,
    server: String,
    auth_json: Option<PathBuf>,
}

impl QueryTool {
    /// Create a query tool invoker for `server`
    pub fn new(tool: impl Into<PathBuf>, server: impl Into<String>) -> Self {
        Self {
            tool: tool.into(),
            server: server.into(),
            auth_json: None,
        }
    }

    /// Pass a credential file to the tool
    pub fn with_auth_json(mut self, path: impl Into<PathBuf>) -> Self {
        self.auth_json = Some(path.into());
        self
    }

    /// Command-line arguments for one batched query
    pub fn args(&self, ids: &[TaskId]) -> Vec<String> {
        let mut args = vec![
            "query".to_string(),
            "-S".to_string(),
            self.server.clone(),
        ];
        if let Some(auth) = &self.auth_json {
            args.push("--auth-service-account-json".to_string());
            args.push(auth.to_string_lossy().into_owned());
        }
        let query = ids
            .iter()
            .map(|id| format!("task_id={}", id))
            .collect::<Vec<_>>()
            .join("&");
        args.push(format!("tasks/get_states?{}", query));
        args
    }

    fn command_line(&self, args: &[String]) -> String {
        format!("{} {}", self.tool.display(), args.join(" "))
    }
}

impl TaskStateQuery for QueryTool {
    fn query_states(&self, ids: &[TaskId]) -> Result<Vec<TaskState>> {
        let args = self.args(ids);
        let command = self.command_line(&args);
        debug!(tool = %self.tool.display(), count = ids.len(), "querying task states");

        let output = Command::new(&self.tool)
            .args(&args)
            .output()
            .map_err(|e| PollError::QueryToolFailure {
                command: command.clone(),
                exit_code: None,
                output: format!("Failed to spawn query tool: {}", e),
            })?;

        if !output.status.success() {
            let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
            combined.push_str(&String::from_utf8_lossy(&output.stderr));
            return Err(PollError::QueryToolFailure {
                command,
                exit_code: output.status.code(),
                output: combined,
            });
        }

        parse_states(&output.stdout)
    }
}

/// Parse the `{"states": [...]}` document printed by the query tool
pub fn parse_states(stdout: &[u8]) -> Result<Vec<TaskState>> {
    let response: StatesResponse =
        serde_json::from_slice(stdout).map_err(|e| PollError::InvalidResponse(e.to_string()))?;

    Ok(response.states.iter().map(|s| TaskState::parse(s)).collect())
}
