//! Exit codes for the CLI

use tally_core::TallyError;

/// General error, including a failed task state query
pub const ERROR: i32 = 1;

/// Configuration error
pub const CONFIG_ERROR: i32 = 2;

/// Map a command failure to the process exit code
pub fn for_error(err: &anyhow::Error) -> i32 {
    if err.downcast_ref::<TallyError>().is_some() {
        CONFIG_ERROR
    } else {
        ERROR
    }
}
