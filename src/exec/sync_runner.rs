// src/exec/sync_runner.rs

//! Run an executable in the caller's context and capture everything.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tracing::{info, warn};

use crate::model::ExecutionResult;

/// Output reported when the executable outlives its timeout.
pub const TIMEOUT_OUTPUT: &str = "Execution timed out.";

/// Return code used when the executable produced no exit code of its own.
pub const FAILURE_RETURN_CODE: i32 = -1;

/// Run `path` with `args` (no shell) and wait for it, at most `timeout`.
///
/// Never fails: spawn errors and timeouts come back as an
/// [`ExecutionResult`] with return code `-1`. The output is stdout followed
/// by stderr. On timeout the child is killed.
pub async fn run_executable_sync(path: &Path, args: &[String], timeout: Duration) -> ExecutionResult {
    let mut cmd = Command::new(path);
    cmd.args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let child = match cmd.spawn() {
        Ok(child) => child,
        Err(e) => {
            warn!(executable = %path.display(), error = %e, "failed to start executable");
            return ExecutionResult::new(e.to_string(), FAILURE_RETURN_CODE);
        }
    };

    // Dropping the wait future on timeout drops the child, which kills it.
    match tokio::time::timeout(timeout, child.wait_with_output()).await {
        Ok(Ok(output)) => {
            let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
            text.push_str(&String::from_utf8_lossy(&output.stderr));
            let code = output.status.code().unwrap_or(FAILURE_RETURN_CODE);
            info!(executable = %path.display(), exit_code = code, "executable finished");
            ExecutionResult::new(text, code)
        }
        Ok(Err(e)) => {
            warn!(executable = %path.display(), error = %e, "failed to wait for executable");
            ExecutionResult::new(e.to_string(), FAILURE_RETURN_CODE)
        }
        Err(_) => {
            warn!(
                executable = %path.display(),
                timeout_secs = timeout.as_secs(),
                "executable timed out; killed"
            );
            ExecutionResult::new(TIMEOUT_OUTPUT, FAILURE_RETURN_CODE)
        }
    }
}
