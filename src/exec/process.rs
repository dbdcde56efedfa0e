// src/exec/process.rs

//! Child process plumbing shared by the runners.

use std::process::Stdio;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::errors::Result;
use crate::runner::RunEvent;

/// What happens to the child's stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StderrMode {
    /// Forward stderr lines as run events, like stdout.
    Forward,
    /// Log stderr at debug level only.
    Log,
}

/// Spawn `cmd`, turn its output into [`RunEvent`]s and wait for it to exit.
///
/// Returns the exit code, or `-1` if the process was killed by a signal.
/// All events have been sent by the time this returns. A closed event
/// channel does not stop the process; remaining lines are drained and
/// discarded.
pub async fn stream_command(
    mut cmd: Command,
    label: &str,
    events: mpsc::Sender<RunEvent>,
    stderr_mode: StderrMode,
) -> Result<i32> {
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    info!(process = %label, "starting process");

    let mut child = cmd
        .spawn()
        .with_context(|| format!("spawning process '{label}'"))?;

    let stdout = child.stdout.take();
    let stderr = child.stderr.take();

    // Always consume stderr so the pipe never fills up.
    let stderr_task = stderr.map(|stderr| {
        let label = label.to_string();
        let events = match stderr_mode {
            StderrMode::Forward => Some(events.clone()),
            StderrMode::Log => None,
        };
        tokio::spawn(async move {
            let mut lines = BufReader::new(stderr).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                match &events {
                    Some(tx) => {
                        let _ = tx.send(RunEvent::new(line)).await;
                    }
                    None => debug!(process = %label, "stderr: {}", line),
                }
            }
        })
    });

    if let Some(stdout) = stdout {
        forward_lines(stdout, &events).await;
    }
    drop(events);

    if let Some(task) = stderr_task {
        let _ = task.await;
    }

    let status = child
        .wait()
        .await
        .with_context(|| format!("waiting for process '{label}'"))?;
    let code = status.code().unwrap_or(-1);

    info!(process = %label, exit_code = code, "process exited");
    Ok(code)
}

async fn forward_lines<R>(reader: R, events: &mpsc::Sender<RunEvent>)
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(reader).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        let _ = events.send(RunEvent::new(line)).await;
    }
}
