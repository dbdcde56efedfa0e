// src/backend/queue.rs

//! Distributed queue backend, submitting side.
//!
//! Jobs are serialized into a [`TaskMessage`] and pushed to the broker's
//! intake endpoint over a ZeroMQ PUSH socket. The broker hands each message
//! to one connected `lso worker`; the submitter never sees the outcome.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;
use zeromq::{PushSocket, Socket, SocketSend, ZmqMessage};

use crate::errors::{LsoError, Result};
use crate::model::{Job, JobKind};
use crate::runner::BoxFuture;

use super::{JobSubmitter, SubmitError};

pub const PLAYBOOK_TASK: &str = "lso.tasks.run_playbook_proc_task";
pub const EXECUTABLE_TASK: &str = "lso.tasks.run_executable_proc_task";

/// Envelope carried over the queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskMessage {
    /// Task name; determined by the job kind.
    pub task: String,
    /// Name of the queue the submitter was configured for. Routing is by
    /// endpoint; workers only use this to flag misconfiguration.
    #[serde(default)]
    pub queue: Option<String>,
    pub job: Job,
}

impl TaskMessage {
    pub fn new(job: Job, queue: Option<String>) -> Self {
        Self {
            task: task_name(&job.kind).to_string(),
            queue,
            job,
        }
    }

    pub fn job_id(&self) -> Uuid {
        self.job.id()
    }

    /// Whether the task name agrees with the job it carries.
    pub fn is_consistent(&self) -> bool {
        self.task == task_name(&self.job.kind)
    }

    pub fn encode(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }

    pub fn decode(bytes: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(bytes)
    }
}

pub fn task_name(kind: &JobKind) -> &'static str {
    match kind {
        JobKind::Playbook { .. } => PLAYBOOK_TASK,
        JobKind::Executable { .. } => EXECUTABLE_TASK,
    }
}

pub struct QueueSubmitter {
    socket: Mutex<PushSocket>,
    endpoint: String,
    queue_name: Option<String>,
}

impl std::fmt::Debug for QueueSubmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueueSubmitter")
            .field("endpoint", &self.endpoint)
            .field("queue_name", &self.queue_name)
            .finish_non_exhaustive()
    }
}

/// Connect `socket` to `endpoint`, giving up after `timeout`.
///
/// zeromq retries a refused connection forever; the timeout turns an
/// unreachable broker into a startup error.
pub(crate) async fn connect_within<S: Socket>(
    socket: &mut S,
    endpoint: &str,
    timeout: Duration,
) -> Result<()> {
    match tokio::time::timeout(timeout, socket.connect(endpoint)).await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(LsoError::Backend(format!(
            "cannot connect to task queue at {endpoint}: {e}"
        ))),
        Err(_) => Err(LsoError::Backend(format!(
            "cannot connect to task queue at {endpoint}: no answer within {}s",
            timeout.as_secs_f64()
        ))),
    }
}

impl QueueSubmitter {
    /// Connect to the broker's intake endpoint.
    ///
    /// Fails with [`LsoError::Backend`] when the endpoint cannot be reached
    /// within `timeout`.
    pub async fn connect(endpoint: &str, queue_name: Option<String>, timeout: Duration) -> Result<Self> {
        let mut socket = PushSocket::new();
        connect_within(&mut socket, endpoint, timeout).await?;

        info!(endpoint, queue = ?queue_name, "connected to task queue");

        Ok(Self {
            socket: Mutex::new(socket),
            endpoint: endpoint.to_string(),
            queue_name,
        })
    }

    async fn push(&self, job: Job) -> std::result::Result<(), SubmitError> {
        let message = TaskMessage::new(job, self.queue_name.clone());
        let job_id = message.job_id();
        let bytes = message.encode()?;

        self.socket
            .lock()
            .await
            .send(ZmqMessage::from(bytes))
            .await
            .map_err(|e| SubmitError::Transport(e.to_string()))?;

        debug!(job_id = %job_id, task = %message.task, "job pushed to task queue");
        Ok(())
    }
}

impl JobSubmitter for QueueSubmitter {
    fn submit(&self, job: Job) -> BoxFuture<'_, std::result::Result<(), SubmitError>> {
        Box::pin(self.push(job))
    }
}
