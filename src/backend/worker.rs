// src/backend/worker.rs

//! Distributed queue backend, executing side (`lso worker`).
//!
//! Any number of workers may connect to one broker's dispatch endpoint;
//! the broker hands each job to exactly one of them.

use std::future::Future;
use std::time::Duration;

use tracing::{error, info, warn};
use zeromq::{PullSocket, Socket, SocketRecv};

use crate::errors::Result;

use super::local_pool::LocalPool;
use super::queue::{TaskMessage, connect_within};
use super::JobSubmitter;

/// Pulls [`TaskMessage`]s from the broker's dispatch endpoint and runs them
/// on a local pool.
pub struct QueueWorker {
    socket: PullSocket,
    endpoint: String,
    queue_name: Option<String>,
    pool: LocalPool,
}

impl std::fmt::Debug for QueueWorker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueueWorker")
            .field("endpoint", &self.endpoint)
            .field("queue_name", &self.queue_name)
            .field("pool", &self.pool)
            .finish_non_exhaustive()
    }
}

impl QueueWorker {
    /// Connect the PULL socket to the broker's dispatch `endpoint`.
    pub async fn connect(
        endpoint: &str,
        queue_name: Option<String>,
        pool: LocalPool,
        timeout: Duration,
    ) -> Result<Self> {
        let mut socket = PullSocket::new();
        connect_within(&mut socket, endpoint, timeout).await?;

        info!(endpoint, queue = ?queue_name, "worker waiting for jobs");

        Ok(Self {
            socket,
            endpoint: endpoint.to_string(),
            queue_name,
            pool,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Receive and run jobs until `shutdown` resolves, then drain the pool.
    pub async fn run<F>(mut self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("worker shutdown requested");
                    break;
                }
                received = self.socket.recv() => {
                    let message = match received {
                        Ok(message) => message,
                        Err(e) => {
                            error!(error = %e, "task queue receive failed; stopping worker");
                            break;
                        }
                    };
                    let Some(frame) = message.get(0) else {
                        warn!("empty message on task queue; skipping");
                        continue;
                    };
                    self.accept(frame).await;
                }
            }
        }

        self.pool.shutdown().await;
        Ok(())
    }

    async fn accept(&self, frame: &[u8]) {
        let message = match TaskMessage::decode(frame) {
            Ok(message) => message,
            Err(e) => {
                warn!(error = %e, "undecodable task message; skipping");
                return;
            }
        };

        // A delivered job is never handed to another worker, so it runs
        // regardless of a queue name mismatch.
        if message.queue != self.queue_name {
            error!(
                job_id = %message.job_id(),
                job_queue = ?message.queue,
                worker_queue = ?self.queue_name,
                "job was submitted for another queue; check [queue].queue_name on both sides"
            );
        }

        if !message.is_consistent() {
            error!(job_id = %message.job_id(), task = %message.task, "task name does not match job; dropping");
            return;
        }

        let job_id = message.job_id();
        if let Err(e) = self.pool.submit(message.job).await {
            error!(job_id = %job_id, error = %e, "could not run job from task queue");
        }
    }
}
