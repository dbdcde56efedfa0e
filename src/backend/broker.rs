// src/backend/broker.rs

//! Task queue broker (`lso broker`).
//!
//! Binds two endpoints: an intake PULL socket that submitters connect to,
//! and a dispatch PUSH socket that `lso worker` processes connect to. Each
//! message is forwarded to exactly one connected worker, round robin. While
//! no worker is connected, messages wait in memory and are retried.

use std::collections::VecDeque;
use std::future::Future;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};
use zeromq::{PullSocket, PushSocket, Socket, SocketRecv, SocketSend, ZmqError, ZmqMessage};

use crate::errors::{LsoError, Result};

use super::queue::TaskMessage;

/// How often held messages are offered to workers again.
const RETRY_INTERVAL: Duration = Duration::from_millis(200);

pub struct QueueBroker {
    intake: PullSocket,
    dispatch: PushSocket,
    intake_endpoint: String,
    dispatch_endpoint: String,
}

impl std::fmt::Debug for QueueBroker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueueBroker")
            .field("intake_endpoint", &self.intake_endpoint)
            .field("dispatch_endpoint", &self.dispatch_endpoint)
            .finish_non_exhaustive()
    }
}

impl QueueBroker {
    /// Bind both endpoints. A `:0` port picks a free one; the accessors
    /// report what was bound.
    pub async fn bind(intake_endpoint: &str, dispatch_endpoint: &str) -> Result<Self> {
        let mut intake = PullSocket::new();
        let intake_bound = intake.bind(intake_endpoint).await.map_err(|e| {
            LsoError::Backend(format!("cannot bind task queue intake at {intake_endpoint}: {e}"))
        })?;

        let mut dispatch = PushSocket::new();
        let dispatch_bound = dispatch.bind(dispatch_endpoint).await.map_err(|e| {
            LsoError::Backend(format!(
                "cannot bind task queue dispatch at {dispatch_endpoint}: {e}"
            ))
        })?;

        info!(
            intake = %intake_bound,
            dispatch = %dispatch_bound,
            "broker listening"
        );

        Ok(Self {
            intake,
            dispatch,
            intake_endpoint: intake_bound.to_string(),
            dispatch_endpoint: dispatch_bound.to_string(),
        })
    }

    /// Endpoint submitters connect to.
    pub fn intake_endpoint(&self) -> &str {
        &self.intake_endpoint
    }

    /// Endpoint workers connect to.
    pub fn dispatch_endpoint(&self) -> &str {
        &self.dispatch_endpoint
    }

    /// Forward messages until `shutdown` resolves.
    pub async fn run<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        let Self {
            mut intake,
            mut dispatch,
            ..
        } = self;
        tokio::pin!(shutdown);

        let mut held = VecDeque::new();
        let mut retry = tokio::time::interval(RETRY_INTERVAL);
        retry.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("broker shutdown requested");
                    break;
                }
                received = intake.recv() => {
                    match received {
                        Ok(message) => {
                            log_intake(&message);
                            held.push_back(message);
                            forward_held(&mut dispatch, &mut held).await;
                        }
                        Err(e) => {
                            error!(error = %e, "task queue intake failed; stopping broker");
                            break;
                        }
                    }
                }
                _ = retry.tick(), if !held.is_empty() => {
                    forward_held(&mut dispatch, &mut held).await;
                }
            }
        }

        if !held.is_empty() {
            warn!(held = held.len(), "broker stopped with jobs no worker picked up");
        }
        Ok(())
    }
}

fn log_intake(message: &ZmqMessage) {
    match message.get(0).map(|frame| TaskMessage::decode(frame)) {
        Some(Ok(task)) => debug!(job_id = %task.job_id(), task = %task.task, "job received"),
        _ => warn!("received a message that is not a task; forwarding as-is"),
    }
}

/// Hand held messages to workers in arrival order. Stops at the first
/// message no worker could take; it stays at the front for the next try.
async fn forward_held(dispatch: &mut PushSocket, held: &mut VecDeque<ZmqMessage>) {
    while let Some(message) = held.pop_front() {
        match dispatch.send(message).await {
            Ok(()) => {}
            Err(ZmqError::ReturnToSender { message, .. }) => {
                held.push_front(message);
                debug!(held = held.len(), "no worker connected; holding jobs");
                return;
            }
            Err(e) => {
                error!(error = %e, "forwarding job to worker failed; job dropped");
                return;
            }
        }
    }
}
