// src/backend/mod.rs

//! Execution backends.
//!
//! The dispatcher only sees a [`JobSubmitter`]. Which implementation sits
//! behind it is decided once at startup by [`build_submitter`]:
//!
//! - [`LocalPool`]: jobs run in this process on a bounded set of workers.
//! - [`QueueSubmitter`]: jobs are pushed to a [`QueueBroker`] and run by
//!   separate [`QueueWorker`] processes.

pub mod broker;
pub mod local_pool;
pub mod queue;
pub mod worker;

use std::sync::Arc;

use thiserror::Error;
use uuid::Uuid;

use crate::config::ConfigFile;
use crate::engine::{JobError, JobRunner};
use crate::errors::{LsoError, Result};
use crate::model::Job;
use crate::runner::BoxFuture;
use crate::types::ExecutorType;

pub use broker::QueueBroker;
pub use local_pool::LocalPool;
pub use queue::{EXECUTABLE_TASK, PLAYBOOK_TASK, QueueSubmitter, TaskMessage};
pub use worker::QueueWorker;

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("backend is shut down")]
    Closed,

    #[error("could not encode job: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("task queue transport error: {0}")]
    Transport(String),

    /// Only in testing mode, where submission waits for the job.
    #[error("job {job_id} failed: {source}")]
    Job {
        job_id: Uuid,
        #[source]
        source: JobError,
    },
}

/// Accepts jobs for execution.
///
/// `submit` returns once the job is accepted; it does not wait for the run
/// (except for a local pool in testing mode).
pub trait JobSubmitter: Send + Sync {
    fn submit(&self, job: Job) -> BoxFuture<'_, std::result::Result<(), SubmitError>>;

    /// Stop accepting jobs and wait for accepted in-process work.
    fn shutdown(&self) -> BoxFuture<'_, ()> {
        Box::pin(async {})
    }
}

/// Build the configured backend. Called once by the composition root.
pub async fn build_submitter(cfg: &ConfigFile, runner: Arc<JobRunner>) -> Result<Arc<dyn JobSubmitter>> {
    match cfg.executor.kind {
        ExecutorType::Threadpool => Ok(Arc::new(LocalPool::new(
            cfg.executor.max_workers,
            runner,
            cfg.executor.testing,
        ))),
        ExecutorType::Worker => {
            let endpoint = cfg.queue.broker_url.as_deref().ok_or_else(|| {
                LsoError::ConfigError("[queue].broker_url is required for the worker backend".to_string())
            })?;
            let submitter = QueueSubmitter::connect(
                endpoint,
                cfg.queue.queue_name.clone(),
                cfg.connect_timeout(),
            )
            .await?;
            Ok(Arc::new(submitter))
        }
    }
}
