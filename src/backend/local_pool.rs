// src/backend/local_pool.rs

//! In-process job pool.
//!
//! A fixed set of tokio tasks pulls jobs from one unbounded queue. Each job
//! runs in its own spawned task, so a panicking job is caught at the join
//! and the worker moves on to the next one.

use std::sync::{Arc, Mutex};

use tokio::sync::{Mutex as AsyncMutex, mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::engine::{JobError, JobRunner};
use crate::model::Job;
use crate::runner::{BoxFuture, RunOutcome};

use super::{JobSubmitter, SubmitError};

type JobReply = oneshot::Sender<Result<RunOutcome, JobError>>;

struct QueuedJob {
    job: Job,
    reply: Option<JobReply>,
}

pub struct LocalPool {
    tx: Mutex<Option<mpsc::UnboundedSender<QueuedJob>>>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    size: usize,
    testing: bool,
}

impl std::fmt::Debug for LocalPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalPool")
            .field("size", &self.size)
            .field("testing", &self.testing)
            .finish_non_exhaustive()
    }
}

impl LocalPool {
    /// Start `size` workers (at least one) that run jobs through `runner`.
    ///
    /// With `testing` set, [`submit`](JobSubmitter::submit) waits for the
    /// submitted job to finish and returns its error.
    pub fn new(size: usize, runner: Arc<JobRunner>, testing: bool) -> Self {
        let size = size.max(1);
        let (tx, rx) = mpsc::unbounded_channel::<QueuedJob>();
        let rx = Arc::new(AsyncMutex::new(rx));

        let workers = (0..size)
            .map(|worker| tokio::spawn(worker_loop(worker, Arc::clone(&rx), Arc::clone(&runner))))
            .collect();

        info!(workers = size, testing, "local pool started");

        Self {
            tx: Mutex::new(Some(tx)),
            workers: Mutex::new(workers),
            size,
            testing,
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Stop accepting jobs and wait until every queued job has finished.
    pub async fn shutdown(&self) {
        drop(self.tx.lock().unwrap_or_else(|e| e.into_inner()).take());

        let workers = std::mem::take(&mut *self.workers.lock().unwrap_or_else(|e| e.into_inner()));
        for worker in workers {
            if let Err(e) = worker.await {
                error!(error = %e, "pool worker ended abnormally");
            }
        }
        info!("local pool drained");
    }

    async fn enqueue(&self, job: Job) -> Result<(), SubmitError> {
        let job_id = job.id();
        let (reply, done) = if self.testing {
            let (tx, rx) = oneshot::channel();
            (Some(tx), Some(rx))
        } else {
            (None, None)
        };

        {
            let guard = self.tx.lock().unwrap_or_else(|e| e.into_inner());
            let tx = guard.as_ref().ok_or(SubmitError::Closed)?;
            tx.send(QueuedJob { job, reply })
                .map_err(|_| SubmitError::Closed)?;
        }
        debug!(job_id = %job_id, "job queued on local pool");

        if let Some(done) = done {
            match done.await {
                Ok(Ok(_)) => {}
                Ok(Err(source)) => return Err(SubmitError::Job { job_id, source }),
                Err(_) => return Err(SubmitError::Closed),
            }
        }
        Ok(())
    }
}

impl JobSubmitter for LocalPool {
    fn submit(&self, job: Job) -> BoxFuture<'_, Result<(), SubmitError>> {
        Box::pin(self.enqueue(job))
    }

    fn shutdown(&self) -> BoxFuture<'_, ()> {
        Box::pin(LocalPool::shutdown(self))
    }
}

async fn worker_loop(
    worker: usize,
    rx: Arc<AsyncMutex<mpsc::UnboundedReceiver<QueuedJob>>>,
    runner: Arc<JobRunner>,
) {
    loop {
        // Hold the lock only while waiting for the next job.
        let next = rx.lock().await.recv().await;
        let Some(QueuedJob { job, reply }) = next else {
            debug!(worker, "job queue closed; worker exiting");
            break;
        };

        let job_id = job.id();
        let task_runner = Arc::clone(&runner);
        let handle = tokio::spawn(async move { task_runner.run(job).await });

        let result = match handle.await {
            Ok(result) => result,
            Err(e) => Err(JobError::Panicked(e.to_string())),
        };

        match &result {
            Ok(outcome) => {
                info!(worker, job_id = %job_id, return_code = outcome.return_code, "job done")
            }
            Err(e) => error!(worker, job_id = %job_id, error = %e, "job failed"),
        }

        if let Some(reply) = reply {
            let _ = reply.send(result);
        }
    }
}
