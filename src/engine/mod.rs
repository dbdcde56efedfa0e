// src/engine/mod.rs

//! Job execution.
//!
//! A backend hands each job to a [`JobRunner`], which:
//! - builds the job's progress and completion handlers from its URLs;
//! - drives the execution collaborator, relaying each event to the progress
//!   handler in emission order;
//! - post-processes the output once the run is over;
//! - delivers the completion payload exactly once.

pub mod job_runner;

use thiserror::Error;

use crate::handlers::CallbackError;

pub use job_runner::JobRunner;

/// Why a job could not be seen through to the end.
///
/// A non-zero return code is not a `JobError`; it is reported through the
/// completion callback like any other outcome.
#[derive(Debug, Error)]
pub enum JobError {
    #[error(transparent)]
    Callback(#[from] CallbackError),

    #[error("job task panicked: {0}")]
    Panicked(String),
}
