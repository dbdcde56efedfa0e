// src/dispatch/error.rs

use thiserror::Error;
use uuid::Uuid;

use crate::backend::SubmitError;
use crate::engine::JobError;
use crate::errors::LsoError;

/// Why a run request was not accepted.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    NotExecutable(String),

    #[error("Invalid inventory: {}", .0.join("; "))]
    InvalidInventory(Vec<String>),

    #[error("field '{0}' is required")]
    MissingField(&'static str),

    #[error("could not submit job: {0}")]
    Submit(#[source] SubmitError),

    /// Testing mode only: the job was issued and run, but failed.
    #[error("job {job_id} failed: {source}")]
    Job {
        job_id: Uuid,
        #[source]
        source: JobError,
    },

    #[error(transparent)]
    Internal(#[from] LsoError),
}

impl DispatchError {
    /// HTTP status a front end should answer with.
    pub fn status_code(&self) -> u16 {
        match self {
            DispatchError::NotFound(_) => 404,
            DispatchError::NotExecutable(_) => 403,
            DispatchError::InvalidInventory(_) | DispatchError::MissingField(_) => 422,
            DispatchError::Submit(_) | DispatchError::Job { .. } | DispatchError::Internal(_) => 500,
        }
    }

    /// The id of the job this error belongs to, if one was issued.
    pub fn job_id(&self) -> Option<Uuid> {
        match self {
            DispatchError::Job { job_id, .. } => Some(*job_id),
            _ => None,
        }
    }
}

impl From<SubmitError> for DispatchError {
    fn from(e: SubmitError) -> Self {
        match e {
            SubmitError::Job { job_id, source } => DispatchError::Job { job_id, source },
            other => DispatchError::Submit(other),
        }
    }
}
