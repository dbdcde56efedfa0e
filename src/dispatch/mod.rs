// src/dispatch/mod.rs

//! Entry point for run requests.
//!
//! The [`Dispatcher`] checks a request, issues the job id and submits the
//! job; [`DispatchError::status_code`] maps rejections to HTTP codes for
//! whatever front end sits in front of it.

pub mod dispatcher;
pub mod error;
pub mod preconditions;
pub mod request;

pub use dispatcher::Dispatcher;
pub use error::DispatchError;
pub use request::{ExecutableRunRequest, PlaybookRunRequest};

/// Status code of an accepted run request.
pub const ACCEPTED_STATUS: u16 = 201;

/// HTTP status a front end answers with for a dispatch outcome.
pub fn response_status<T>(outcome: &Result<T, DispatchError>) -> u16 {
    match outcome {
        Ok(_) => ACCEPTED_STATUS,
        Err(e) => e.status_code(),
    }
}
