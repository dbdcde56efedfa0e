// src/model/mod.rs

//! Data entities shared by the dispatcher, the backends and the handlers.
//!
//! - [`job`]: the unit of work (`Job`, `JobKind`, `Inventory`).
//! - [`result`]: `ExecutionResult` and the return-code → status rule.
//! - [`payload`]: webhook bodies and launch responses.

pub mod job;
pub mod payload;
pub mod result;

pub use job::{Inventory, Job, JobKind};
pub use payload::{
    CallbackOutput, CallbackPayload, ExecutableRunResponse, PlaybookRunResponse, ProgressPayload,
};
pub use result::{ExecutionResult, JobStatus};
