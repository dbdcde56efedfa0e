// src/exec/mod.rs

//! Process execution layer.
//!
//! - [`process`] spawns a child, streams its output lines as run events and
//!   reports the exit code. Used by the process-backed collaborator.
//! - [`sync_runner`] runs an executable to completion with a timeout and
//!   captures its output in one string.

pub mod process;
pub mod sync_runner;

pub use process::{StderrMode, stream_command};
pub use sync_runner::run_executable_sync;
