// src/errors.rs

//! Crate-wide error aliases and helpers.
//!
//! Errors that callers of the dispatcher have to tell apart live next to the
//! boundary that raises them ([`crate::dispatch::DispatchError`],
//! [`crate::handlers::CallbackError`]); this enum covers startup and plumbing.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LsoError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// The execution backend could not be brought up (e.g. broker unreachable).
    #[error("Execution backend unavailable: {0}")]
    Backend(String),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, LsoError>;
