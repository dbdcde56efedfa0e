// src/model/result.rs

use serde::{Deserialize, Serialize};

/// Terminal status of a run, derived from its return code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Successful,
    Failed,
}

impl JobStatus {
    /// `Successful` iff the return code is zero.
    pub fn from_return_code(return_code: i32) -> Self {
        if return_code == 0 {
            JobStatus::Successful
        } else {
            JobStatus::Failed
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Successful => "successful",
            JobStatus::Failed => "failed",
        }
    }
}

/// Outcome of one executable run.
///
/// The status is never supplied by the caller: it is derived from the
/// return code when the value is built, including when it is deserialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ExecutionResultRepr")]
pub struct ExecutionResult {
    output: String,
    return_code: i32,
    status: JobStatus,
}

impl ExecutionResult {
    pub fn new(output: impl Into<String>, return_code: i32) -> Self {
        Self {
            output: output.into(),
            return_code,
            status: JobStatus::from_return_code(return_code),
        }
    }

    pub fn output(&self) -> &str {
        &self.output
    }

    pub fn return_code(&self) -> i32 {
        self.return_code
    }

    pub fn status(&self) -> JobStatus {
        self.status
    }
}

#[derive(Deserialize)]
struct ExecutionResultRepr {
    output: String,
    return_code: i32,
}

impl From<ExecutionResultRepr> for ExecutionResult {
    fn from(repr: ExecutionResultRepr) -> Self {
        ExecutionResult::new(repr.output, repr.return_code)
    }
}
