// src/model/payload.rs

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::result::{ExecutionResult, JobStatus};

/// `output` field of a completion callback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CallbackOutput {
    /// Raw output lines (executable jobs).
    Raw(Vec<String>),
    /// Records kept by the output filter (playbook jobs).
    Filtered(Vec<Value>),
}

impl CallbackOutput {
    pub fn len(&self) -> usize {
        match self {
            CallbackOutput::Raw(lines) => lines.len(),
            CallbackOutput::Filtered(records) => records.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Body POSTed once to the callback URL when a job finishes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CallbackPayload {
    status: JobStatus,
    job_id: Uuid,
    output: CallbackOutput,
    return_code: i32,
}

impl CallbackPayload {
    pub fn new(job_id: Uuid, output: CallbackOutput, return_code: i32) -> Self {
        Self {
            status: JobStatus::from_return_code(return_code),
            job_id,
            output,
            return_code,
        }
    }

    pub fn status(&self) -> JobStatus {
        self.status
    }

    pub fn job_id(&self) -> Uuid {
        self.job_id
    }

    pub fn output(&self) -> &CallbackOutput {
        &self.output
    }

    pub fn return_code(&self) -> i32 {
        self.return_code
    }
}

/// Body POSTed to the progress URL for each run event.
#[derive(Debug, Serialize)]
pub struct ProgressPayload<'a> {
    progress: ProgressBody<'a>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum ProgressBody<'a> {
    Latest(&'a str),
    Accumulated(&'a [String]),
}

impl<'a> ProgressPayload<'a> {
    /// Incremental mode: only the newest event.
    pub fn latest(text: &'a str) -> Self {
        Self {
            progress: ProgressBody::Latest(text),
        }
    }

    /// Cumulative mode: every event seen so far, in emission order.
    pub fn accumulated(events: &'a [String]) -> Self {
        Self {
            progress: ProgressBody::Accumulated(events),
        }
    }
}

/// Response for an accepted playbook run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybookRunResponse {
    pub job_id: Uuid,
}

/// Response for an executable run; `result` is only set on the sync path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutableRunResponse {
    pub job_id: Uuid,
    pub result: Option<ExecutionResult>,
}
