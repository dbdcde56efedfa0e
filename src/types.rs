// src/types.rs

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Which execution backend jobs are submitted to.
///
/// - `Threadpool`: run jobs in-process on the bounded local pool (default).
/// - `Worker`: hand jobs to the distributed queue; separate `lso worker`
///   processes execute them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutorType {
    Threadpool,
    Worker,
}

impl Default for ExecutorType {
    fn default() -> Self {
        ExecutorType::Threadpool
    }
}

impl FromStr for ExecutorType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "threadpool" => Ok(ExecutorType::Threadpool),
            "worker" => Ok(ExecutorType::Worker),
            other => Err(format!(
                "invalid executor kind: {other} (expected \"threadpool\" or \"worker\")"
            )),
        }
    }
}

impl fmt::Display for ExecutorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutorType::Threadpool => f.write_str("threadpool"),
            ExecutorType::Worker => f.write_str("worker"),
        }
    }
}
