// src/dispatch/request.rs

use serde::Deserialize;
use serde_json::{Map, Value};
use url::Url;

use crate::model::Inventory;

/// Request to run a playbook asynchronously.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PlaybookRunRequest {
    /// Playbook file name, relative to the playbooks root directory.
    pub playbook_name: String,
    #[serde(default)]
    pub extra_vars: Map<String, Value>,
    pub inventory: Inventory,
    #[serde(default)]
    pub callback: Option<Url>,
    #[serde(default)]
    pub progress: Option<Url>,
    #[serde(default)]
    pub progress_is_incremental: bool,
    #[serde(default)]
    pub dry_run: bool,
}

impl PlaybookRunRequest {
    pub fn new(playbook_name: impl Into<String>, inventory: Inventory) -> Self {
        Self {
            playbook_name: playbook_name.into(),
            extra_vars: Map::new(),
            inventory,
            callback: None,
            progress: None,
            progress_is_incremental: false,
            dry_run: false,
        }
    }
}

/// Request to run an executable, synchronously or not.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ExecutableRunRequest {
    /// Executable file name, relative to the executables root directory.
    pub executable_name: String,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub callback: Option<Url>,
    #[serde(default = "default_is_async")]
    pub is_async: bool,
}

fn default_is_async() -> bool {
    true
}

impl ExecutableRunRequest {
    pub fn new(executable_name: impl Into<String>) -> Self {
        Self {
            executable_name: executable_name.into(),
            args: Vec::new(),
            callback: None,
            is_async: default_is_async(),
        }
    }
}
