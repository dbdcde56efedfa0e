// src/model/job.rs

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use url::Url;
use uuid::Uuid;

/// Inventory a playbook runs against.
///
/// Either a plain host list (`"host1\nhost2"`) or a structured inventory
/// object in Ansible's JSON/YAML inventory layout. The contents are never
/// interpreted here; validity is decided by the execution collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Inventory {
    Hosts(String),
    Structured(Map<String, Value>),
}

impl Inventory {
    /// Render the inventory the way it is written to disk for the runner.
    pub fn to_file_contents(&self) -> Result<String, serde_json::Error> {
        match self {
            Inventory::Hosts(hosts) => Ok(hosts.clone()),
            Inventory::Structured(map) => serde_json::to_string_pretty(map),
        }
    }

    /// File suffix the inventory plugins recognise for this shape.
    pub fn file_suffix(&self) -> &'static str {
        match self {
            Inventory::Hosts(_) => ".ini",
            Inventory::Structured(_) => ".json",
        }
    }
}

impl From<&str> for Inventory {
    fn from(hosts: &str) -> Self {
        Inventory::Hosts(hosts.to_string())
    }
}

/// What a job runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum JobKind {
    Playbook {
        playbook_path: PathBuf,
        #[serde(default)]
        extra_vars: Map<String, Value>,
        inventory: Inventory,
    },
    Executable {
        executable_path: PathBuf,
        #[serde(default)]
        args: Vec<String>,
    },
}

impl JobKind {
    /// Path of the playbook or executable.
    pub fn target(&self) -> &PathBuf {
        match self {
            JobKind::Playbook { playbook_path, .. } => playbook_path,
            JobKind::Executable {
                executable_path, ..
            } => executable_path,
        }
    }
}

/// One asynchronous execution request.
///
/// The id is assigned on construction and cannot be changed afterwards; the
/// remaining fields describe where progress and completion are reported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    id: Uuid,
    pub kind: JobKind,
    #[serde(default)]
    pub callback: Option<Url>,
    #[serde(default)]
    pub progress: Option<Url>,
    #[serde(default)]
    pub progress_is_incremental: bool,
    #[serde(default)]
    pub dry_run: bool,
}

impl Job {
    /// Create a job with a freshly generated id.
    pub fn new(kind: JobKind) -> Self {
        Self::with_id(Uuid::new_v4(), kind)
    }

    /// Create a job for an id that was issued elsewhere.
    pub fn with_id(id: Uuid, kind: JobKind) -> Self {
        Self {
            id,
            kind,
            callback: None,
            progress: None,
            progress_is_incremental: false,
            dry_run: false,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn callback(mut self, url: Option<Url>) -> Self {
        self.callback = url;
        self
    }

    pub fn progress(mut self, url: Option<Url>, incremental: bool) -> Self {
        self.progress = url;
        self.progress_is_incremental = incremental;
        self
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

impl fmt::Display for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self.kind {
            JobKind::Playbook { .. } => "playbook",
            JobKind::Executable { .. } => "executable",
        };
        write!(f, "{label} job {} ({})", self.id, self.kind.target().display())
    }
}
