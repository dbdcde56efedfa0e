// src/config/model.rs

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::types::ExecutorType;

/// Upper bound for the default local pool size.
const MAX_DEFAULT_WORKERS: usize = 32;

/// Top-level configuration as read from a TOML file, before validation.
///
/// ```toml
/// [executor]
/// kind = "threadpool"
/// max_workers = 8
///
/// [queue]
/// broker_url = "tcp://127.0.0.1:5555"
/// worker_url = "tcp://127.0.0.1:5556"
///
/// [paths]
/// ansible_playbooks_root_dir = "/opt/playbooks"
/// executables_root_dir = "/opt/executables"
/// ```
///
/// All sections are optional and have reasonable defaults.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawConfigFile {
    #[serde(default)]
    pub executor: ExecutorSection,

    #[serde(default)]
    pub queue: QueueSection,

    #[serde(default)]
    pub paths: PathsSection,

    #[serde(default)]
    pub runner: RunnerSection,

    #[serde(default)]
    pub http: HttpSection,

    #[serde(default)]
    pub execution: ExecutionSection,
}

/// Validated configuration.
///
/// Only obtainable through `ConfigFile::try_from(RawConfigFile)` (see
/// `validate.rs`), so holders can rely on the invariants checked there.
#[derive(Debug, Clone, Serialize)]
pub struct ConfigFile {
    pub executor: ExecutorSection,
    pub queue: QueueSection,
    pub paths: PathsSection,
    pub runner: RunnerSection,
    pub http: HttpSection,
    pub execution: ExecutionSection,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(raw: RawConfigFile) -> Self {
        Self {
            executor: raw.executor,
            queue: raw.queue,
            paths: raw.paths,
            runner: raw.runner,
            http: raw.http,
            execution: raw.execution,
        }
    }

    /// Timeout applied to every webhook POST.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.http.request_timeout_sec)
    }

    /// How long to wait for a task queue endpoint to accept a connection.
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.queue.connect_timeout_sec)
    }

    /// Timeout for the synchronous executable runner.
    pub fn executable_timeout(&self) -> Duration {
        Duration::from_secs(self.execution.executable_timeout_sec)
    }
}

/// `[executor]` section.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExecutorSection {
    /// `"threadpool"` (default) or `"worker"`.
    #[serde(default)]
    pub kind: ExecutorType,

    /// Number of local pool workers.
    ///
    /// Defaults to the number of available CPUs plus four, capped at 32.
    #[serde(default = "default_max_workers")]
    pub max_workers: usize,

    /// Synchronous testing mode: `submit` on the local pool waits for the job
    /// and hands back its error.
    #[serde(default)]
    pub testing: bool,
}

pub fn default_max_workers() -> usize {
    let cpus = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    (cpus + 4).min(MAX_DEFAULT_WORKERS)
}

impl Default for ExecutorSection {
    fn default() -> Self {
        Self {
            kind: ExecutorType::default(),
            max_workers: default_max_workers(),
            testing: false,
        }
    }
}

/// `[queue]` section, used by the worker backend and the `broker` and
/// `worker` subcommands.
///
/// One broker serves one queue: submitters connect to `broker_url`, workers
/// connect to `worker_url`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct QueueSection {
    /// ZeroMQ endpoint the broker takes jobs on, e.g. `tcp://10.0.0.5:5555`.
    #[serde(default)]
    pub broker_url: Option<String>,

    /// ZeroMQ endpoint the broker hands jobs out on.
    #[serde(default)]
    pub worker_url: Option<String>,

    /// Name of the queue, stamped on every task. Workers log an error for
    /// tasks stamped with another name.
    #[serde(default)]
    pub queue_name: Option<String>,

    #[serde(default = "default_connect_timeout_sec")]
    pub connect_timeout_sec: u64,
}

fn default_connect_timeout_sec() -> u64 {
    5
}

impl Default for QueueSection {
    fn default() -> Self {
        Self {
            broker_url: None,
            worker_url: None,
            queue_name: None,
            connect_timeout_sec: default_connect_timeout_sec(),
        }
    }
}

/// `[paths]` section.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PathsSection {
    /// Directory playbook names are resolved against.
    #[serde(default = "default_root_dir")]
    pub ansible_playbooks_root_dir: PathBuf,

    /// Directory executable names are resolved against.
    #[serde(default = "default_root_dir")]
    pub executables_root_dir: PathBuf,
}

fn default_root_dir() -> PathBuf {
    PathBuf::from(".")
}

impl Default for PathsSection {
    fn default() -> Self {
        Self {
            ansible_playbooks_root_dir: default_root_dir(),
            executables_root_dir: default_root_dir(),
        }
    }
}

/// `[runner]` section: binaries used by the process-backed collaborator.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RunnerSection {
    #[serde(default = "default_ansible_playbook_bin")]
    pub ansible_playbook_bin: String,

    #[serde(default = "default_ansible_inventory_bin")]
    pub ansible_inventory_bin: String,
}

fn default_ansible_playbook_bin() -> String {
    "ansible-playbook".to_string()
}

fn default_ansible_inventory_bin() -> String {
    "ansible-inventory".to_string()
}

impl Default for RunnerSection {
    fn default() -> Self {
        Self {
            ansible_playbook_bin: default_ansible_playbook_bin(),
            ansible_inventory_bin: default_ansible_inventory_bin(),
        }
    }
}

/// `[http]` section.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HttpSection {
    #[serde(default = "default_request_timeout_sec")]
    pub request_timeout_sec: u64,
}

fn default_request_timeout_sec() -> u64 {
    10
}

impl Default for HttpSection {
    fn default() -> Self {
        Self {
            request_timeout_sec: default_request_timeout_sec(),
        }
    }
}

/// `[execution]` section.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExecutionSection {
    #[serde(default = "default_executable_timeout_sec")]
    pub executable_timeout_sec: u64,
}

fn default_executable_timeout_sec() -> u64 {
    300
}

impl Default for ExecutionSection {
    fn default() -> Self {
        Self {
            executable_timeout_sec: default_executable_timeout_sec(),
        }
    }
}
