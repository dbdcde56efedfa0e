#![allow(dead_code)]

use std::path::{Path, PathBuf};

use lso::config::{ConfigFile, RawConfigFile};
use lso::types::ExecutorType;
use serde_json::{Value, json};

/// Builder for `ConfigFile` to simplify test setup.
///
/// Starts from the defaults with a small pool and testing mode off.
pub struct ConfigBuilder {
    config: RawConfigFile,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        let mut config = RawConfigFile::default();
        config.executor.max_workers = 2;
        Self { config }
    }

    pub fn playbooks_root(mut self, dir: &Path) -> Self {
        self.config.paths.ansible_playbooks_root_dir = dir.to_path_buf();
        self
    }

    pub fn executables_root(mut self, dir: &Path) -> Self {
        self.config.paths.executables_root_dir = dir.to_path_buf();
        self
    }

    pub fn testing(mut self, val: bool) -> Self {
        self.config.executor.testing = val;
        self
    }

    pub fn max_workers(mut self, n: usize) -> Self {
        self.config.executor.max_workers = n;
        self
    }

    pub fn worker_queue(mut self, broker_url: &str, queue_name: Option<&str>) -> Self {
        self.config.executor.kind = ExecutorType::Worker;
        self.config.queue.broker_url = Some(broker_url.to_string());
        self.config.queue.queue_name = queue_name.map(str::to_string);
        self
    }

    pub fn connect_timeout_sec(mut self, secs: u64) -> Self {
        self.config.queue.connect_timeout_sec = secs;
        self
    }

    pub fn request_timeout_sec(mut self, secs: u64) -> Self {
        self.config.http.request_timeout_sec = secs;
        self
    }

    pub fn executable_timeout_sec(mut self, secs: u64) -> Self {
        self.config.execution.executable_timeout_sec = secs;
        self
    }

    pub fn raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// One `jsonl` per-host record line.
pub fn host_record(host: &str, result: Value) -> String {
    json!({
        "_event": "v2_runner_on_ok",
        "task": {"name": "step"},
        "hosts": {host: result},
    })
    .to_string()
}

/// One `jsonl` summary record line.
pub fn stats_record(host: &str, changed: u32, failures: u32) -> String {
    json!({
        "_event": "v2_playbook_on_stats",
        "stats": {host: {"ok": 1, "changed": changed, "failures": failures}},
    })
    .to_string()
}

/// One `jsonl` play banner line; never part of filtered output.
pub fn play_banner(name: &str) -> String {
    json!({"_event": "v2_playbook_on_play_start", "play": {"name": name}}).to_string()
}

/// Write a shell script into `dir` and mark it executable.
#[cfg(unix)]
pub fn write_executable(dir: &Path, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).expect("write script");
    let mut perms = std::fs::metadata(&path).expect("stat script").permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&path, perms).expect("chmod script");
    path
}
