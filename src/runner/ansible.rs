// src/runner/ansible.rs

//! Process-backed execution collaborator.
//!
//! Playbooks run through `ansible-playbook` with the `jsonl` stdout
//! callback, so every stdout line is one JSON record. Inventories are
//! checked with `ansible-inventory --list`.

use std::io::Write;
use std::process::Stdio;

use anyhow::Context;
use regex::Regex;
use tempfile::NamedTempFile;
use tokio::process::Command;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::config::RunnerSection;
use crate::errors::{LsoError, Result};
use crate::exec::{StderrMode, stream_command};
use crate::model::Inventory;

use super::{BoxFuture, ExecutableSpec, ExecutionCollaborator, PlaybookSpec, RunEvent, RunOutcome};

const STDOUT_CALLBACK: &str = "ansible.posix.jsonl";

/// Lines `ansible-inventory` prints for problems with the inventory.
const DIAGNOSTIC_PATTERN: &str = r"^\s*\[(WARNING|ERROR)\]";

#[derive(Debug, Clone)]
pub struct AnsibleProcessRunner {
    playbook_bin: String,
    inventory_bin: String,
    diagnostic: Regex,
}

impl AnsibleProcessRunner {
    pub fn new(playbook_bin: impl Into<String>, inventory_bin: impl Into<String>) -> Result<Self> {
        let diagnostic = Regex::new(DIAGNOSTIC_PATTERN)
            .map_err(|e| LsoError::ConfigError(format!("invalid diagnostic pattern: {e}")))?;
        Ok(Self {
            playbook_bin: playbook_bin.into(),
            inventory_bin: inventory_bin.into(),
            diagnostic,
        })
    }

    pub fn from_config(runner: &RunnerSection) -> Result<Self> {
        Self::new(&runner.ansible_playbook_bin, &runner.ansible_inventory_bin)
    }

    async fn playbook(&self, spec: PlaybookSpec, events: mpsc::Sender<RunEvent>) -> Result<RunOutcome> {
        // Both files must outlive the process.
        let inventory_file = write_inventory(&spec.inventory)?;
        let vars_file = write_temp(".json", &serde_json::to_string(&spec.extra_vars)?)?;

        let mut cmd = Command::new(&self.playbook_bin);
        cmd.arg("-i")
            .arg(inventory_file.path())
            .arg("-e")
            .arg(format!("@{}", vars_file.path().display()))
            .arg(&spec.playbook_path)
            .env("ANSIBLE_STDOUT_CALLBACK", STDOUT_CALLBACK);

        let label = spec.playbook_path.display().to_string();
        let return_code = stream_command(cmd, &label, events, StderrMode::Log).await?;
        Ok(RunOutcome { return_code })
    }

    async fn executable(&self, spec: ExecutableSpec, events: mpsc::Sender<RunEvent>) -> Result<RunOutcome> {
        let mut cmd = Command::new(&spec.executable_path);
        cmd.args(&spec.args);

        let label = spec.executable_path.display().to_string();
        let return_code = stream_command(cmd, &label, events, StderrMode::Forward).await?;
        Ok(RunOutcome { return_code })
    }

    async fn inventory_diagnostics(&self, inventory: &Inventory) -> Result<Vec<String>> {
        let inventory_file = write_inventory(inventory)?;

        let output = Command::new(&self.inventory_bin)
            .arg("-i")
            .arg(inventory_file.path())
            .arg("--list")
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .with_context(|| format!("running '{}'", self.inventory_bin))?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        let mut problems: Vec<String> = stderr
            .lines()
            .filter(|line| self.diagnostic.is_match(line))
            .map(|line| line.trim().to_string())
            .collect();

        if !output.status.success() && problems.is_empty() {
            problems.push(format!(
                "[ERROR]: {} exited with status {}",
                self.inventory_bin,
                output.status.code().unwrap_or(-1)
            ));
        }

        if problems.is_empty() {
            debug!("inventory parsed cleanly");
        } else {
            info!(count = problems.len(), "inventory check reported problems");
        }
        Ok(problems)
    }
}

impl ExecutionCollaborator for AnsibleProcessRunner {
    fn run_playbook(
        &self,
        spec: PlaybookSpec,
        events: mpsc::Sender<RunEvent>,
    ) -> BoxFuture<'_, Result<RunOutcome>> {
        Box::pin(self.playbook(spec, events))
    }

    fn run_executable(
        &self,
        spec: ExecutableSpec,
        events: mpsc::Sender<RunEvent>,
    ) -> BoxFuture<'_, Result<RunOutcome>> {
        Box::pin(self.executable(spec, events))
    }

    fn check_inventory<'a>(&'a self, inventory: &'a Inventory) -> BoxFuture<'a, Result<Vec<String>>> {
        Box::pin(self.inventory_diagnostics(inventory))
    }
}

fn write_inventory(inventory: &Inventory) -> Result<NamedTempFile> {
    write_temp(inventory.file_suffix(), &inventory.to_file_contents()?)
}

fn write_temp(suffix: &str, contents: &str) -> Result<NamedTempFile> {
    let mut file = tempfile::Builder::new()
        .prefix("lso-")
        .suffix(suffix)
        .tempfile()?;
    file.write_all(contents.as_bytes())?;
    file.flush()?;
    Ok(file)
}
