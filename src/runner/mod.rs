// src/runner/mod.rs

//! Boundary to whatever actually executes playbooks and executables.
//!
//! The rest of the crate only talks to an [`ExecutionCollaborator`]: the
//! engine hands it a run description plus an event sender and gets a return
//! code back; the dispatcher asks it whether an inventory is usable. Production uses
//! [`AnsibleProcessRunner`]; tests plug in a scripted fake.

pub mod ansible;
pub mod event;

use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;

use serde_json::{Map, Value};
use tokio::sync::mpsc;

use crate::errors::Result;
use crate::model::Inventory;

pub use ansible::AnsibleProcessRunner;
pub use event::RunEvent;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Everything needed to launch one playbook run.
#[derive(Debug, Clone)]
pub struct PlaybookSpec {
    pub playbook_path: PathBuf,
    pub inventory: Inventory,
    pub extra_vars: Map<String, Value>,
}

/// Everything needed to launch one executable run.
#[derive(Debug, Clone)]
pub struct ExecutableSpec {
    pub executable_path: PathBuf,
    pub args: Vec<String>,
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOutcome {
    pub return_code: i32,
}

pub trait ExecutionCollaborator: Send + Sync {
    /// Run a playbook to completion, sending one event per output line.
    ///
    /// A non-zero return code is not an error; `Err` means the run could not
    /// be started or observed at all.
    fn run_playbook(
        &self,
        spec: PlaybookSpec,
        events: mpsc::Sender<RunEvent>,
    ) -> BoxFuture<'_, Result<RunOutcome>>;

    fn run_executable(
        &self,
        spec: ExecutableSpec,
        events: mpsc::Sender<RunEvent>,
    ) -> BoxFuture<'_, Result<RunOutcome>>;

    /// Warnings and errors raised while loading the inventory; empty means
    /// the inventory is usable.
    fn check_inventory<'a>(&'a self, inventory: &'a Inventory) -> BoxFuture<'a, Result<Vec<String>>>;
}
