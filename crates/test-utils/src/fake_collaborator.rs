use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use lso::errors::{LsoError, Result};
use lso::model::Inventory;
use lso::runner::{
    BoxFuture, ExecutableSpec, ExecutionCollaborator, PlaybookSpec, RunEvent, RunOutcome,
};
use tokio::sync::mpsc;

/// A call the fake received, in arrival order.
#[derive(Debug, Clone)]
pub enum RecordedCall {
    Playbook(PlaybookSpec),
    Executable(ExecutableSpec),
    InventoryCheck(Inventory),
}

#[derive(Debug, Clone, Default)]
struct Script {
    lines: Vec<String>,
    return_code: i32,
    inventory_problems: Vec<String>,
    start_error: Option<String>,
    line_delay: Option<Duration>,
}

/// A fake execution collaborator that:
/// - records every call;
/// - replays a fixed list of output lines as events, then returns the
///   scripted return code;
/// - answers inventory checks with a fixed list of problems.
#[derive(Debug, Clone, Default)]
pub struct FakeCollaborator {
    script: Arc<Mutex<Script>>,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
    running: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
}

impl FakeCollaborator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_lines<S: AsRef<str>>(self, lines: &[S]) -> Self {
        self.script.lock().unwrap().lines = lines.iter().map(|l| l.as_ref().to_string()).collect();
        self
    }

    pub fn with_return_code(self, return_code: i32) -> Self {
        self.script.lock().unwrap().return_code = return_code;
        self
    }

    pub fn with_inventory_problems<S: AsRef<str>>(self, problems: &[S]) -> Self {
        self.script.lock().unwrap().inventory_problems =
            problems.iter().map(|p| p.as_ref().to_string()).collect();
        self
    }

    /// Make every run fail to start with `message`.
    pub fn failing_to_start(self, message: &str) -> Self {
        self.script.lock().unwrap().start_error = Some(message.to_string());
        self
    }

    /// Pause between events, to keep a run busy for a while.
    pub fn with_line_delay(self, delay: Duration) -> Self {
        self.script.lock().unwrap().line_delay = Some(delay);
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Highest number of runs that were in progress at the same time.
    pub fn peak_concurrency(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    pub fn run_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| !matches!(c, RecordedCall::InventoryCheck(_)))
            .count()
    }

    fn replay(&self, call: RecordedCall, events: mpsc::Sender<RunEvent>) -> BoxFuture<'_, Result<RunOutcome>> {
        self.calls.lock().unwrap().push(call);
        let script = self.script.lock().unwrap().clone();
        let running = Arc::clone(&self.running);
        let peak = Arc::clone(&self.peak);

        Box::pin(async move {
            if let Some(message) = script.start_error {
                return Err(LsoError::Other(anyhow::anyhow!(message)));
            }

            let now = running.fetch_add(1, Ordering::SeqCst) + 1;
            peak.fetch_max(now, Ordering::SeqCst);

            for line in script.lines {
                if let Some(delay) = script.line_delay {
                    tokio::time::sleep(delay).await;
                }
                let _ = events.send(RunEvent::new(line)).await;
            }

            running.fetch_sub(1, Ordering::SeqCst);
            Ok(RunOutcome {
                return_code: script.return_code,
            })
        })
    }
}

impl ExecutionCollaborator for FakeCollaborator {
    fn run_playbook(
        &self,
        spec: PlaybookSpec,
        events: mpsc::Sender<RunEvent>,
    ) -> BoxFuture<'_, Result<RunOutcome>> {
        self.replay(RecordedCall::Playbook(spec), events)
    }

    fn run_executable(
        &self,
        spec: ExecutableSpec,
        events: mpsc::Sender<RunEvent>,
    ) -> BoxFuture<'_, Result<RunOutcome>> {
        self.replay(RecordedCall::Executable(spec), events)
    }

    fn check_inventory<'a>(&'a self, inventory: &'a Inventory) -> BoxFuture<'a, Result<Vec<String>>> {
        self.calls
            .lock()
            .unwrap()
            .push(RecordedCall::InventoryCheck(inventory.clone()));
        let problems = self.script.lock().unwrap().inventory_problems.clone();
        Box::pin(async move { Ok(problems) })
    }
}
