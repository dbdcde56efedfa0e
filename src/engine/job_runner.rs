// src/engine/job_runner.rs

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::exec::sync_runner::FAILURE_RETURN_CODE;
use crate::filter::filter_output;
use crate::handlers::{WebhookClient, completion_handler, progress_handler};
use crate::model::{CallbackOutput, CallbackPayload, Job, JobKind};
use crate::runner::{ExecutableSpec, ExecutionCollaborator, PlaybookSpec, RunEvent, RunOutcome};

use super::JobError;

/// Bounded so a chatty run waits for slow progress POSTs instead of
/// buffering without limit.
const EVENT_BUFFER: usize = 64;

/// Extra var that tells playbooks to only report what they would change.
const DRY_RUN_VAR: &str = "dry_run";

/// Runs single jobs end to end. Shared by every worker of a backend.
#[derive(Clone)]
pub struct JobRunner {
    collaborator: Arc<dyn ExecutionCollaborator>,
    client: WebhookClient,
}

impl std::fmt::Debug for JobRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobRunner")
            .field("client", &self.client)
            .finish_non_exhaustive()
    }
}

impl JobRunner {
    pub fn new(collaborator: Arc<dyn ExecutionCollaborator>, client: WebhookClient) -> Self {
        Self { collaborator, client }
    }

    /// Execute `job` and report its outcome.
    ///
    /// Progress POSTs for all events happen before the completion POST.
    pub async fn run(&self, job: Job) -> Result<RunOutcome, JobError> {
        let job_id = job.id();
        info!(job_id = %job_id, dry_run = job.dry_run, "{job} started");

        let mut progress = progress_handler(
            job.progress.as_ref(),
            job.progress_is_incremental,
            &self.client,
        );
        let completion = completion_handler(job.callback.as_ref(), job_id, &self.client);

        let (tx, mut rx) = mpsc::channel::<RunEvent>(EVENT_BUFFER);
        let run = self.start(&job, tx);

        let mut lines = Vec::new();
        let relay = async {
            while let Some(event) = rx.recv().await {
                if let Some(handler) = progress.as_mut() {
                    handler.on_event(&event).await;
                }
                lines.push(event.into_line());
            }
        };

        let (result, ()) = tokio::join!(run, relay);

        let return_code = match result {
            Ok(outcome) => outcome.return_code,
            Err(e) => {
                error!(job_id = %job_id, error = %e, "run could not be completed");
                lines.push(e.to_string());
                FAILURE_RETURN_CODE
            }
        };

        let output = match job.kind {
            JobKind::Playbook { .. } => CallbackOutput::Filtered(filter_output(&lines, return_code)),
            JobKind::Executable { .. } => CallbackOutput::Raw(lines),
        };

        info!(
            job_id = %job_id,
            return_code,
            output_records = output.len(),
            "run finished"
        );

        match completion {
            Some(handler) => {
                handler
                    .complete(CallbackPayload::new(job_id, output, return_code))
                    .await?;
            }
            None => warn!(job_id = %job_id, "no callback URL; outcome not reported"),
        }

        Ok(RunOutcome { return_code })
    }

    fn start(
        &self,
        job: &Job,
        events: mpsc::Sender<RunEvent>,
    ) -> crate::runner::BoxFuture<'_, crate::errors::Result<RunOutcome>> {
        match &job.kind {
            JobKind::Playbook {
                playbook_path,
                extra_vars,
                inventory,
            } => {
                let mut extra_vars = extra_vars.clone();
                // A dry_run var set by the caller wins over the job flag.
                extra_vars
                    .entry(DRY_RUN_VAR)
                    .or_insert(Value::Bool(job.dry_run));

                self.collaborator.run_playbook(
                    PlaybookSpec {
                        playbook_path: playbook_path.clone(),
                        inventory: inventory.clone(),
                        extra_vars,
                    },
                    events,
                )
            }
            JobKind::Executable {
                executable_path,
                args,
            } => self.collaborator.run_executable(
                ExecutableSpec {
                    executable_path: executable_path.clone(),
                    args: args.clone(),
                },
                events,
            ),
        }
    }
}
