// src/dispatch/dispatcher.rs

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};
use uuid::Uuid;

use crate::backend::JobSubmitter;
use crate::config::ConfigFile;
use crate::exec::run_executable_sync;
use crate::model::{ExecutableRunResponse, Job, JobKind};
use crate::runner::ExecutionCollaborator;

use super::preconditions::{resolve_executable, resolve_playbook};
use super::request::{ExecutableRunRequest, PlaybookRunRequest};
use super::DispatchError;

/// Validates run requests, issues job ids and hands jobs to the backend.
pub struct Dispatcher {
    playbooks_root: PathBuf,
    executables_root: PathBuf,
    executable_timeout: Duration,
    collaborator: Arc<dyn ExecutionCollaborator>,
    submitter: Arc<dyn JobSubmitter>,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("playbooks_root", &self.playbooks_root)
            .field("executables_root", &self.executables_root)
            .field("executable_timeout", &self.executable_timeout)
            .finish_non_exhaustive()
    }
}

impl Dispatcher {
    pub fn new(
        cfg: &ConfigFile,
        collaborator: Arc<dyn ExecutionCollaborator>,
        submitter: Arc<dyn JobSubmitter>,
    ) -> Self {
        Self {
            playbooks_root: cfg.paths.ansible_playbooks_root_dir.clone(),
            executables_root: cfg.paths.executables_root_dir.clone(),
            executable_timeout: cfg.executable_timeout(),
            collaborator,
            submitter,
        }
    }

    /// Validate and submit a playbook run; returns the issued job id.
    ///
    /// Nothing is submitted when the playbook is missing or the inventory
    /// check reports any warning or error.
    pub async fn run_playbook(&self, request: PlaybookRunRequest) -> Result<Uuid, DispatchError> {
        let playbook_path = resolve_playbook(&self.playbooks_root, &request.playbook_name)?;

        let problems = self.collaborator.check_inventory(&request.inventory).await?;
        if !problems.is_empty() {
            warn!(
                playbook = %request.playbook_name,
                problems = problems.len(),
                "rejecting playbook run: invalid inventory"
            );
            return Err(DispatchError::InvalidInventory(problems));
        }

        let job = Job::new(JobKind::Playbook {
            playbook_path,
            extra_vars: request.extra_vars,
            inventory: request.inventory,
        })
        .callback(request.callback)
        .progress(request.progress, request.progress_is_incremental)
        .dry_run(request.dry_run);

        self.submit(job).await
    }

    /// Run an executable.
    ///
    /// Async requests need a callback and return only the job id; sync
    /// requests run in place and return the result as well.
    pub async fn run_executable(
        &self,
        request: ExecutableRunRequest,
    ) -> Result<ExecutableRunResponse, DispatchError> {
        let executable_path = resolve_executable(&self.executables_root, &request.executable_name)?;

        if !request.is_async {
            let job_id = Uuid::new_v4();
            info!(job_id = %job_id, executable = %executable_path.display(), "running executable synchronously");
            let result =
                run_executable_sync(&executable_path, &request.args, self.executable_timeout).await;
            return Ok(ExecutableRunResponse {
                job_id,
                result: Some(result),
            });
        }

        let Some(callback) = request.callback else {
            return Err(DispatchError::MissingField("callback"));
        };

        let job = Job::new(JobKind::Executable {
            executable_path,
            args: request.args,
        })
        .callback(Some(callback));

        let job_id = self.submit(job).await?;
        Ok(ExecutableRunResponse {
            job_id,
            result: None,
        })
    }

    async fn submit(&self, job: Job) -> Result<Uuid, DispatchError> {
        let job_id = job.id();
        info!(job_id = %job_id, "submitting {job}");
        self.submitter.submit(job).await?;
        Ok(job_id)
    }
}
