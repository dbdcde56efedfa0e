// src/lib.rs

pub mod backend;
pub mod cli;
pub mod config;
pub mod dispatch;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod filter;
pub mod handlers;
pub mod logging;
pub mod model;
pub mod runner;
pub mod types;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::info;

use crate::backend::{JobSubmitter, LocalPool, QueueBroker, QueueWorker, build_submitter};
use crate::cli::{CliArgs, Command, ExecuteArgs, PlaybookArgs};
use crate::config::{ConfigFile, load_and_validate};
use crate::dispatch::{
    DispatchError, Dispatcher, ExecutableRunRequest, PlaybookRunRequest, response_status,
};
use crate::engine::JobRunner;
use crate::errors::LsoError;
use crate::handlers::WebhookClient;
use crate::model::{Inventory, PlaybookRunResponse};
use crate::runner::{AnsibleProcessRunner, ExecutionCollaborator};

/// Long-lived objects built once at startup.
pub struct Services {
    pub dispatcher: Dispatcher,
    pub submitter: Arc<dyn JobSubmitter>,
}

/// Build the webhook client, job runner, backend and dispatcher around
/// `collaborator`.
pub async fn build_services(
    cfg: &ConfigFile,
    collaborator: Arc<dyn ExecutionCollaborator>,
) -> errors::Result<Services> {
    let runner = Arc::new(job_runner(cfg, Arc::clone(&collaborator))?);
    let submitter = build_submitter(cfg, runner).await?;
    let dispatcher = Dispatcher::new(cfg, collaborator, Arc::clone(&submitter));
    Ok(Services {
        dispatcher,
        submitter,
    })
}

fn job_runner(cfg: &ConfigFile, collaborator: Arc<dyn ExecutionCollaborator>) -> errors::Result<JobRunner> {
    let client = WebhookClient::new(cfg.request_timeout())
        .map_err(|e| LsoError::ConfigError(format!("cannot build HTTP client: {e}")))?;
    Ok(JobRunner::new(collaborator, client))
}

/// High-level entry point used by `main.rs`.
pub async fn run(args: CliArgs) -> Result<()> {
    let cfg = load_and_validate(&args.config)
        .with_context(|| format!("loading config from {}", args.config.display()))?;

    match args.command {
        Command::CheckConfig => print_json(&cfg),
        Command::Worker => run_worker(&cfg).await,
        Command::Broker => run_broker(&cfg).await,
        Command::Playbook(playbook) => {
            let services = build_services(&cfg, collaborator(&cfg)?).await?;
            let request = playbook_request(playbook)?;
            let outcome = services.dispatcher.run_playbook(request).await;
            info!(status = response_status(&outcome), "playbook request handled");
            // Local jobs run in this process; let them finish before exiting.
            services.submitter.shutdown().await;
            let job_id = outcome.map_err(rejected)?;
            print_json(&PlaybookRunResponse { job_id })
        }
        Command::Execute(execute) => {
            let services = build_services(&cfg, collaborator(&cfg)?).await?;
            let outcome = services.dispatcher.run_executable(executable_request(execute)).await;
            info!(status = response_status(&outcome), "execute request handled");
            services.submitter.shutdown().await;
            print_json(&outcome.map_err(rejected)?)
        }
    }
}

fn collaborator(cfg: &ConfigFile) -> Result<Arc<dyn ExecutionCollaborator>> {
    Ok(Arc::new(AnsibleProcessRunner::from_config(&cfg.runner)?))
}

async fn run_worker(cfg: &ConfigFile) -> Result<()> {
    let endpoint = cfg
        .queue
        .worker_url
        .as_deref()
        .ok_or_else(|| anyhow!("[queue].worker_url must be set to run a worker"))?;

    let runner = Arc::new(job_runner(cfg, collaborator(cfg)?)?);
    let pool = LocalPool::new(cfg.executor.max_workers, runner, false);
    let worker = QueueWorker::connect(
        endpoint,
        cfg.queue.queue_name.clone(),
        pool,
        cfg.connect_timeout(),
    )
    .await?;

    worker.run(ctrl_c()).await?;
    info!("worker stopped");
    Ok(())
}

async fn run_broker(cfg: &ConfigFile) -> Result<()> {
    let (Some(intake), Some(dispatch)) = (
        cfg.queue.broker_url.as_deref(),
        cfg.queue.worker_url.as_deref(),
    ) else {
        return Err(anyhow!(
            "[queue].broker_url and [queue].worker_url must be set to run a broker"
        ));
    };

    let broker = QueueBroker::bind(intake, dispatch).await?;
    broker.run(ctrl_c()).await?;
    info!("broker stopped");
    Ok(())
}

async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
}

fn rejected(e: DispatchError) -> anyhow::Error {
    let status = e.status_code();
    anyhow::Error::new(e).context(format!("request rejected with status {status}"))
}

fn playbook_request(args: PlaybookArgs) -> Result<PlaybookRunRequest> {
    let mut request = PlaybookRunRequest::new(args.name, parse_inventory(&args.inventory)?);
    if let Some(raw) = args.extra_vars.as_deref() {
        request.extra_vars = serde_json::from_str::<Map<String, Value>>(raw)
            .context("--extra-vars must be a JSON object")?;
    }
    request.callback = args.callback;
    request.progress = args.progress;
    request.progress_is_incremental = args.incremental;
    request.dry_run = args.dry_run;
    Ok(request)
}

fn executable_request(args: ExecuteArgs) -> ExecutableRunRequest {
    let mut request = ExecutableRunRequest::new(args.name);
    request.args = args.args;
    request.callback = args.callback;
    request.is_async = args.is_async;
    request
}

/// `@path` reads the inventory from a file. A JSON object is taken as a
/// structured inventory, anything else as a host list.
pub fn parse_inventory(raw: &str) -> Result<Inventory> {
    let text = match raw.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(Path::new(path))
            .with_context(|| format!("reading inventory file {path}"))?,
        None => raw.to_string(),
    };

    match serde_json::from_str::<Value>(&text) {
        Ok(Value::Object(map)) => Ok(Inventory::Structured(map)),
        _ => Ok(Inventory::Hosts(text)),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
