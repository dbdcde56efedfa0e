// src/handlers/mod.rs

//! Per-job webhook handlers.
//!
//! Each job gets its own handler objects, built where the job runs from the
//! URLs it carries. No URL, no handler.

pub mod completion;
pub mod progress;
pub mod webhook;

use url::Url;
use uuid::Uuid;

pub use completion::{CallbackError, CompletionHandler};
pub use progress::ProgressHandler;
pub use webhook::WebhookClient;

pub fn progress_handler(
    progress_url: Option<&Url>,
    incremental: bool,
    client: &WebhookClient,
) -> Option<ProgressHandler> {
    progress_url.map(|url| ProgressHandler::new(url.clone(), incremental, client.clone()))
}

pub fn completion_handler(
    callback_url: Option<&Url>,
    job_id: Uuid,
    client: &WebhookClient,
) -> Option<CompletionHandler> {
    callback_url.map(|url| CompletionHandler::new(url.clone(), job_id, client.clone()))
}
