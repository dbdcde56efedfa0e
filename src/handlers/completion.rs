// src/handlers/completion.rs

use thiserror::Error;
use tracing::info;
use url::Url;
use uuid::Uuid;

use crate::model::CallbackPayload;

use super::webhook::WebhookClient;

#[derive(Debug, Error)]
pub enum CallbackError {
    /// The request never got a response (connect failure, timeout, ...).
    #[error("Callback failed: {source}, url: {url}")]
    Request {
        url: Url,
        #[source]
        source: reqwest::Error,
    },

    /// The callback endpoint answered with a non-2xx status.
    #[error("Callback failed: {body}, url: {url}")]
    Failed { url: Url, status: u16, body: String },
}

/// Delivers the final payload of one job.
///
/// [`complete`](Self::complete) consumes the handler, so a job can report
/// completion at most once.
#[derive(Debug)]
pub struct CompletionHandler {
    url: Url,
    job_id: Uuid,
    client: WebhookClient,
}

impl CompletionHandler {
    pub(crate) fn new(url: Url, job_id: Uuid, client: WebhookClient) -> Self {
        Self { url, job_id, client }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn job_id(&self) -> Uuid {
        self.job_id
    }

    pub async fn complete(self, payload: CallbackPayload) -> Result<(), CallbackError> {
        let response = self
            .client
            .post_json(&self.url, &payload)
            .await
            .map_err(|source| CallbackError::Request {
                url: self.url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CallbackError::Failed {
                url: self.url,
                status: status.as_u16(),
                body,
            });
        }

        info!(
            job_id = %self.job_id,
            url = %self.url,
            status = payload.status().as_str(),
            "completion callback delivered"
        );
        Ok(())
    }
}
