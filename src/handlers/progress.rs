// src/handlers/progress.rs

use tracing::{debug, warn};
use url::Url;

use crate::model::ProgressPayload;
use crate::runner::RunEvent;

use super::webhook::WebhookClient;

/// Relays run events to a progress URL while the run is going.
///
/// Incremental handlers send only the newest event; cumulative handlers
/// keep their own buffer and resend everything seen so far on each event.
/// The buffer belongs to this handler alone.
#[derive(Debug)]
pub struct ProgressHandler {
    url: Url,
    incremental: bool,
    client: WebhookClient,
    seen: Vec<String>,
}

impl ProgressHandler {
    pub(crate) fn new(url: Url, incremental: bool, client: WebhookClient) -> Self {
        Self {
            url,
            incremental,
            client,
            seen: Vec::new(),
        }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// POST the progress update for `event`. A failed POST is logged and
    /// does not affect the run.
    pub async fn on_event(&mut self, event: &RunEvent) {
        let result = if self.incremental {
            let payload = ProgressPayload::latest(event.text());
            self.client.post_json(&self.url, &payload).await
        } else {
            self.seen.push(event.text().to_string());
            let payload = ProgressPayload::accumulated(&self.seen);
            self.client.post_json(&self.url, &payload).await
        };

        match result {
            Ok(response) if response.status().is_success() => {
                debug!(url = %self.url, "progress update delivered");
            }
            Ok(response) => {
                warn!(url = %self.url, status = %response.status(), "progress update rejected");
            }
            Err(e) => {
                warn!(url = %self.url, error = %e, "progress update failed");
            }
        }
    }
}
