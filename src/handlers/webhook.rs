// src/handlers/webhook.rs

use std::time::Duration;

use serde::Serialize;
use url::Url;

/// Shared HTTP client for progress and completion webhooks.
///
/// Cheap to clone; all clones share one connection pool.
#[derive(Debug, Clone)]
pub struct WebhookClient {
    client: reqwest::Client,
}

impl WebhookClient {
    /// Build a client whose requests give up after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    /// POST `body` as JSON to `url`. Single attempt.
    pub async fn post_json<T>(&self, url: &Url, body: &T) -> Result<reqwest::Response, reqwest::Error>
    where
        T: Serialize + ?Sized,
    {
        self.client.post(url.clone()).json(body).send().await
    }
}
