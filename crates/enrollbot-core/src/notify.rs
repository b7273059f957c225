//! Outcome notifications.
//!
//! Fire-and-forget: the supervisor reports delivery failures in the log
//! and moves on. A notification must never decide a run's outcome.

use reqwest::Client;
use serde_json::json;
use std::time::Duration;
use tokio::runtime::Runtime;

use crate::error::NotifyError;

/// Message-send capability with a bounded delivery attempt.
pub trait Notifier {
    fn send(&self, message: &str) -> Result<(), NotifyError>;
}

const SEND_TIMEOUT: Duration = Duration::from_secs(10);

/// Posts messages to a JSON webhook (Discord-compatible payload).
#[derive(Debug)]
pub struct WebhookNotifier {
    url: String,
    http: Client,
    rt: Runtime,
}

impl WebhookNotifier {
    pub fn new(url: &str) -> Result<Self, NotifyError> {
        url::Url::parse(url).map_err(|e| NotifyError::InvalidUrl(e.to_string()))?;
        let http = Client::builder()
            .timeout(SEND_TIMEOUT)
            .build()
            .map_err(|e| NotifyError::SendFailed(e.to_string()))?;
        let rt = Runtime::new().map_err(|e| NotifyError::SendFailed(e.to_string()))?;
        Ok(Self {
            url: url.to_string(),
            http,
            rt,
        })
    }
}

impl Notifier for WebhookNotifier {
    fn send(&self, message: &str) -> Result<(), NotifyError> {
        let body = json!({ "content": message });
        let response = self
            .rt
            .block_on(async { self.http.post(&self.url).json(&body).send().await })
            .map_err(|e| NotifyError::SendFailed(e.to_string()))?;

        if response.status().is_success() {
            Ok(())
        } else {
            let status = response.status();
            let text = self.rt.block_on(response.text()).unwrap_or_default();
            Err(NotifyError::SendFailed(format!(
                "webhook returned HTTP {status}: {text}"
            )))
        }
    }
}

/// Used when notifications are disabled.
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn send(&self, _message: &str) -> Result<(), NotifyError> {
        Ok(())
    }
}
