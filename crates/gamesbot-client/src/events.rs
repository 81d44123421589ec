//! Diagnostic events: local log plus an optional remote collector
//!
//! Remote delivery is fire-and-forget: `POST {api}/events` on a spawned task,
//! failures logged at debug and dropped. Reporting never blocks or fails the
//! caller.

use reqwest::header::AUTHORIZATION;
use tracing::{debug, info};

pub trait EventSink: Send + Sync {
    fn report(&self, text: &str);
}

/// Local log only.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogSink;

impl EventSink for LogSink {
    fn report(&self, text: &str) {
        info!("{}", text);
    }
}

/// Local log, then forwarded to the hub's event endpoint.
#[derive(Clone)]
pub struct HttpEventSink {
    client: reqwest::Client,
    url: String,
    auth_token: String,
}

impl HttpEventSink {
    pub fn new(url: impl Into<String>, auth_token: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
            auth_token: auth_token.into(),
        }
    }
}

impl EventSink for HttpEventSink {
    fn report(&self, text: &str) {
        info!("{}", text);

        let handle = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                debug!("no runtime, event not forwarded");
                return;
            }
        };
        let request = self
            .client
            .post(&self.url)
            .header(AUTHORIZATION, self.auth_token.as_str())
            .json(&serde_json::json!({ "text": text, "severity": "info" }));
        handle.spawn(async move {
            if let Err(e) = request.send().await {
                debug!("event post failed: {}", e);
            }
        });
    }
}
