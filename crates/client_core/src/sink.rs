use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, Client};
use shared::protocol::SinkPayload;
use thiserror::Error;
use url::Url;

use crate::config::Settings;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("failed to encode sink payload: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("failed to reach sink endpoint: {0}")]
    Transport(#[from] reqwest::Error),
}

/// One-way destination for submitted visits.
///
/// `Ok(())` only means the request left the machine; the remote's response
/// is never read.
#[async_trait]
pub trait RemoteSink: Send + Sync {
    async fn send(&self, payload: &SinkPayload) -> Result<(), SinkError>;
}

pub struct HttpSink {
    http: Client,
    endpoint: Url,
}

impl HttpSink {
    pub fn new(endpoint: Url, timeout: Duration) -> Result<Self, SinkError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self { http, endpoint })
    }

    /// Builds the sink when forwarding is enabled and an endpoint is set.
    pub fn from_settings(settings: &Settings) -> Result<Option<Self>, SinkError> {
        match (&settings.sink_url, settings.cloud_forwarding_enabled) {
            (Some(url), true) => Self::new(url.clone(), settings.sink_timeout).map(Some),
            _ => Ok(None),
        }
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl RemoteSink for HttpSink {
    async fn send(&self, payload: &SinkPayload) -> Result<(), SinkError> {
        let body = serde_json::to_string(payload)?;
        // The spreadsheet script reads the raw body; it does not accept application/json.
        let response = self
            .http
            .post(self.endpoint.clone())
            .header(CONTENT_TYPE, "text/plain;charset=utf-8")
            .body(body)
            .send()
            .await?;
        tracing::debug!(status = %response.status(), "visit forwarded to sink");
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/sink_tests.rs"]
mod tests;
