//! HTTP backend for the remote analysis service.

use std::time::Duration;

use reqwest::Client;
use tracing::{debug, warn};
use veritas_core::{AnalysisResult, Error, PageSnapshot, Result};

use crate::backend::AnalysisBackend;

/// Posts snapshots as JSON and parses the JSON reply.
#[derive(Clone)]
pub struct HttpBackend {
    client: Client,
}

impl HttpBackend {
    /// Build a client. `timeout` bounds the whole request; `None` waits
    /// for as long as the transport allows.
    pub fn new(timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| Error::Config(format!("HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    /// Wrap an existing client.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl AnalysisBackend for HttpBackend {
    async fn analyze(&self, endpoint: &str, snapshot: &PageSnapshot) -> Result<AnalysisResult> {
        debug!(
            "POST {} ({} chars of text)",
            endpoint,
            snapshot.text.chars().count()
        );

        let response = self
            .client
            .post(endpoint)
            .json(snapshot)
            .send()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            warn!("Analysis service returned {}", status);
            return Err(Error::Backend(status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;
        serde_json::from_str(&body).map_err(|e| Error::InvalidResponse(e.to_string()))
    }
}
