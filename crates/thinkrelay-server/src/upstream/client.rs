//! Ollama REST API client.
//!
//! Uses reqwest to call `/api/generate` in streaming mode and `/api/version`.

use std::time::Duration;

use futures_util::{StreamExt, TryStreamExt};
use thinkrelay_core::config::UpstreamConfig;
use tokio_util::codec::{FramedRead, LinesCodec};
use tokio_util::io::StreamReader;
use tracing::{debug, info};

use super::LineStream;
use super::error::UpstreamError;
use super::types::GenerateRequest;

/// Ollama REST API client.
///
/// Cheap to clone; every call opens its own request on the shared
/// connection pool.
#[derive(Debug, Clone)]
pub struct OllamaClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
    header_timeout: Duration,
    max_line_bytes: usize,
}

impl OllamaClient {
    /// Create a new Ollama API client.
    pub fn new(config: &UpstreamConfig) -> Result<Self, UpstreamError> {
        if config.base_url.is_empty() {
            return Err(UpstreamError::Config("base_url is empty".into()));
        }
        if config.model.is_empty() {
            return Err(UpstreamError::Config("model is empty".into()));
        }

        // Ensure a TLS crypto provider is installed (reqwest uses rustls-no-provider).
        // The `Err` case just means it was already installed.
        let _ = rustls::crypto::ring::default_provider().install_default();

        let header_timeout = config.connect_timeout();
        let http = reqwest::Client::builder()
            .connect_timeout(header_timeout)
            .build()
            .map_err(|e| UpstreamError::Config(e.to_string()))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            header_timeout,
            max_line_bytes: config.max_line_bytes,
        })
    }

    /// Build the API URL for a given path.
    pub(crate) fn api_url(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }

    /// Check HTTP response status, returning error for non-success codes.
    fn check_status(resp: &reqwest::Response) -> Result<(), UpstreamError> {
        let status = resp.status();
        if !status.is_success() {
            return Err(UpstreamError::Status(status.as_u16()));
        }
        Ok(())
    }

    /// Wait for response headers, bounded by the connect timeout.
    ///
    /// The body itself is not bounded: a connected backend may stay silent
    /// for as long as it likes.
    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, UpstreamError> {
        tokio::time::timeout(self.header_timeout, request.send())
            .await
            .map_err(|_| UpstreamError::ConnectTimeout)?
            .map_err(UpstreamError::from)
    }

    /// Start a streaming generation and return its lines.
    pub async fn generate(&self, prompt: &str) -> Result<LineStream, UpstreamError> {
        let body = GenerateRequest {
            model: &self.model,
            prompt,
            stream: true,
        };
        let resp = self
            .send(self.http.post(self.api_url("/generate")).json(&body))
            .await?;

        info!(status = resp.status().as_u16(), model = %self.model, "Connected to Ollama");
        Self::check_status(&resp)?;

        let bytes = resp.bytes_stream().map_err(std::io::Error::other);
        let lines = FramedRead::new(
            StreamReader::new(bytes),
            LinesCodec::new_with_max_length(self.max_line_bytes),
        );

        Ok(Box::pin(lines.map(|line| line.map_err(UpstreamError::from))))
    }

    /// Fetch the backend's version document.
    pub async fn version(&self) -> Result<serde_json::Value, UpstreamError> {
        let resp = self.send(self.http.get(self.api_url("/version"))).await?;
        Self::check_status(&resp)?;
        let version = resp.json().await?;
        debug!(%version, "Ollama version probe succeeded");
        Ok(version)
    }
}
