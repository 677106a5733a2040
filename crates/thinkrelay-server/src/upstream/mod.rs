//! Ollama backend integration.
//!
//! Provides a reqwest-based client for the streaming `/api/generate`
//! endpoint and the `/api/version` probe, plus the [`Upstream`] seam the
//! relay pipeline is generic over.

mod client;
mod error;
pub mod types;


use std::future::Future;
use std::pin::Pin;

use futures_util::Stream;

pub use client::OllamaClient;
pub use error::UpstreamError;

/// Raw lines of one generation, in arrival order. Single use.
pub type LineStream = Pin<Box<dyn Stream<Item = Result<String, UpstreamError>> + Send>>;

/// A backend that turns a prompt into a stream of NDJSON lines.
pub trait Upstream: Send + Sync {
    /// Open one streaming generation. Resolves once response headers arrive.
    fn open(&self, prompt: &str) -> impl Future<Output = Result<LineStream, UpstreamError>> + Send;
}

impl Upstream for OllamaClient {
    async fn open(&self, prompt: &str) -> Result<LineStream, UpstreamError> {
        self.generate(prompt).await
    }
}
