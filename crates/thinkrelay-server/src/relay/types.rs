//! Relay module types.

use serde::{Deserialize, Serialize};

use crate::upstream::UpstreamError;

/// Content of the first event of every stream.
pub const CONNECTED: &str = "Connected";

/// One event on the browser-facing stream.
///
/// Serialized as `{"type": "<variant>"}` plus a `content` field for the
/// variants that carry text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "content", rename_all = "snake_case")]
pub enum OutboundEvent {
    Status(String),
    ThinkStart,
    ThinkEnd,
    ThinkContent(String),
    Content(String),
    Keepalive,
    Error(String),
    Done,
}

/// Errors surfaced to the client as an `error` event.
///
/// The `Display` text is the client-facing message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RelayError {
    #[error("Connection timed out. Please try again.")]
    ConnectTimeout,

    #[error("Error: Could not connect to Ollama server: {0}")]
    Connect(String),

    #[error("Error: Received status code {0}")]
    UpstreamStatus(u16),

    #[error("Error decoding response: {0}")]
    Decode(String),

    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),

    #[error("Error: Failed to save conversation: {0}")]
    Persistence(String),
}

impl RelayError {
    /// Whether the stream ends after this error. Decode errors skip one line.
    pub const fn is_fatal(&self) -> bool {
        !matches!(self, Self::Decode(_))
    }
}

impl From<UpstreamError> for RelayError {
    fn from(e: UpstreamError) -> Self {
        match e {
            UpstreamError::ConnectTimeout => Self::ConnectTimeout,
            UpstreamError::Connect(detail) => Self::Connect(detail),
            UpstreamError::Status(code) => Self::UpstreamStatus(code),
            UpstreamError::Unexpected(detail) => Self::Unexpected(detail),
            e @ UpstreamError::Config(_) => Self::Unexpected(e.to_string()),
        }
    }
}
