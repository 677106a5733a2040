//! Upstream client error types.

use tokio_util::codec::LinesCodecError;

/// Errors from talking to the inference backend.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UpstreamError {
    /// No response headers within the connect timeout.
    #[error("Connection timed out")]
    ConnectTimeout,

    /// Backend unreachable, or the transport failed mid-stream.
    #[error("{0}")]
    Connect(String),

    /// Backend answered with a non-success status.
    #[error("Backend returned status {0}")]
    Status(u16),

    /// The byte stream could not be split into lines.
    #[error("{0}")]
    Unexpected(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for UpstreamError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::ConnectTimeout
        } else {
            Self::Connect(e.to_string())
        }
    }
}

impl From<LinesCodecError> for UpstreamError {
    fn from(e: LinesCodecError) -> Self {
        match e {
            LinesCodecError::MaxLineLengthExceeded => {
                Self::Unexpected("backend line exceeds the maximum length".into())
            }
            LinesCodecError::Io(io) if io.kind() == std::io::ErrorKind::InvalidData => {
                Self::Unexpected(io.to_string())
            }
            LinesCodecError::Io(io) => Self::Connect(io.to_string()),
        }
    }
}
