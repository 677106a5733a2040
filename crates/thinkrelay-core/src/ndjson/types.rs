//! Message types for the Ollama NDJSON stream.

use serde::{Deserialize, Serialize};

/// One decoded line of the generate stream.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Fragment {
    /// Generated text. Empty when the line carries none.
    pub response: String,
    /// Set on the final line of a generation.
    pub done: bool,
    /// Model that produced the fragment, when reported.
    pub model: Option<String>,
}
