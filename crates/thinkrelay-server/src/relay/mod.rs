//! Relay module: bridges the Ollama line stream with the browser's event
//! stream.
//!
//! Data flow:
//! ```text
//! upstream lines → NDJSON parser → Classifier → OutboundEvent → SSE frame
//!                                      ↓
//!                          answer / reasoning → HistoryStore
//! ```

pub mod classifier;
pub mod encoder;
pub mod keepalive;
mod pipeline;
mod types;

pub use classifier::{Classifier, Segment, Transcript};
pub use keepalive::Watchdog;
pub use pipeline::{RelayOptions, StreamRelay};
pub use types::*;
