//! NDJSON parser for the Ollama generate stream.
//!
//! The backend answers `/api/generate` with one JSON object per line. This
//! module turns each line into a [`Fragment`], implementing a tolerant reader
//! pattern: unknown fields are ignored and missing fields take defaults.

mod parser;
mod types;

pub use parser::parse_line;
pub use types::*;
