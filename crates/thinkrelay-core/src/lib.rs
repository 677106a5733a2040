//! thinkrelay Core Library
//!
//! Shared functionality for the thinkrelay server:
//! - NDJSON parsing for the Ollama `/api/generate` stream
//! - Configuration resolution and hierarchy
//! - `SQLite` pool helpers
//! - Common error types

pub mod config;
pub mod db;
pub mod error;
pub mod ndjson;
pub mod tracing_init;

pub use config::Config;
pub use error::{Error, Result};
