//! thinkrelay server library.
//!
//! Relays prompts to a local Ollama backend over server-sent events,
//! splitting reasoning from the answer, and keeps a history of exchanges.

pub mod relay;
pub mod server;
pub mod storage;
pub mod upstream;
