//! Data models for thinkrelay storage.

use serde::{Deserialize, Serialize};

/// A completed prompt/answer exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Exchange {
    pub id: i64,
    pub prompt: String,
    pub answer: String,
    pub reasoning: String,
    /// Unix seconds, assigned on insert.
    pub created_at: i64,
}
