//! `SQLite` storage for thinkrelay.
//!
//! Provides persistence for completed exchanges, and the [`HistoryStore`]
//! seam the relay pipeline writes through.

mod db;
mod models;
mod queries;


use std::future::Future;

pub use db::HistoryDatabase;
pub use models::Exchange;
pub use thinkrelay_core::db::DatabaseError;

/// Durable, append-only log of exchanges.
///
/// Implementations must tolerate concurrent appends and reads; each row is
/// written atomically.
pub trait HistoryStore: Send + Sync {
    /// Record a completed exchange and return its identifier.
    fn append(
        &self,
        prompt: &str,
        answer: &str,
        reasoning: &str,
    ) -> impl Future<Output = Result<i64, DatabaseError>> + Send;

    /// All exchanges, newest first.
    fn list(&self) -> impl Future<Output = Result<Vec<Exchange>, DatabaseError>> + Send;

    /// Delete one exchange. Unknown identifiers are not an error.
    fn delete(&self, id: i64) -> impl Future<Output = Result<(), DatabaseError>> + Send;

    /// Delete every exchange.
    fn clear(&self) -> impl Future<Output = Result<(), DatabaseError>> + Send;
}

impl HistoryStore for HistoryDatabase {
    async fn append(&self, prompt: &str, answer: &str, reasoning: &str) -> Result<i64, DatabaseError> {
        self.insert_exchange(prompt, answer, reasoning).await
    }

    async fn list(&self) -> Result<Vec<Exchange>, DatabaseError> {
        self.list_exchanges().await
    }

    async fn delete(&self, id: i64) -> Result<(), DatabaseError> {
        self.delete_exchange(id).await.map(|_| ())
    }

    async fn clear(&self) -> Result<(), DatabaseError> {
        self.clear_exchanges().await.map(|_| ())
    }
}
