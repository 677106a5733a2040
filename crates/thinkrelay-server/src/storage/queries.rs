//! Database queries for thinkrelay history.

use thinkrelay_core::db::{DatabaseError, unix_timestamp};

use super::db::HistoryDatabase;
use super::models::Exchange;

impl HistoryDatabase {
    /// Insert a completed exchange.
    pub async fn insert_exchange(
        &self,
        prompt: &str,
        answer: &str,
        reasoning: &str,
    ) -> Result<i64, DatabaseError> {
        let result = sqlx::query(
            "INSERT INTO exchanges (prompt, answer, reasoning, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(prompt)
        .bind(answer)
        .bind(reasoning)
        .bind(unix_timestamp())
        .execute(self.pool())
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Get an exchange by ID.
    pub async fn get_exchange(&self, id: i64) -> Result<Option<Exchange>, DatabaseError> {
        let exchange = sqlx::query_as::<_, Exchange>("SELECT * FROM exchanges WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool())
            .await?;

        Ok(exchange)
    }

    /// List all exchanges, newest first.
    pub async fn list_exchanges(&self) -> Result<Vec<Exchange>, DatabaseError> {
        let exchanges = sqlx::query_as::<_, Exchange>(
            "SELECT * FROM exchanges ORDER BY created_at DESC, id DESC",
        )
        .fetch_all(self.pool())
        .await?;

        Ok(exchanges)
    }

    /// Delete an exchange. Returns whether a row was removed.
    pub async fn delete_exchange(&self, id: i64) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM exchanges WHERE id = ?")
            .bind(id)
            .execute(self.pool())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete all exchanges. Returns the number removed.
    pub async fn clear_exchanges(&self) -> Result<u64, DatabaseError> {
        let result = sqlx::query("DELETE FROM exchanges")
            .execute(self.pool())
            .await?;

        Ok(result.rows_affected())
    }
}
