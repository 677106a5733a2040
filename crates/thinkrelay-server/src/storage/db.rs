//! `SQLite` database for thinkrelay history.

use std::path::Path;

use sqlx::migrate::Migrator;
use sqlx::{Pool, Sqlite};
use thinkrelay_core::db::{self as core_db, DatabaseError};
use tracing::info;

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// History database handle. Clones share one pool.
#[derive(Debug, Clone)]
pub struct HistoryDatabase {
    pool: Pool<Sqlite>,
}

impl HistoryDatabase {
    /// Open or create the database file, applying pending migrations.
    pub async fn open(path: &Path) -> Result<Self, DatabaseError> {
        Self::migrated(core_db::open_pool(path).await?).await
    }

    /// Private in-memory database (for testing).
    pub async fn open_in_memory() -> Result<Self, DatabaseError> {
        Self::migrated(core_db::open_pool_in_memory().await?).await
    }

    async fn migrated(pool: Pool<Sqlite>) -> Result<Self, DatabaseError> {
        MIGRATOR
            .run(&pool)
            .await
            .map_err(|e| DatabaseError::Migration(e.to_string()))?;
        info!("History database migrations complete");
        Ok(Self { pool })
    }

    pub const fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }
}
