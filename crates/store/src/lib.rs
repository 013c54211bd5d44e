//! SQLite persistence for Intelli Summarize.
//!
//! Every operation the HTTP layer exposes maps onto one method of [`Store`],
//! and every method onto one SQL statement (or one short transaction where
//! an ownership check has to happen atomically with the write).
//!
//! ```no_run
//! # async fn demo() -> store::Result<()> {
//! let store = store::Store::connect("sqlite://intelli_summarize.db").await?;
//! store.init_schema().await?;
//! let annotations = store.annotations_for_document(3).await?;
//! # let _ = annotations;
//! # Ok(())
//! # }
//! ```

mod annotations;
mod documents;
mod error;
mod feedback;
mod models;
mod schema;
mod sessions;
mod summaries;
mod users;

pub use crate::error::{Result, StoreError};
pub use crate::models::*;
pub use crate::schema::SCHEMA_SQL;

use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous,
};
use std::str::FromStr;
use tracing::{debug, info};

/// Handle to the relational store. Cheap to clone; clones share the pool.
#[derive(Clone, Debug)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    /// Connect to a SQLite database URL such as `sqlite://data/app.db` or
    /// `sqlite::memory:`. The file is created when missing.
    pub async fn connect(url: &str) -> Result<Self> {
        let in_memory = url.contains(":memory:");
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .journal_mode(if in_memory {
                SqliteJournalMode::Memory
            } else {
                SqliteJournalMode::Wal
            })
            .synchronous(SqliteSynchronous::Normal);

        // Every connection to `:memory:` opens its own database.
        let max_connections = if in_memory { 1 } else { 5 };

        debug!(url, max_connections, "connecting to sqlite");

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;

        Ok(Self { pool })
    }

    /// Wrap an existing pool.
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create all tables and indexes if they do not exist yet.
    pub async fn init_schema(&self) -> Result<()> {
        info!("initializing database schema");
        sqlx::raw_sql(SCHEMA_SQL).execute(&self.pool).await?;
        Ok(())
    }

    /// Round-trip a trivial query; used by the readiness probe.
    pub async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// Canonical timestamp encoding for every `*_at` column: RFC 3339, UTC,
/// millisecond precision. Fixed width, so string order is time order.
pub fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub(crate) fn now() -> String {
    timestamp(Utc::now())
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::Store;
    use tempfile::TempDir;

    /// A fresh file-backed store; the directory must outlive the store.
    pub async fn temp_store() -> (Store, TempDir) {
        let dir = tempfile::tempdir().expect("tempdir");
        let url = format!("sqlite://{}", dir.path().join("test.db").display());
        let store = Store::connect(&url).await.expect("connect");
        store.init_schema().await.expect("schema");
        (store, dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[tokio::test]
    async fn schema_is_idempotent() {
        let (store, _dir) = test_support::temp_store().await;
        store.init_schema().await.unwrap();
        store.ping().await.unwrap();
    }

    #[tokio::test]
    async fn in_memory_store_keeps_state_across_queries() {
        let store = Store::connect("sqlite::memory:").await.unwrap();
        store.init_schema().await.unwrap();
        let user = store
            .insert_user("Ada", "ada@example.com", "hash")
            .await
            .unwrap();
        let found = store.find_user_by_email("ada@example.com").await.unwrap();
        assert_eq!(found.map(|u| u.user_id), Some(user.user_id));
    }

    #[test]
    fn timestamps_are_fixed_width() {
        let a = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(timestamp(a), "2024-01-02T03:04:05.000Z");
    }
}
