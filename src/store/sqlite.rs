// src/store/sqlite.rs
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Pool, Sqlite};

use super::{SentRecord, SentStore};

const MIGRATION_SENT_ARTICLES: &str = r#"
CREATE TABLE IF NOT EXISTS sent_articles (
    url        TEXT PRIMARY KEY,
    title      TEXT NOT NULL,
    sent_at    INTEGER NOT NULL,
    expires_at INTEGER NOT NULL
);
"#;

const MIGRATION_EXPIRY_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_sent_articles_expires_at ON sent_articles(expires_at);";

/// SQLite-backed sent-article store. Expired rows are treated as absent by
/// `contains` and physically removed only by `purge_expired`, so the lookup
/// behaves like a TTL'd key store regardless of when maintenance last ran.
#[derive(Clone)]
pub struct SqliteSentStore {
    pool: Pool<Sqlite>,
}

impl SqliteSentStore {
    pub async fn open(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }

        let db_url = format!("sqlite:{}", db_path.display());
        tracing::info!("Connecting to sent-article store: {}", db_path.display());

        // Per-connection PRAGMAs so every pooled connection agrees.
        let options = SqliteConnectOptions::from_str(&db_url)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(10));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(10))
            .connect_with(options)
            .await
            .context("connecting sent-article store")?;

        let store = Self { pool };
        store.run_migrations().await?;
        Ok(store)
    }

    /// In-memory store for tests.
    pub async fn open_in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .context("connecting in-memory store")?;

        let store = Self { pool };
        store.run_migrations().await?;
        Ok(store)
    }

    async fn run_migrations(&self) -> Result<()> {
        sqlx::query(MIGRATION_SENT_ARTICLES)
            .execute(&self.pool)
            .await
            .context("migrating sent_articles")?;
        sqlx::query(MIGRATION_EXPIRY_INDEX)
            .execute(&self.pool)
            .await
            .context("indexing sent_articles")?;
        Ok(())
    }

    /// Delete rows past their expiry. Maintenance only; `contains` already
    /// ignores expired rows.
    pub async fn purge_expired(&self, now: i64) -> Result<u64> {
        let result = sqlx::query("DELETE FROM sent_articles WHERE expires_at <= ?")
            .bind(now)
            .execute(&self.pool)
            .await
            .context("purging expired sent articles")?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl SentStore for SqliteSentStore {
    async fn contains(&self, url: &str) -> Result<bool> {
        let now = chrono::Utc::now().timestamp();
        let row: Option<(i64,)> =
            sqlx::query_as("SELECT 1 FROM sent_articles WHERE url = ? AND expires_at > ?")
                .bind(url)
                .bind(now)
                .fetch_optional(&self.pool)
                .await
                .context("sent-article lookup")?;
        Ok(row.is_some())
    }

    async fn record_sent(&self, records: &[SentRecord]) -> Result<()> {
        let mut tx = self.pool.begin().await.context("opening store tx")?;
        for r in records {
            sqlx::query(
                "INSERT OR REPLACE INTO sent_articles (url, title, sent_at, expires_at) \
                 VALUES (?, ?, ?, ?)",
            )
            .bind(&r.url)
            .bind(&r.title)
            .bind(r.sent_at)
            .bind(r.expires_at)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("recording sent article {}", r.url))?;
        }
        tx.commit().await.context("committing sent articles")?;
        Ok(())
    }
}
