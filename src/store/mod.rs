// src/store/mod.rs
pub mod sqlite;

pub use sqlite::SqliteSentStore;

use anyhow::Result;

use crate::article::Candidate;

/// Retention window after which a sent article may be recommended again.
pub const RETENTION_DAYS: i64 = 30;

/// Record of a successfully delivered article. Written once, never mutated,
/// invisible to lookups once `expires_at` has passed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentRecord {
    pub url: String,
    pub title: String,
    /// Epoch seconds.
    pub sent_at: i64,
    /// Epoch seconds; `sent_at` + 30 days.
    pub expires_at: i64,
}

impl SentRecord {
    pub fn new(candidate: &Candidate, sent_at: i64) -> Self {
        Self {
            url: candidate.url.clone(),
            title: candidate.title.clone(),
            sent_at,
            expires_at: sent_at + RETENTION_DAYS * 24 * 60 * 60,
        }
    }
}

/// Existence-check / write collaborator for past notifications, keyed by
/// article URL. Injected into the pipeline so tests can substitute a double.
#[async_trait::async_trait]
pub trait SentStore: Send + Sync {
    /// Whether `url` was notified within the retention window.
    async fn contains(&self, url: &str) -> Result<bool>;
    /// Persist records for delivered articles.
    async fn record_sent(&self, records: &[SentRecord]) -> Result<()>;
}
