// src/article.rs
use chrono::{DateTime, Utc};

/// Where a candidate came from. Qiita exposes an engagement signal
/// (likes), Zenn is a trend feed with no per-item signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Source {
    Qiita,
    Zenn,
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Source::Qiita => f.write_str("Qiita"),
            Source::Zenn => f.write_str("Zenn"),
        }
    }
}

/// A normalized article record prior to selection. `url` is the identity
/// key: the same URL never appears twice within a run.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Candidate {
    pub source: Source,
    pub url: String,
    pub title: String,
    /// Source-reported publication time, normalized to UTC. `None` when the
    /// source timestamp failed to parse; such candidates do not survive the
    /// recency filter.
    pub created_at: Option<DateTime<Utc>>,
    /// Like count. Only meaningful for Qiita; Zenn candidates carry 0.
    pub likes: u32,
    /// Decay-weighted popularity. Computed for Qiita only; must not be used
    /// to compare across sources.
    pub trend_score: Option<f64>,
    pub author: String,
}

impl Candidate {
    pub fn is_scored(&self) -> bool {
        self.source == Source::Qiita
    }
}
