// src/pipeline.rs
//! Orchestrates one recommendation run: fetch → score → dedup → select →
//! broadcast → persist.

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use metrics::{counter, describe_counter, describe_gauge, gauge};
use once_cell::sync::OnceCell;

use crate::article::Candidate;
use crate::dedup::filter_unsent;
use crate::fetch::{dedup_by_url, fetch_all, within_lookback, ArticleProvider};
use crate::notify::{format_broadcast, Notifier};
use crate::rank::{score_candidates, top_k};
use crate::select::select_stratified;
use crate::store::{SentRecord, SentStore};

/// Candidates requested per source before ranking trims them down.
pub const FETCH_COUNT: usize = 50;
pub const DEFAULT_LOOKBACK_DAYS: i64 = 14;

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("pipeline_runs_total", "Recommendation runs started.");
        describe_counter!("fetch_provider_errors_total", "Whole-source fetch failures.");
        describe_counter!("fetch_page_errors_total", "Single-page fetch failures.");
        describe_counter!("fetch_articles_total", "Raw articles parsed per source.");
        describe_counter!("dedup_dropped_total", "Candidates dropped by the sent-store check.");
        describe_counter!("articles_selected_total", "Articles in delivered digests.");
        describe_counter!("notify_failures_total", "Failed broadcast attempts.");
        describe_gauge!("pipeline_last_run_ts", "Unix ts when a run last completed.");
    });
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Digest broadcast, this many articles.
    Sent(usize),
    /// Nothing new survived dedup (or N = 0); no broadcast attempted.
    NoNewArticles,
}

pub struct Pipeline {
    providers: Vec<Box<dyn ArticleProvider>>,
    store: Arc<dyn SentStore>,
    notifier: Arc<dyn Notifier>,
    article_count: usize,
    lookback_days: i64,
    fetch_count: usize,
}

impl Pipeline {
    pub fn new(
        providers: Vec<Box<dyn ArticleProvider>>,
        store: Arc<dyn SentStore>,
        notifier: Arc<dyn Notifier>,
        article_count: usize,
    ) -> Self {
        Self {
            providers,
            store,
            notifier,
            article_count,
            lookback_days: DEFAULT_LOOKBACK_DAYS,
            fetch_count: FETCH_COUNT,
        }
    }

    pub fn with_lookback_days(mut self, days: i64) -> Self {
        self.lookback_days = days;
        self
    }

    pub fn with_fetch_count(mut self, count: usize) -> Self {
        self.fetch_count = count;
        self
    }

    /// Fetch, dedup and rank, without side effects. Split out so the
    /// candidate set the selector sees is observable on its own.
    pub async fn gather_candidates(&self) -> (Vec<Candidate>, Vec<Candidate>) {
        let now = Utc::now();

        let raw = fetch_all(&self.providers, self.fetch_count).await;
        let unique = dedup_by_url(raw);
        let recent = within_lookback(unique, now, self.lookback_days);

        let (mut qiita, zenn): (Vec<Candidate>, Vec<Candidate>) =
            recent.into_iter().partition(Candidate::is_scored);

        score_candidates(&mut qiita, now);
        let qiita = top_k(qiita, self.article_count);

        // One pass over the store, Qiita first; order inside each partition
        // is preserved (Qiita best-first, Zenn in feed order).
        let combined: Vec<Candidate> = qiita.into_iter().chain(zenn).collect();
        let kept = filter_unsent(self.store.as_ref(), combined).await;

        kept.into_iter().partition(Candidate::is_scored)
    }

    /// Run the whole pipeline once. Delivery failure is fatal to the run and
    /// skips persistence, so undelivered articles retry next run.
    pub async fn run_once(&self) -> Result<RunOutcome> {
        ensure_metrics_described();
        counter!("pipeline_runs_total").increment(1);
        tracing::info!("Starting article recommendation run");

        let (qiita, zenn) = self.gather_candidates().await;
        tracing::info!(
            qiita = qiita.len(),
            zenn = zenn.len(),
            "new candidates after dedup"
        );

        let selected = {
            let mut rng = rand::rng();
            select_stratified(qiita, zenn, self.article_count, &mut rng)
        };
        if selected.is_empty() {
            tracing::info!("No new articles to send");
            return Ok(RunOutcome::NoNewArticles);
        }

        let message = format_broadcast(&selected);
        if let Err(e) = self.notifier.broadcast(&message).await {
            counter!("notify_failures_total").increment(1);
            return Err(e).context("sending broadcast");
        }

        let sent_at = Utc::now().timestamp();
        let records: Vec<SentRecord> = selected
            .iter()
            .map(|c| SentRecord::new(c, sent_at))
            .collect();
        if let Err(e) = self.store.record_sent(&records).await {
            // Delivery already happened; failing the run here would re-send
            // the same articles next time. Log and move on.
            tracing::warn!(error = ?e, "failed to record sent articles");
        }

        counter!("articles_selected_total").increment(selected.len() as u64);
        gauge!("pipeline_last_run_ts").set(sent_at as f64);
        tracing::info!(count = selected.len(), "digest broadcast and recorded");
        Ok(RunOutcome::Sent(selected.len()))
    }
}
