// src/dedup.rs
//! Drops candidates already notified within the retention window, by point
//! lookup against the injected [`SentStore`].

use metrics::counter;

use crate::article::Candidate;
use crate::store::SentStore;

/// Keep only candidates the store has never seen. Input order is preserved.
///
/// A failing existence check drops the candidate: under-notifying beats
/// re-sending a duplicate when the store is flaky.
pub async fn filter_unsent(store: &dyn SentStore, candidates: Vec<Candidate>) -> Vec<Candidate> {
    let mut kept = Vec::with_capacity(candidates.len());
    for c in candidates {
        match store.contains(&c.url).await {
            Ok(false) => kept.push(c),
            Ok(true) => {
                tracing::debug!(url = %c.url, "already notified; dropping");
                counter!("dedup_dropped_total", "reason" => "already_sent").increment(1);
            }
            Err(e) => {
                tracing::warn!(url = %c.url, error = ?e, "existence check failed; dropping candidate");
                counter!("dedup_dropped_total", "reason" => "store_error").increment(1);
            }
        }
    }
    kept
}
