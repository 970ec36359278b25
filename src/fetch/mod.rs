// src/fetch/mod.rs
pub mod qiita;
pub mod zenn;

use std::collections::HashSet;
use std::future::Future;

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use futures::stream::{self, StreamExt};
use metrics::counter;
use time::format_description::well_known::Rfc2822;
use time::{OffsetDateTime, UtcOffset};

use crate::article::Candidate;

/// Hard cap on result pages per fetch.
pub const MAX_PAGES: u32 = 10;
/// In-flight page requests at any moment.
pub const PAGE_CONCURRENCY: usize = 5;

#[async_trait::async_trait]
pub trait ArticleProvider: Send + Sync {
    /// Fetch up to `count` recent candidates, best-effort. Partial failures
    /// inside the provider shrink the result; a returned error means the
    /// whole source is unavailable for this run.
    async fn fetch_latest(&self, count: usize) -> Result<Vec<Candidate>>;
    fn name(&self) -> &'static str;
}

/// Fetch from every provider concurrently. A failing provider contributes
/// zero candidates; the run proceeds with the rest.
pub async fn fetch_all(providers: &[Box<dyn ArticleProvider>], count: usize) -> Vec<Candidate> {
    let fetches = providers.iter().map(|p| async move {
        match p.fetch_latest(count).await {
            Ok(v) => {
                tracing::info!(provider = p.name(), fetched = v.len(), "provider fetch ok");
                v
            }
            Err(e) => {
                tracing::warn!(provider = p.name(), error = ?e, "provider error");
                counter!("fetch_provider_errors_total").increment(1);
                Vec::new()
            }
        }
    });
    let per_provider: Vec<Vec<Candidate>> = futures::future::join_all(fetches).await;
    per_provider.into_iter().flatten().collect()
}

/// Run `fetch_page` for pages `1..=max_pages` with bounded concurrency and
/// merge the results after all pages settle. A failed page is logged and
/// treated as empty; it never aborts the other in-flight requests.
pub(crate) async fn fetch_pages_concurrent<F, Fut>(
    source_name: &'static str,
    max_pages: u32,
    concurrency: usize,
    fetch_page: F,
) -> Vec<Candidate>
where
    F: Fn(u32) -> Fut,
    Fut: Future<Output = Result<Vec<Candidate>>>,
{
    let pages: Vec<Vec<Candidate>> = stream::iter(1..=max_pages)
        .map(|page| {
            let fut = fetch_page(page);
            async move {
                match fut.await {
                    Ok(items) => items,
                    Err(e) => {
                        tracing::warn!(source = source_name, page, error = ?e, "page fetch failed; treating as empty");
                        counter!("fetch_page_errors_total").increment(1);
                        Vec::new()
                    }
                }
            }
        })
        .buffer_unordered(concurrency)
        .collect()
        .await;

    pages.into_iter().flatten().collect()
}

/// Drop candidates whose URL was already seen, keeping the first occurrence.
pub fn dedup_by_url(candidates: Vec<Candidate>) -> Vec<Candidate> {
    let mut seen: HashSet<String> = HashSet::with_capacity(candidates.len());
    candidates
        .into_iter()
        .filter(|c| seen.insert(c.url.clone()))
        .collect()
}

/// Keep only candidates published within the last `lookback_days`. A missing
/// publication time excludes the candidate.
pub fn within_lookback(
    candidates: Vec<Candidate>,
    now: DateTime<Utc>,
    lookback_days: i64,
) -> Vec<Candidate> {
    let limit = now - Duration::days(lookback_days);
    candidates
        .into_iter()
        .filter(|c| c.created_at.is_some_and(|ts| ts >= limit))
        .collect()
}

/// RFC 2822 (`Tue, 02 Sep 2025 09:00:00 GMT`) to UTC, or `None` on garbage.
pub(crate) fn parse_rfc2822_utc(ts: &str) -> Option<DateTime<Utc>> {
    OffsetDateTime::parse(ts, &Rfc2822)
        .ok()
        .map(|dt| dt.to_offset(UtcOffset::UTC))
        .and_then(|dt| DateTime::<Utc>::from_timestamp(dt.unix_timestamp(), 0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::article::Source;

    fn cand(url: &str, age_days: i64) -> Candidate {
        Candidate {
            source: Source::Qiita,
            url: url.to_string(),
            title: "t".to_string(),
            created_at: Some(Utc::now() - Duration::days(age_days)),
            likes: 0,
            trend_score: None,
            author: "a".to_string(),
        }
    }

    #[tokio::test]
    async fn failed_pages_become_empty_and_others_survive() {
        let out = fetch_pages_concurrent("test", 4, 2, |page| async move {
            if page % 2 == 0 {
                anyhow::bail!("boom on page {page}");
            }
            Ok(vec![cand(&format!("https://example.test/{page}"), 0)])
        })
        .await;
        // pages 1 and 3 succeed, 2 and 4 fail
        assert_eq!(out.len(), 2);
    }

    #[tokio::test]
    async fn page_count_is_bounded() {
        let out = fetch_pages_concurrent("test", MAX_PAGES, PAGE_CONCURRENCY, |page| async move {
            Ok(vec![cand(&format!("https://example.test/{page}"), 0)])
        })
        .await;
        assert_eq!(out.len(), MAX_PAGES as usize);
    }

    #[test]
    fn dedup_keeps_first_occurrence() {
        let mut first = cand("https://example.test/x", 0);
        first.title = "first".into();
        let mut second = cand("https://example.test/x", 0);
        second.title = "second".into();
        let out = dedup_by_url(vec![first, cand("https://example.test/y", 0), second]);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].title, "first");
    }

    #[test]
    fn lookback_excludes_old_and_undated() {
        let mut undated = cand("https://example.test/u", 0);
        undated.created_at = None;
        let out = within_lookback(
            vec![cand("https://example.test/new", 3), cand("https://example.test/old", 30), undated],
            Utc::now(),
            14,
        );
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].url, "https://example.test/new");
    }

    #[test]
    fn rfc2822_parses_to_utc() {
        let dt = parse_rfc2822_utc("Tue, 02 Sep 2025 09:00:00 +0900").unwrap();
        assert_eq!(dt.to_rfc3339(), "2025-09-02T00:00:00+00:00");
        assert!(parse_rfc2822_utc("not a date").is_none());
    }
}
