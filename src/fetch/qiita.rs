// src/fetch/qiita.rs
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use metrics::counter;
use reqwest::Client;
use serde::Deserialize;

use crate::article::{Candidate, Source};
use crate::fetch::{dedup_by_url, fetch_pages_concurrent, ArticleProvider, MAX_PAGES, PAGE_CONCURRENCY};

pub const QIITA_API_ENDPOINT: &str = "https://qiita.com/api/v2/items";
const PAGE_TIMEOUT: Duration = Duration::from_secs(10);
const MAX_PER_PAGE: usize = 100;

#[derive(Debug, Deserialize)]
struct Item {
    title: String,
    url: String,
    likes_count: u32,
    created_at: String,
    user: User,
}

#[derive(Debug, Deserialize)]
struct User {
    id: String,
}

/// Qiita search-API provider. Queries `created:>DATE stocks:>0` and fans
/// out over result pages with bounded concurrency; a failed page only
/// shrinks the result.
pub struct QiitaProvider {
    endpoint: String,
    token: Option<String>,
    lookback_days: i64,
    client: Client,
}

impl QiitaProvider {
    pub fn new(token: Option<String>, lookback_days: i64) -> Self {
        Self {
            endpoint: QIITA_API_ENDPOINT.to_string(),
            token,
            lookback_days,
            client: Client::new(),
        }
    }

    /// Point the provider at a different endpoint (tests/tools).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Search expression for recent, minimally-engaged articles.
    fn query(&self, now: DateTime<Utc>) -> String {
        let since = (now - chrono::Duration::days(self.lookback_days)).date_naive();
        format!("created:>{} stocks:>0", since.format("%Y-%m-%d"))
    }

    async fn fetch_page(&self, query: &str, per_page: usize, page: u32) -> Result<Vec<Candidate>> {
        let mut req = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("query", query.to_string()),
                ("per_page", per_page.to_string()),
                ("page", page.to_string()),
            ])
            .timeout(PAGE_TIMEOUT);
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }

        let items: Vec<Item> = req
            .send()
            .await
            .context("qiita http get()")?
            .error_for_status()
            .context("qiita non-2xx")?
            .json()
            .await
            .context("qiita response body")?;

        counter!("fetch_articles_total", "source" => "qiita").increment(items.len() as u64);
        Ok(items.into_iter().map(Candidate::from).collect())
    }

    /// Parse one page's JSON body. Split out so fixtures can exercise the
    /// mapping without HTTP.
    pub fn parse_page(body: &str) -> Result<Vec<Candidate>> {
        let items: Vec<Item> = serde_json::from_str(body).context("parsing qiita items json")?;
        Ok(items.into_iter().map(Candidate::from).collect())
    }
}

impl From<Item> for Candidate {
    fn from(it: Item) -> Self {
        Candidate {
            source: Source::Qiita,
            url: it.url,
            title: it.title,
            created_at: DateTime::parse_from_rfc3339(&it.created_at)
                .ok()
                .map(|dt| dt.with_timezone(&Utc)),
            likes: it.likes_count,
            trend_score: None,
            author: it.user.id,
        }
    }
}

#[async_trait]
impl ArticleProvider for QiitaProvider {
    async fn fetch_latest(&self, count: usize) -> Result<Vec<Candidate>> {
        let query = self.query(Utc::now());
        let per_page = count.clamp(1, MAX_PER_PAGE);

        let merged = fetch_pages_concurrent(self.name(), MAX_PAGES, PAGE_CONCURRENCY, |page| {
            self.fetch_page(&query, per_page, page)
        })
        .await;

        let mut out = dedup_by_url(merged);
        // Highest-engagement first; the scorer re-ranks by decay later.
        out.sort_by(|a, b| b.likes.cmp(&a.likes));
        out.truncate(count);
        Ok(out)
    }

    fn name(&self) -> &'static str {
        "Qiita"
    }
}
