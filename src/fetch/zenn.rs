// src/fetch/zenn.rs
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use quick_xml::de::from_str;
use reqwest::Client;
use serde::Deserialize;

use crate::article::{Candidate, Source};
use crate::fetch::{parse_rfc2822_utc, ArticleProvider};

pub const ZENN_FEED_URL: &str = "https://zenn.dev/feed";
const FEED_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    item: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    link: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    #[serde(rename = "creator", default)]
    creator: Option<String>,
}

/// Zenn trend-feed provider. One unpaginated fetch; entries arrive in trend
/// order and carry no engagement signal, so the first `count` are taken
/// as-is.
pub struct ZennProvider {
    feed_url: String,
    client: Client,
}

impl Default for ZennProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl ZennProvider {
    pub fn new() -> Self {
        Self {
            feed_url: ZENN_FEED_URL.to_string(),
            client: Client::new(),
        }
    }

    pub fn with_feed_url(mut self, url: impl Into<String>) -> Self {
        self.feed_url = url.into();
        self
    }

    /// Parse the feed document, bounded to the first `count` entries in
    /// feed order. Entries without a link are skipped.
    pub fn parse_feed(xml: &str, count: usize) -> Result<Vec<Candidate>> {
        let rss: Rss = from_str(xml).context("parsing zenn rss xml")?;

        let mut out = Vec::with_capacity(count.min(rss.channel.item.len()));
        for it in rss.channel.item.into_iter().take(count) {
            let Some(url) = it.link else {
                continue;
            };
            let title = it
                .title
                .map(|t| html_escape::decode_html_entities(t.trim()).to_string())
                .unwrap_or_default();
            out.push(Candidate {
                source: Source::Zenn,
                url,
                title,
                created_at: it.pub_date.as_deref().and_then(parse_rfc2822_utc),
                likes: 0,
                trend_score: None,
                author: it.creator.unwrap_or_else(|| "unknown".to_string()),
            });
        }
        Ok(out)
    }
}

#[async_trait]
impl ArticleProvider for ZennProvider {
    async fn fetch_latest(&self, count: usize) -> Result<Vec<Candidate>> {
        let body = self
            .client
            .get(&self.feed_url)
            .timeout(FEED_TIMEOUT)
            .send()
            .await
            .context("zenn http get()")?
            .error_for_status()
            .context("zenn non-2xx")?
            .text()
            .await
            .context("zenn feed body")?;

        let out = Self::parse_feed(&body, count)?;
        metrics::counter!("fetch_articles_total", "source" => "zenn").increment(out.len() as u64);
        Ok(out)
    }

    fn name(&self) -> &'static str {
        "Zenn"
    }
}
