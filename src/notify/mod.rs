// src/notify/mod.rs
pub mod line;

pub use line::LineNotifier;

use anyhow::Result;

use crate::article::Candidate;

/// Delivery collaborator. One call broadcasts the whole formatted digest to
/// the full subscriber audience; there is no per-recipient addressing.
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    async fn broadcast(&self, message: &str) -> Result<()>;
}

/// Render the selected articles as the broadcast text: fixed header, then
/// numbered `[source] title / url` blocks.
pub fn format_broadcast(articles: &[Candidate]) -> String {
    let mut text = String::from("📅 Today's Recommended Articles\n");
    for (i, a) in articles.iter().enumerate() {
        text.push_str(&format!(
            "\n{}. [{}] {}\n{}\n",
            i + 1,
            a.source,
            a.title,
            a.url
        ));
    }
    text.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::article::Source;

    fn cand(source: Source, title: &str, url: &str) -> Candidate {
        Candidate {
            source,
            url: url.to_string(),
            title: title.to_string(),
            created_at: None,
            likes: 0,
            trend_score: None,
            author: "a".to_string(),
        }
    }

    #[test]
    fn digest_is_numbered_with_source_labels() {
        let msg = format_broadcast(&[
            cand(Source::Qiita, "Async Rust", "https://qiita.com/x"),
            cand(Source::Zenn, "Zennの記事", "https://zenn.dev/y"),
        ]);
        assert!(msg.starts_with("📅 Today's Recommended Articles"));
        assert!(msg.contains("\n1. [Qiita] Async Rust\nhttps://qiita.com/x\n"));
        assert!(msg.contains("\n2. [Zenn] Zennの記事\nhttps://zenn.dev/y"));
        assert!(!msg.ends_with('\n'));
    }
}
