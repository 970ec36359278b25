// tests/store_sqlite.rs
// TTL semantics of the SQLite sent-article store.

use chrono::Utc;

use tech_trend_notifier::store::{SentRecord, SentStore, SqliteSentStore, RETENTION_DAYS};

fn record(url: &str, sent_at: i64) -> SentRecord {
    SentRecord {
        url: url.to_string(),
        title: format!("title for {url}"),
        sent_at,
        expires_at: sent_at + RETENTION_DAYS * 24 * 60 * 60,
    }
}

#[tokio::test]
async fn recorded_urls_are_present_until_expiry() {
    let store = SqliteSentStore::open_in_memory().await.unwrap();
    let now = Utc::now().timestamp();

    store
        .record_sent(&[record("https://qiita.com/a", now), record("https://zenn.dev/b", now)])
        .await
        .unwrap();

    assert!(store.contains("https://qiita.com/a").await.unwrap());
    assert!(store.contains("https://zenn.dev/b").await.unwrap());
    assert!(!store.contains("https://qiita.com/unknown").await.unwrap());
}

#[tokio::test]
async fn expired_rows_read_as_absent() {
    let store = SqliteSentStore::open_in_memory().await.unwrap();
    let long_ago = Utc::now().timestamp() - (RETENTION_DAYS + 5) * 24 * 60 * 60;

    store
        .record_sent(&[record("https://qiita.com/old", long_ago)])
        .await
        .unwrap();

    // still on disk, but past expires_at, so the lookup ignores it
    assert!(!store.contains("https://qiita.com/old").await.unwrap());
}

#[tokio::test]
async fn purge_removes_only_expired_rows() {
    let store = SqliteSentStore::open_in_memory().await.unwrap();
    let now = Utc::now().timestamp();
    let long_ago = now - (RETENTION_DAYS + 5) * 24 * 60 * 60;

    store
        .record_sent(&[record("https://qiita.com/old", long_ago), record("https://qiita.com/new", now)])
        .await
        .unwrap();

    let purged = store.purge_expired(now).await.unwrap();
    assert_eq!(purged, 1);
    assert!(store.contains("https://qiita.com/new").await.unwrap());
    assert_eq!(store.purge_expired(now).await.unwrap(), 0);
}

#[tokio::test]
async fn rewriting_a_url_refreshes_its_expiry() {
    let store = SqliteSentStore::open_in_memory().await.unwrap();
    let now = Utc::now().timestamp();
    let long_ago = now - (RETENTION_DAYS + 5) * 24 * 60 * 60;

    store
        .record_sent(&[record("https://qiita.com/x", long_ago)])
        .await
        .unwrap();
    assert!(!store.contains("https://qiita.com/x").await.unwrap());

    store
        .record_sent(&[record("https://qiita.com/x", now)])
        .await
        .unwrap();
    assert!(store.contains("https://qiita.com/x").await.unwrap());
}
