// tests/api_http.rs
// HTTP surface: scheduler invocation contract (200 / 500 + short message).

use std::sync::Arc;

use anyhow::{bail, Result};
use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::Utc;
use tower::ServiceExt; // for `oneshot`

use tech_trend_notifier::fetch::ArticleProvider;
use tech_trend_notifier::notify::Notifier;
use tech_trend_notifier::{api, AppState, Candidate, Pipeline, SentRecord, SentStore, Source};

struct EmptyStore;

#[async_trait]
impl SentStore for EmptyStore {
    async fn contains(&self, _url: &str) -> Result<bool> {
        Ok(false)
    }
    async fn record_sent(&self, _records: &[SentRecord]) -> Result<()> {
        Ok(())
    }
}

struct OkNotifier;

#[async_trait]
impl Notifier for OkNotifier {
    async fn broadcast(&self, _message: &str) -> Result<()> {
        Ok(())
    }
}

struct BrokenNotifier;

#[async_trait]
impl Notifier for BrokenNotifier {
    async fn broadcast(&self, _message: &str) -> Result<()> {
        bail!("delivery down")
    }
}

struct OneArticle;

#[async_trait]
impl ArticleProvider for OneArticle {
    async fn fetch_latest(&self, _count: usize) -> Result<Vec<Candidate>> {
        Ok(vec![Candidate {
            source: Source::Zenn,
            url: "https://zenn.dev/only/articles/one".to_string(),
            title: "only one".to_string(),
            created_at: Some(Utc::now()),
            likes: 0,
            trend_score: None,
            author: "z".to_string(),
        }])
    }
    fn name(&self) -> &'static str {
        "Zenn"
    }
}

fn router(providers: Vec<Box<dyn ArticleProvider>>, notifier: Arc<dyn Notifier>) -> Router {
    let pipeline = Arc::new(Pipeline::new(providers, Arc::new(EmptyStore), notifier, 3));
    api::create_router(AppState { pipeline })
}

async fn body_string(resp: axum::response::Response) -> String {
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn health_answers_ok() {
    let app = router(Vec::new(), Arc::new(OkNotifier));
    let resp = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_string(resp).await, "ok");
}

#[tokio::test]
async fn run_with_no_candidates_is_success() {
    let app = router(Vec::new(), Arc::new(OkNotifier));
    let resp = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/run")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_string(resp).await.contains("No new articles found."));
}

#[tokio::test]
async fn run_with_articles_reports_sent() {
    let app = router(vec![Box::new(OneArticle)], Arc::new(OkNotifier));
    let resp = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/run")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_string(resp).await.contains("Articles sent successfully."));
}

#[tokio::test]
async fn delivery_failure_surfaces_as_500() {
    let app = router(vec![Box::new(OneArticle)], Arc::new(BrokenNotifier));
    let resp = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/run")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body_string(resp).await.contains("Internal Server Error"));
}
