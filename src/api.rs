// src/api.rs
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::cors::CorsLayer;

use crate::pipeline::{Pipeline, RunOutcome};

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/run", post(run_pipeline))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

#[derive(serde::Serialize)]
pub struct RunResponse {
    pub message: String,
}

/// Invocation contract for the external scheduler: 200 on success or
/// no-new-articles, 500 on any internal failure. No request parameters.
async fn run_pipeline(State(state): State<AppState>) -> (StatusCode, Json<RunResponse>) {
    match state.pipeline.run_once().await {
        Ok(RunOutcome::Sent(_)) => (
            StatusCode::OK,
            Json(RunResponse {
                message: "Articles sent successfully.".to_string(),
            }),
        ),
        Ok(RunOutcome::NoNewArticles) => (
            StatusCode::OK,
            Json(RunResponse {
                message: "No new articles found.".to_string(),
            }),
        ),
        Err(e) => {
            tracing::error!(error = ?e, "pipeline run failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(RunResponse {
                    message: "Internal Server Error".to_string(),
                }),
            )
        }
    }
}
