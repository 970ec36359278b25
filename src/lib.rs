// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod api;
pub mod article;
pub mod config;
pub mod dedup;
pub mod fetch;
pub mod metrics;
pub mod notify;
pub mod pipeline;
pub mod rank;
pub mod scheduler;
pub mod select;
pub mod store;

// ---- Re-exports for stable public API ----
pub use crate::api::{create_router, AppState};
pub use crate::article::{Candidate, Source};
pub use crate::pipeline::{Pipeline, RunOutcome};
pub use crate::store::{SentRecord, SentStore, SqliteSentStore};
