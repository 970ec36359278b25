// src/scheduler.rs
use std::sync::Arc;
use std::time::Duration;

use metrics::counter;
use tokio::task::JoinHandle;

use crate::pipeline::Pipeline;

/// Spawn an in-process ticker that runs the pipeline every `interval_secs`.
/// Deployments with an external scheduler hitting `POST /run` leave this
/// off; failures are logged and the next tick proceeds normally.
pub fn spawn_interval_runner(pipeline: Arc<Pipeline>, interval_secs: u64) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs));
        // the first tick fires immediately; skip it so startup stays quiet
        ticker.tick().await;
        loop {
            ticker.tick().await;
            match pipeline.run_once().await {
                Ok(outcome) => {
                    tracing::info!(target: "scheduler", ?outcome, "scheduled run finished");
                }
                Err(e) => {
                    tracing::error!(target: "scheduler", error = ?e, "scheduled run failed");
                    counter!("scheduler_run_failures_total").increment(1);
                }
            }
        }
    })
}
