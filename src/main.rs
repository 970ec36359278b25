//! Tech Trend Notifier — Binary Entrypoint
//! Boots the Axum HTTP server that exposes the scheduled `/run` trigger,
//! wiring providers, the sent-article store and the LINE notifier.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use tech_trend_notifier::config::AppConfig;
use tech_trend_notifier::fetch::qiita::QiitaProvider;
use tech_trend_notifier::fetch::zenn::ZennProvider;
use tech_trend_notifier::fetch::ArticleProvider;
use tech_trend_notifier::metrics::Metrics;
use tech_trend_notifier::notify::LineNotifier;
use tech_trend_notifier::pipeline::{Pipeline, DEFAULT_LOOKBACK_DAYS};
use tech_trend_notifier::scheduler::spawn_interval_runner;
use tech_trend_notifier::store::SqliteSentStore;
use tech_trend_notifier::{api, AppState};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("tech_trend_notifier=info,warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = AppConfig::from_env().context("loading configuration")?;

    let store = SqliteSentStore::open(&cfg.db_path).await?;
    let purged = store
        .purge_expired(chrono::Utc::now().timestamp())
        .await
        .unwrap_or_else(|e| {
            tracing::warn!(error = ?e, "startup purge failed");
            0
        });
    if purged > 0 {
        tracing::info!(purged, "dropped expired sent-article records");
    }

    let providers: Vec<Box<dyn ArticleProvider>> = vec![
        Box::new(QiitaProvider::new(
            cfg.qiita_token.clone(),
            DEFAULT_LOOKBACK_DAYS,
        )),
        Box::new(ZennProvider::new()),
    ];
    let notifier = Arc::new(LineNotifier::new(cfg.line_token.clone()));

    let pipeline = Arc::new(Pipeline::new(
        providers,
        Arc::new(store),
        notifier,
        cfg.article_count,
    ));

    // Recorder must exist before the first run can tick.
    let metrics = Metrics::init(cfg.article_count);

    if let Some(secs) = cfg.run_interval_secs {
        tracing::info!(interval_secs = secs, "starting in-process scheduler");
        spawn_interval_runner(Arc::clone(&pipeline), secs);
    }

    let app = api::create_router(AppState { pipeline }).merge(metrics.router());

    let listener = tokio::net::TcpListener::bind(cfg.bind_addr)
        .await
        .with_context(|| format!("binding {}", cfg.bind_addr))?;
    tracing::info!(addr = %cfg.bind_addr, "listening");
    axum::serve(listener, app).await.context("serving http")?;

    Ok(())
}
