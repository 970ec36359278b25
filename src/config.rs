// src/config.rs
use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};

const DEFAULT_ARTICLE_COUNT: usize = 3;
const DEFAULT_DB_PATH: &str = "data/sent_articles.db";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";

/// Environment-driven configuration. One knob that matters (the digest size
/// `ARTICLE_COUNT`), bearer tokens for the two external APIs, and wiring.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Target digest size N. Default 3.
    pub article_count: usize,
    pub qiita_token: Option<String>,
    pub line_token: Option<String>,
    pub db_path: PathBuf,
    pub bind_addr: SocketAddr,
    /// When set, an in-process ticker invokes the pipeline on this interval
    /// in addition to the HTTP trigger.
    pub run_interval_secs: Option<u64>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let article_count = match std::env::var("ARTICLE_COUNT") {
            Ok(v) => v
                .trim()
                .parse::<usize>()
                .with_context(|| format!("ARTICLE_COUNT is not a number: {v:?}"))?,
            Err(_) => DEFAULT_ARTICLE_COUNT,
        };

        let bind_addr = std::env::var("BIND_ADDR")
            .unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .context("BIND_ADDR is not a socket address")?;

        let run_interval_secs = match std::env::var("RUN_INTERVAL_SECS") {
            Ok(v) => Some(
                v.trim()
                    .parse::<u64>()
                    .with_context(|| format!("RUN_INTERVAL_SECS is not a number: {v:?}"))?,
            ),
            Err(_) => None,
        };

        Ok(Self {
            article_count,
            qiita_token: std::env::var("QIITA_ACCESS_TOKEN").ok(),
            line_token: std::env::var("LINE_CHANNEL_ACCESS_TOKEN").ok(),
            db_path: std::env::var("SENT_DB_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_DB_PATH)),
            bind_addr,
            run_interval_secs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    fn clear_env() {
        for k in [
            "ARTICLE_COUNT",
            "QIITA_ACCESS_TOKEN",
            "LINE_CHANNEL_ACCESS_TOKEN",
            "SENT_DB_PATH",
            "BIND_ADDR",
            "RUN_INTERVAL_SECS",
        ] {
            env::remove_var(k);
        }
    }

    #[serial_test::serial]
    #[test]
    fn defaults_apply_without_env() {
        clear_env();
        let cfg = AppConfig::from_env().unwrap();
        assert_eq!(cfg.article_count, 3);
        assert!(cfg.qiita_token.is_none());
        assert!(cfg.line_token.is_none());
        assert_eq!(cfg.db_path, PathBuf::from(DEFAULT_DB_PATH));
        assert!(cfg.run_interval_secs.is_none());
    }

    #[serial_test::serial]
    #[test]
    fn env_overrides_win() {
        clear_env();
        env::set_var("ARTICLE_COUNT", "5");
        env::set_var("QIITA_ACCESS_TOKEN", "qtok");
        env::set_var("RUN_INTERVAL_SECS", "3600");
        let cfg = AppConfig::from_env().unwrap();
        assert_eq!(cfg.article_count, 5);
        assert_eq!(cfg.qiita_token.as_deref(), Some("qtok"));
        assert_eq!(cfg.run_interval_secs, Some(3600));
        clear_env();
    }

    #[serial_test::serial]
    #[test]
    fn garbage_count_is_an_error() {
        clear_env();
        env::set_var("ARTICLE_COUNT", "three");
        assert!(AppConfig::from_env().is_err());
        clear_env();
    }
}
