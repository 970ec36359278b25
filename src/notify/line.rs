// src/notify/line.rs
use anyhow::{anyhow, Result};
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

use super::Notifier;

pub const LINE_BROADCAST_URL: &str = "https://api.line.me/v2/bot/message/broadcast";

/// LINE Messaging API notifier. Broadcasts one text message to every friend
/// of the channel; retries transient failures with exponential backoff.
#[derive(Clone)]
pub struct LineNotifier {
    endpoint: String,
    token: Option<String>,
    client: Client,
    timeout: Duration,
    max_retries: u8,
}

impl LineNotifier {
    pub fn new(token: Option<String>) -> Self {
        Self {
            endpoint: LINE_BROADCAST_URL.to_string(),
            token,
            client: Client::new(),
            timeout: Duration::from_secs(10),
            max_retries: 3,
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }

    pub fn with_retries(mut self, retries: u8) -> Self {
        self.max_retries = retries;
        self
    }
}

#[derive(Serialize)]
struct BroadcastPayload<'a> {
    messages: Vec<TextMessage<'a>>,
}

#[derive(Serialize)]
struct TextMessage<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    text: &'a str,
}

#[async_trait::async_trait]
impl Notifier for LineNotifier {
    async fn broadcast(&self, message: &str) -> Result<()> {
        let Some(token) = &self.token else {
            return Err(anyhow!("LINE_CHANNEL_ACCESS_TOKEN not set"));
        };

        let payload = BroadcastPayload {
            messages: vec![TextMessage {
                kind: "text",
                text: message,
            }],
        };

        let mut attempt: u8 = 0;
        loop {
            attempt += 1;
            let res = self
                .client
                .post(&self.endpoint)
                .bearer_auth(token)
                .timeout(self.timeout)
                .json(&payload)
                .send()
                .await;

            match res {
                Ok(rsp) => {
                    if let Err(e) = rsp.error_for_status_ref() {
                        let body = rsp.text().await.unwrap_or_default();
                        if attempt < self.max_retries {
                            tokio::time::sleep(Duration::from_millis(500u64 << (attempt - 1)))
                                .await;
                            continue;
                        }
                        return Err(anyhow!("LINE broadcast HTTP error: {e} ({body})"));
                    }
                    return Ok(());
                }
                Err(e) => {
                    if attempt < self.max_retries {
                        tokio::time::sleep(Duration::from_millis(500u64 << (attempt - 1))).await;
                        continue;
                    }
                    return Err(anyhow!("LINE broadcast request failed: {e}"));
                }
            }
        }
    }
}
