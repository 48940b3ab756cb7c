//! Long-polling transport for the control channel.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tokio::sync::{mpsc, watch};
use tokio::time::sleep;
use tracing::{info, warn};

use crate::types::InboundUpdate;

#[derive(Clone, Debug)]
pub struct TailConfig {
    pub poll_timeout: Duration,
    pub backoff_base: Duration,
    pub backoff_max: Duration,
}

/// Thin Bot API client. The tailer uses it for getUpdates; the dispatch
/// loop holds its own clone for replies.
#[derive(Clone)]
pub struct TelegramApi {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct ApiEnvelope<T> {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    result: Option<T>,
}

impl TelegramApi {
    pub fn new(api_base: &str, token: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: format!("{}/bot{}", api_base.trim_end_matches('/'), token),
        })
    }

    fn url(&self, method: &str) -> String {
        format!("{}/{}", self.base_url, method)
    }

    /// One long poll. Blocks server-side up to `timeout`; an empty batch
    /// on expiry is a normal outcome.
    pub async fn get_updates(
        &self,
        offset: i64,
        timeout: Duration,
    ) -> Result<Vec<InboundUpdate>> {
        let resp = self
            .client
            .get(self.url("getUpdates"))
            .query(&[
                ("offset", offset.to_string()),
                ("timeout", timeout.as_secs().to_string()),
            ])
            .send()
            .await
            .context("getUpdates")?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!(
                "getUpdates status={} body_sample={}",
                status,
                truncate_body_snippet(&body, 200)
            );
        }

        let body = resp.text().await.context("getUpdates body")?;
        parse_updates_response(&body)
    }

    /// Reply to a chat. Failures are the caller's to log; they are never
    /// retried.
    pub async fn send_message(&self, chat_id: i64, text: &str) -> Result<()> {
        let resp = self
            .client
            .post(self.url("sendMessage"))
            .json(&json!({ "chat_id": chat_id, "text": text }))
            .send()
            .await
            .context("sendMessage")?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!(
                "sendMessage status={} body_sample={}",
                status,
                truncate_body_snippet(&body, 200)
            );
        }
        Ok(())
    }
}

/// Decode a getUpdates response body. A well-formed envelope with
/// `ok: false` is an API-level rejection, not a transport error.
pub fn parse_updates_response(body: &str) -> Result<Vec<InboundUpdate>> {
    let envelope: ApiEnvelope<Vec<InboundUpdate>> =
        serde_json::from_str(body).context("getUpdates body")?;
    if !envelope.ok {
        anyhow::bail!(
            "getUpdates rejected: {}",
            envelope.description.unwrap_or_default()
        );
    }
    Ok(envelope.result.unwrap_or_default())
}

/// Offset acknowledging every update in the batch; the next poll starts
/// past the highest delivered id.
pub fn next_offset(current: i64, updates: &[InboundUpdate]) -> i64 {
    updates
        .iter()
        .map(|u| u.update_id + 1)
        .fold(current, i64::max)
}

pub struct TelegramTailer {
    cfg: TailConfig,
    api: TelegramApi,
    offset: i64,
}

impl TelegramTailer {
    pub fn new(cfg: TailConfig, api: TelegramApi) -> Self {
        Self {
            cfg,
            api,
            offset: 0,
        }
    }

    /// Drive the long-poll loop until the shutdown flag flips. Poll
    /// errors back off exponentially and reset on the next success.
    /// Dropping the sender on exit is what closes the update stream for
    /// the dispatch loop.
    pub async fn run(
        &mut self,
        tx: mpsc::Sender<InboundUpdate>,
        mut shutdown: watch::Receiver<bool>,
    ) -> Result<()> {
        let mut backoff = self.cfg.backoff_base;
        loop {
            if *shutdown.borrow() {
                info!("transport stopping");
                return Ok(());
            }
            tokio::select! {
                _ = shutdown.changed() => {
                    info!("transport stopping");
                    return Ok(());
                }
                polled = self.poll_once(&tx) => match polled {
                    Ok(()) => {
                        backoff = self.cfg.backoff_base;
                    }
                    Err(err) => {
                        warn!("poll error: {err:?}");
                        sleep(backoff).await;
                        backoff = (backoff * 2).min(self.cfg.backoff_max);
                    }
                }
            }
        }
    }

    async fn poll_once(&mut self, tx: &mpsc::Sender<InboundUpdate>) -> Result<()> {
        let updates = self.api.get_updates(self.offset, self.cfg.poll_timeout).await?;
        self.offset = next_offset(self.offset, &updates);
        for update in updates {
            if tx.send(update).await.is_err() {
                anyhow::bail!("update stream consumer gone");
            }
        }
        Ok(())
    }
}

fn truncate_body_snippet(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        return s.to_string();
    }
    format!("{}…", &s[..max_len])
}
