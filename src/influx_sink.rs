//! Buffered line-protocol sink for the time-series store.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use tracing::debug;

use crate::types::MetricPoint;

#[derive(Clone, Debug)]
pub struct InfluxConfig {
    pub url: String,
    pub org: String,
    pub bucket: String,
    pub token: String,
    pub timeout: Duration,
}

pub struct InfluxSink {
    cfg: InfluxConfig,
    client: Client,
    buffer: Vec<String>,
}

impl InfluxSink {
    pub fn new(cfg: InfluxConfig) -> Result<Self> {
        let client = Client::builder().timeout(cfg.timeout).build()?;
        Ok(Self {
            cfg,
            client,
            buffer: Vec::new(),
        })
    }

    /// Encode and buffer one point. No I/O happens until `flush`.
    pub fn write_point(&mut self, point: &MetricPoint) {
        self.buffer.push(line_protocol(point));
    }

    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    /// Make buffered writes durable. One attempt, no retry; the buffer is
    /// cleared whether the write lands or not.
    pub async fn flush(&mut self) -> Result<()> {
        if self.buffer.is_empty() {
            return Ok(());
        }
        let body = self.buffer.join("\n");
        self.buffer.clear();

        let url = format!("{}/api/v2/write", self.cfg.url.trim_end_matches('/'));
        let resp = self
            .client
            .post(url)
            .query(&[
                ("org", self.cfg.org.as_str()),
                ("bucket", self.cfg.bucket.as_str()),
                ("precision", "ns"),
            ])
            .header("Authorization", format!("Token {}", self.cfg.token))
            .header("Content-Type", "text/plain; charset=utf-8")
            .body(body)
            .send()
            .await
            .context("influx write")?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            anyhow::bail!(
                "influx write status={} body_sample={}",
                status,
                truncate_body_snippet(&text, 200)
            );
        }
        debug!("influx write ok");
        Ok(())
    }
}

/// Render a point as one line of InfluxDB line protocol with a nanosecond
/// timestamp.
pub fn line_protocol(point: &MetricPoint) -> String {
    let mut line = escape_measurement(&point.measurement);
    for (key, value) in &point.tags {
        line.push(',');
        line.push_str(&escape_tag(key));
        line.push('=');
        line.push_str(&escape_tag(value));
    }
    line.push(' ');
    for (i, (key, value)) in point.fields.iter().enumerate() {
        if i > 0 {
            line.push(',');
        }
        line.push_str(&escape_tag(key));
        line.push('=');
        line.push_str(&format!("{value}i"));
    }
    line.push(' ');
    line.push_str(
        &point
            .timestamp
            .timestamp_nanos_opt()
            .unwrap_or_default()
            .to_string(),
    );
    line
}

fn escape_measurement(s: &str) -> String {
    escape_component(s, &[',', ' '])
}

fn escape_tag(s: &str) -> String {
    escape_component(s, &[',', '=', ' '])
}

fn escape_component(s: &str, specials: &[char]) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        if specials.contains(&ch) {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

fn truncate_body_snippet(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        return s.to_string();
    }
    format!("{}…", &s[..max_len])
}
