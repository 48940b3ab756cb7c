use std::{env, fs, path::PathBuf, time::Duration};

use anyhow::Result;
use directories::ProjectDirs;
use serde::Deserialize;

#[derive(Debug, Clone)]
pub struct Config {
    pub api_base: String,
    pub mention: String,
    pub bot_token: String,
    pub influx_url: String,
    pub influx_org: String,
    pub influx_bucket: String,
    pub influx_token: String,
    pub poll_timeout_secs: u64,
    pub http_timeout_secs: u64,
    pub backoff_base_ms: u64,
    pub backoff_max_ms: u64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawConfig {
    api_base: Option<String>,
    mention: Option<String>,
    influx_url: Option<String>,
    influx_org: Option<String>,
    influx_bucket: Option<String>,
    poll_timeout_secs: Option<u64>,
    http_timeout_secs: Option<u64>,
    backoff_base_ms: Option<u64>,
    backoff_max_ms: Option<u64>,
}

impl From<RawConfig> for Config {
    fn from(raw: RawConfig) -> Self {
        Self {
            api_base: raw
                .api_base
                .unwrap_or_else(|| "https://api.telegram.org".into()),
            mention: raw.mention.unwrap_or_else(|| "@metricemitter_bot".into()),
            bot_token: String::new(),
            influx_url: raw
                .influx_url
                .unwrap_or_else(|| "http://localhost:8086".into()),
            influx_org: raw.influx_org.unwrap_or_else(|| "private".into()),
            influx_bucket: raw.influx_bucket.unwrap_or_else(|| "default".into()),
            influx_token: String::new(),
            poll_timeout_secs: raw.poll_timeout_secs.unwrap_or(50),
            http_timeout_secs: raw.http_timeout_secs.unwrap_or(60),
            backoff_base_ms: raw.backoff_base_ms.unwrap_or(200),
            backoff_max_ms: raw.backoff_max_ms.unwrap_or(10_000),
        }
    }
}

impl Config {
    /// Load from an explicit TOML path, the default location, or built-in
    /// defaults, then apply env overrides. Credentials come from the
    /// environment only and are read exactly once here.
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        let mut cfg = if let Some(path) = path {
            let raw = fs::read_to_string(path)?;
            Config::from(toml::from_str::<RawConfig>(&raw)?)
        } else {
            let default_path = default_config_path();
            if default_path.exists() {
                let raw = fs::read_to_string(&default_path)?;
                Config::from(toml::from_str::<RawConfig>(&raw)?)
            } else {
                Config::from(RawConfig::default())
            }
        };

        maybe_env_string(&mut cfg.api_base, "TG_API_BASE");
        maybe_env_string(&mut cfg.mention, "BOT_MENTION");
        maybe_env_string(&mut cfg.influx_url, "INFLUX_URL");
        maybe_env_string(&mut cfg.influx_org, "INFLUX_ORG");
        maybe_env_string(&mut cfg.influx_bucket, "INFLUX_BUCKET");
        maybe_env_u64(&mut cfg.poll_timeout_secs, "POLL_TIMEOUT_SECS");
        maybe_env_u64(&mut cfg.http_timeout_secs, "HTTP_TIMEOUT_SECS");
        maybe_env_u64(&mut cfg.backoff_base_ms, "BACKOFF_BASE_MS");
        maybe_env_u64(&mut cfg.backoff_max_ms, "BACKOFF_MAX_MS");

        cfg.bot_token = env::var("ME_TGBOT_TOKEN").unwrap_or_default();
        cfg.influx_token = env::var("INFLUXDB_TOKEN").unwrap_or_default();

        validate_required(&cfg)?;
        Ok(cfg)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    pub fn poll_timeout(&self) -> Duration {
        Duration::from_secs(self.poll_timeout_secs)
    }

    pub fn backoff_base(&self) -> Duration {
        Duration::from_millis(self.backoff_base_ms)
    }

    pub fn backoff_max(&self) -> Duration {
        Duration::from_millis(self.backoff_max_ms)
    }
}

fn default_config_path() -> PathBuf {
    ProjectDirs::from("dev", "metricbridge", "metricbridge")
        .map(|p| p.config_dir().join("config.toml"))
        .unwrap_or_else(|| PathBuf::from(".metricbridge/config.toml"))
}

fn validate_required(cfg: &Config) -> Result<()> {
    if cfg.bot_token.trim().is_empty() {
        anyhow::bail!("ME_TGBOT_TOKEN is required (set via env or .env)");
    }
    if cfg.influx_token.trim().is_empty() {
        anyhow::bail!("INFLUXDB_TOKEN is required (set via env or .env)");
    }
    if cfg.api_base.trim().is_empty() {
        anyhow::bail!("api_base must not be empty");
    }
    if cfg.influx_url.trim().is_empty() {
        anyhow::bail!("influx_url must not be empty");
    }
    // The HTTP client timeout bounds the long poll; equal or shorter would
    // cancel every poll before the server answers.
    if cfg.http_timeout_secs <= cfg.poll_timeout_secs {
        anyhow::bail!(
            "http_timeout_secs ({}) must exceed poll_timeout_secs ({})",
            cfg.http_timeout_secs,
            cfg.poll_timeout_secs
        );
    }
    Ok(())
}

fn maybe_env_string(val: &mut String, key: &str) {
    if let Ok(v) = env::var(key) {
        if !v.trim().is_empty() {
            *val = v;
        }
    }
}

fn maybe_env_u64(val: &mut u64, key: &str) {
    if let Ok(v) = env::var(key) {
        if let Ok(n) = v.parse::<u64>() {
            *val = n;
        }
    }
}
