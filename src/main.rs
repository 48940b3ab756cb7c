use std::path::PathBuf;

use anyhow::Result;
use dotenvy::dotenv;
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use metricbridge::command::CommandParser;
use metricbridge::config::Config;
use metricbridge::dispatch::run_dispatch;
use metricbridge::influx_sink::{InfluxConfig, InfluxSink};
use metricbridge::shutdown;
use metricbridge::tg_tail::{TailConfig, TelegramApi, TelegramTailer};

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenv();
    init_tracing();

    let cfg_path = std::env::args().nth(1).map(PathBuf::from);
    let cfg = Config::load(cfg_path)?;
    info!(
        api_base = %cfg.api_base,
        mention = %cfg.mention,
        influx_url = %cfg.influx_url,
        influx_org = %cfg.influx_org,
        influx_bucket = %cfg.influx_bucket,
        "starting metricbridge"
    );

    let api = TelegramApi::new(&cfg.api_base, &cfg.bot_token, cfg.http_timeout())?;
    let mut sink = InfluxSink::new(InfluxConfig {
        url: cfg.influx_url.clone(),
        org: cfg.influx_org.clone(),
        bucket: cfg.influx_bucket.clone(),
        token: cfg.influx_token.clone(),
        timeout: cfg.http_timeout(),
    })?;
    let parser = CommandParser::new(&cfg.mention)?;

    let shutdown_rx = shutdown::install();

    let (tx, rx) = mpsc::channel(64);
    let mut tailer = TelegramTailer::new(
        TailConfig {
            poll_timeout: cfg.poll_timeout(),
            backoff_base: cfg.backoff_base(),
            backoff_max: cfg.backoff_max(),
        },
        api.clone(),
    );
    let tail_handle = tokio::spawn(async move {
        if let Err(err) = tailer.run(tx, shutdown_rx).await {
            tracing::error!("transport failed: {err:?}");
        }
    });

    run_dispatch(rx, &parser, &api, &mut sink).await;

    let _ = tail_handle.await;
    info!("metricbridge stopped");
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
