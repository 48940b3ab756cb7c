//! Metric emitter - validated command to stored point, plus confirmation.

use chrono::Utc;
use tracing::{error, info, warn};

use crate::influx_sink::InfluxSink;
use crate::tg_tail::TelegramApi;
use crate::types::{MetricPoint, ParsedCommand};

pub const CONFIRMATION_REPLY: &str = "metric has been emitted!";

/// Tag key on every emitted point.
pub const CAMERA_TAG: &str = "camera";
/// Field written on every emitted point.
pub const ACTIVATE_FIELD: &str = "activate";

/// Build the point for a validated command. The point carries the
/// emission instant; the command's own timestamp is only logged.
pub fn build_point(command: &ParsedCommand) -> MetricPoint {
    MetricPoint {
        measurement: command.metric_name.clone(),
        tags: vec![(CAMERA_TAG.to_string(), command.field.clone())],
        fields: vec![(ACTIVATE_FIELD.to_string(), 1)],
        timestamp: Utc::now(),
    }
}

/// Write-and-flush one point, then confirm to the origin chat. The store
/// outcome is observed and logged, but the confirmation is unconditional
/// and the write is never retried.
pub async fn emit_metric(
    sink: &mut InfluxSink,
    api: &TelegramApi,
    chat_id: i64,
    command: ParsedCommand,
) {
    info!(
        metric_name = %command.metric_name,
        field = %command.field,
        time_stamp = %command.timestamp,
        chat_id,
        "emitting metric"
    );

    let point = build_point(&command);
    sink.write_point(&point);
    if let Err(err) = sink.flush().await {
        error!("store write failed: {err:?}");
    }

    if let Err(err) = api.send_message(chat_id, CONFIRMATION_REPLY).await {
        warn!("confirmation send failed: {err:?}");
    }
}
