//! Dispatch loop - classify, gate, parse, then emit or reject, one update
//! at a time.

use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::classify::classify_update;
use crate::command::{CommandParser, ParseOutcome};
use crate::emit::emit_metric;
use crate::influx_sink::InfluxSink;
use crate::tg_tail::TelegramApi;
use crate::timestamp::TimestampError;
use crate::types::{ClassifiedEvent, InboundUpdate, ParsedCommand};

pub const USAGE_REPLY: &str =
    "wrong command format, please use /emit <metric_name> <field> <metric_timestamp>";
pub const BAD_TIMESTAMP_REPLY: &str = "failed to parse time";

/// Decision for one classified event.
#[derive(Debug)]
pub enum RouteAction {
    /// Unaddressed chatter or an empty event. No reply, no emission.
    Ignore,
    Reject {
        chat_id: i64,
        reply: &'static str,
        cause: Option<TimestampError>,
    },
    Emit {
        chat_id: i64,
        command: ParsedCommand,
    },
}

/// Pure routing decision; the loop performs the replies and writes.
pub fn route_event(parser: &CommandParser, event: &ClassifiedEvent) -> RouteAction {
    if event.text.is_empty() {
        return RouteAction::Ignore;
    }
    if !parser.is_addressed(&event.text) {
        return RouteAction::Ignore;
    }
    match parser.parse(&event.text) {
        ParseOutcome::Parsed(command) => RouteAction::Emit {
            chat_id: event.chat_id,
            command,
        },
        ParseOutcome::MalformedSyntax => RouteAction::Reject {
            chat_id: event.chat_id,
            reply: USAGE_REPLY,
            cause: None,
        },
        ParseOutcome::InvalidTimestamp(err) => RouteAction::Reject {
            chat_id: event.chat_id,
            reply: BAD_TIMESTAMP_REPLY,
            cause: Some(err),
        },
    }
}

/// Drain the update stream strictly sequentially until the transport
/// closes it. Every rejected command gets exactly one reply; reply
/// failures are logged and never halt the loop.
pub async fn run_dispatch(
    mut rx: mpsc::Receiver<InboundUpdate>,
    parser: &CommandParser,
    api: &TelegramApi,
    sink: &mut InfluxSink,
) {
    while let Some(update) = rx.recv().await {
        debug!(update_id = update.update_id, "got update");
        let event = classify_update(&update);

        match route_event(parser, &event) {
            RouteAction::Ignore => {
                debug!(chat_id = event.chat_id, "ignoring unaddressed message");
            }
            RouteAction::Reject {
                chat_id,
                reply,
                cause,
            } => {
                match &cause {
                    Some(err) => error!("failed to parse time: {err}"),
                    None => info!(chat_id, "wrong command format"),
                }
                if let Err(err) = api.send_message(chat_id, reply).await {
                    warn!("reply send failed: {err:?}");
                }
            }
            RouteAction::Emit { chat_id, command } => {
                emit_metric(sink, api, chat_id, command).await;
            }
        }
    }
    info!("update stream closed, dispatch done");
}
