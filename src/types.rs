use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

/// One update record delivered by the Bot API long-poll stream. The
/// transport populates exactly one of the two message slots per event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboundUpdate {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<ChatMessage>,
    #[serde(default)]
    pub channel_post: Option<ChatMessage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    #[serde(default)]
    pub text: Option<String>,
    pub chat: Chat,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chat {
    pub id: i64,
}

/// Uniform (text, origin chat) projection of an update; lives for one
/// dispatch iteration only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedEvent {
    pub text: String,
    pub chat_id: i64,
}

/// A fully validated `/emit` command. Never partially constructed:
/// `metric_name` and `field` are single `\w+` tokens and `timestamp` is a
/// resolved local instant.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedCommand {
    pub metric_name: String,
    pub field: String,
    pub timestamp: DateTime<Local>,
}

/// One point bound for the time-series store. Built immediately before
/// write and not retained after flush.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricPoint {
    pub measurement: String,
    pub tags: Vec<(String, String)>,
    pub fields: Vec<(String, i64)>,
    pub timestamp: DateTime<Utc>,
}
