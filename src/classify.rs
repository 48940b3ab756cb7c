use crate::types::{ClassifiedEvent, InboundUpdate};

/// Project an update onto a uniform (text, chat id) pair. Direct-message
/// text wins; the channel post is consulted only when the direct message
/// carries no text, and then supplies both text and chat id. Neither slot
/// carrying text yields an empty-text event, which the dispatch loop
/// skips.
pub fn classify_update(update: &InboundUpdate) -> ClassifiedEvent {
    let mut text = String::new();
    let mut chat_id = 0i64;

    if let Some(message) = &update.message {
        text = message.text.clone().unwrap_or_default();
        chat_id = message.chat.id;
    }
    if text.is_empty() {
        if let Some(post) = &update.channel_post {
            text = post.text.clone().unwrap_or_default();
            chat_id = post.chat.id;
        }
    }

    ClassifiedEvent { text, chat_id }
}
