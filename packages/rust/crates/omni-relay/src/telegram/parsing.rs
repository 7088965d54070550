use serde_json::Value;

use crate::relay::InboundEvent;

/// Parse a Telegram update (`message` or `edited_message`) into an inbound event.
///
/// Returns `None` when the update carries no message or no integer chat id. A message without
/// `text` yields an event with empty text.
pub fn parse_update(update: &Value) -> Option<InboundEvent> {
    let message = update
        .get("message")
        .filter(|m| m.is_object())
        .or_else(|| update.get("edited_message").filter(|m| m.is_object()))?;
    let chat_id = message
        .get("chat")
        .and_then(|chat| chat.get("id"))
        .and_then(Value::as_i64)?;
    let text = message
        .get("text")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .trim()
        .to_string();
    Some(InboundEvent {
        update_id: update.get("update_id").and_then(Value::as_i64),
        chat_id,
        text,
    })
}
