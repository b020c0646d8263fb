//! JSON payloads for the Bot API send methods.

use serde_json::{Value, json};

/// Create the JSON payload for `sendMessage`.
///
/// When `reply_to` is set the message is threaded as a reply to it. The
/// reply is still delivered if the original message was deleted meanwhile.
///
/// # Examples
///
/// ```
/// use image_descriptor::telegram::response_builder::create_send_message_payload;
///
/// let payload = create_send_message_payload(1, "hi", Some(42));
/// assert_eq!(payload["reply_parameters"]["message_id"], 42);
/// ```
#[must_use]
pub fn create_send_message_payload(chat_id: i64, text: &str, reply_to: Option<i64>) -> Value {
    let mut payload = json!({
        "chat_id": chat_id,
        "text": text,
    });

    if let Some(message_id) = reply_to {
        payload["reply_parameters"] = json!({
            "message_id": message_id,
            "allow_sending_without_reply": true,
        });
    }

    payload
}

/// Create the JSON payload for `sendChatAction`.
#[must_use]
pub fn create_chat_action_payload(chat_id: i64, action: &str) -> Value {
    json!({
        "chat_id": chat_id,
        "action": action,
    })
}
