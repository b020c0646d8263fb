use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde_json::Value;

use crate::errors::BotError;
use crate::telegram::types::TelegramUpdate;

/// Header lookup that tolerates the lower-cased names API Gateway delivers.
pub fn get_header_value<'a>(headers: &'a Value, name: &str) -> Option<&'a str> {
    if let Some(v) = headers.get(name).and_then(|s| s.as_str()) {
        return Some(v);
    }
    headers.as_object().and_then(|map| {
        map.iter().find_map(|(k, v)| {
            if k.eq_ignore_ascii_case(name) {
                v.as_str()
            } else {
                None
            }
        })
    })
}

/// Pulls the Telegram update out of an invocation event.
///
/// Accepts a proxy event whose `body` is a JSON string (base64 encoded when
/// `isBase64Encoded` is true), a `body` that is already an object, or the
/// bare update as the event itself.
///
/// # Errors
///
/// Returns `ParseError` if no update can be decoded.
pub fn extract_update(payload: &Value) -> Result<TelegramUpdate, BotError> {
    match payload.get("body") {
        Some(Value::String(body)) => {
            let is_base64 = payload
                .get("isBase64Encoded")
                .and_then(Value::as_bool)
                .unwrap_or(false);

            let decoded = if is_base64 {
                let bytes = STANDARD
                    .decode(body.trim())
                    .map_err(|e| BotError::ParseError(format!("Invalid base64 body: {e}")))?;
                String::from_utf8(bytes)
                    .map_err(|e| BotError::ParseError(format!("Body is not UTF-8: {e}")))?
            } else {
                body.clone()
            };

            serde_json::from_str(&decoded)
                .map_err(|e| BotError::ParseError(format!("Invalid update JSON: {e}")))
        }
        Some(body @ Value::Object(_)) => serde_json::from_value(body.clone())
            .map_err(|e| BotError::ParseError(format!("Invalid update object: {e}"))),
        Some(Value::Null) | None => serde_json::from_value(payload.clone())
            .map_err(|e| BotError::ParseError(format!("Event is not an update: {e}"))),
        Some(other) => Err(BotError::ParseError(format!(
            "Unsupported body type: {other}"
        ))),
    }
}
