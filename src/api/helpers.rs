//! Response builders for the function adapter.

use serde_json::{Value, json};

/// Returns a 200 OK response carrying a short status message.
#[must_use]
pub fn ok_response(message: &str) -> Value {
    json!({
        "statusCode": 200,
        "body": json!({ "ok": true, "message": message }).to_string()
    })
}

/// Returns an error response with the given status code and message.
#[must_use]
pub fn err_response(status_code: u16, message: &str) -> Value {
    json!({
        "statusCode": status_code,
        "body": json!({ "error": message }).to_string()
    })
}

/// Best-effort text of a caught panic payload.
#[must_use]
pub fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
