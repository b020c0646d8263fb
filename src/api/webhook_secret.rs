use serde_json::Value;
use tracing::error;

use super::parsing::get_header_value;

/// Header Telegram sets on webhook calls when `setWebhook` was given a secret.
pub const SECRET_TOKEN_HEADER: &str = "X-Telegram-Bot-Api-Secret-Token";

/// Checks the webhook secret header against the configured secret.
pub fn verify_secret_token(headers: Option<&Value>, expected: &str) -> bool {
    let Some(received) = headers.and_then(|h| get_header_value(h, SECRET_TOKEN_HEADER)) else {
        error!("Missing {} header", SECRET_TOKEN_HEADER);
        return false;
    };

    if constant_time_eq(received.as_bytes(), expected.as_bytes()) {
        true
    } else {
        error!("Webhook secret token mismatch");
        false
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
