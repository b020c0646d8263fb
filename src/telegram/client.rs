//! Telegram Bot API client module
//!
//! Plain HTTPS calls to `https://api.telegram.org/bot<token>/<method>`. Used by
//! both entry points: the poller for `getUpdates`, both for `getFile`,
//! `sendMessage` and `sendChatAction`.

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::{debug, error, info};

use super::response_builder::{create_chat_action_payload, create_send_message_payload};
use super::types::{ApiResponse, BotIdentity, TelegramFile, TelegramUpdate};
use crate::core::models::{FormattedResponse, MediaReference};
use crate::errors::BotError;
use crate::pipeline::{MediaResolver, ResponseSender};
use crate::poller::UpdateSource;

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Headroom between the long-poll timeout and the HTTP timeout, so the client
/// never aborts a `getUpdates` call Telegram is still holding open.
const POLL_TIMEOUT_HEADROOM_SECS: u64 = 15;

/// Telegram Bot API client
#[derive(Clone)]
pub struct TelegramClient {
    http: Client,
    token: String,
    api_base: String,
}

impl TelegramClient {
    #[must_use]
    pub fn new(token: String, api_base: &str) -> Self {
        let http = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self::with_http_client(token, api_base, http)
    }

    #[must_use]
    pub fn with_http_client(token: String, api_base: &str, http: Client) -> Self {
        Self {
            http,
            token,
            api_base: api_base.trim_end_matches('/').to_string(),
        }
    }

    /// Client whose request timeout outlasts a `getUpdates` long poll.
    #[must_use]
    pub fn for_polling(token: String, api_base: &str, poll_timeout_secs: u64) -> Self {
        let http = Client::builder()
            .timeout(Duration::from_secs(
                poll_timeout_secs.saturating_add(POLL_TIMEOUT_HEADROOM_SECS),
            ))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self::with_http_client(token, api_base, http)
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_base, self.token, method)
    }

    /// Download URL for a `file_path` returned by `getFile`.
    #[must_use]
    pub fn file_url(&self, file_path: &str) -> String {
        format!(
            "{}/file/bot{}/{}",
            self.api_base,
            self.token,
            file_path.trim_start_matches('/')
        )
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, payload: &Value) -> Result<T, BotError> {
        // reqwest errors carry the URL, which carries the token.
        let resp = self
            .http
            .post(self.method_url(method))
            .json(payload)
            .send()
            .await
            .map_err(|e| BotError::HttpError(format!("{method}: {}", e.without_url())))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| BotError::HttpError(format!("{method}: {}", e.without_url())))?;

        let parsed: ApiResponse<T> = match serde_json::from_str(&body) {
            Ok(parsed) => parsed,
            Err(e) if status.is_success() => {
                return Err(BotError::ParseError(format!(
                    "{method}: unexpected response body: {e}"
                )));
            }
            Err(_) => {
                error!(method, status = %status, "Telegram API call failed: {}", body);
                return Err(BotError::TelegramError(format!(
                    "{method} returned HTTP {status}"
                )));
            }
        };

        if !parsed.ok {
            let description = parsed
                .description
                .unwrap_or_else(|| "no description".to_string());
            return Err(BotError::TelegramError(format!(
                "{method} failed ({}): {description}",
                parsed.error_code.unwrap_or_else(|| i64::from(status.as_u16()))
            )));
        }

        parsed
            .result
            .ok_or_else(|| BotError::ParseError(format!("{method}: response has no result")))
    }

    /// # Errors
    ///
    /// Returns an error if the token is invalid or the API is unreachable.
    pub async fn get_me(&self) -> Result<BotIdentity, BotError> {
        self.call("getMe", &json!({})).await
    }

    /// Removes any webhook so `getUpdates` works, optionally dropping the backlog.
    ///
    /// # Errors
    ///
    /// Returns an error if the Bot API call fails.
    pub async fn delete_webhook(&self, drop_pending_updates: bool) -> Result<bool, BotError> {
        self.call(
            "deleteWebhook",
            &json!({ "drop_pending_updates": drop_pending_updates }),
        )
        .await
    }

    /// # Errors
    ///
    /// Returns an error if the Bot API call fails or the updates cannot be decoded.
    pub async fn get_updates(
        &self,
        offset: Option<i64>,
        timeout_secs: u64,
    ) -> Result<Vec<TelegramUpdate>, BotError> {
        let mut payload = json!({
            "timeout": timeout_secs,
            "allowed_updates": ["message"],
        });
        if let Some(offset) = offset {
            payload["offset"] = json!(offset);
        }

        self.call("getUpdates", &payload).await
    }

    /// # Errors
    ///
    /// Returns an error if the file is unknown or the Bot API call fails.
    pub async fn get_file(&self, file_id: &str) -> Result<TelegramFile, BotError> {
        self.call("getFile", &json!({ "file_id": file_id })).await
    }

    /// # Errors
    ///
    /// Returns an error if the Bot API rejects the message.
    pub async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        reply_to: Option<i64>,
    ) -> Result<(), BotError> {
        let payload = create_send_message_payload(chat_id, text, reply_to);
        let _: Value = self.call("sendMessage", &payload).await?;
        debug!(chat_id, reply_to = ?reply_to, "sendMessage delivered");
        Ok(())
    }

    /// # Errors
    ///
    /// Returns an error if the Bot API call fails.
    pub async fn send_chat_action(&self, chat_id: i64, action: &str) -> Result<(), BotError> {
        let payload = create_chat_action_payload(chat_id, action);
        let _: bool = self.call("sendChatAction", &payload).await?;
        Ok(())
    }
}

#[async_trait]
impl MediaResolver for TelegramClient {
    async fn resolve(&self, media_id: &str) -> Result<MediaReference, BotError> {
        let file = self.get_file(media_id).await?;
        let file_path = file.file_path.ok_or_else(|| {
            BotError::TelegramError(format!("getFile returned no file_path for {media_id}"))
        })?;

        info!(file_path = %file_path, file_size = ?file.file_size, "Resolved Telegram file");

        Ok(MediaReference {
            media_id: file.file_id,
            url: self.file_url(&file_path),
        })
    }
}

#[async_trait]
impl ResponseSender for TelegramClient {
    async fn send(&self, chat_id: i64, response: &FormattedResponse) -> Result<(), BotError> {
        self.send_message(chat_id, &response.text, response.reply_to)
            .await
    }

    async fn send_typing(&self, chat_id: i64) -> Result<(), BotError> {
        self.send_chat_action(chat_id, "typing").await
    }
}

#[async_trait]
impl UpdateSource for TelegramClient {
    async fn fetch_updates(
        &self,
        offset: Option<i64>,
        timeout_secs: u64,
    ) -> Result<Vec<TelegramUpdate>, BotError> {
        self.get_updates(offset, timeout_secs).await
    }
}
