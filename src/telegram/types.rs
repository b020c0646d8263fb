//! Telegram Bot API wire types (only the fields this bot reads)

use serde::{Deserialize, Serialize};

use crate::core::models::{InboundUpdate, MediaVariant};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TelegramUpdate {
    pub update_id: i64,
    pub message: Option<TelegramMessage>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TelegramMessage {
    pub message_id: i64,
    pub from: Option<TelegramUser>,
    /// Always present on real messages; optional so a bare payload still
    /// classifies instead of failing to decode.
    pub chat: Option<TelegramChat>,
    pub text: Option<String>,
    pub caption: Option<String>,
    /// Photo sizes, smallest first.
    pub photo: Option<Vec<PhotoSize>>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TelegramUser {
    pub id: i64,
    #[serde(default)]
    pub is_bot: bool,
    pub first_name: Option<String>,
    pub username: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TelegramChat {
    pub id: i64,
    #[serde(rename = "type")]
    pub chat_type: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PhotoSize {
    pub file_id: String,
    pub file_unique_id: Option<String>,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
    pub file_size: Option<u64>,
}

/// Result of `getFile`.
#[derive(Debug, Clone, Deserialize)]
pub struct TelegramFile {
    pub file_id: String,
    pub file_path: Option<String>,
    pub file_size: Option<u64>,
}

/// Result of `getMe`.
#[derive(Debug, Clone, Deserialize)]
pub struct BotIdentity {
    pub id: i64,
    pub username: Option<String>,
}

/// Envelope every Bot API method responds with.
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    pub description: Option<String>,
    pub error_code: Option<i64>,
}

impl From<&TelegramUpdate> for InboundUpdate {
    fn from(update: &TelegramUpdate) -> Self {
        let Some(message) = &update.message else {
            return InboundUpdate {
                update_id: update.update_id,
                ..InboundUpdate::default()
            };
        };

        let media_variants = message
            .photo
            .as_deref()
            .unwrap_or_default()
            .iter()
            .map(|p| MediaVariant {
                media_id: p.file_id.clone(),
                width: p.width,
                height: p.height,
            })
            .collect();

        InboundUpdate {
            update_id: update.update_id,
            sender_present: message.from.is_some(),
            command_text: message.text.clone(),
            chat_id: message.chat.as_ref().map(|c| c.id),
            message_id: Some(message.message_id),
            media_variants,
        }
    }
}

impl From<TelegramUpdate> for InboundUpdate {
    fn from(update: TelegramUpdate) -> Self {
        InboundUpdate::from(&update)
    }
}
