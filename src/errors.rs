use thiserror::Error;

use crate::vision::ProviderError;

#[derive(Debug, Error)]
pub enum BotError {
    #[error("Failed to parse Telegram update: {0}")]
    ParseError(String),

    #[error("Failed to access Telegram API: {0}")]
    TelegramError(String),

    #[error("Failed to describe image: {0}")]
    ProviderError(String),

    #[error("Failed to send HTTP request: {0}")]
    HttpError(String),

    #[error("Failed to interact with AWS services: {0}")]
    AwsError(String),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),
}

impl From<reqwest::Error> for BotError {
    fn from(error: reqwest::Error) -> Self {
        BotError::HttpError(error.to_string())
    }
}

impl From<serde_json::Error> for BotError {
    fn from(error: serde_json::Error) -> Self {
        BotError::ParseError(error.to_string())
    }
}

impl From<ProviderError> for BotError {
    fn from(error: ProviderError) -> Self {
        BotError::ProviderError(error.to_string())
    }
}
