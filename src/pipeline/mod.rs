//! Per-update dispatch: classify, resolve, describe, format, send.
//!
//! The pipeline owns no transport. Everything it talks to is injected through
//! the traits below, which [`crate::telegram::TelegramClient`] implements for
//! production and tests replace with fakes.

pub mod classifier;
pub mod dispatch;

use async_trait::async_trait;

use crate::core::models::{FormattedResponse, MediaReference};
use crate::errors::BotError;

pub use classifier::{Classification, GREETING_COMMAND, IgnoreReason, classify};
pub use dispatch::{FailureStage, Outcome, Pipeline};

/// Turns a media identifier into a URL the description provider can fetch.
#[async_trait]
pub trait MediaResolver: Send + Sync {
    /// # Errors
    ///
    /// Returns an error for unknown identifiers, network failures or
    /// malformed platform responses.
    async fn resolve(&self, media_id: &str) -> Result<MediaReference, BotError>;
}

/// Delivers replies to a conversation.
#[async_trait]
pub trait ResponseSender: Send + Sync {
    /// # Errors
    ///
    /// Returns an error if the platform rejects or never receives the message.
    async fn send(&self, chat_id: i64, response: &FormattedResponse) -> Result<(), BotError>;

    /// Send a "typing" indicator. No-op by default.
    ///
    /// # Errors
    ///
    /// Returns an error if the platform call fails.
    async fn send_typing(&self, _chat_id: i64) -> Result<(), BotError> {
        Ok(())
    }
}
