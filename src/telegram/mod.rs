//! All Telegram-specific functionality

pub mod client;
pub mod message_formatter;
pub mod response_builder;
pub mod types;

// Re-export main types for convenience
pub use client::TelegramClient;
pub use message_formatter::{Locale, ReplyTexts};
pub use types::{TelegramMessage, TelegramUpdate};
