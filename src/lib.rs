//! Image Descriptor - a Telegram bot that replies to photos with a description
//! generated by a vision model.
//!
//! Two entry points drive the same per-update pipeline:
//! 1. A long-polling process (`image-descriptor-poller`) that fetches updates
//!    with `getUpdates` and handles each one as its own task
//! 2. An AWS Lambda function (`image-descriptor-webhook`) that receives one
//!    webhook delivery per invocation and reads its secrets from SSM
//!
//! # Architecture
//!
//! The system uses:
//! - The Telegram Bot API over reqwest for updates, file lookup and replies
//! - The `OpenAI` chat-completions API for image descriptions
//! - AWS Lambda and SSM Parameter Store for the serverless deployment
//! - Tokio for async runtime
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use image_descriptor::core::config::AppConfig;
//! use image_descriptor::core::models::InboundUpdate;
//! use image_descriptor::pipeline::Pipeline;
//! use image_descriptor::telegram::TelegramClient;
//! use image_descriptor::vision::OpenAiVisionProvider;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     image_descriptor::setup_local_logging();
//!
//!     let config = AppConfig::from_env()?;
//!     let client = Arc::new(TelegramClient::new(
//!         config.credentials.telegram_bot_token.clone(),
//!         &config.settings.telegram_api_base,
//!     ));
//!     let provider = Arc::new(OpenAiVisionProvider::from_config(&config));
//!     let pipeline = Pipeline::new(client.clone(), provider, client, config.settings.locale);
//!
//!     let update = InboundUpdate {
//!         update_id: 1,
//!         sender_present: true,
//!         command_text: Some("/start".to_string()),
//!         chat_id: Some(123),
//!         ..InboundUpdate::default()
//!     };
//!     let outcome = pipeline.handle_update(&update).await;
//!     println!("{outcome:?}");
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod api;
pub mod core;
pub mod errors;
pub mod pipeline;
pub mod poller;
pub mod telegram;
pub mod vision;

pub use errors::BotError;

use tracing_subscriber::EnvFilter;

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Configure structured logging with JSON format for AWS Lambda environments.
///
/// This function sets up tracing-subscriber with a JSON formatter suitable for
/// `CloudWatch` Logs integration. The level comes from `RUST_LOG` (default
/// `info`). Calling it again is a no-op.
///
/// # Example
///
/// ```
/// // Initialize structured logging at the start of your Lambda handler
/// image_descriptor::setup_logging();
/// ```
pub fn setup_logging() {
    use tracing_subscriber::prelude::*;
    let fmt_layer = tracing_subscriber::fmt::layer().json().with_target(true);

    let _ = tracing_subscriber::registry()
        .with(env_filter())
        .with(fmt_layer)
        .try_init();
}

/// Human-readable logging for the long-polling process.
pub fn setup_local_logging() {
    use tracing_subscriber::prelude::*;
    let fmt_layer = tracing_subscriber::fmt::layer().with_target(false);

    let _ = tracing_subscriber::registry()
        .with(env_filter())
        .with(fmt_layer)
        .try_init();
}
