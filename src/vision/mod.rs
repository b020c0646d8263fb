//! Image description capability
//!
//! The pipeline only knows [`DescriptionProvider`]: a fetchable image URL in,
//! descriptive text out. [`OpenAiVisionProvider`] is the production
//! implementation.

pub mod client;
pub mod prompt;

use async_trait::async_trait;
use thiserror::Error;

pub use client::OpenAiVisionProvider;
pub use prompt::PromptStyle;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("request to vision provider failed: {0}")]
    Http(String),

    #[error("vision provider returned HTTP {status}: {body}")]
    Api { status: u16, body: String },

    #[error("vision provider response could not be decoded: {0}")]
    InvalidResponse(String),

    #[error("vision provider returned no text")]
    EmptyResponse,
}

#[async_trait]
pub trait DescriptionProvider: Send + Sync {
    /// Describe the image at `image_url`.
    ///
    /// # Errors
    ///
    /// Returns a [`ProviderError`] for transport, API or decoding failures.
    async fn describe(&self, image_url: &str) -> Result<String, ProviderError>;
}
