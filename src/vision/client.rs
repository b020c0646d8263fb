//! `OpenAI` chat-completions implementation of [`DescriptionProvider`].

use async_trait::async_trait;
use openai_api_rs::v1::chat_completion::{
    ChatCompletionMessage, Content, ContentType, ImageUrl, ImageUrlType, MessageRole,
};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::info;

use super::{DescriptionProvider, ProviderError};
use crate::core::config::AppConfig;

/// Vision calls on large images regularly take tens of seconds.
const REQUEST_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Describes images through the `OpenAI` chat-completions endpoint.
pub struct OpenAiVisionProvider {
    http: Client,
    api_key: String,
    org_id: Option<String>,
    model_name: String,
    max_tokens: u32,
    instructions: String,
    api_base: String,
}

impl OpenAiVisionProvider {
    #[must_use]
    pub fn new(
        api_key: String,
        org_id: Option<String>,
        model_name: String,
        max_tokens: u32,
        instructions: String,
    ) -> Self {
        let http = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            http,
            api_key,
            org_id,
            model_name,
            max_tokens,
            instructions,
            api_base: crate::core::config::DEFAULT_OPENAI_API_BASE.to_string(),
        }
    }

    #[must_use]
    pub fn with_api_base(mut self, api_base: &str) -> Self {
        self.api_base = api_base.trim_end_matches('/').to_string();
        self
    }

    /// Provider configured from model, prompt style, locale and output bound.
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        let settings = &config.settings;
        Self::new(
            config.credentials.openai_api_key.clone(),
            settings.openai_org_id.clone(),
            settings.model().to_string(),
            settings.max_tokens(),
            settings
                .prompt_style
                .instructions(settings.locale)
                .to_string(),
        )
        .with_api_base(&settings.openai_api_base)
    }

    #[must_use]
    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    #[must_use]
    pub fn max_tokens(&self) -> u32 {
        self.max_tokens
    }

    /// A single user turn: the instruction text followed by the image.
    #[must_use]
    pub fn build_prompt(&self, image_url: &str) -> Vec<ChatCompletionMessage> {
        vec![ChatCompletionMessage {
            role: MessageRole::user,
            content: Content::ImageUrl(vec![
                ImageUrl {
                    r#type: ContentType::text,
                    text: Some(self.instructions.clone()),
                    image_url: None,
                },
                ImageUrl {
                    r#type: ContentType::image_url,
                    text: None,
                    image_url: Some(ImageUrlType {
                        url: image_url.to_string(),
                    }),
                },
            ]),
            name: None,
            tool_calls: None,
            tool_call_id: None,
        }]
    }

    /// Chat-completions request body for `prompt`.
    #[must_use]
    pub fn build_request_body(&self, prompt: &[ChatCompletionMessage]) -> Value {
        let messages: Vec<Value> = prompt
            .iter()
            .map(|msg| {
                let role_str = match msg.role {
                    MessageRole::system => "system",
                    MessageRole::user => "user",
                    MessageRole::assistant => "assistant",
                    MessageRole::function => "function",
                    MessageRole::tool => "tool",
                };

                let content_val = match &msg.content {
                    Content::Text(text) => json!(text),
                    Content::ImageUrl(parts) => {
                        let part_objects: Vec<Value> = parts
                            .iter()
                            .map(|part| {
                                if let Some(ref img_url) = part.image_url {
                                    json!({
                                        "type": "image_url",
                                        "image_url": { "url": img_url.url }
                                    })
                                } else {
                                    json!({
                                        "type": "text",
                                        "text": part.text.as_deref().unwrap_or_default()
                                    })
                                }
                            })
                            .collect();
                        json!(part_objects)
                    }
                };

                json!({
                    "role": role_str,
                    "content": content_val
                })
            })
            .collect();

        json!({
            "model": self.model_name,
            "messages": messages,
            "max_tokens": self.max_tokens
        })
    }
}

#[async_trait]
impl DescriptionProvider for OpenAiVisionProvider {
    async fn describe(&self, image_url: &str) -> Result<String, ProviderError> {
        let prompt = self.build_prompt(image_url);

        #[cfg(feature = "debug-logs")]
        tracing::debug!("Using vision prompt:\n{:?}", self.instructions);

        info!(
            model = %self.model_name,
            max_tokens = self.max_tokens,
            "Requesting image description"
        );

        let mut request = self
            .http
            .post(format!("{}/v1/chat/completions", self.api_base))
            .bearer_auth(&self.api_key)
            .json(&self.build_request_body(&prompt));

        if let Some(org) = &self.org_id {
            request = request.header("OpenAI-Organization", org);
        }

        // The image URL embeds the Telegram bot token; keep it out of errors.
        let response = request
            .send()
            .await
            .map_err(|e| ProviderError::Http(e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ProviderError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.without_url().to_string()))?;

        let text = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(ProviderError::EmptyResponse)?;

        info!(chars = text.chars().count(), "Received image description");
        Ok(text)
    }
}
