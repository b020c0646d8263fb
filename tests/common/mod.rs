//! In-memory collaborators shared by the integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::Barrier;

use image_descriptor::BotError;
use image_descriptor::core::models::{FormattedResponse, InboundUpdate, MediaReference, MediaVariant};
use image_descriptor::core::secrets::SecretStore;
use image_descriptor::pipeline::{MediaResolver, ResponseSender};
use image_descriptor::vision::{DescriptionProvider, ProviderError};

pub fn photo_update(chat_id: i64, message_id: i64, media_ids: &[&str]) -> InboundUpdate {
    InboundUpdate {
        update_id: message_id,
        sender_present: true,
        chat_id: Some(chat_id),
        message_id: Some(message_id),
        media_variants: media_ids
            .iter()
            .enumerate()
            .map(|(i, id)| MediaVariant {
                media_id: (*id).to_string(),
                width: 90 * (i as u32 + 1),
                height: 60 * (i as u32 + 1),
            })
            .collect(),
        ..InboundUpdate::default()
    }
}

pub fn start_update(chat_id: i64) -> InboundUpdate {
    InboundUpdate {
        update_id: 1,
        sender_present: true,
        command_text: Some("/start".to_string()),
        chat_id: Some(chat_id),
        message_id: Some(7),
        ..InboundUpdate::default()
    }
}

// ============================================================================
// Resolver
// ============================================================================

pub enum ResolveMode {
    Url,
    Fail,
    Panic,
}

pub struct FakeResolver {
    mode: ResolveMode,
    pub calls: Mutex<Vec<String>>,
}

impl FakeResolver {
    pub fn new(mode: ResolveMode) -> Self {
        Self {
            mode,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl MediaResolver for FakeResolver {
    async fn resolve(&self, media_id: &str) -> Result<MediaReference, BotError> {
        self.calls.lock().unwrap().push(media_id.to_string());
        match self.mode {
            ResolveMode::Url => Ok(MediaReference {
                media_id: media_id.to_string(),
                url: format!("https://files.example/{media_id}.jpg"),
            }),
            ResolveMode::Fail => Err(BotError::TelegramError(
                "getFile failed (400): Bad Request: invalid file_id".to_string(),
            )),
            ResolveMode::Panic => panic!("resolver exploded"),
        }
    }
}

// ============================================================================
// Provider
// ============================================================================

pub enum DescribeMode {
    Text(String),
    Fail,
    Panic,
    /// Answers only once `n` describe calls are waiting at the same time.
    Rendezvous(Barrier, String),
}

pub struct FakeProvider {
    mode: DescribeMode,
    delay: Duration,
    pub calls: Mutex<Vec<String>>,
}

impl FakeProvider {
    pub fn new(mode: DescribeMode) -> Self {
        Self {
            mode,
            delay: Duration::ZERO,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn text(text: &str) -> Self {
        Self::new(DescribeMode::Text(text.to_string()))
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl DescriptionProvider for FakeProvider {
    async fn describe(&self, image_url: &str) -> Result<String, ProviderError> {
        self.calls.lock().unwrap().push(image_url.to_string());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        match &self.mode {
            DescribeMode::Text(text) => Ok(text.clone()),
            DescribeMode::Fail => Err(ProviderError::Api {
                status: 503,
                body: "overloaded".to_string(),
            }),
            DescribeMode::Panic => panic!("provider exploded"),
            DescribeMode::Rendezvous(barrier, text) => {
                barrier.wait().await;
                Ok(text.clone())
            }
        }
    }
}

// ============================================================================
// Sender
// ============================================================================

#[derive(Default)]
pub struct RecordingSender {
    fail: bool,
    pub sent: Mutex<Vec<(i64, FormattedResponse)>>,
    pub typing: AtomicUsize,
}

impl RecordingSender {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<(i64, FormattedResponse)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn typing_count(&self) -> usize {
        self.typing.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ResponseSender for RecordingSender {
    async fn send(&self, chat_id: i64, response: &FormattedResponse) -> Result<(), BotError> {
        self.sent.lock().unwrap().push((chat_id, response.clone()));
        if self.fail {
            Err(BotError::TelegramError(
                "sendMessage failed (403): Forbidden: bot was blocked by the user".to_string(),
            ))
        } else {
            Ok(())
        }
    }

    async fn send_typing(&self, _chat_id: i64) -> Result<(), BotError> {
        self.typing.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// A sender that keeps the trait's default `send_typing`.
#[derive(Default)]
pub struct PlainSender {
    pub sent: Mutex<Vec<(i64, FormattedResponse)>>,
}

#[async_trait]
impl ResponseSender for PlainSender {
    async fn send(&self, chat_id: i64, response: &FormattedResponse) -> Result<(), BotError> {
        self.sent.lock().unwrap().push((chat_id, response.clone()));
        Ok(())
    }
}

// ============================================================================
// Secret store
// ============================================================================

#[derive(Default)]
pub struct MapSecretStore {
    values: HashMap<String, String>,
    panic: bool,
}

impl MapSecretStore {
    pub fn with(entries: &[(&str, &str)]) -> Self {
        Self {
            values: entries
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
            panic: false,
        }
    }

    pub fn panicking() -> Self {
        Self {
            panic: true,
            ..Self::default()
        }
    }
}

#[async_trait]
impl SecretStore for MapSecretStore {
    async fn get_secret(&self, name: &str) -> Result<String, BotError> {
        if self.panic {
            panic!("secret store exploded");
        }
        self.values
            .get(name)
            .cloned()
            .ok_or_else(|| BotError::AwsError(format!("Failed to get SSM parameter {name}")))
    }
}
