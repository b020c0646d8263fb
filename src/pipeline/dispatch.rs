use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::{Instrument, debug, error, info, info_span, warn};
use uuid::Uuid;

use super::classifier::{Classification, IgnoreReason, classify};
use super::{MediaResolver, ResponseSender};
use crate::core::models::{FormattedResponse, InboundUpdate};
use crate::telegram::message_formatter::{
    Locale, apology_response, description_response, greeting_response,
};
use crate::vision::DescriptionProvider;

/// Telegram clears a chat action after about five seconds.
const TYPING_REFRESH: Duration = Duration::from_secs(4);

/// Where a photo update went wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureStage {
    MediaResolution,
    Description,
    /// A panic while resolving or describing.
    Internal,
}

/// What a single pipeline pass did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Nothing sent.
    Ignored(IgnoreReason),
    /// Welcome text sent.
    Greeted,
    /// Description sent as a reply.
    Described,
    /// Apology sent as a reply.
    Apologized(FailureStage),
    /// The single reply attempt failed. Not retried.
    SendFailed,
}

/// The per-update pipeline with its collaborators injected.
pub struct Pipeline {
    resolver: Arc<dyn MediaResolver>,
    provider: Arc<dyn DescriptionProvider>,
    sender: Arc<dyn ResponseSender>,
    locale: Locale,
    show_typing: bool,
    bot_username: Option<String>,
}

impl Pipeline {
    #[must_use]
    pub fn new(
        resolver: Arc<dyn MediaResolver>,
        provider: Arc<dyn DescriptionProvider>,
        sender: Arc<dyn ResponseSender>,
        locale: Locale,
    ) -> Self {
        Self {
            resolver,
            provider,
            sender,
            locale,
            show_typing: false,
            bot_username: None,
        }
    }

    /// The bot's own username, so `/start@<username>` is recognised in groups.
    #[must_use]
    pub fn with_bot_username(mut self, username: Option<String>) -> Self {
        self.bot_username = username;
        self
    }

    /// Keep a "typing" indicator up while a photo is being described.
    #[must_use]
    pub fn with_typing_indicator(mut self, enabled: bool) -> Self {
        self.show_typing = enabled;
        self
    }

    #[must_use]
    pub fn locale(&self) -> Locale {
        self.locale
    }

    /// Run one update to completion.
    ///
    /// Never fails: every problem after classification ends in exactly one
    /// reply attempt, and ignorable updates end in none.
    pub async fn handle_update(&self, update: &InboundUpdate) -> Outcome {
        let span = info_span!(
            "update",
            update_id = update.update_id,
            correlation_id = %Uuid::new_v4()
        );

        async {
            let outcome = match classify(update, self.bot_username.as_deref()) {
                Classification::Ignore(reason) => {
                    debug!(?reason, "Ignoring update");
                    Outcome::Ignored(reason)
                }
                Classification::Greeting { chat_id } => {
                    info!(chat_id, "Greeting command received");
                    self.deliver(chat_id, &greeting_response(self.locale), Outcome::Greeted)
                        .await
                }
                Classification::Photo {
                    chat_id,
                    message_id,
                    media,
                } => {
                    info!(
                        chat_id,
                        message_id = ?message_id,
                        width = media.width,
                        height = media.height,
                        "Photo received"
                    );
                    self.handle_photo(chat_id, message_id, &media.media_id)
                        .await
                }
            };

            info!(?outcome, "Update handled");
            outcome
        }
        .instrument(span)
        .await
    }

    async fn handle_photo(&self, chat_id: i64, message_id: Option<i64>, media_id: &str) -> Outcome {
        let typing = self.show_typing.then(|| self.start_typing(chat_id));

        let result = AssertUnwindSafe(self.describe_media(media_id))
            .catch_unwind()
            .await
            .unwrap_or_else(|_| {
                error!("Panic while describing image");
                Err(FailureStage::Internal)
            });

        if let Some(done_tx) = typing {
            let _ = done_tx.send(());
        }

        match result {
            Ok(description) => {
                let response = description_response(self.locale, &description, message_id);
                self.deliver(chat_id, &response, Outcome::Described).await
            }
            Err(stage) => {
                let response = apology_response(self.locale, message_id);
                self.deliver(chat_id, &response, Outcome::Apologized(stage))
                    .await
            }
        }
    }

    async fn describe_media(&self, media_id: &str) -> Result<String, FailureStage> {
        let media = self.resolver.resolve(media_id).await.map_err(|e| {
            error!("Failed to resolve media: {}", e);
            FailureStage::MediaResolution
        })?;

        self.provider.describe(&media.url).await.map_err(|e| {
            error!(media_id = %media.media_id, "Failed to describe image: {}", e);
            FailureStage::Description
        })
    }

    async fn deliver(&self, chat_id: i64, response: &FormattedResponse, outcome: Outcome) -> Outcome {
        match self.sender.send(chat_id, response).await {
            Ok(()) => outcome,
            Err(e) => {
                warn!(chat_id, reply_to = ?response.reply_to, "Failed to send reply: {}", e);
                Outcome::SendFailed
            }
        }
    }

    /// Refreshes the typing indicator until the returned sender fires or drops.
    fn start_typing(&self, chat_id: i64) -> oneshot::Sender<()> {
        let (done_tx, mut done_rx) = oneshot::channel::<()>();
        let sender = Arc::clone(&self.sender);

        tokio::spawn(
            async move {
                loop {
                    if let Err(e) = sender.send_typing(chat_id).await {
                        debug!("typing indicator failed: {e}");
                    }
                    tokio::select! {
                        () = tokio::time::sleep(TYPING_REFRESH) => {},
                        _ = &mut done_rx => break,
                    }
                }
            }
            .in_current_span(),
        );

        done_tx
    }
}
