use serde::{Deserialize, Serialize};

/// One size of an inbound image. Telegram delivers these ordered by
/// resolution, largest last.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaVariant {
    pub media_id: String,
    pub width: u32,
    pub height: u32,
}

/// A single inbound event, reduced to what the pipeline looks at.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundUpdate {
    pub update_id: i64,
    pub sender_present: bool,
    pub command_text: Option<String>,
    pub chat_id: Option<i64>,
    pub message_id: Option<i64>,
    pub media_variants: Vec<MediaVariant>,
}

impl InboundUpdate {
    /// The variant to describe: always the highest resolution one.
    #[must_use]
    pub fn best_media(&self) -> Option<&MediaVariant> {
        self.media_variants.last()
    }
}

/// A media identifier together with the URL it resolved to.
///
/// The URL embeds the bot token, so `Debug` only prints the identifier.
#[derive(Clone, PartialEq, Eq)]
pub struct MediaReference {
    pub media_id: String,
    pub url: String,
}

impl std::fmt::Debug for MediaReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaReference")
            .field("media_id", &self.media_id)
            .field("url", &"<redacted>")
            .finish()
    }
}

/// Text ready to be sent, plus the message it should reply to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattedResponse {
    pub text: String,
    pub reply_to: Option<i64>,
}
