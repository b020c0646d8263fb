//! Fixed, localized reply texts and the formatting of every reply the bot sends.
//!
//! Both entry points go through this module, so the greeting, the description
//! prefix and the apology are worded identically whichever transport delivered
//! the update.

use std::fmt;
use std::str::FromStr;

use crate::core::models::FormattedResponse;

/// Telegram rejects `sendMessage` texts longer than this many characters.
pub const MAX_MESSAGE_CHARS: usize = 4096;

const TRUNCATION_MARKER: char = '…';

/// Language of the fixed texts and of the provider prompt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Locale {
    #[default]
    English,
    Italian,
}

impl Locale {
    #[must_use]
    pub fn texts(self) -> &'static ReplyTexts {
        match self {
            Locale::English => &ENGLISH,
            Locale::Italian => &ITALIAN,
        }
    }

    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Locale::English => "en",
            Locale::Italian => "it",
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" | "english" => Ok(Locale::English),
            "it" | "italian" | "italiano" => Ok(Locale::Italian),
            other => Err(format!("unsupported locale '{other}' (expected 'en' or 'it')")),
        }
    }
}

#[derive(Debug)]
pub struct ReplyTexts {
    pub greeting: &'static str,
    pub description_prefix: &'static str,
    pub apology: &'static str,
}

static ENGLISH: ReplyTexts = ReplyTexts {
    greeting: "Hello! I'm Image Descriptor Bot. Send me an image and I'll give you a detailed description!",
    description_prefix: "Here is the description of the image:",
    apology: "Sorry, I could not process this image. Please try again later.",
};

static ITALIAN: ReplyTexts = ReplyTexts {
    greeting: "Ciao! Sono Image Descriptor Bot. Inviami un'immagine e ti fornirò una descrizione dettagliata!",
    description_prefix: "Ecco la descrizione dell'immagine:",
    apology: "Mi dispiace, non sono riuscito a elaborare questa immagine. Riprova più tardi.",
};

/// Welcome text, sent top-level (never as a reply).
#[must_use]
pub fn greeting_response(locale: Locale) -> FormattedResponse {
    FormattedResponse {
        text: locale.texts().greeting.to_string(),
        reply_to: None,
    }
}

/// Wraps the provider output verbatim under the localized prefix and threads
/// it to the originating message.
#[must_use]
pub fn description_response(
    locale: Locale,
    description: &str,
    reply_to: Option<i64>,
) -> FormattedResponse {
    let text = format!("{}\n\n{}", locale.texts().description_prefix, description);
    FormattedResponse {
        text: clamp_message(&text),
        reply_to,
    }
}

/// The one failure reply, whatever went wrong while handling a photo.
#[must_use]
pub fn apology_response(locale: Locale, reply_to: Option<i64>) -> FormattedResponse {
    FormattedResponse {
        text: locale.texts().apology.to_string(),
        reply_to,
    }
}

/// Cuts `text` to at most [`MAX_MESSAGE_CHARS`] characters, marking the cut.
#[must_use]
pub fn clamp_message(text: &str) -> String {
    if text.chars().count() <= MAX_MESSAGE_CHARS {
        return text.to_string();
    }

    let mut clamped: String = text.chars().take(MAX_MESSAGE_CHARS - 1).collect();
    clamped.push(TRUNCATION_MARKER);
    clamped
}
