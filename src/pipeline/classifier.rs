use crate::core::models::{InboundUpdate, MediaVariant};

/// The one command the bot answers.
pub const GREETING_COMMAND: &str = "/start";

/// Why an update produced no reply. None of these are errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    NoSender,
    NoChat,
    NoMedia,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification<'a> {
    Ignore(IgnoreReason),
    Greeting {
        chat_id: i64,
    },
    Photo {
        chat_id: i64,
        message_id: Option<i64>,
        media: &'a MediaVariant,
    },
}

/// `/start`, or `/start@<bot_username>` as group chats address it.
///
/// The addressed form only counts when the bot's own username is known and
/// matches (case-insensitively); a command aimed at another bot is not ours.
#[must_use]
pub fn is_greeting_command(text: &str, bot_username: Option<&str>) -> bool {
    let Some(rest) = text.strip_prefix(GREETING_COMMAND) else {
        return false;
    };
    if rest.is_empty() {
        return true;
    }

    match (rest.strip_prefix('@'), bot_username) {
        (Some(addressee), Some(own)) => {
            addressee.eq_ignore_ascii_case(own.trim_start_matches('@'))
        }
        _ => false,
    }
}

/// Decide what to do with an update. Pure; performs no I/O.
#[must_use]
pub fn classify<'a>(update: &'a InboundUpdate, bot_username: Option<&str>) -> Classification<'a> {
    if !update.sender_present {
        return Classification::Ignore(IgnoreReason::NoSender);
    }

    let Some(chat_id) = update.chat_id else {
        return Classification::Ignore(IgnoreReason::NoChat);
    };

    if update
        .command_text
        .as_deref()
        .is_some_and(|text| is_greeting_command(text, bot_username))
    {
        return Classification::Greeting { chat_id };
    }

    match update.best_media() {
        Some(media) => Classification::Photo {
            chat_id,
            message_id: update.message_id,
            media,
        },
        None => Classification::Ignore(IgnoreReason::NoMedia),
    }
}
