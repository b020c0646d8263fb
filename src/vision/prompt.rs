use std::fmt;
use std::str::FromStr;

use crate::telegram::message_formatter::Locale;

/// Default output bound for the structured event-extraction prompt.
pub const EVENT_EXTRACTION_MAX_TOKENS: u32 = 500;

/// Default output bound for the plain description prompt.
pub const PLAIN_MAX_TOKENS: u32 = 300;

/// Which instruction the provider receives alongside the image.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PromptStyle {
    /// Extract event details when the image announces an event, then describe it.
    #[default]
    EventExtraction,
    /// Describe the image, nothing else.
    Plain,
}

impl PromptStyle {
    #[must_use]
    pub fn default_max_tokens(self) -> u32 {
        match self {
            PromptStyle::EventExtraction => EVENT_EXTRACTION_MAX_TOKENS,
            PromptStyle::Plain => PLAIN_MAX_TOKENS,
        }
    }

    #[must_use]
    pub fn instructions(self, locale: Locale) -> &'static str {
        match (self, locale) {
            (PromptStyle::EventExtraction, Locale::English) => EVENT_PROMPT_EN,
            (PromptStyle::EventExtraction, Locale::Italian) => EVENT_PROMPT_IT,
            (PromptStyle::Plain, Locale::English) => PLAIN_PROMPT_EN,
            (PromptStyle::Plain, Locale::Italian) => PLAIN_PROMPT_IT,
        }
    }
}

impl fmt::Display for PromptStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PromptStyle::EventExtraction => f.write_str("event"),
            PromptStyle::Plain => f.write_str("plain"),
        }
    }
}

impl FromStr for PromptStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "event" | "events" | "structured" => Ok(PromptStyle::EventExtraction),
            "plain" | "simple" => Ok(PromptStyle::Plain),
            other => Err(format!(
                "unsupported prompt style '{other}' (expected 'event' or 'plain')"
            )),
        }
    }
}

const EVENT_PROMPT_EN: &str = "Analyze this image and answer in English.\n\
\n\
FIRST: Determine whether this is an event announcement (poster, flyer, invitation, promotional post).\n\
\n\
If it is an event announcement, start with this section and fill in only the fields you can read in the image:\n\
🎫 **EVENT INFORMATION**\n\
• **Event name:** ...\n\
• **Description:** ...\n\
• **Date:** ...\n\
• **Time:** ...\n\
• **Venue:** ...\n\
• **Organizer:** ...\n\
• **Price/Tickets:** ...\n\
• **Contacts:** ...\n\
\n\
SECOND: In every case, give a detailed description of the image: subjects, colors, composition, visible text and mood.\n\
\n\
Do not invent details that do not appear in the image.";

const EVENT_PROMPT_IT: &str = "Analizza questa immagine e rispondi in italiano.\n\
\n\
PRIMO: Determina se si tratta di un annuncio di evento (locandina, volantino, invito, post promozionale).\n\
\n\
Se è un annuncio di evento, inizia con questa sezione e compila solo i campi leggibili nell'immagine:\n\
🎫 **INFORMAZIONI EVENTO**\n\
• **Nome evento:** ...\n\
• **Descrizione:** ...\n\
• **Data:** ...\n\
• **Orario:** ...\n\
• **Luogo:** ...\n\
• **Organizzatore:** ...\n\
• **Prezzo/Biglietti:** ...\n\
• **Contatti:** ...\n\
\n\
SECONDO: In ogni caso, fornisci una descrizione dettagliata dell'immagine: soggetti, colori, composizione, testo visibile e atmosfera.\n\
\n\
Non inventare informazioni che non compaiono nell'immagine.";

const PLAIN_PROMPT_EN: &str = "Please describe this image in detail.";

const PLAIN_PROMPT_IT: &str = "Descrivi questa immagine in dettaglio, in italiano.";
