use std::env;
use url::Url;

use super::secrets::SecretStore;
use crate::errors::BotError;
use crate::telegram::message_formatter::Locale;
use crate::vision::prompt::PromptStyle;

pub const DEFAULT_TELEGRAM_API_BASE: &str = "https://api.telegram.org";
pub const DEFAULT_OPENAI_API_BASE: &str = "https://api.openai.com";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o";
pub const DEFAULT_POLL_TIMEOUT_SECS: u64 = 30;
/// Longest long-poll timeout the Bot API honours.
pub const MAX_POLL_TIMEOUT_SECS: u64 = 50;
pub const DEFAULT_TELEGRAM_TOKEN_PARAM: &str = "/telegram-bot/prod/telegram-token";
pub const DEFAULT_OPENAI_KEY_PARAM: &str = "/telegram-bot/prod/openai-api-key";

/// The two secrets the bot cannot run without.
#[derive(Clone)]
pub struct Credentials {
    pub telegram_bot_token: String,
    pub openai_api_key: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("telegram_bot_token", &"<redacted>")
            .field("openai_api_key", &"<redacted>")
            .finish()
    }
}

/// Non-secret settings, always read from the environment.
#[derive(Debug, Clone)]
pub struct Settings {
    pub openai_org_id: Option<String>,
    pub openai_model: Option<String>,
    pub locale: Locale,
    pub prompt_style: PromptStyle,
    pub max_output_tokens: Option<u32>,
    pub telegram_api_base: String,
    pub openai_api_base: String,
    pub poll_timeout_secs: u64,
    pub webhook_secret: Option<String>,
    /// Username without the leading `@`; lets the webhook accept `/start@<username>`.
    pub bot_username: Option<String>,
    pub telegram_token_param: String,
    pub openai_key_param: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            openai_org_id: None,
            openai_model: None,
            locale: Locale::default(),
            prompt_style: PromptStyle::default(),
            max_output_tokens: None,
            telegram_api_base: DEFAULT_TELEGRAM_API_BASE.to_string(),
            openai_api_base: DEFAULT_OPENAI_API_BASE.to_string(),
            poll_timeout_secs: DEFAULT_POLL_TIMEOUT_SECS,
            webhook_secret: None,
            bot_username: None,
            telegram_token_param: DEFAULT_TELEGRAM_TOKEN_PARAM.to_string(),
            openai_key_param: DEFAULT_OPENAI_KEY_PARAM.to_string(),
        }
    }
}

impl Settings {
    /// # Errors
    ///
    /// Returns `ConfigError` when a variable is present but cannot be parsed.
    pub fn from_env() -> Result<Self, BotError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds settings from an arbitrary key lookup. Blank values count as unset.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when a variable is present but cannot be parsed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, BotError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let locale = match get("BOT_LOCALE") {
            Some(raw) => raw
                .parse::<Locale>()
                .map_err(|e| BotError::ConfigError(format!("BOT_LOCALE: {e}")))?,
            None => defaults.locale,
        };

        let prompt_style = match get("VISION_PROMPT_STYLE") {
            Some(raw) => raw
                .parse::<PromptStyle>()
                .map_err(|e| BotError::ConfigError(format!("VISION_PROMPT_STYLE: {e}")))?,
            None => defaults.prompt_style,
        };

        let max_output_tokens = get("VISION_MAX_TOKENS")
            .map(|raw| {
                raw.trim()
                    .parse::<u32>()
                    .ok()
                    .filter(|n| *n > 0)
                    .ok_or_else(|| {
                        BotError::ConfigError(format!(
                            "VISION_MAX_TOKENS: expected a positive integer, got '{raw}'"
                        ))
                    })
            })
            .transpose()?;

        let poll_timeout_secs = get("TELEGRAM_POLL_TIMEOUT")
            .map(|raw| {
                raw.trim()
                    .parse::<u64>()
                    .ok()
                    .filter(|secs| (1..=MAX_POLL_TIMEOUT_SECS).contains(secs))
                    .ok_or_else(|| {
                        BotError::ConfigError(format!(
                            "TELEGRAM_POLL_TIMEOUT: expected 1 to {MAX_POLL_TIMEOUT_SECS} seconds, got '{raw}'"
                        ))
                    })
            })
            .transpose()?
            .unwrap_or(defaults.poll_timeout_secs);

        Ok(Self {
            openai_org_id: get("OPENAI_ORG_ID"),
            openai_model: get("OPENAI_MODEL"),
            locale,
            prompt_style,
            max_output_tokens,
            telegram_api_base: get("TELEGRAM_API_BASE")
                .map(|raw| api_base("TELEGRAM_API_BASE", &raw))
                .transpose()?
                .unwrap_or(defaults.telegram_api_base),
            openai_api_base: get("OPENAI_API_BASE")
                .map(|raw| api_base("OPENAI_API_BASE", &raw))
                .transpose()?
                .unwrap_or(defaults.openai_api_base),
            poll_timeout_secs,
            webhook_secret: get("TELEGRAM_WEBHOOK_SECRET"),
            bot_username: get("TELEGRAM_BOT_USERNAME")
                .map(|name| name.trim().trim_start_matches('@').to_string())
                .filter(|name| !name.is_empty()),
            telegram_token_param: get("TELEGRAM_TOKEN_PARAM")
                .unwrap_or(defaults.telegram_token_param),
            openai_key_param: get("OPENAI_KEY_PARAM").unwrap_or(defaults.openai_key_param),
        })
    }

    #[must_use]
    pub fn model(&self) -> &str {
        self.openai_model.as_deref().unwrap_or(DEFAULT_OPENAI_MODEL)
    }

    /// Output bound for the provider: explicit override, else the style's default.
    #[must_use]
    pub fn max_tokens(&self) -> u32 {
        self.max_output_tokens
            .unwrap_or_else(|| self.prompt_style.default_max_tokens())
    }
}

/// Accepts an absolute http(s) URL and strips any trailing slash.
fn api_base(key: &str, raw: &str) -> Result<String, BotError> {
    let raw = raw.trim();
    let parsed =
        Url::parse(raw).map_err(|e| BotError::ConfigError(format!("{key}: {e}")))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(BotError::ConfigError(format!(
            "{key}: unsupported scheme '{}'",
            parsed.scheme()
        )));
    }
    Ok(raw.trim_end_matches('/').to_string())
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub credentials: Credentials,
    pub settings: Settings,
}

impl AppConfig {
    /// Configuration for the long-poll process: everything from the environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` naming the first missing or malformed variable.
    pub fn from_env() -> Result<Self, BotError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// # Errors
    ///
    /// Returns `ConfigError` naming the first missing or malformed variable.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, BotError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| BotError::ConfigError(format!("{key} is not set")))
        };

        let credentials = Credentials {
            telegram_bot_token: required("TELEGRAM_TOKEN")?,
            openai_api_key: required("OPENAI_API_KEY")?,
        };
        let settings = Settings::from_lookup(&lookup)?;

        Ok(Self {
            credentials,
            settings,
        })
    }

    /// Configuration for the function adapter: settings from the environment,
    /// secrets from the keyed store. Both secrets are fetched concurrently.
    ///
    /// # Errors
    ///
    /// Returns the store's error if either secret cannot be read.
    pub async fn from_secret_store(
        settings: Settings,
        store: &dyn SecretStore,
    ) -> Result<Self, BotError> {
        let (telegram_bot_token, openai_api_key) = tokio::try_join!(
            store.get_secret(&settings.telegram_token_param),
            store.get_secret(&settings.openai_key_param),
        )?;

        Ok(Self {
            credentials: Credentials {
                telegram_bot_token,
                openai_api_key,
            },
            settings,
        })
    }
}
