//! Function adapter - one Telegram webhook delivery per invocation.
//!
//! This module handles:
//! - Credential retrieval from the secret store
//! - Optional webhook secret verification
//! - Update extraction from the invocation event
//! - Running the pipeline and mapping its outcome to a status/body pair

use futures::FutureExt;
use lambda_runtime::{Error, LambdaEvent};
use serde_json::Value;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{error, info};

use super::{helpers, parsing, webhook_secret};
use crate::core::config::{AppConfig, Settings};
use crate::core::models::InboundUpdate;
use crate::core::secrets::{SecretStore, SsmSecretStore};
use crate::pipeline::{FailureStage, IgnoreReason, Outcome, Pipeline};
use crate::telegram::TelegramClient;
use crate::vision::OpenAiVisionProvider;

pub use self::function_handler as handler;

/// Lambda handler for the webhook entrypoint.
///
/// Always returns `Ok`: every failure is reported as a status/body pair.
///
/// # Errors
///
/// Never returns an error; the signature is what `lambda_runtime` expects.
#[tracing::instrument(level = "info", skip(event))]
pub async fn function_handler(event: LambdaEvent<Value>) -> Result<Value, Error> {
    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            error!("Config error: {}", e);
            return Ok(helpers::err_response(500, "Invalid configuration"));
        }
    };

    let store = SsmSecretStore::from_env().await;
    Ok(handle_event(&event.payload, settings, &store).await)
}

/// Runs one invocation. A panic anywhere inside becomes a 500 response.
pub async fn handle_event(payload: &Value, settings: Settings, store: &dyn SecretStore) -> Value {
    match AssertUnwindSafe(process_event(payload, settings, store))
        .catch_unwind()
        .await
    {
        Ok(response) => response,
        Err(panic) => {
            let message = helpers::panic_message(panic.as_ref());
            error!("Unhandled failure in webhook handler: {}", message);
            helpers::err_response(500, &format!("Lambda error: {message}"))
        }
    }
}

async fn process_event(payload: &Value, settings: Settings, store: &dyn SecretStore) -> Value {
    // ========================================================================
    // Credentials
    // ========================================================================

    let config = match AppConfig::from_secret_store(settings, store).await {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load credentials: {}", e);
            return helpers::err_response(500, "Failed to load credentials");
        }
    };

    // ========================================================================
    // Webhook secret (only when configured)
    // ========================================================================

    if let Some(expected) = config.settings.webhook_secret.as_deref()
        && !webhook_secret::verify_secret_token(payload.get("headers"), expected)
    {
        return helpers::err_response(401, "Invalid webhook secret");
    }

    // ========================================================================
    // Update
    // ========================================================================

    let update = match parsing::extract_update(payload) {
        Ok(update) => update,
        Err(e) => {
            error!("Failed to parse update: {}", e);
            return helpers::err_response(500, "Invalid update payload");
        }
    };

    info!(update_id = update.update_id, "Webhook received update");

    let pipeline = build_pipeline(&config);
    let outcome = pipeline.handle_update(&InboundUpdate::from(&update)).await;
    outcome_response(outcome)
}

/// Production collaborators for a single invocation.
#[must_use]
pub fn build_pipeline(config: &AppConfig) -> Pipeline {
    let client = Arc::new(TelegramClient::new(
        config.credentials.telegram_bot_token.clone(),
        &config.settings.telegram_api_base,
    ));
    let provider = Arc::new(OpenAiVisionProvider::from_config(config));

    Pipeline::new(client.clone(), provider, client, config.settings.locale)
        .with_bot_username(config.settings.bot_username.clone())
}

/// Maps a pipeline outcome to the transport-level response.
#[must_use]
pub fn outcome_response(outcome: Outcome) -> Value {
    match outcome {
        Outcome::Ignored(IgnoreReason::NoChat) => helpers::ok_response("No chat ID found"),
        Outcome::Ignored(_) => helpers::ok_response("Update processed"),
        Outcome::Greeted => helpers::ok_response("Start message sent"),
        Outcome::Described => helpers::ok_response("Description sent"),
        Outcome::Apologized(FailureStage::MediaResolution) => {
            helpers::err_response(400, "Failed to get file from Telegram")
        }
        Outcome::Apologized(_) => helpers::err_response(500, "Failed to describe image"),
        Outcome::SendFailed => helpers::err_response(500, "Failed to send reply"),
    }
}
