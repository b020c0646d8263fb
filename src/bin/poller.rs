use std::sync::Arc;

use image_descriptor::core::config::AppConfig;
use image_descriptor::pipeline::Pipeline;
use image_descriptor::poller::{LongPoller, prepare_bot};
use image_descriptor::telegram::TelegramClient;
use image_descriptor::vision::OpenAiVisionProvider;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine; the real environment still applies.
    dotenvy::dotenv().ok();
    image_descriptor::setup_local_logging();

    let config = AppConfig::from_env()?;
    info!(
        locale = %config.settings.locale,
        prompt_style = %config.settings.prompt_style,
        model = config.settings.model(),
        "Starting image descriptor bot"
    );

    let client = Arc::new(TelegramClient::for_polling(
        config.credentials.telegram_bot_token.clone(),
        &config.settings.telegram_api_base,
        config.settings.poll_timeout_secs,
    ));

    let identity = match prepare_bot(&client).await {
        Ok(identity) => identity,
        Err(e) => {
            error!("Could not connect to Telegram: {}", e);
            return Err(e.into());
        }
    };

    let provider = Arc::new(OpenAiVisionProvider::from_config(&config));
    let pipeline = Pipeline::new(
        client.clone(),
        provider,
        client.clone(),
        config.settings.locale,
    )
    .with_typing_indicator(true)
    .with_bot_username(identity.username.or(config.settings.bot_username.clone()));

    LongPoller::new(client, Arc::new(pipeline), config.settings.poll_timeout_secs)
        .run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for shutdown signal: {}", e);
                std::future::pending::<()>().await;
            }
            info!("Shutdown signal received");
        })
        .await;

    info!("Bot stopped");
    Ok(())
}
