use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::{JoinError, JoinSet};
use tokio_retry::Retry;
use tokio_retry::strategy::{ExponentialBackoff, jitter};
use tracing::{error, info, warn};

use crate::core::models::InboundUpdate;
use crate::errors::BotError;
use crate::pipeline::{Outcome, Pipeline};
use crate::telegram::TelegramClient;
use crate::telegram::types::{BotIdentity, TelegramUpdate};

/// Ceiling for the delay between failed `getUpdates` calls.
pub const MAX_FETCH_BACKOFF: Duration = Duration::from_secs(60);

/// A stream of updates fetched in batches (Telegram's `getUpdates`).
#[async_trait]
pub trait UpdateSource: Send + Sync {
    /// Fetch the next batch, waiting up to `timeout_secs` for one to arrive.
    ///
    /// # Errors
    ///
    /// Returns an error if the platform call fails.
    async fn fetch_updates(
        &self,
        offset: Option<i64>,
        timeout_secs: u64,
    ) -> Result<Vec<TelegramUpdate>, BotError>;
}

/// Delays between consecutive failed fetches: 1s, 2s, 4s, ... capped at 60s.
pub fn fetch_backoff() -> impl Iterator<Item = Duration> {
    ExponentialBackoff::from_millis(2)
        .factor(500)
        .max_delay(MAX_FETCH_BACKOFF)
}

/// Ceiling for a single startup retry delay.
pub const MAX_STARTUP_BACKOFF: Duration = Duration::from_secs(10);

/// Startup attempts after the first one fails.
pub const STARTUP_RETRIES: usize = 5;

/// Delays before each startup retry: 500ms doubling, capped at 10s.
pub fn startup_backoff() -> impl Iterator<Item = Duration> {
    ExponentialBackoff::from_millis(2)
        .factor(250)
        .max_delay(MAX_STARTUP_BACKOFF)
        .take(STARTUP_RETRIES)
}

/// Offset that acknowledges every update in `updates`.
#[must_use]
pub fn next_offset(current: Option<i64>, updates: &[TelegramUpdate]) -> Option<i64> {
    updates
        .iter()
        .map(|u| u.update_id + 1)
        .max()
        .map_or(current, |next| Some(current.map_or(next, |c| c.max(next))))
}

/// Verifies the token and switches the bot to polling mode.
///
/// Any webhook is removed and the pending backlog dropped. Each call is
/// retried up to [`STARTUP_RETRIES`] times with jittered [`startup_backoff`]
/// delays.
///
/// # Errors
///
/// Returns the last error if either call keeps failing.
pub async fn prepare_bot(client: &TelegramClient) -> Result<BotIdentity, BotError> {
    let strategy = || startup_backoff().map(jitter);

    let me = Retry::spawn(strategy(), || client.get_me()).await?;
    Retry::spawn(strategy(), || client.delete_webhook(true)).await?;

    info!(
        bot_id = me.id,
        username = ?me.username,
        "Telegram bot connected (webhook cleared, pending updates dropped)"
    );
    Ok(me)
}

/// Long-poll adapter: fetches updates and runs each through the pipeline as
/// its own task.
pub struct LongPoller {
    source: Arc<dyn UpdateSource>,
    pipeline: Arc<Pipeline>,
    poll_timeout_secs: u64,
}

impl LongPoller {
    #[must_use]
    pub fn new(
        source: Arc<dyn UpdateSource>,
        pipeline: Arc<Pipeline>,
        poll_timeout_secs: u64,
    ) -> Self {
        Self {
            source,
            pipeline,
            poll_timeout_secs,
        }
    }

    /// Spawn one pipeline task per update into `tasks`.
    pub fn dispatch(&self, tasks: &mut JoinSet<Outcome>, updates: Vec<TelegramUpdate>) {
        for update in updates {
            let pipeline = Arc::clone(&self.pipeline);
            let inbound = InboundUpdate::from(update);
            tasks.spawn(async move { pipeline.handle_update(&inbound).await });
        }
    }

    /// Poll until `shutdown` resolves, then wait for in-flight updates.
    pub async fn run_until<F>(&self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        info!(
            timeout_secs = self.poll_timeout_secs,
            "Starting Telegram long polling"
        );

        let mut offset: Option<i64> = None;
        let mut backoff = fetch_backoff();
        let mut tasks: JoinSet<Outcome> = JoinSet::new();

        loop {
            let fetched = tokio::select! {
                () = &mut shutdown => break,
                result = self.source.fetch_updates(offset, self.poll_timeout_secs) => result,
            };

            match fetched {
                Ok(updates) => {
                    backoff = fetch_backoff();
                    if !updates.is_empty() {
                        info!(count = updates.len(), "Received updates");
                    }
                    offset = next_offset(offset, &updates);
                    self.dispatch(&mut tasks, updates);
                }
                Err(e) => {
                    let delay = backoff.next().unwrap_or(MAX_FETCH_BACKOFF);
                    warn!(
                        "Telegram polling error: {}. Retrying in {}s...",
                        e,
                        delay.as_secs()
                    );
                    tokio::select! {
                        () = &mut shutdown => break,
                        () = tokio::time::sleep(delay) => {}
                    }
                }
            }

            while let Some(joined) = tasks.try_join_next() {
                log_join(joined);
            }
        }

        info!(in_flight = tasks.len(), "Polling stopped, finishing in-flight updates");
        while let Some(joined) = tasks.join_next().await {
            log_join(joined);
        }
    }
}

fn log_join(joined: Result<Outcome, JoinError>) {
    if let Err(e) = joined {
        error!("Update task failed: {}", e);
    }
}
