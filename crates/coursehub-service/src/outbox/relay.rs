//! Outbox relay loop.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time;
use tracing::{debug, info, warn};

use coursehub_core::config::OutboxConfig;
use coursehub_core::result::AppResult;
use coursehub_core::traits::NotificationDispatcher;
use coursehub_database::store::OutboxStore;

/// Counts from one relay pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RelayStats {
    /// Events handed to the dispatcher successfully.
    pub dispatched: usize,
    /// Events whose dispatch failed and will be retried.
    pub failed: usize,
}

/// Polls the outbox and dispatches pending events.
///
/// Dispatch failures are recorded on the row and never touch commerce state.
#[derive(Clone)]
pub struct OutboxRelay {
    outbox: Arc<dyn OutboxStore>,
    dispatcher: Arc<dyn NotificationDispatcher>,
    config: OutboxConfig,
}

impl std::fmt::Debug for OutboxRelay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutboxRelay")
            .field("dispatcher", &self.dispatcher)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl OutboxRelay {
    /// Create a new relay.
    pub fn new(
        outbox: Arc<dyn OutboxStore>,
        dispatcher: Arc<dyn NotificationDispatcher>,
        config: OutboxConfig,
    ) -> Self {
        Self {
            outbox,
            dispatcher,
            config,
        }
    }

    /// Dispatch one batch of pending events.
    pub async fn run_once(&self) -> AppResult<RelayStats> {
        let batch = self
            .outbox
            .pending_events(i64::from(self.config.batch_size), self.config.max_attempts)
            .await?;

        let mut stats = RelayStats::default();
        for record in batch {
            let outcome = match record.event() {
                Ok(event) => self.dispatcher.dispatch(&event).await,
                Err(e) => Err(e),
            };
            match outcome {
                Ok(()) => {
                    self.outbox.mark_dispatched(record.id).await?;
                    stats.dispatched += 1;
                }
                Err(e) => {
                    warn!(
                        event_id = %record.id,
                        event_type = %record.event_type,
                        attempt = record.attempts + 1,
                        max_attempts = self.config.max_attempts,
                        error = %e,
                        "Event dispatch failed"
                    );
                    self.outbox.mark_failed(record.id, &e.to_string()).await?;
                    stats.failed += 1;
                }
            }
        }
        Ok(stats)
    }

    /// Run until the shutdown signal flips to `true`.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        info!(
            poll_interval_seconds = self.config.poll_interval_seconds,
            batch_size = self.config.batch_size,
            "Outbox relay started"
        );
        let poll_interval = Duration::from_secs(self.config.poll_interval_seconds);

        loop {
            let drained = match self.run_once().await {
                Ok(stats) => {
                    if stats.dispatched + stats.failed > 0 {
                        debug!(dispatched = stats.dispatched, failed = stats.failed, "Outbox pass");
                    }
                    stats.dispatched + stats.failed < self.config.batch_size as usize
                }
                Err(e) => {
                    warn!(error = %e, "Outbox poll failed");
                    true
                }
            };

            if !drained {
                continue;
            }
            tokio::select! {
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        break;
                    }
                }
                _ = time::sleep(poll_interval) => {}
            }
            if *shutdown.borrow() {
                break;
            }
        }

        info!("Outbox relay stopped");
    }
}
