//! Periodic sweep driver.
//!
//! Runs one sweeper on a fixed interval until shutdown is signaled. Each
//! store gets its own worker with its own interval and its own reconciler
//! state; the two stores share no locking.

use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, error, info, instrument};

use crate::sweep::Sweeper;

/// Background worker driving a [`Sweeper`] on a fixed interval.
pub struct SyncWorker<S: Sweeper> {
    sweeper: S,
    interval: Duration,
    once: bool,
}

impl<S: Sweeper> SyncWorker<S> {
    pub fn new(sweeper: S, interval: Duration, once: bool) -> Self {
        Self {
            sweeper,
            interval,
            once,
        }
    }

    /// Runs until shutdown is signaled (or after one sweep in `once` mode).
    #[instrument(skip(self, shutdown), fields(sweeper = self.sweeper.name()))]
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        info!(
            interval_secs = self.interval.as_secs(),
            once = self.once,
            "Starting sync worker"
        );

        if self.once {
            self.run_sweep(&shutdown).await;
            return;
        }

        let mut interval = tokio::time::interval(self.interval);
        // Don't sweep immediately on startup - wait for the first interval
        interval.tick().await;

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    self.run_sweep(&shutdown).await;
                }
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        info!("Sync worker shutting down");
                        break;
                    }
                }
            }
        }
    }

    async fn run_sweep(&mut self, shutdown: &watch::Receiver<bool>) {
        match self.sweeper.sweep(shutdown).await {
            Ok(stats) if stats.is_quiet() => {
                debug!("Sweep complete; store already converged");
            }
            Ok(stats) => {
                info!(
                    created = stats.created,
                    updated = stats.updated,
                    deleted = stats.deleted,
                    failed = stats.failed,
                    interrupted = stats.interrupted,
                    "Sweep complete"
                );
            }
            Err(e) => {
                error!(error = %e, "Sweep failed");
            }
        }
    }
}
