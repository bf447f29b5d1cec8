//! Session expiry sweeper
//!
//! Background task that periodically removes expired sessions from a
//! [`SessionStore`]. It wakes on a short poll interval so a shutdown request
//! is noticed quickly, but only scans the map once per sweep interval.
//!
//! Shutdown goes through a `watch` channel; the task's `JoinHandle` is the
//! completion signal the owner awaits.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep};
use tracing::{debug, error, info};

use super::store::SessionStore;
use crate::config::SessionConfig;

/// Sweeper timing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepConfig {
    /// How often the task wakes to check for shutdown
    pub poll_interval: Duration,
    /// Minimum time between two full scans of the map
    pub sweep_interval: Duration,
}

impl SweepConfig {
    /// Poll every 100ms, sweep once per TTL window
    pub fn for_ttl(ttl: Duration) -> Self {
        Self {
            poll_interval: Duration::from_millis(100),
            sweep_interval: ttl,
        }
    }
}

impl From<&SessionConfig> for SweepConfig {
    fn from(config: &SessionConfig) -> Self {
        Self {
            poll_interval: Duration::from_millis(config.poll_interval_ms),
            sweep_interval: Duration::from_secs(config.sweep_interval_secs),
        }
    }
}

/// Handle to a running sweeper task
pub struct SessionSweeper {
    shutdown_tx: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl SessionSweeper {
    /// Spawn the sweeper on the current tokio runtime
    pub fn spawn(store: Arc<SessionStore>, config: SweepConfig) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = tokio::spawn(run(store, config, shutdown_rx));
        Self {
            shutdown_tx,
            handle,
        }
    }

    /// True once the task has exited
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Signal cancellation and wait for the task to exit
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(true);
        if let Err(e) = self.handle.await {
            error!(error = %e, "Session sweeper task failed");
        }
    }
}

async fn run(store: Arc<SessionStore>, config: SweepConfig, mut shutdown: watch::Receiver<bool>) {
    info!(
        poll_interval = ?config.poll_interval,
        sweep_interval = ?config.sweep_interval,
        ttl = ?store.ttl(),
        "Session sweeper started"
    );

    let mut last_sweep = Instant::now();

    loop {
        tokio::select! {
            _ = sleep(config.poll_interval) => {}
            // A dropped sender also ends the loop
            _ = shutdown.changed() => {
                info!("Session sweeper exiting");
                return;
            }
        }

        let now = Instant::now();
        if now.saturating_duration_since(last_sweep) < config.sweep_interval {
            continue;
        }
        last_sweep = now;

        let removed = store.sweep_expired(now);
        debug!(removed, remaining = store.len(), "Swept expired sessions");
    }
}
