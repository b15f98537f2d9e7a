use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::domain::{TxStatus, TxStatusReport};
use crate::error::RouteError;
use crate::ports::RoutingServicePort;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackOptions {
    pub poll_interval: Duration,
    /// Unbounded when `None`.
    pub max_duration: Option<Duration>,
}

impl Default for TrackOptions {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_duration: None,
        }
    }
}

/// Registers a transaction with the status service and polls it to a terminal state.
#[derive(Debug)]
pub struct Tracker<'a, R: ?Sized> {
    routing: &'a R,
}

impl<'a, R: RoutingServicePort + ?Sized> Tracker<'a, R> {
    pub fn new(routing: &'a R) -> Self {
        Self { routing }
    }

    pub async fn track(
        &self,
        chain_id: &str,
        tx_hash: &str,
        options: &TrackOptions,
        cancel: Option<&CancellationToken>,
    ) -> Result<TxStatusReport, RouteError> {
        self.routing.track_transaction(chain_id, tx_hash).await?;
        info!(chain_id, tx_hash, "tracking transaction");

        let started = Instant::now();
        let deadline = options.max_duration.map(|max| started + max);
        let mut polls = 0u64;

        loop {
            if cancel.is_some_and(CancellationToken::is_cancelled) {
                warn!(chain_id, tx_hash, "tracking cancelled");
                return Err(RouteError::Cancelled);
            }

            let report = self.routing.transaction_status(chain_id, tx_hash).await?;
            polls += 1;
            debug!(chain_id, tx_hash, polls, state = %report.raw_state, "status poll");

            match report.status {
                TxStatus::Completed => return Ok(report),
                TxStatus::Failed => {
                    return Err(RouteError::TransferFailed {
                        chain_id: chain_id.to_owned(),
                        tx_hash: tx_hash.to_owned(),
                        state: report.raw_state,
                        reason: report.error,
                    })
                }
                TxStatus::Pending => {}
            }

            tokio::select! {
                biased;
                _ = wait_cancelled(cancel) => {
                    warn!(chain_id, tx_hash, "tracking cancelled");
                    return Err(RouteError::Cancelled);
                }
                _ = wait_deadline(deadline) => {
                    warn!(chain_id, tx_hash, polls, "tracking timed out");
                    return Err(RouteError::TrackingTimedOut {
                        chain_id: chain_id.to_owned(),
                        tx_hash: tx_hash.to_owned(),
                        elapsed: started.elapsed(),
                    });
                }
                _ = tokio::time::sleep(options.poll_interval) => {}
            }
        }
    }
}

async fn wait_cancelled(cancel: Option<&CancellationToken>) {
    match cancel {
        Some(token) => token.cancelled().await,
        None => std::future::pending().await,
    }
}

async fn wait_deadline(deadline: Option<Instant>) {
    match deadline {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}
