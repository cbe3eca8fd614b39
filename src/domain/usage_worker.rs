//! Tier usage metrics collection with batched, timed flushing.
//!
//! [`TierMetricsCollector`] is the cheap, cloneable handle used by request
//! handlers; [`run_usage_worker`] owns the buffer and writes batches to a
//! [`UsageRepository`].

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::time::MissedTickBehavior;
use tokio_retry::Retry;
use tokio_retry::strategy::{ExponentialBackoff, jitter};

use crate::domain::repositories::UsageRepository;
use crate::domain::usage_event::TierUsageEvent;

const FLUSH_ATTEMPTS: usize = 3;

/// Non-blocking producer side of the usage metrics pipeline.
#[derive(Clone)]
pub struct TierMetricsCollector {
    sender: mpsc::Sender<TierUsageEvent>,
}

impl TierMetricsCollector {
    /// Creates a collector and the receiver to hand to [`run_usage_worker`].
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<TierUsageEvent>) {
        let (sender, receiver) = mpsc::channel(capacity);
        (Self { sender }, receiver)
    }

    /// Queues an event without waiting.
    ///
    /// When the queue is full or the worker has stopped the event is dropped
    /// and counted in `tier_usage_events_dropped_total`.
    pub fn record(&self, event: TierUsageEvent) {
        match self.sender.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(event)) => {
                metrics::counter!("tier_usage_events_dropped_total").increment(1);
                tracing::warn!(
                    user_id = event.user_id,
                    feature = event.feature.as_str(),
                    "Usage queue full, dropping event"
                );
            }
            Err(TrySendError::Closed(_)) => {
                metrics::counter!("tier_usage_events_dropped_total").increment(1);
                tracing::warn!("Usage worker stopped, dropping event");
            }
        }
    }

    /// Returns true if the worker side has shut down.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    /// Remaining queue capacity.
    pub fn capacity(&self) -> usize {
        self.sender.capacity()
    }
}

/// Batching parameters for [`run_usage_worker`].
#[derive(Debug, Clone, Copy)]
pub struct UsageWorkerConfig {
    pub batch_size: usize,
    pub flush_interval: Duration,
}

/// Consumes usage events until every sender is dropped.
///
/// A batch is flushed when it reaches `batch_size` events or when
/// `flush_interval` elapses, whichever comes first. Remaining events are
/// flushed before the worker exits.
pub async fn run_usage_worker(
    mut rx: mpsc::Receiver<TierUsageEvent>,
    repository: Arc<dyn UsageRepository>,
    config: UsageWorkerConfig,
) {
    let batch_size = config.batch_size.max(1);
    let mut buffer: Vec<TierUsageEvent> = Vec::with_capacity(batch_size);

    let mut ticker = tokio::time::interval(config.flush_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately.
    ticker.tick().await;

    loop {
        tokio::select! {
            maybe_event = rx.recv() => match maybe_event {
                Some(event) => {
                    metrics::counter!(
                        "tier_usage_events_total",
                        "tier" => event.tier.as_str(),
                        "feature" => event.feature.as_str(),
                        "allowed" => if event.allowed { "true" } else { "false" }
                    )
                    .increment(1);

                    buffer.push(event);
                    if buffer.len() >= batch_size {
                        flush(repository.as_ref(), &mut buffer).await;
                    }
                }
                None => {
                    flush(repository.as_ref(), &mut buffer).await;
                    tracing::info!("Usage worker stopped");
                    break;
                }
            },
            _ = ticker.tick() => {
                flush(repository.as_ref(), &mut buffer).await;
            }
        }
    }
}

/// Writes the buffered events, retrying with exponential backoff.
///
/// A batch that still fails after the last attempt is discarded.
async fn flush(repository: &dyn UsageRepository, buffer: &mut Vec<TierUsageEvent>) {
    if buffer.is_empty() {
        return;
    }

    let batch = std::mem::take(buffer);
    let size = batch.len();

    let strategy = ExponentialBackoff::from_millis(10)
        .map(jitter)
        .take(FLUSH_ATTEMPTS - 1);

    let result = Retry::start(strategy, || repository.record_batch(batch.clone())).await;

    match result {
        Ok(stored) => tracing::debug!(stored, "Flushed usage events"),
        Err(e) => {
            metrics::counter!("tier_usage_flush_failures_total").increment(1);
            tracing::error!(error = %e, size, "Failed to flush usage events, batch discarded");
        }
    }
}
