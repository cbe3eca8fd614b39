//! Repository trait for tier usage metrics.

use crate::domain::usage_event::TierUsageEvent;
use crate::domain::{Feature, Tier};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Aggregated usage count for one tier/feature/outcome combination.
#[derive(Debug, Clone, PartialEq)]
pub struct UsageSummary {
    pub tier: Tier,
    pub feature: Feature,
    pub allowed: bool,
    pub count: i64,
}

/// Sink for batches produced by [`crate::domain::usage_worker::run_usage_worker`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UsageRepository: Send + Sync {
    /// Persists a batch of usage events.
    ///
    /// Returns the number of stored events.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn record_batch(&self, events: Vec<TierUsageEvent>) -> Result<u64, AppError>;

    /// Aggregates usage since `since`, ordered by tier, feature and outcome.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn summary(&self, since: DateTime<Utc>) -> Result<Vec<UsageSummary>, AppError>;
}
