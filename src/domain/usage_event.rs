//! Tier usage event model for asynchronous usage metrics.

use chrono::{DateTime, Utc};

use crate::domain::{Feature, Tier};

/// An in-memory record of a tier-gated feature check.
///
/// Created by [`crate::application::services::AccessService`] on every gated
/// request and passed to [`crate::domain::usage_worker::run_usage_worker`]
/// through a bounded channel, so recording never delays the response.
#[derive(Debug, Clone, PartialEq)]
pub struct TierUsageEvent {
    pub user_id: i64,
    pub tier: Tier,
    pub feature: Feature,
    pub allowed: bool,
    pub occurred_at: DateTime<Utc>,
}

impl TierUsageEvent {
    /// Creates an event stamped with the current time.
    pub fn new(user_id: i64, tier: Tier, feature: Feature, allowed: bool) -> Self {
        Self {
            user_id,
            tier,
            feature,
            allowed,
            occurred_at: Utc::now(),
        }
    }
}
