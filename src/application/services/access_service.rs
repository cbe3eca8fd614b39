//! Tier-based feature gating.

use serde_json::json;

use crate::domain::entities::{Opportunity, User};
use crate::domain::usage_event::TierUsageEvent;
use crate::domain::usage_worker::TierMetricsCollector;
use crate::domain::{Feature, Tier};
use crate::error::AppError;

/// Decides which features a user may use and records every decision.
#[derive(Clone)]
pub struct AccessService {
    collector: TierMetricsCollector,
}

impl AccessService {
    pub fn new(collector: TierMetricsCollector) -> Self {
        Self { collector }
    }

    /// Pure tier check; records nothing.
    pub fn has_feature(&self, tier: Tier, feature: Feature) -> bool {
        tier.has_feature(feature)
    }

    /// Checks access and records a usage event; never fails.
    pub fn check(&self, user: &User, feature: Feature) -> bool {
        let allowed = user.tier.has_feature(feature);
        self.collector
            .record(TierUsageEvent::new(user.id, user.tier, feature, allowed));
        allowed
    }

    /// Requires `feature`, recording a usage event either way.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Forbidden`] with `feature`, `current_tier` and
    /// `required_tier` details when the user's tier is too low.
    pub fn require(&self, user: &User, feature: Feature) -> Result<(), AppError> {
        if self.check(user, feature) {
            return Ok(());
        }

        let required = feature.minimum_tier();
        Err(AppError::forbidden(
            format!("This feature requires the {required} tier"),
            json!({
                "feature": feature,
                "current_tier": user.tier,
                "required_tier": required,
            }),
        ))
    }

    /// Truncates a priority-sorted opportunity list to what `tier` may see.
    pub fn visible_opportunities(
        &self,
        tier: Tier,
        mut opportunities: Vec<Opportunity>,
    ) -> Vec<Opportunity> {
        if let Some(limit) = tier.opportunity_limit() {
            opportunities.truncate(limit);
        }
        opportunities
    }

    /// Evaluations allowed per calendar month; `None` is unlimited.
    pub fn monthly_quota(&self, tier: Tier) -> Option<u32> {
        tier.monthly_evaluation_quota()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::assess;
    use crate::domain::entities::evaluation::fixtures::struggling_retail;
    use chrono::Utc;

    fn user(tier: Tier) -> User {
        User {
            id: 3,
            external_id: "idp|3".to_string(),
            email: "owner@example.com".to_string(),
            name: None,
            tier,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_require_records_usage() {
        let (collector, mut rx) = TierMetricsCollector::channel(10);
        let access = AccessService::new(collector);

        assert!(access.require(&user(Tier::Professional), Feature::PdfExport).is_ok());
        assert!(access.require(&user(Tier::Basic), Feature::PdfExport).is_err());

        let first = rx.recv().await.unwrap();
        assert!(first.allowed);
        assert_eq!(first.tier, Tier::Professional);

        let second = rx.recv().await.unwrap();
        assert!(!second.allowed);
        assert_eq!(second.feature, Feature::PdfExport);
    }

    #[test]
    fn test_forbidden_details() {
        let (collector, _rx) = TierMetricsCollector::channel(10);
        let access = AccessService::new(collector);

        let err = access
            .require(&user(Tier::Basic), Feature::ScenarioAnalysis)
            .unwrap_err();
        let info = err.to_error_info();

        assert_eq!(info.code, "forbidden");
        assert_eq!(info.details["feature"], "scenario_analysis");
        assert_eq!(info.details["current_tier"], "basic");
        assert_eq!(info.details["required_tier"], "enterprise");
    }

    #[test]
    fn test_require_works_when_worker_is_gone() {
        let (collector, rx) = TierMetricsCollector::channel(1);
        drop(rx);
        let access = AccessService::new(collector);

        assert!(access.require(&user(Tier::Enterprise), Feature::PrioritySupport).is_ok());
    }

    #[test]
    fn test_visible_opportunities() {
        let (collector, _rx) = TierMetricsCollector::channel(1);
        let access = AccessService::new(collector);
        let all = assess(&struggling_retail()).opportunities;
        assert_eq!(all.len(), 8);

        let basic = access.visible_opportunities(Tier::Basic, all.clone());
        assert_eq!(basic.len(), 3);
        assert_eq!(basic[0], all[0]);

        assert_eq!(access.visible_opportunities(Tier::Professional, all).len(), 8);
    }

    #[test]
    fn test_has_feature_and_quota() {
        let (collector, _rx) = TierMetricsCollector::channel(1);
        let access = AccessService::new(collector);

        assert!(access.has_feature(Tier::Professional, Feature::MarketAnalysis));
        assert!(!access.has_feature(Tier::Basic, Feature::MarketAnalysis));
        assert_eq!(access.monthly_quota(Tier::Basic), Some(3));
        assert_eq!(access.monthly_quota(Tier::Enterprise), None);
    }
}
