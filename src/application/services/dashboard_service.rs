//! Cached dashboard aggregation.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::analysis::aggregate::{DashboardSummary, summarize};
use crate::domain::entities::User;
use crate::domain::repositories::{EvaluationRepository, ReportRepository, TicketRepository};
use crate::error::AppError;
use crate::infrastructure::cache::CacheService;

/// Cache key of the counter bumped whenever a user's dashboard data changes.
pub fn dashboard_version_key(user_id: i64) -> String {
    format!("dashboard:{user_id}:version")
}

/// Cache key of a user's dashboard summary at a data version.
pub fn dashboard_cache_key(user_id: i64, version: u64) -> String {
    format!("dashboard:{user_id}:v{version}")
}

/// Marks the user's cached dashboard as stale.
///
/// The version is bumped rather than the entry deleted, so a summary computed
/// before the change but stored after it lands under a key no reader uses.
pub async fn invalidate_dashboard(cache: &dyn CacheService, user_id: i64) {
    if let Err(e) = cache.increment(&dashboard_version_key(user_id)).await {
        warn!(user_id, error = %e, "Failed to invalidate dashboard cache");
    }
}

/// Builds the dashboard from evaluations, reports and tickets.
///
/// Summaries are cached per user and data version for `ttl_seconds`; services
/// that change the underlying data call [`invalidate_dashboard`].
pub struct DashboardService {
    evaluations: Arc<dyn EvaluationRepository>,
    reports: Arc<dyn ReportRepository>,
    tickets: Arc<dyn TicketRepository>,
    cache: Arc<dyn CacheService>,
    ttl_seconds: u64,
}

impl DashboardService {
    pub fn new(
        evaluations: Arc<dyn EvaluationRepository>,
        reports: Arc<dyn ReportRepository>,
        tickets: Arc<dyn TicketRepository>,
        cache: Arc<dyn CacheService>,
        ttl_seconds: u64,
    ) -> Self {
        Self {
            evaluations,
            reports,
            tickets,
            cache,
            ttl_seconds,
        }
    }

    /// Returns the user's dashboard, from cache when possible.
    ///
    /// The three sources are fetched concurrently. A failed report or ticket
    /// count degrades to 0; a failed evaluation fetch fails the request.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] if evaluations cannot be loaded.
    pub async fn summary(&self, user: &User) -> Result<DashboardSummary, AppError> {
        let version = self.current_version(user.id).await;
        let key = dashboard_cache_key(user.id, version);

        if let Ok(Some(cached)) = self.cache.get(&key).await {
            match serde_json::from_str::<DashboardSummary>(&cached) {
                Ok(summary) => {
                    debug!(user_id = user.id, "Dashboard cache hit");
                    return Ok(summary);
                }
                Err(e) => warn!(
                    user_id = user.id,
                    error = %e,
                    "Discarding malformed cached dashboard"
                ),
            }
        }

        let (evaluations, reports, tickets) = tokio::join!(
            self.evaluations.list_all(user.id),
            self.reports.count(user.id),
            self.tickets.count_open(user.id),
        );

        let evaluations = evaluations?;
        let total_reports = reports.unwrap_or_else(|e| {
            warn!(user_id = user.id, error = %e, "Report count unavailable for dashboard");
            0
        });
        let open_tickets = tickets.unwrap_or_else(|e| {
            warn!(user_id = user.id, error = %e, "Ticket count unavailable for dashboard");
            0
        });

        let summary = summarize(
            &evaluations,
            u64::try_from(total_reports).unwrap_or(0),
            u64::try_from(open_tickets).unwrap_or(0),
        );

        match serde_json::to_string(&summary) {
            Ok(json) => {
                let _ = self.cache.set(&key, &json, Some(self.ttl_seconds)).await;
            }
            Err(e) => warn!(error = %e, "Failed to serialize dashboard for cache"),
        }

        Ok(summary)
    }

    /// Current data version; 0 when unset or the cache is unavailable.
    async fn current_version(&self, user_id: i64) -> u64 {
        match self.cache.get(&dashboard_version_key(user_id)).await {
            Ok(Some(value)) => value.parse().unwrap_or(0),
            _ => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::assess;
    use crate::domain::Tier;
    use crate::domain::entities::Evaluation;
    use crate::domain::entities::evaluation::fixtures::healthy_tech;
    use crate::domain::repositories::{
        MockEvaluationRepository, MockReportRepository, MockTicketRepository,
    };
    use crate::infrastructure::cache::{CacheResult, MockCacheService};
    use chrono::Utc;
    use serde_json::json;

    fn user() -> User {
        User {
            id: 4,
            external_id: "idp|4".to_string(),
            email: "owner@example.com".to_string(),
            name: None,
            tier: Tier::Professional,
            created_at: Utc::now(),
        }
    }

    fn evaluation() -> Evaluation {
        let profile = healthy_tech();
        let a = assess(&profile);
        let now = Utc::now();
        Evaluation {
            id: 1,
            user_id: 4,
            profile,
            valuation: a.valuation,
            health: a.health,
            opportunities: a.opportunities,
            narrative: None,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    fn miss_cache() -> MockCacheService {
        let mut cache = MockCacheService::new();
        cache.expect_get().returning(|_| Ok(None));
        cache.expect_set().returning(|_, _, _| Ok(()));
        cache
    }

    fn service(
        evaluations: MockEvaluationRepository,
        reports: MockReportRepository,
        tickets: MockTicketRepository,
        cache: MockCacheService,
    ) -> DashboardService {
        DashboardService::new(
            Arc::new(evaluations),
            Arc::new(reports),
            Arc::new(tickets),
            Arc::new(cache),
            300,
        )
    }

    #[tokio::test]
    async fn test_summary_aggregates_sources() {
        let mut evaluations = MockEvaluationRepository::new();
        let mut reports = MockReportRepository::new();
        let mut tickets = MockTicketRepository::new();
        evaluations
            .expect_list_all()
            .returning(|_| Ok(vec![evaluation()]));
        reports.expect_count().returning(|_| Ok(2));
        tickets.expect_count_open().returning(|_| Ok(1));

        let mut cache = MockCacheService::new();
        cache.expect_get().returning(|_| Ok(None));
        cache
            .expect_set()
            .withf(|key, _, ttl| key == "dashboard:4:v0" && *ttl == Some(300))
            .times(1)
            .returning(|_, _, _| Ok(()));

        let summary = service(evaluations, reports, tickets, cache)
            .summary(&user())
            .await
            .unwrap();

        assert_eq!(summary.total_evaluations, 1);
        assert_eq!(summary.average_health_score, Some(83.4));
        assert_eq!(summary.total_reports, 2);
        assert_eq!(summary.open_tickets, 1);
    }

    #[tokio::test]
    async fn test_partial_failure_degrades_counts() {
        let mut evaluations = MockEvaluationRepository::new();
        let mut reports = MockReportRepository::new();
        let mut tickets = MockTicketRepository::new();
        evaluations.expect_list_all().returning(|_| Ok(vec![]));
        reports
            .expect_count()
            .returning(|_| Err(AppError::internal("Database error", json!({}))));
        tickets
            .expect_count_open()
            .returning(|_| Err(AppError::internal("Database error", json!({}))));

        let summary = service(evaluations, reports, tickets, miss_cache())
            .summary(&user())
            .await
            .unwrap();

        assert_eq!(summary.total_reports, 0);
        assert_eq!(summary.open_tickets, 0);
    }

    #[tokio::test]
    async fn test_evaluation_failure_fails_request() {
        let mut evaluations = MockEvaluationRepository::new();
        let mut reports = MockReportRepository::new();
        let mut tickets = MockTicketRepository::new();
        evaluations
            .expect_list_all()
            .returning(|_| Err(AppError::internal("Database error", json!({}))));
        reports.expect_count().returning(|_| Ok(0));
        tickets.expect_count_open().returning(|_| Ok(0));

        let mut cache = MockCacheService::new();
        cache.expect_get().returning(|_| Ok(None));
        cache.expect_set().never();

        let result = service(evaluations, reports, tickets, cache)
            .summary(&user())
            .await;
        assert!(matches!(result, Err(AppError::Internal { .. })));
    }

    #[tokio::test]
    async fn test_cache_hit_skips_repositories() {
        let cached = serde_json::to_string(&summarize(&[], 7, 0)).unwrap();

        let mut evaluations = MockEvaluationRepository::new();
        evaluations.expect_list_all().never();
        let mut cache = MockCacheService::new();
        cache
            .expect_get()
            .returning(move |_| Ok(Some(cached.clone())));

        let summary = service(
            evaluations,
            MockReportRepository::new(),
            MockTicketRepository::new(),
            cache,
        )
        .summary(&user())
        .await
        .unwrap();

        assert_eq!(summary.total_reports, 7);
    }

    #[test]
    fn test_cache_keys() {
        assert_eq!(dashboard_version_key(12), "dashboard:12:version");
        assert_eq!(dashboard_cache_key(12, 3), "dashboard:12:v3");
    }

    /// Cache that keeps values in a map, for checking versioning end to end.
    #[derive(Default)]
    struct MapCache(std::sync::Mutex<std::collections::HashMap<String, String>>);

    #[async_trait::async_trait]
    impl CacheService for MapCache {
        async fn get(&self, key: &str) -> CacheResult<Option<String>> {
            Ok(self.0.lock().unwrap().get(key).cloned())
        }

        async fn set(&self, key: &str, value: &str, _ttl: Option<u64>) -> CacheResult<()> {
            self.0
                .lock()
                .unwrap()
                .insert(key.to_string(), value.to_string());
            Ok(())
        }

        async fn increment(&self, key: &str) -> CacheResult<u64> {
            let mut map = self.0.lock().unwrap();
            let next = map.get(key).and_then(|v| v.parse::<u64>().ok()).unwrap_or(0) + 1;
            map.insert(key.to_string(), next.to_string());
            Ok(next)
        }

        async fn health_check(&self) -> bool {
            true
        }
    }

    #[tokio::test]
    async fn test_summary_stored_after_invalidation_is_not_served() {
        let mut evaluations = MockEvaluationRepository::new();
        let mut reports = MockReportRepository::new();
        let mut tickets = MockTicketRepository::new();
        evaluations
            .expect_list_all()
            .times(1)
            .returning(|_| Ok(vec![evaluation()]));
        reports.expect_count().returning(|_| Ok(2));
        tickets.expect_count_open().returning(|_| Ok(0));

        let cache = Arc::new(MapCache::default());
        let service = DashboardService::new(
            Arc::new(evaluations),
            Arc::new(reports),
            Arc::new(tickets),
            cache.clone(),
            300,
        );

        // A reader that started before the mutation stores its stale summary
        // under version 0 after the mutation bumped the version.
        invalidate_dashboard(cache.as_ref(), 4).await;
        let stale = serde_json::to_string(&summarize(&[], 0, 0)).unwrap();
        cache
            .set(&dashboard_cache_key(4, 0), &stale, None)
            .await
            .unwrap();

        let summary = service.summary(&user()).await.unwrap();
        assert_eq!(summary.total_evaluations, 1);
        assert_eq!(summary.total_reports, 2);

        let cached = service.summary(&user()).await.unwrap();
        assert_eq!(cached.total_evaluations, 1);
        assert!(cache.get("dashboard:4:v1").await.unwrap().is_some());
    }
}
