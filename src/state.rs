//! Shared application state injected into every handler.

use std::sync::Arc;

use sqlx::PgPool;

use crate::application::services::{
    AccessService, AuthService, DashboardService, EvaluationService, ReportService,
    SupportService,
};
use crate::domain::repositories::{
    EvaluationRepository, ReportRepository, TicketRepository, TokenRepository, UsageRepository,
    UserRepository,
};
use crate::domain::usage_worker::TierMetricsCollector;
use crate::infrastructure::cache::CacheService;
use crate::infrastructure::memory::MemoryStore;
use crate::infrastructure::narrative::NarrativeGenerator;
use crate::infrastructure::persistence::{
    PgEvaluationRepository, PgReportRepository, PgTicketRepository, PgTokenRepository,
    PgUsageRepository, PgUserRepository,
};
use crate::infrastructure::storage::ReportStorage;

/// One implementation of every repository trait.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub tokens: Arc<dyn TokenRepository>,
    pub evaluations: Arc<dyn EvaluationRepository>,
    pub reports: Arc<dyn ReportRepository>,
    pub tickets: Arc<dyn TicketRepository>,
    pub usage: Arc<dyn UsageRepository>,
}

impl Repositories {
    /// PostgreSQL-backed repositories sharing one pool.
    pub fn postgres(pool: Arc<PgPool>) -> Self {
        Self {
            users: Arc::new(PgUserRepository::new(pool.clone())),
            tokens: Arc::new(PgTokenRepository::new(pool.clone())),
            evaluations: Arc::new(PgEvaluationRepository::new(pool.clone())),
            reports: Arc::new(PgReportRepository::new(pool.clone())),
            tickets: Arc::new(PgTicketRepository::new(pool.clone())),
            usage: Arc::new(PgUsageRepository::new(pool)),
        }
    }

    /// Repositories backed by one shared [`MemoryStore`].
    pub fn memory(store: Arc<MemoryStore>) -> Self {
        Self {
            users: store.clone(),
            tokens: store.clone(),
            evaluations: store.clone(),
            reports: store.clone(),
            tickets: store.clone(),
            usage: store,
        }
    }
}

/// Everything [`AppState::new`] needs besides the repositories.
pub struct StateOptions {
    pub cache: Arc<dyn CacheService>,
    pub collector: TierMetricsCollector,
    pub storage: ReportStorage,
    pub llm: Option<Arc<dyn NarrativeGenerator>>,
    pub token_signing_secret: String,
    pub cache_ttl_seconds: u64,
}

#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<AuthService>,
    pub access_service: AccessService,
    pub evaluation_service: Arc<EvaluationService>,
    pub dashboard_service: Arc<DashboardService>,
    pub report_service: Arc<ReportService>,
    pub support_service: Arc<SupportService>,
    pub users: Arc<dyn UserRepository>,
    pub cache: Arc<dyn CacheService>,
    pub usage_collector: TierMetricsCollector,
}

impl AppState {
    /// Wires the services over `repositories`.
    pub fn new(repositories: Repositories, options: StateOptions) -> Self {
        let StateOptions {
            cache,
            collector,
            storage,
            llm,
            token_signing_secret,
            cache_ttl_seconds,
        } = options;
        let access = AccessService::new(collector.clone());

        let auth_service = Arc::new(AuthService::new(
            repositories.tokens.clone(),
            repositories.users.clone(),
            token_signing_secret,
        ));
        let evaluation_service = Arc::new(EvaluationService::new(
            repositories.evaluations.clone(),
            access.clone(),
            cache.clone(),
            llm,
        ));
        let dashboard_service = Arc::new(DashboardService::new(
            repositories.evaluations.clone(),
            repositories.reports.clone(),
            repositories.tickets.clone(),
            cache.clone(),
            cache_ttl_seconds,
        ));
        let report_service = Arc::new(ReportService::new(
            repositories.reports.clone(),
            repositories.evaluations.clone(),
            storage,
            access.clone(),
            cache.clone(),
        ));
        let support_service = Arc::new(SupportService::new(
            repositories.tickets.clone(),
            cache.clone(),
        ));

        Self {
            auth_service,
            access_service: access,
            evaluation_service,
            dashboard_service,
            report_service,
            support_service,
            users: repositories.users,
            cache,
            usage_collector: collector,
        }
    }
}
