#![allow(dead_code)]

use axum_test::TestServer;
use bizval::application::services::hash_token;
use bizval::domain::Tier;
use bizval::domain::entities::{NewUser, User};
use bizval::domain::usage_event::TierUsageEvent;
use bizval::domain::usage_worker::TierMetricsCollector;
use bizval::infrastructure::cache::NullCache;
use bizval::infrastructure::memory::MemoryStore;
use bizval::infrastructure::storage::ReportStorage;
use bizval::routes::router;
use bizval::state::{AppState, Repositories, StateOptions};
use serde_json::{Value, json};
use sqlx::PgPool;
use std::sync::Arc;
use tempfile::TempDir;
use tokio::sync::mpsc;

pub const SIGNING_SECRET: &str = "test-signing-secret";

/// A running in-process app with one authenticated user.
pub struct TestApp {
    pub server: TestServer,
    pub state: AppState,
    pub repositories: Repositories,
    pub user: User,
    pub token: String,
    pub usage_rx: mpsc::Receiver<TierUsageEvent>,
    reports_dir: TempDir,
}

impl TestApp {
    /// Registers another user with its own token.
    pub async fn add_user(&self, email: &str, tier: Tier) -> (User, String) {
        create_user(&self.repositories, email, tier).await
    }

    pub fn reports_dir(&self) -> &std::path::Path {
        self.reports_dir.path()
    }
}

pub fn create_test_state(
    repositories: Repositories,
    reports_dir: &TempDir,
) -> (AppState, mpsc::Receiver<TierUsageEvent>) {
    let (collector, rx) = TierMetricsCollector::channel(1000);

    let state = AppState::new(
        repositories,
        StateOptions {
            cache: Arc::new(NullCache::new()),
            collector,
            storage: ReportStorage::new(reports_dir.path()),
            llm: None,
            token_signing_secret: SIGNING_SECRET.to_string(),
            cache_ttl_seconds: 60,
        },
    );

    (state, rx)
}

pub async fn create_user(repositories: &Repositories, email: &str, tier: Tier) -> (User, String) {
    let user = repositories
        .users
        .create(NewUser {
            external_id: format!("test|{email}"),
            email: email.to_string(),
            name: Some("Test Owner".to_string()),
            tier,
        })
        .await
        .unwrap();

    let token = format!("token-{}-{}", user.id, tier);
    repositories
        .tokens
        .create_token(user.id, "test", &hash_token(SIGNING_SECRET, &token))
        .await
        .unwrap();

    (user, token)
}

/// Builds the full router over the in-memory backend.
pub async fn spawn_app(tier: Tier) -> TestApp {
    let repositories = Repositories::memory(Arc::new(MemoryStore::new()));
    spawn_app_with(repositories, tier).await
}

/// Same as [`spawn_app`] over PostgreSQL.
pub async fn spawn_pg_app(pool: PgPool, tier: Tier) -> TestApp {
    spawn_app_with(Repositories::postgres(Arc::new(pool)), tier).await
}

async fn spawn_app_with(repositories: Repositories, tier: Tier) -> TestApp {
    let reports_dir = tempfile::tempdir().unwrap();
    let (state, usage_rx) = create_test_state(repositories.clone(), &reports_dir);
    let (user, token) = create_user(&repositories, "owner@example.com", tier).await;

    let server = TestServer::new(router(state.clone())).unwrap();

    TestApp {
        server,
        state,
        repositories,
        user,
        token,
        usage_rx,
        reports_dir,
    }
}

/// A profile that scores poorly and triggers every opportunity rule.
pub fn struggling_retail() -> Value {
    json!({
        "business_name": "Corner Goods",
        "industry": "retail",
        "annual_revenue": 2000000,
        "ebitda": 100000,
        "net_income": -20000,
        "total_assets": 400000,
        "total_liabilities": 380000,
        "gross_margin_pct": 25,
        "revenue_growth_pct": -3,
        "recurring_revenue_pct": 5,
        "customer_concentration_pct": 45,
        "customer_retention_pct": 60,
        "employee_count": 25,
        "years_in_business": 2,
        "owner_dependence": "high",
        "competitive_position": "weak"
    })
}

pub fn healthy_tech() -> Value {
    json!({
        "business_name": "Acme Analytics",
        "industry": "technology",
        "annual_revenue": 1000000,
        "ebitda": 200000,
        "net_income": 150000,
        "total_assets": 500000,
        "total_liabilities": 200000,
        "gross_margin_pct": 70,
        "revenue_growth_pct": 20,
        "recurring_revenue_pct": 60,
        "customer_concentration_pct": 15,
        "customer_retention_pct": 90,
        "employee_count": 8,
        "years_in_business": 6,
        "owner_dependence": "low",
        "competitive_position": "strong"
    })
}

/// Submits an evaluation and returns its id.
pub async fn create_evaluation(app: &TestApp, body: &Value) -> i64 {
    let response = app
        .server
        .post("/api/evaluations")
        .authorization_bearer(&app.token)
        .json(body)
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);
    response.json::<Value>()["id"].as_i64().unwrap()
}
