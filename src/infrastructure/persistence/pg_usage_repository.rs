//! PostgreSQL implementation of usage repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;

use super::parse_column;
use crate::domain::repositories::{UsageRepository, UsageSummary};
use crate::domain::usage_event::TierUsageEvent;
use crate::error::AppError;

#[derive(sqlx::FromRow)]
struct SummaryRow {
    tier: String,
    feature: String,
    allowed: bool,
    count: i64,
}

/// PostgreSQL sink for tier usage events.
///
/// Batches are inserted with a single `UNNEST` statement.
pub struct PgUsageRepository {
    pool: Arc<PgPool>,
}

impl PgUsageRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UsageRepository for PgUsageRepository {
    async fn record_batch(&self, events: Vec<TierUsageEvent>) -> Result<u64, AppError> {
        if events.is_empty() {
            return Ok(0);
        }

        let mut user_ids = Vec::with_capacity(events.len());
        let mut tiers = Vec::with_capacity(events.len());
        let mut features = Vec::with_capacity(events.len());
        let mut allowed = Vec::with_capacity(events.len());
        let mut occurred_at = Vec::with_capacity(events.len());
        for event in &events {
            user_ids.push(event.user_id);
            tiers.push(event.tier.as_str());
            features.push(event.feature.as_str());
            allowed.push(event.allowed);
            occurred_at.push(event.occurred_at);
        }

        let result = sqlx::query(
            r#"
            INSERT INTO tier_usage_events (user_id, tier, feature, allowed, occurred_at)
            SELECT * FROM UNNEST($1::BIGINT[], $2::TEXT[], $3::TEXT[], $4::BOOLEAN[], $5::TIMESTAMPTZ[])
            "#,
        )
        .bind(&user_ids)
        .bind(&tiers)
        .bind(&features)
        .bind(&allowed)
        .bind(&occurred_at)
        .execute(self.pool.as_ref())
        .await?;

        Ok(result.rows_affected())
    }

    async fn summary(&self, since: DateTime<Utc>) -> Result<Vec<UsageSummary>, AppError> {
        let rows: Vec<SummaryRow> = sqlx::query_as(
            r#"
            SELECT tier, feature, allowed, COUNT(*) AS count
            FROM tier_usage_events
            WHERE occurred_at >= $1
            GROUP BY tier, feature, allowed
            ORDER BY tier, feature, allowed
            "#,
        )
        .bind(since)
        .fetch_all(self.pool.as_ref())
        .await?;

        rows.into_iter()
            .map(|row| {
                Ok(UsageSummary {
                    tier: parse_column("tier_usage_events.tier", &row.tier)?,
                    feature: parse_column("tier_usage_events.feature", &row.feature)?,
                    allowed: row.allowed,
                    count: row.count,
                })
            })
            .collect()
    }
}
