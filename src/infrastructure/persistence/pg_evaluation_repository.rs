//! PostgreSQL implementation of evaluation repository.
//!
//! Profile and computed outputs are stored as JSONB. Business name, industry,
//! valuation midpoint and health score are duplicated into plain columns so
//! the admin CLI can aggregate them without decoding JSON.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::types::Json;
use std::sync::Arc;

use crate::domain::entities::{
    BusinessProfile, Evaluation, EvaluationUpdate, HealthScore, NewEvaluation, Opportunity,
    ValuationResult,
};
use crate::domain::repositories::EvaluationRepository;
use crate::error::AppError;

const EVALUATION_COLUMNS: &str = "id, user_id, profile, valuation, health, opportunities, \
     narrative, created_at, updated_at, deleted_at";

#[derive(sqlx::FromRow)]
struct EvaluationRow {
    id: i64,
    user_id: i64,
    profile: Json<BusinessProfile>,
    valuation: Json<ValuationResult>,
    health: Json<HealthScore>,
    opportunities: Json<Vec<Opportunity>>,
    narrative: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

impl From<EvaluationRow> for Evaluation {
    fn from(row: EvaluationRow) -> Self {
        Evaluation {
            id: row.id,
            user_id: row.user_id,
            profile: row.profile.0,
            valuation: row.valuation.0,
            health: row.health.0,
            opportunities: row.opportunities.0,
            narrative: row.narrative,
            created_at: row.created_at,
            updated_at: row.updated_at,
            deleted_at: row.deleted_at,
        }
    }
}

/// PostgreSQL repository for evaluations.
pub struct PgEvaluationRepository {
    pool: Arc<PgPool>,
}

impl PgEvaluationRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

/// Inserts one evaluation and returns the stored row.
async fn insert_evaluation<'e, E>(
    executor: E,
    new_evaluation: NewEvaluation,
) -> Result<EvaluationRow, sqlx::Error>
where
    E: sqlx::PgExecutor<'e>,
{
    let NewEvaluation {
        user_id,
        profile,
        valuation,
        health,
        opportunities,
        narrative,
    } = new_evaluation;

    sqlx::query_as(&format!(
        r#"
        INSERT INTO evaluations (
            user_id, business_name, industry, profile, valuation, health,
            opportunities, valuation_mid, health_score, narrative
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        RETURNING {EVALUATION_COLUMNS}
        "#
    ))
    .bind(user_id)
    .bind(&profile.business_name)
    .bind(profile.industry.as_str())
    .bind(Json(&profile))
    .bind(Json(&valuation))
    .bind(Json(&health))
    .bind(Json(&opportunities))
    .bind(valuation.mid)
    .bind(health.overall)
    .bind(&narrative)
    .fetch_one(executor)
    .await
}

#[async_trait]
impl EvaluationRepository for PgEvaluationRepository {
    async fn create(&self, new_evaluation: NewEvaluation) -> Result<Evaluation, AppError> {
        let row = insert_evaluation(self.pool.as_ref(), new_evaluation).await?;
        Ok(row.into())
    }

    async fn create_within_quota(
        &self,
        new_evaluation: NewEvaluation,
        since: DateTime<Utc>,
        limit: i64,
    ) -> Result<Option<Evaluation>, AppError> {
        let user_id = new_evaluation.user_id;
        let mut tx = self.pool.begin().await?;

        // Held until commit or rollback; serializes one user's submissions.
        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        let used: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM evaluations WHERE user_id = $1 AND created_at >= $2",
        )
        .bind(user_id)
        .bind(since)
        .fetch_one(&mut *tx)
        .await?;

        if used >= limit {
            tx.rollback().await?;
            return Ok(None);
        }

        let row = insert_evaluation(&mut *tx, new_evaluation).await?;
        tx.commit().await?;
        Ok(Some(row.into()))
    }

    async fn find_by_id(&self, id: i64, user_id: i64) -> Result<Option<Evaluation>, AppError> {
        let row: Option<EvaluationRow> = sqlx::query_as(&format!(
            r#"
            SELECT {EVALUATION_COLUMNS}
            FROM evaluations
            WHERE id = $1 AND user_id = $2 AND deleted_at IS NULL
            "#
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(Evaluation::from))
    }

    async fn list(
        &self,
        user_id: i64,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Evaluation>, AppError> {
        let rows: Vec<EvaluationRow> = sqlx::query_as(&format!(
            r#"
            SELECT {EVALUATION_COLUMNS}
            FROM evaluations
            WHERE user_id = $1 AND deleted_at IS NULL
            ORDER BY created_at DESC, id DESC
            OFFSET $2
            LIMIT $3
            "#
        ))
        .bind(user_id)
        .bind(offset)
        .bind(limit)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.into_iter().map(Evaluation::from).collect())
    }

    async fn list_all(&self, user_id: i64) -> Result<Vec<Evaluation>, AppError> {
        let rows: Vec<EvaluationRow> = sqlx::query_as(&format!(
            r#"
            SELECT {EVALUATION_COLUMNS}
            FROM evaluations
            WHERE user_id = $1 AND deleted_at IS NULL
            ORDER BY created_at DESC, id DESC
            "#
        ))
        .bind(user_id)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.into_iter().map(Evaluation::from).collect())
    }

    async fn count(&self, user_id: i64) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM evaluations WHERE user_id = $1 AND deleted_at IS NULL",
        )
        .bind(user_id)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(count)
    }

    async fn count_created_since(
        &self,
        user_id: i64,
        since: DateTime<Utc>,
    ) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM evaluations WHERE user_id = $1 AND created_at >= $2",
        )
        .bind(user_id)
        .bind(since)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(count)
    }

    async fn update(
        &self,
        id: i64,
        user_id: i64,
        update: EvaluationUpdate,
    ) -> Result<Option<Evaluation>, AppError> {
        let EvaluationUpdate {
            profile,
            valuation,
            health,
            opportunities,
            narrative,
        } = update;

        let row: Option<EvaluationRow> = sqlx::query_as(&format!(
            r#"
            UPDATE evaluations
            SET business_name = $3,
                industry = $4,
                profile = $5,
                valuation = $6,
                health = $7,
                opportunities = $8,
                valuation_mid = $9,
                health_score = $10,
                narrative = $11,
                updated_at = NOW()
            WHERE id = $1 AND user_id = $2 AND deleted_at IS NULL
            RETURNING {EVALUATION_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(user_id)
        .bind(&profile.business_name)
        .bind(profile.industry.as_str())
        .bind(Json(&profile))
        .bind(Json(&valuation))
        .bind(Json(&health))
        .bind(Json(&opportunities))
        .bind(valuation.mid)
        .bind(health.overall)
        .bind(&narrative)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(Evaluation::from))
    }

    async fn soft_delete(&self, id: i64, user_id: i64) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE evaluations
            SET deleted_at = NOW()
            WHERE id = $1 AND user_id = $2 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .bind(user_id)
        .execute(self.pool.as_ref())
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
