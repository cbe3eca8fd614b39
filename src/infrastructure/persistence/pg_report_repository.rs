//! PostgreSQL implementation of report repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;

use super::parse_column;
use crate::domain::entities::{NewReport, Report};
use crate::domain::repositories::ReportRepository;
use crate::error::AppError;

const REPORT_COLUMNS: &str =
    "id, user_id, evaluation_id, tier, format, title, storage_path, size_bytes, created_at";

#[derive(sqlx::FromRow)]
struct ReportRow {
    id: i64,
    user_id: i64,
    evaluation_id: i64,
    tier: String,
    format: String,
    title: String,
    storage_path: String,
    size_bytes: i64,
    created_at: DateTime<Utc>,
}

impl TryFrom<ReportRow> for Report {
    type Error = AppError;

    fn try_from(row: ReportRow) -> Result<Self, Self::Error> {
        Ok(Report {
            id: row.id,
            user_id: row.user_id,
            evaluation_id: row.evaluation_id,
            tier: parse_column("reports.tier", &row.tier)?,
            format: parse_column("reports.format", &row.format)?,
            title: row.title,
            storage_path: row.storage_path,
            size_bytes: row.size_bytes,
            created_at: row.created_at,
        })
    }
}

/// PostgreSQL repository for generated report metadata.
pub struct PgReportRepository {
    pool: Arc<PgPool>,
}

impl PgReportRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReportRepository for PgReportRepository {
    async fn create(&self, new_report: NewReport) -> Result<Report, AppError> {
        let row: ReportRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO reports (user_id, evaluation_id, tier, format, title, storage_path, size_bytes)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {REPORT_COLUMNS}
            "#
        ))
        .bind(new_report.user_id)
        .bind(new_report.evaluation_id)
        .bind(new_report.tier.as_str())
        .bind(new_report.format.as_str())
        .bind(&new_report.title)
        .bind(&new_report.storage_path)
        .bind(new_report.size_bytes)
        .fetch_one(self.pool.as_ref())
        .await?;

        row.try_into()
    }

    async fn find_by_id(&self, id: i64, user_id: i64) -> Result<Option<Report>, AppError> {
        let row: Option<ReportRow> = sqlx::query_as(&format!(
            "SELECT {REPORT_COLUMNS} FROM reports WHERE id = $1 AND user_id = $2"
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        row.map(Report::try_from).transpose()
    }

    async fn list(&self, user_id: i64) -> Result<Vec<Report>, AppError> {
        let rows: Vec<ReportRow> = sqlx::query_as(&format!(
            r#"
            SELECT {REPORT_COLUMNS}
            FROM reports
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            "#
        ))
        .bind(user_id)
        .fetch_all(self.pool.as_ref())
        .await?;

        rows.into_iter().map(Report::try_from).collect()
    }

    async fn count(&self, user_id: i64) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reports WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(count)
    }
}
