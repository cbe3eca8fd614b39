//! PostgreSQL implementation of support ticket repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;

use super::parse_column;
use crate::domain::entities::{NewSupportTicket, SupportTicket, TicketStatus};
use crate::domain::repositories::TicketRepository;
use crate::error::AppError;

const TICKET_COLUMNS: &str = "id, user_id, subject, message, category, priority, status, created_at";

#[derive(sqlx::FromRow)]
struct TicketRow {
    id: i64,
    user_id: i64,
    subject: String,
    message: String,
    category: String,
    priority: String,
    status: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<TicketRow> for SupportTicket {
    type Error = AppError;

    fn try_from(row: TicketRow) -> Result<Self, Self::Error> {
        Ok(SupportTicket {
            id: row.id,
            user_id: row.user_id,
            subject: row.subject,
            message: row.message,
            category: parse_column("support_tickets.category", &row.category)?,
            priority: parse_column("support_tickets.priority", &row.priority)?,
            status: parse_column("support_tickets.status", &row.status)?,
            created_at: row.created_at,
        })
    }
}

/// PostgreSQL repository for support tickets.
pub struct PgTicketRepository {
    pool: Arc<PgPool>,
}

impl PgTicketRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TicketRepository for PgTicketRepository {
    async fn create(&self, new_ticket: NewSupportTicket) -> Result<SupportTicket, AppError> {
        let row: TicketRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO support_tickets (user_id, subject, message, category, priority, status)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {TICKET_COLUMNS}
            "#
        ))
        .bind(new_ticket.user_id)
        .bind(&new_ticket.subject)
        .bind(&new_ticket.message)
        .bind(new_ticket.category.as_str())
        .bind(new_ticket.priority.as_str())
        .bind(TicketStatus::Open.as_str())
        .fetch_one(self.pool.as_ref())
        .await?;

        row.try_into()
    }

    async fn list(&self, user_id: i64) -> Result<Vec<SupportTicket>, AppError> {
        let rows: Vec<TicketRow> = sqlx::query_as(&format!(
            r#"
            SELECT {TICKET_COLUMNS}
            FROM support_tickets
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            "#
        ))
        .bind(user_id)
        .fetch_all(self.pool.as_ref())
        .await?;

        rows.into_iter().map(SupportTicket::try_from).collect()
    }

    async fn count_open(&self, user_id: i64) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM support_tickets
            WHERE user_id = $1 AND status IN ('open', 'in_progress')
            "#,
        )
        .bind(user_id)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(count)
    }
}
