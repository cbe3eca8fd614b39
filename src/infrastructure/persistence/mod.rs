//! PostgreSQL repository implementations.
//!
//! Concrete implementations of domain repository traits using SQLx. Queries are
//! checked at runtime and mapped through `FromRow` row structs; enum columns
//! are stored as text and parsed on the way out.
//!
//! # Repositories
//!
//! - [`PgUserRepository`] - Accounts and tiers
//! - [`PgTokenRepository`] - API token storage and validation
//! - [`PgEvaluationRepository`] - Evaluations with JSONB payloads
//! - [`PgReportRepository`] - Generated report metadata
//! - [`PgTicketRepository`] - Support tickets
//! - [`PgUsageRepository`] - Batched tier usage events

pub mod pg_evaluation_repository;
pub mod pg_report_repository;
pub mod pg_ticket_repository;
pub mod pg_token_repository;
pub mod pg_usage_repository;
pub mod pg_user_repository;

pub use pg_evaluation_repository::PgEvaluationRepository;
pub use pg_report_repository::PgReportRepository;
pub use pg_ticket_repository::PgTicketRepository;
pub use pg_token_repository::PgTokenRepository;
pub use pg_usage_repository::PgUsageRepository;
pub use pg_user_repository::PgUserRepository;

use std::str::FromStr;

use serde_json::json;

use crate::error::AppError;

/// Parses a text column into a domain enum.
///
/// A value the domain does not know means the row was written by something
/// else, so it surfaces as an internal error.
pub(crate) fn parse_column<T>(column: &'static str, value: &str) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.parse().map_err(|e: T::Err| {
        AppError::internal(
            "Corrupt column value",
            json!({ "column": column, "reason": e.to_string() }),
        )
    })
}
