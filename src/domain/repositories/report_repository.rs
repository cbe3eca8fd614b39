//! Repository trait for generated report metadata.

use crate::domain::entities::{NewReport, Report};
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for report records.
///
/// Report files themselves are kept by
/// [`crate::infrastructure::storage::ReportStorage`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReportRepository: Send + Sync {
    /// Records a generated report.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the evaluation does not exist.
    /// Returns [`AppError::Internal`] on database errors.
    async fn create(&self, new_report: NewReport) -> Result<Report, AppError>;

    /// Finds a report owned by `user_id`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn find_by_id(&self, id: i64, user_id: i64) -> Result<Option<Report>, AppError>;

    /// Lists a user's reports, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn list(&self, user_id: i64) -> Result<Vec<Report>, AppError>;

    /// Counts a user's reports.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn count(&self, user_id: i64) -> Result<i64, AppError>;
}
