//! Repository trait for business evaluations.

use crate::domain::entities::{Evaluation, EvaluationUpdate, NewEvaluation};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Repository interface for evaluations.
///
/// All lookups are scoped to the owning user; soft-deleted evaluations are
/// invisible to every method except [`EvaluationRepository::count_created_since`].
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgEvaluationRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::memory::MemoryStore`] - In-memory implementation
/// - Test mocks available with `cfg(test)`
///
/// # Examples
///
/// See integration tests: `tests/repository_evaluation.rs`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EvaluationRepository: Send + Sync {
    /// Stores a new evaluation.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn create(&self, new_evaluation: NewEvaluation) -> Result<Evaluation, AppError>;

    /// Stores a new evaluation unless the user already created `limit`
    /// evaluations at or after `since`, deleted ones included.
    ///
    /// The count and the insert are atomic with respect to other submissions
    /// of the same user.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(Evaluation))` with the stored record
    /// - `Ok(None)` if the quota is already used up
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn create_within_quota(
        &self,
        new_evaluation: NewEvaluation,
        since: DateTime<Utc>,
        limit: i64,
    ) -> Result<Option<Evaluation>, AppError>;

    /// Finds a live evaluation owned by `user_id`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn find_by_id(&self, id: i64, user_id: i64) -> Result<Option<Evaluation>, AppError>;

    /// Lists live evaluations, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn list(&self, user_id: i64, offset: i64, limit: i64)
    -> Result<Vec<Evaluation>, AppError>;

    /// Lists every live evaluation of a user, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn list_all(&self, user_id: i64) -> Result<Vec<Evaluation>, AppError>;

    /// Counts live evaluations.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn count(&self, user_id: i64) -> Result<i64, AppError>;

    /// Counts evaluations created at or after `since`, including deleted ones.
    ///
    /// Used for monthly quota enforcement.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn count_created_since(
        &self,
        user_id: i64,
        since: DateTime<Utc>,
    ) -> Result<i64, AppError>;

    /// Replaces profile and computed outputs of a live evaluation.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(Evaluation))` with the updated record
    /// - `Ok(None)` if no live evaluation matches
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn update(
        &self,
        id: i64,
        user_id: i64,
        update: EvaluationUpdate,
    ) -> Result<Option<Evaluation>, AppError>;

    /// Soft-deletes a live evaluation.
    ///
    /// Returns `false` if nothing matched (missing or already deleted).
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn soft_delete(&self, id: i64, user_id: i64) -> Result<bool, AppError>;
}
