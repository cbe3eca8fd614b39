//! Repository trait for support tickets.

use crate::domain::entities::{NewSupportTicket, SupportTicket};
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for support tickets.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TicketRepository: Send + Sync {
    /// Opens a ticket with status `open`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn create(&self, new_ticket: NewSupportTicket) -> Result<SupportTicket, AppError>;

    /// Lists a user's tickets, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn list(&self, user_id: i64) -> Result<Vec<SupportTicket>, AppError>;

    /// Counts tickets that are open or in progress.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn count_open(&self, user_id: i64) -> Result<i64, AppError>;
}
