//! Repository trait definitions for the domain layer.
//!
//! This module defines the repository interfaces (traits) that abstract data access
//! operations following the Repository pattern. These traits are implemented by
//! concrete repositories in the infrastructure layer.
//!
//! # Architecture
//!
//! - Traits define the contract for data operations
//! - PostgreSQL implementations live in `crate::infrastructure::persistence`
//! - In-memory implementations live in `crate::infrastructure::memory`
//! - Mock implementations are auto-generated via `mockall` for testing
//!
//! # Available Repositories
//!
//! - [`UserRepository`] - Accounts and subscription tiers
//! - [`TokenRepository`] - API token authentication
//! - [`EvaluationRepository`] - Business evaluations
//! - [`ReportRepository`] - Generated report metadata
//! - [`TicketRepository`] - Support tickets
//! - [`UsageRepository`] - Tier usage metrics
//!
//! # Testing
//!
//! See integration tests in `tests/repository_*.rs` for usage examples.

pub mod evaluation_repository;
pub mod report_repository;
pub mod ticket_repository;
pub mod token_repository;
pub mod usage_repository;
pub mod user_repository;

pub use evaluation_repository::EvaluationRepository;
pub use report_repository::ReportRepository;
pub use ticket_repository::TicketRepository;
pub use token_repository::{ApiToken, TokenRepository};
pub use usage_repository::{UsageRepository, UsageSummary};
pub use user_repository::UserRepository;

#[cfg(test)]
pub use evaluation_repository::MockEvaluationRepository;
#[cfg(test)]
pub use report_repository::MockReportRepository;
#[cfg(test)]
pub use ticket_repository::MockTicketRepository;
#[cfg(test)]
pub use token_repository::MockTokenRepository;
#[cfg(test)]
pub use usage_repository::MockUsageRepository;
#[cfg(test)]
pub use user_repository::MockUserRepository;
