//! Core domain entities representing the business data model.
//!
//! Entities are plain data structures. Values computed by the analysis
//! engines ([`ValuationResult`], [`HealthScore`], [`Opportunity`]) are stored
//! with the evaluation they belong to.
//!
//! # Entity Types
//!
//! - [`User`] - An account resolved from the identity provider
//! - [`Evaluation`] - Submitted business data plus its computed outputs
//! - [`Report`] - A generated HTML/PDF report file
//! - [`SupportTicket`] - A customer support request
//!
//! # Design Pattern
//!
//! Entities follow the "New Type" pattern with separate structs for creation:
//! - `NewUser`, `NewEvaluation`, `NewReport`, `NewSupportTicket` - For creating new records
//! - `EvaluationUpdate` - For re-evaluation of an existing record

pub mod assessment;
pub mod evaluation;
pub mod report;
pub mod support_ticket;
pub mod user;

pub use assessment::{
    Assessment, BenchmarkComparison, BenchmarkStanding, Effort, HealthGrade, HealthScore,
    MarketHealth, MarketOutlook, Opportunity, OpportunityCategory, Scenario, ValuationMethod,
    ValuationResult,
};
pub use evaluation::{
    BusinessProfile, CompetitivePosition, Evaluation, EvaluationUpdate, NewEvaluation,
    OwnerDependence,
};
pub use report::{NewReport, Report, ReportFormat, ReportSection};
pub use support_ticket::{
    NewSupportTicket, SupportTicket, TicketCategory, TicketPriority, TicketStatus,
};
pub use user::{NewUser, User};
