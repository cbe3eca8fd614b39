//! Application layer services implementing business logic.
//!
//! Services orchestrate the analysis engines, repositories, cache and report
//! rendering. They consume repository traits and provide a clean API for
//! HTTP handlers.
//!
//! # Available Services
//!
//! - [`services::AccessService`] - Tier feature gating and usage recording
//! - [`services::AuthService`] - API token authentication
//! - [`services::EvaluationService`] - Evaluations, quotas, narratives and CSV export
//! - [`services::DashboardService`] - Cached per-user aggregates
//! - [`services::ReportService`] - Report templates, generation and download
//! - [`services::SupportService`] - Support tickets

pub mod services;
