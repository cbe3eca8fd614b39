//! Business logic services for the application layer.

pub mod access_service;
pub mod auth_service;
pub mod dashboard_service;
pub mod evaluation_service;
pub mod report_service;
pub mod support_service;

pub use access_service::AccessService;
pub use auth_service::{AuthService, hash_token};
pub use dashboard_service::DashboardService;
pub use evaluation_service::{EvaluationService, QuotaUsage};
pub use report_service::{GenerateReport, ReportService, ReportTemplate};
pub use support_service::SupportService;
