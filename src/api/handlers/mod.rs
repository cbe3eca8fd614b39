//! HTTP request handlers for API endpoints.
//!
//! Each handler module corresponds to a logical grouping of endpoints.
//! Authenticated handlers receive the caller as `Extension<User>`, inserted
//! by [`crate::api::middleware::auth`].

pub mod dashboard;
pub mod evaluations;
pub mod health;
pub mod market;
pub mod me;
pub mod reports;
pub mod support;

pub use dashboard::dashboard_handler;
pub use evaluations::{
    create_evaluation_handler, delete_evaluation_handler, export_evaluations_handler,
    get_evaluation_handler, list_evaluations_handler, update_evaluation_handler,
};
pub use health::health_handler;
pub use market::market_health_handler;
pub use me::me_handler;
pub use reports::{
    download_report_handler, generate_report_handler, list_reports_handler,
    report_templates_handler,
};
pub use support::{create_ticket_handler, list_tickets_handler};
