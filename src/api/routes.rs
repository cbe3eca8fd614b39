//! API route configuration.
//!
//! All API endpoints require Bearer token authentication via
//! [`crate::api::middleware::auth`].

use crate::api::handlers::{
    create_evaluation_handler, create_ticket_handler, dashboard_handler,
    delete_evaluation_handler, download_report_handler, export_evaluations_handler,
    generate_report_handler, get_evaluation_handler, list_evaluations_handler,
    list_reports_handler, list_tickets_handler, market_health_handler, me_handler,
    report_templates_handler, update_evaluation_handler,
};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

/// All API routes, protected by Bearer token authentication.
///
/// # Endpoints
///
/// - `GET    /me`                        - Caller profile, features and quota
/// - `GET    /evaluations`               - List evaluations (paginated)
/// - `POST   /evaluations`               - Submit business data for evaluation
/// - `GET    /evaluations/export`        - CSV export (professional+)
/// - `GET    /evaluations/{id}`          - Fetch one evaluation
/// - `PUT    /evaluations/{id}`          - Re-evaluate with new data
/// - `DELETE /evaluations/{id}`          - Soft-delete an evaluation
/// - `GET    /market-health/{industry}`  - Industry market analysis (professional+)
/// - `GET    /dashboard`                 - Aggregated dashboard summary
/// - `GET    /reports/templates`         - Report templates and availability
/// - `GET    /reports`                   - List generated reports
/// - `POST   /reports/{tier}`            - Generate a report of the given tier
/// - `GET    /reports/{id}/download`     - Download a report file
/// - `GET    /support/tickets`           - List support tickets
/// - `POST   /support/tickets`           - Open a support ticket
pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .route("/me", get(me_handler))
        .route(
            "/evaluations",
            get(list_evaluations_handler).post(create_evaluation_handler),
        )
        .route("/evaluations/export", get(export_evaluations_handler))
        .route(
            "/evaluations/{id}",
            get(get_evaluation_handler)
                .put(update_evaluation_handler)
                .delete(delete_evaluation_handler),
        )
        .route("/market-health/{industry}", get(market_health_handler))
        .route("/dashboard", get(dashboard_handler))
        .route("/reports/templates", get(report_templates_handler))
        .route("/reports", get(list_reports_handler))
        // `{id}` carries the tier name on POST; matchit needs one name per position.
        .route("/reports/{id}", post(generate_report_handler))
        .route("/reports/{id}/download", get(download_report_handler))
        .route(
            "/support/tickets",
            get(list_tickets_handler).post(create_ticket_handler),
        )
}
