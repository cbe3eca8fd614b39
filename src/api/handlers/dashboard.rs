//! Handler for the dashboard endpoint.

use axum::{Extension, Json, extract::State};

use crate::analysis::aggregate::DashboardSummary;
use crate::domain::entities::User;
use crate::error::AppError;
use crate::state::AppState;

/// Returns the caller's aggregated dashboard.
///
/// # Endpoint
///
/// `GET /api/dashboard`
///
/// Served from cache when available; see
/// [`crate::application::services::DashboardService::summary`].
pub async fn dashboard_handler(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> Result<Json<DashboardSummary>, AppError> {
    let summary = state.dashboard_service.summary(&user).await?;
    Ok(Json(summary))
}
