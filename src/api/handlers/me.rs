//! Handler for the current-user endpoint.

use axum::{Extension, Json, extract::State};

use crate::api::dto::me::MeResponse;
use crate::domain::entities::User;
use crate::error::AppError;
use crate::state::AppState;

/// Returns the caller's profile, tier, enabled features and quota usage.
///
/// # Endpoint
///
/// `GET /api/me`
pub async fn me_handler(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> Result<Json<MeResponse>, AppError> {
    let quota = state.evaluation_service.quota_usage(&user).await?;
    Ok(Json(MeResponse::new(user, quota)))
}
