//! Handler for industry market health.

use axum::{Extension, Json, extract::State};
use serde_json::json;

use crate::analysis::market::analyze_market;
use crate::api::extract::ApiPath;
use crate::domain::entities::{MarketHealth, User};
use crate::domain::{Feature, Industry};
use crate::error::AppError;
use crate::state::AppState;

/// Returns the market health of an industry.
///
/// # Endpoint
///
/// `GET /api/market-health/{industry}`
///
/// # Errors
///
/// - **403 Forbidden**: caller's tier lacks `market_analysis`
/// - **400 Bad Request**: unknown industry
pub async fn market_health_handler(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    ApiPath(industry): ApiPath<String>,
) -> Result<Json<MarketHealth>, AppError> {
    state
        .access_service
        .require(&user, Feature::MarketAnalysis)?;

    let industry: Industry = industry.parse().map_err(|e: crate::domain::UnknownVariant| {
        AppError::bad_request(
            "Validation failed",
            json!([{ "field": "industry", "message": e.to_string() }]),
        )
    })?;

    Ok(Json(analyze_market(industry)))
}
