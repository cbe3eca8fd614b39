//! Handlers for evaluation endpoints.

use axum::{
    Extension, Json,
    extract::State,
    http::{StatusCode, header},
    response::IntoResponse,
};
use serde_json::json;

use crate::api::dto::evaluation::{EvaluationRequest, EvaluationResponse};
use crate::api::dto::pagination::{Page, PaginationParams};
use crate::api::extract::{ApiPath, ApiQuery, ValidatedJson};
use crate::domain::entities::{BusinessProfile, Evaluation, User};
use crate::error::AppError;
use crate::state::AppState;

/// Converts a validated payload into a domain profile.
fn into_profile(payload: EvaluationRequest) -> Result<BusinessProfile, AppError> {
    payload
        .into_profile()
        .ok_or_else(|| AppError::bad_request("Validation failed", json!([])))
}

/// Hides opportunities beyond the caller's tier limit.
fn to_response(state: &AppState, user: &User, evaluation: Evaluation) -> EvaluationResponse {
    let visible = state
        .access_service
        .visible_opportunities(user.tier, evaluation.opportunities.clone());
    EvaluationResponse::new(evaluation, visible)
}

/// Submits business data for evaluation.
///
/// # Endpoint
///
/// `POST /api/evaluations`
///
/// # Request Body
///
/// ```json
/// {
///   "business_name": "Acme Analytics",
///   "industry": "technology",
///   "annual_revenue": 1000000,
///   "ebitda": 200000,
///   "net_income": 150000,
///   "total_assets": 500000,
///   "total_liabilities": 200000,
///   "gross_margin_pct": 70,
///   "revenue_growth_pct": 20,
///   "recurring_revenue_pct": 60,
///   "customer_concentration_pct": 15,
///   "customer_retention_pct": 90,
///   "employee_count": 8,
///   "years_in_business": 6,
///   "owner_dependence": "low",
///   "competitive_position": "strong"
/// }
/// ```
///
/// # Errors
///
/// - **400 Bad Request**: validation failed (details per field)
/// - **403 Forbidden**: monthly evaluation quota exhausted
pub async fn create_evaluation_handler(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    ValidatedJson(payload): ValidatedJson<EvaluationRequest>,
) -> Result<(StatusCode, Json<EvaluationResponse>), AppError> {
    let profile = into_profile(payload)?;
    let evaluation = state.evaluation_service.submit(&user, profile).await?;
    Ok((
        StatusCode::CREATED,
        Json(to_response(&state, &user, evaluation)),
    ))
}

/// Lists the caller's evaluations, newest first.
///
/// # Endpoint
///
/// `GET /api/evaluations?page=1&page_size=20`
pub async fn list_evaluations_handler(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    ApiQuery(params): ApiQuery<PaginationParams>,
) -> Result<Json<Page<EvaluationResponse>>, AppError> {
    let (page, page_size) = params.resolve()?;
    let (evaluations, total) = state
        .evaluation_service
        .list(&user, page, page_size)
        .await?;

    let items = evaluations
        .into_iter()
        .map(|e| to_response(&state, &user, e))
        .collect();

    Ok(Json(Page {
        items,
        page,
        page_size,
        total,
    }))
}

/// # Endpoint
///
/// `GET /api/evaluations/{id}`
///
/// # Errors
///
/// - **404 Not Found**: missing, deleted, or owned by another user
pub async fn get_evaluation_handler(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<EvaluationResponse>, AppError> {
    let evaluation = state.evaluation_service.get(&user, id).await?;
    Ok(Json(to_response(&state, &user, evaluation)))
}

/// Re-evaluates with new business data.
///
/// # Endpoint
///
/// `PUT /api/evaluations/{id}`
pub async fn update_evaluation_handler(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    ApiPath(id): ApiPath<i64>,
    ValidatedJson(payload): ValidatedJson<EvaluationRequest>,
) -> Result<Json<EvaluationResponse>, AppError> {
    let profile = into_profile(payload)?;
    let evaluation = state.evaluation_service.update(&user, id, profile).await?;
    Ok(Json(to_response(&state, &user, evaluation)))
}

/// Soft-deletes an evaluation.
///
/// # Endpoint
///
/// `DELETE /api/evaluations/{id}`
///
/// # Response Codes
///
/// - **204 No Content**: deleted
/// - **404 Not Found**: missing or already deleted
pub async fn delete_evaluation_handler(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    ApiPath(id): ApiPath<i64>,
) -> Result<StatusCode, AppError> {
    state.evaluation_service.delete(&user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Downloads every live evaluation as CSV.
///
/// # Endpoint
///
/// `GET /api/evaluations/export`
///
/// # Errors
///
/// - **403 Forbidden**: caller's tier lacks `csv_export`
pub async fn export_evaluations_handler(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> Result<impl IntoResponse, AppError> {
    let csv = state.evaluation_service.export_csv(&user).await?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"evaluations.csv\"",
            ),
        ],
        csv,
    ))
}
