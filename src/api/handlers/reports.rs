//! Handlers for report endpoints.

use axum::{
    Extension, Json,
    extract::State,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::api::dto::report::{GenerateReportRequest, ReportResponse};
use crate::api::extract::{ApiPath, ValidatedJson};
use crate::application::services::{GenerateReport, ReportTemplate};
use crate::domain::Tier;
use crate::domain::entities::{ReportFormat, User};
use crate::error::AppError;
use crate::state::AppState;

/// Lists the three report templates and which the caller may use.
///
/// # Endpoint
///
/// `GET /api/reports/templates`
pub async fn report_templates_handler(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> Json<Vec<ReportTemplate>> {
    Json(state.report_service.templates(user.tier))
}

/// Generates a report of the given tier.
///
/// # Endpoint
///
/// `POST /api/reports/{tier}` where `tier` is `basic`, `professional` or `enterprise`
///
/// # Request Body
///
/// ```json
/// { "evaluation_id": 42, "format": "pdf", "title": "Q3 valuation" }
/// ```
///
/// # Errors
///
/// - **400 Bad Request**: unknown tier, invalid body, or format not offered by the template
/// - **403 Forbidden**: caller's tier lacks the report or format
/// - **404 Not Found**: evaluation does not exist
pub async fn generate_report_handler(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    ApiPath(tier): ApiPath<String>,
    ValidatedJson(payload): ValidatedJson<GenerateReportRequest>,
) -> Result<(StatusCode, Json<ReportResponse>), AppError> {
    let tier: Tier = tier.parse().map_err(|e: crate::domain::UnknownVariant| {
        AppError::bad_request(
            "Validation failed",
            json!([{ "field": "tier", "message": e.to_string() }]),
        )
    })?;

    let report = state
        .report_service
        .generate(
            &user,
            GenerateReport {
                tier,
                evaluation_id: payload.evaluation_id,
                format: payload.format.unwrap_or(ReportFormat::Html),
                title: payload.title,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(report.into())))
}

/// Lists the caller's reports, newest first.
///
/// # Endpoint
///
/// `GET /api/reports`
pub async fn list_reports_handler(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> Result<Json<Vec<ReportResponse>>, AppError> {
    let reports = state.report_service.list(&user).await?;
    Ok(Json(reports.into_iter().map(ReportResponse::from).collect()))
}

/// Streams a stored report file as an attachment.
///
/// # Endpoint
///
/// `GET /api/reports/{id}/download`
///
/// # Errors
///
/// - **404 Not Found**: report or its file is missing
pub async fn download_report_handler(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Response, AppError> {
    let (report, bytes) = state.report_service.download(&user, id).await?;

    let disposition = HeaderValue::from_str(&format!(
        "attachment; filename=\"{}\"",
        report.download_file_name()
    ))
    .map_err(|e| AppError::internal("Invalid header value", json!({ "reason": e.to_string() })))?;

    Ok((
        [
            (
                header::CONTENT_TYPE,
                HeaderValue::from_static(report.format.content_type()),
            ),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}
