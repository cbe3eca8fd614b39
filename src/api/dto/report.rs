//! DTOs for report endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::Tier;
use crate::domain::entities::{Report, ReportFormat};

/// Request to generate a report from an evaluation.
#[derive(Debug, Deserialize, Validate)]
pub struct GenerateReportRequest {
    #[validate(range(min = 1))]
    pub evaluation_id: i64,

    /// Defaults to HTML.
    #[serde(default)]
    pub format: Option<ReportFormat>,

    #[validate(length(max = 200))]
    pub title: Option<String>,
}

/// Report metadata returned to clients.
///
/// The storage path stays server-side; clients fetch the file through
/// `download_url`.
#[derive(Debug, Serialize)]
pub struct ReportResponse {
    pub id: i64,
    pub evaluation_id: i64,
    pub tier: Tier,
    pub format: ReportFormat,
    pub title: String,
    pub size_bytes: i64,
    pub download_url: String,
    pub created_at: DateTime<Utc>,
}

impl From<Report> for ReportResponse {
    fn from(report: Report) -> Self {
        Self {
            download_url: format!("/api/reports/{}/download", report.id),
            id: report.id,
            evaluation_id: report.evaluation_id,
            tier: report.tier,
            format: report.format,
            title: report.title,
            size_bytes: report.size_bytes,
            created_at: report.created_at,
        }
    }
}
