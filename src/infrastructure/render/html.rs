use askama::Template;
use serde_json::json;

use super::ReportDocument;
use crate::error::AppError;

#[derive(Template)]
#[template(path = "report.html")]
struct ReportTemplate<'a> {
    doc: &'a ReportDocument,
}

/// Renders a self-contained HTML page. Text is HTML-escaped by the template engine.
pub fn render_html(doc: &ReportDocument) -> Result<Vec<u8>, AppError> {
    ReportTemplate { doc }
        .render()
        .map(String::into_bytes)
        .map_err(|e| {
            AppError::internal(
                "Failed to render report",
                json!({ "format": "html", "reason": e.to_string() }),
            )
        })
}
