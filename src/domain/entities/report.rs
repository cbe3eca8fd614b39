//! Report entity representing a generated report file.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Feature, Tier};

text_enum! {
    /// Output format of a generated report.
    pub enum ReportFormat("report format") {
        Html => "html",
        Pdf => "pdf",
    }
}

impl ReportFormat {
    /// File extension without the dot.
    pub fn extension(self) -> &'static str {
        self.as_str()
    }

    /// MIME type served on download.
    pub fn content_type(self) -> &'static str {
        match self {
            ReportFormat::Html => "text/html; charset=utf-8",
            ReportFormat::Pdf => "application/pdf",
        }
    }

    /// Feature that gates exporting in this format.
    pub fn feature(self) -> Feature {
        match self {
            ReportFormat::Html => Feature::HtmlExport,
            ReportFormat::Pdf => Feature::PdfExport,
        }
    }
}

impl ReportFormat {
    /// Formats offered by the report template of `tier`.
    pub fn offered_for(tier: Tier) -> &'static [ReportFormat] {
        match tier {
            Tier::Basic => &[ReportFormat::Html],
            Tier::Professional | Tier::Enterprise => &[ReportFormat::Html, ReportFormat::Pdf],
        }
    }
}

text_enum! {
    /// A block of content in a generated report.
    pub enum ReportSection("report section") {
        Summary => "summary",
        Valuation => "valuation",
        HealthOverview => "health_overview",
        TopOpportunities => "top_opportunities",
        HealthBreakdown => "health_breakdown",
        AllOpportunities => "all_opportunities",
        MarketAnalysis => "market_analysis",
        Narrative => "narrative",
        ScenarioAnalysis => "scenario_analysis",
        IndustryBenchmarks => "industry_benchmarks",
        ActionPlan => "action_plan",
    }
}

impl ReportSection {
    /// Sections included in a report of `tier`, in document order.
    ///
    /// Each tier includes every section of the tiers below it.
    pub fn for_tier(tier: Tier) -> Vec<ReportSection> {
        let count = match tier {
            Tier::Basic => 4,
            Tier::Professional => 8,
            Tier::Enterprise => ReportSection::ALL.len(),
        };
        ReportSection::ALL[..count].to_vec()
    }
}

/// A generated report stored on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub id: i64,
    pub user_id: i64,
    pub evaluation_id: i64,
    pub tier: Tier,
    pub format: ReportFormat,
    pub title: String,
    /// Path relative to the reports directory.
    pub storage_path: String,
    pub size_bytes: i64,
    pub created_at: DateTime<Utc>,
}

impl Report {
    /// File name offered to the client on download.
    pub fn download_file_name(&self) -> String {
        format!("valuation-report-{}.{}", self.id, self.format.extension())
    }
}

/// Input data for recording a generated report.
#[derive(Debug, Clone)]
pub struct NewReport {
    pub user_id: i64,
    pub evaluation_id: i64,
    pub tier: Tier,
    pub format: ReportFormat,
    pub title: String,
    pub storage_path: String,
    pub size_bytes: i64,
}
