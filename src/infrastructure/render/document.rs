use chrono::{DateTime, Utc};

use super::{format_currency, format_signed_percent};
use crate::analysis::{benchmarks, market, scenarios};
use crate::domain::Tier;
use crate::domain::entities::{Effort, Evaluation, Opportunity, ReportSection};

const TOP_OPPORTUNITIES: usize = 3;

/// Rows and column headers of a table.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    fn new(headers: &[&str]) -> Self {
        Self {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    fn row<I, S>(mut self, cells: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rows.push(cells.into_iter().map(Into::into).collect());
        self
    }
}

/// One rendered block of a report.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentSection {
    pub key: ReportSection,
    pub heading: String,
    pub paragraphs: Vec<String>,
    pub table: Option<Table>,
}

/// Opportunities sharing an implementation horizon.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionGroup {
    pub name: &'static str,
    pub opportunities: Vec<Opportunity>,
}

/// Groups opportunities by effort: quick wins, strategic initiatives and
/// long-term projects. Empty groups are omitted; order within a group is kept.
pub fn action_plan(opportunities: &[Opportunity]) -> Vec<ActionGroup> {
    [
        ("Quick wins", Effort::Low),
        ("Strategic initiatives", Effort::Medium),
        ("Long-term projects", Effort::High),
    ]
    .into_iter()
    .map(|(name, effort)| ActionGroup {
        name,
        opportunities: opportunities
            .iter()
            .filter(|o| o.effort == effort)
            .cloned()
            .collect(),
    })
    .filter(|g| !g.opportunities.is_empty())
    .collect()
}

/// Format-independent content of a report.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportDocument {
    pub title: String,
    pub tier: Tier,
    pub business_name: String,
    pub industry: String,
    pub prepared_for: String,
    pub generated_at: String,
    pub sections: Vec<DocumentSection>,
}

impl ReportDocument {
    /// Lays out the sections of a `tier` report for `evaluation`.
    pub fn build(
        title: &str,
        tier: Tier,
        evaluation: &Evaluation,
        prepared_for: &str,
        generated_at: DateTime<Utc>,
    ) -> Self {
        let sections = ReportSection::for_tier(tier)
            .into_iter()
            .map(|key| build_section(key, evaluation))
            .collect();

        Self {
            title: title.to_string(),
            tier,
            business_name: evaluation.profile.business_name.clone(),
            industry: evaluation.profile.industry.label().to_string(),
            prepared_for: prepared_for.to_string(),
            generated_at: generated_at.format("%Y-%m-%d %H:%M UTC").to_string(),
            sections,
        }
    }

    pub fn section(&self, key: ReportSection) -> Option<&DocumentSection> {
        self.sections.iter().find(|s| s.key == key)
    }
}

fn opportunity_table(opportunities: &[Opportunity]) -> Table {
    opportunities.iter().fold(
        Table::new(&["Opportunity", "Estimated impact", "Effort", "Priority"]),
        |table, o| {
            table.row([
                o.title.clone(),
                format_currency(o.estimated_value_impact),
                o.effort.to_string(),
                format!("{:.1}", o.priority_score),
            ])
        },
    )
}

fn build_section(key: ReportSection, e: &Evaluation) -> DocumentSection {
    let p = &e.profile;
    let v = &e.valuation;
    let h = &e.health;

    let (heading, paragraphs, table) = match key {
        ReportSection::Summary => (
            "Executive summary",
            vec![format!(
                "{} is a {} business with annual revenue of {}. Its estimated value is {} \
                 (range {} to {}) and its overall health grade is {}.",
                p.business_name,
                p.industry.label().to_lowercase(),
                format_currency(p.annual_revenue),
                format_currency(v.mid),
                format_currency(v.low),
                format_currency(v.high),
                h.grade,
            )],
            Some(
                Table::new(&["Metric", "Value"])
                    .row(["Annual revenue".to_string(), format_currency(p.annual_revenue)])
                    .row(["EBITDA".to_string(), format_currency(p.ebitda)])
                    .row(["Net income".to_string(), format_currency(p.net_income)])
                    .row(["Employees".to_string(), p.employee_count.to_string()])
                    .row(["Years in business".to_string(), p.years_in_business.to_string()]),
            ),
        ),
        ReportSection::Valuation => (
            "Valuation",
            vec![format!(
                "Industry multiples of {:.1}x revenue and {:.1}x EBITDA, adjusted by {} for \
                 business-specific factors. Confidence: {}/100.",
                v.revenue_multiple,
                v.ebitda_multiple,
                format_signed_percent(v.adjustment),
                v.confidence,
            )],
            Some(
                Table::new(&["Measure", "Value"])
                    .row(["Revenue method".to_string(), format_currency(v.revenue_method_value)])
                    .row([
                        "EBITDA method".to_string(),
                        v.ebitda_method_value
                            .map(format_currency)
                            .unwrap_or_else(|| "n/a".to_string()),
                    ])
                    .row(["Asset method".to_string(), format_currency(v.asset_method_value)])
                    .row(["Low".to_string(), format_currency(v.low)])
                    .row(["Midpoint".to_string(), format_currency(v.mid)])
                    .row(["High".to_string(), format_currency(v.high)]),
            ),
        ),
        ReportSection::HealthOverview => (
            "Business health",
            vec![format!(
                "Overall health score: {:.1} out of 100 (grade {}).",
                h.overall, h.grade
            )],
            None,
        ),
        ReportSection::TopOpportunities => {
            let top = &e.opportunities[..e.opportunities.len().min(TOP_OPPORTUNITIES)];
            let paragraphs = if top.is_empty() {
                vec!["No major improvement opportunities were identified.".to_string()]
            } else {
                Vec::new()
            };
            ("Top opportunities", paragraphs, Some(opportunity_table(top)))
        }
        ReportSection::HealthBreakdown => (
            "Health breakdown",
            Vec::new(),
            Some(
                [
                    ("Financial", "30%", h.financial),
                    ("Operational", "20%", h.operational),
                    ("Market", "20%", h.market),
                    ("Risk", "15%", h.risk),
                    ("Growth", "15%", h.growth),
                ]
                .into_iter()
                .fold(
                    Table::new(&["Component", "Weight", "Score"]),
                    |t, (name, weight, score)| {
                        t.row([name.to_string(), weight.to_string(), format!("{score:.1}")])
                    },
                ),
            ),
        ),
        ReportSection::AllOpportunities => (
            "All opportunities",
            e.opportunities
                .iter()
                .map(|o| format!("{}: {}", o.title, o.description))
                .collect(),
            Some(opportunity_table(&e.opportunities)),
        ),
        ReportSection::MarketAnalysis => {
            let m = market::analyze_market(p.industry);
            (
                "Market analysis",
                vec![format!(
                    "The {} market is {} with a market health score of {:.1}.",
                    p.industry.label().to_lowercase(),
                    m.outlook,
                    m.score
                )],
                Some(
                    Table::new(&["Factor", "Score"])
                        .row(["Growth outlook".to_string(), format!("{:.0}", m.growth_outlook)])
                        .row(["Competition".to_string(), format!("{:.0}", m.competition)])
                        .row(["Stability".to_string(), format!("{:.0}", m.stability)]),
                ),
            )
        }
        ReportSection::Narrative => (
            "Analyst commentary",
            vec![
                e.narrative
                    .clone()
                    .unwrap_or_else(|| "No commentary available.".to_string()),
            ],
            None,
        ),
        ReportSection::ScenarioAnalysis => (
            "Scenario analysis",
            Vec::new(),
            Some(scenarios::analyze_scenarios(p).into_iter().fold(
                Table::new(&["Scenario", "Low", "Midpoint", "High", "Change"]),
                |t, s| {
                    t.row([
                        s.name,
                        format_currency(s.low),
                        format_currency(s.mid),
                        format_currency(s.high),
                        format!("{:+.1}%", s.delta_pct),
                    ])
                },
            )),
        ),
        ReportSection::IndustryBenchmarks => (
            "Industry benchmarks",
            Vec::new(),
            Some(benchmarks::compare_to_industry(p).into_iter().fold(
                Table::new(&["Metric", "Value", "Benchmark", "Difference", "Standing"]),
                |t, b| {
                    t.row([
                        b.metric.replace('_', " "),
                        format!("{:.1}", b.value),
                        format!("{:.1}", b.benchmark),
                        format!("{:+.1}", b.delta),
                        b.standing.to_string(),
                    ])
                },
            )),
        ),
        ReportSection::ActionPlan => {
            let table = action_plan(&e.opportunities).into_iter().fold(
                Table::new(&["Phase", "Action", "Estimated impact"]),
                |t, group| {
                    group.opportunities.iter().fold(t, |t, o| {
                        t.row([
                            group.name.to_string(),
                            o.title.clone(),
                            format_currency(o.estimated_value_impact),
                        ])
                    })
                },
            );
            ("Action plan", Vec::new(), Some(table))
        }
    };

    DocumentSection {
        key,
        heading: heading.to_string(),
        paragraphs,
        table,
    }
}
