//! Dashboard aggregation over a user's evaluations.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::analysis::round1;
use crate::domain::Industry;
use crate::domain::entities::{Evaluation, HealthGrade, Opportunity};

const TOP_OPPORTUNITIES: usize = 3;

/// Headline figures of a single evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationSnapshot {
    pub evaluation_id: i64,
    pub business_name: String,
    pub industry: Industry,
    pub valuation_low: f64,
    pub valuation_mid: f64,
    pub valuation_high: f64,
    pub health_score: f64,
    pub grade: HealthGrade,
    pub created_at: DateTime<Utc>,
}

impl From<&Evaluation> for EvaluationSnapshot {
    fn from(e: &Evaluation) -> Self {
        Self {
            evaluation_id: e.id,
            business_name: e.profile.business_name.clone(),
            industry: e.profile.industry,
            valuation_low: e.valuation.low,
            valuation_mid: e.valuation.mid,
            valuation_high: e.valuation.high,
            health_score: e.health.overall,
            grade: e.health.grade,
            created_at: e.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub evaluation_id: i64,
    pub created_at: DateTime<Utc>,
    pub valuation_mid: f64,
    pub health_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndustryCount {
    pub industry: Industry,
    pub count: u64,
}

/// Everything the dashboard endpoint returns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub total_evaluations: u64,
    pub latest: Option<EvaluationSnapshot>,
    pub average_health_score: Option<f64>,
    /// Oldest first.
    pub valuation_trend: Vec<TrendPoint>,
    pub grade_distribution: BTreeMap<HealthGrade, u64>,
    pub industry_breakdown: Vec<IndustryCount>,
    pub top_opportunities: Vec<Opportunity>,
    pub total_reports: u64,
    pub open_tickets: u64,
}

/// Aggregates live evaluations given newest first.
pub fn summarize(
    evaluations: &[Evaluation],
    total_reports: u64,
    open_tickets: u64,
) -> DashboardSummary {
    let latest = evaluations.first();

    let average_health_score = (!evaluations.is_empty()).then(|| {
        let sum: f64 = evaluations.iter().map(|e| e.health.overall).sum();
        round1(sum / evaluations.len() as f64)
    });

    let valuation_trend = evaluations
        .iter()
        .rev()
        .map(|e| TrendPoint {
            evaluation_id: e.id,
            created_at: e.created_at,
            valuation_mid: e.valuation.mid,
            health_score: e.health.overall,
        })
        .collect();

    let mut grade_distribution: BTreeMap<HealthGrade, u64> =
        HealthGrade::ALL.iter().map(|g| (*g, 0)).collect();
    for e in evaluations {
        *grade_distribution.entry(e.health.grade).or_default() += 1;
    }

    let mut by_industry: HashMap<Industry, u64> = HashMap::new();
    for e in evaluations {
        *by_industry.entry(e.profile.industry).or_default() += 1;
    }
    let mut industry_breakdown: Vec<IndustryCount> = by_industry
        .into_iter()
        .map(|(industry, count)| IndustryCount { industry, count })
        .collect();
    industry_breakdown.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.industry.as_str().cmp(b.industry.as_str()))
    });

    let top_opportunities = latest
        .map(|e| {
            e.opportunities
                .iter()
                .take(TOP_OPPORTUNITIES)
                .cloned()
                .collect()
        })
        .unwrap_or_default();

    DashboardSummary {
        total_evaluations: evaluations.len() as u64,
        latest: latest.map(EvaluationSnapshot::from),
        average_health_score,
        valuation_trend,
        grade_distribution,
        industry_breakdown,
        top_opportunities,
        total_reports,
        open_tickets,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::assess;
    use crate::domain::entities::BusinessProfile;
    use crate::domain::entities::evaluation::fixtures::{healthy_tech, struggling_retail};
    use chrono::Duration;

    fn evaluation(id: i64, profile: BusinessProfile, age_days: i64) -> Evaluation {
        let a = assess(&profile);
        let created_at = Utc::now() - Duration::days(age_days);
        Evaluation {
            id,
            user_id: 1,
            profile,
            valuation: a.valuation,
            health: a.health,
            opportunities: a.opportunities,
            narrative: None,
            created_at,
            updated_at: created_at,
            deleted_at: None,
        }
    }

    #[test]
    fn test_empty_dashboard() {
        let s = summarize(&[], 0, 0);

        assert_eq!(s.total_evaluations, 0);
        assert!(s.latest.is_none());
        assert!(s.average_health_score.is_none());
        assert!(s.valuation_trend.is_empty());
        assert_eq!(s.grade_distribution.len(), 5);
        assert!(s.grade_distribution.values().all(|c| *c == 0));
        assert!(s.top_opportunities.is_empty());
    }

    #[test]
    fn test_summary_over_evaluations() {
        // Newest first.
        let evaluations = vec![
            evaluation(3, struggling_retail(), 0),
            evaluation(2, healthy_tech(), 1),
            evaluation(1, healthy_tech(), 2),
        ];

        let s = summarize(&evaluations, 4, 1);

        assert_eq!(s.total_evaluations, 3);
        assert_eq!(s.latest.as_ref().unwrap().evaluation_id, 3);
        // (83.4 + 83.4 + 31.0) / 3
        assert_eq!(s.average_health_score, Some(65.9));

        let trend_ids: Vec<_> = s.valuation_trend.iter().map(|p| p.evaluation_id).collect();
        assert_eq!(trend_ids, vec![1, 2, 3]);

        assert_eq!(s.grade_distribution[&HealthGrade::B], 2);
        assert_eq!(s.grade_distribution[&HealthGrade::F], 1);
        assert_eq!(s.grade_distribution[&HealthGrade::A], 0);

        assert_eq!(
            s.industry_breakdown,
            vec![
                IndustryCount {
                    industry: Industry::Technology,
                    count: 2
                },
                IndustryCount {
                    industry: Industry::Retail,
                    count: 1
                },
            ]
        );

        assert_eq!(s.top_opportunities.len(), 3);
        assert_eq!(s.total_reports, 4);
        assert_eq!(s.open_tickets, 1);
    }

    #[test]
    fn test_industry_ties_sorted_by_name() {
        let evaluations = vec![
            evaluation(2, healthy_tech(), 0),
            evaluation(1, struggling_retail(), 1),
        ];

        let s = summarize(&evaluations, 0, 0);

        assert_eq!(s.industry_breakdown[0].industry, Industry::Retail);
        assert_eq!(s.industry_breakdown[1].industry, Industry::Technology);
    }

    #[test]
    fn test_grade_distribution_serializes_letter_keys() {
        let s = summarize(&[], 0, 0);
        let json = serde_json::to_value(&s).unwrap();
        assert_eq!(json["grade_distribution"]["A"], 0);
        assert_eq!(json["grade_distribution"]["F"], 0);
    }
}
