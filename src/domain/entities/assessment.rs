//! Outputs of the analysis engines.
//!
//! These values are computed by [`crate::analysis`] and persisted alongside
//! the evaluation they describe, so they derive both serde traits.

use serde::{Deserialize, Serialize};

use crate::domain::Industry;

text_enum! {
    /// Which inputs produced the valuation midpoint.
    pub enum ValuationMethod("valuation method") {
        /// EBITDA, revenue and asset methods combined.
        Blended => "blended",
        /// Revenue and asset methods only (no positive EBITDA).
        RevenueAndAssets => "revenue_and_assets",
    }
}

/// Valuation range and the inputs that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuationResult {
    pub low: f64,
    pub mid: f64,
    pub high: f64,
    pub method: ValuationMethod,
    pub revenue_multiple: f64,
    pub ebitda_multiple: f64,
    /// Sum of qualitative adjustments, clamped to `[-0.40, 0.50]`.
    pub adjustment: f64,
    pub revenue_method_value: f64,
    pub ebitda_method_value: Option<f64>,
    pub asset_method_value: f64,
    /// 0-100 confidence in the estimate based on data completeness.
    pub confidence: u8,
}

text_enum! {
    /// Letter grade for an overall health score.
    #[derive(PartialOrd, Ord)]
    pub enum HealthGrade("grade") {
        A => "A",
        B => "B",
        C => "C",
        D => "D",
        F => "F",
    }
}

impl HealthGrade {
    /// Grade for an overall score on a 0-100 scale.
    pub fn from_score(score: f64) -> Self {
        match score {
            s if s >= 85.0 => HealthGrade::A,
            s if s >= 70.0 => HealthGrade::B,
            s if s >= 55.0 => HealthGrade::C,
            s if s >= 40.0 => HealthGrade::D,
            _ => HealthGrade::F,
        }
    }
}

/// Weighted composite of heuristic sub-scores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthScore {
    pub overall: f64,
    pub grade: HealthGrade,
    pub financial: f64,
    pub operational: f64,
    pub market: f64,
    pub risk: f64,
    pub growth: f64,
}

text_enum! {
    /// Direction of the industry's market.
    pub enum MarketOutlook("market outlook") {
        Expanding => "expanding",
        Stable => "stable",
        Contracting => "contracting",
    }
}

/// Industry-level market health.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketHealth {
    pub industry: Industry,
    pub score: f64,
    pub outlook: MarketOutlook,
    pub growth_outlook: f64,
    pub competition: f64,
    pub stability: f64,
}

text_enum! {
    /// Area a growth opportunity addresses.
    pub enum OpportunityCategory("opportunity category") {
        Pricing => "pricing",
        RecurringRevenue => "recurring_revenue",
        CustomerBase => "customer_base",
        Succession => "succession",
        Retention => "retention",
        Growth => "growth",
        Efficiency => "efficiency",
        CapitalStructure => "capital_structure",
    }
}

text_enum! {
    /// Implementation effort for an opportunity.
    pub enum Effort("effort") {
        Low => "low",
        Medium => "medium",
        High => "high",
    }
}

/// A value-creation opportunity identified from business data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Opportunity {
    pub category: OpportunityCategory,
    pub title: String,
    pub description: String,
    /// Estimated increase in business value if addressed.
    pub estimated_value_impact: f64,
    pub effort: Effort,
    pub priority_score: f64,
}

/// Valuation under an alternative set of assumptions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub description: String,
    pub low: f64,
    pub mid: f64,
    pub high: f64,
    /// Percentage change of `mid` against the base scenario.
    pub delta_pct: f64,
}

text_enum! {
    /// Where a metric sits relative to its industry benchmark.
    pub enum BenchmarkStanding("benchmark standing") {
        Above => "above",
        At => "at",
        Below => "below",
    }
}

/// A single metric compared against its industry benchmark.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkComparison {
    pub metric: String,
    pub value: f64,
    pub benchmark: f64,
    pub delta: f64,
    pub standing: BenchmarkStanding,
}

/// Everything the engines compute for one business profile.
#[derive(Debug, Clone, PartialEq)]
pub struct Assessment {
    pub valuation: ValuationResult,
    pub market: MarketHealth,
    pub health: HealthScore,
    pub opportunities: Vec<Opportunity>,
}
