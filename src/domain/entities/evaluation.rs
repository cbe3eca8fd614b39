//! Evaluation entity: submitted business data and its computed outputs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::Industry;
use crate::domain::entities::{HealthScore, Opportunity, ValuationResult};

text_enum! {
    /// How much the business depends on its owner's day-to-day involvement.
    pub enum OwnerDependence("owner dependence") {
        Low => "low",
        Medium => "medium",
        High => "high",
    }
}

text_enum! {
    /// Self-reported position against competitors.
    pub enum CompetitivePosition("competitive position") {
        Leader => "leader",
        Strong => "strong",
        Average => "average",
        Weak => "weak",
    }
}

/// Business data submitted by a user.
///
/// Monetary amounts are annual figures in the account currency. Percentages
/// are expressed on a 0-100 scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessProfile {
    pub business_name: String,
    pub industry: Industry,
    pub annual_revenue: f64,
    pub ebitda: f64,
    pub net_income: f64,
    pub total_assets: f64,
    pub total_liabilities: f64,
    pub gross_margin_pct: f64,
    pub revenue_growth_pct: f64,
    pub recurring_revenue_pct: f64,
    pub customer_concentration_pct: f64,
    pub customer_retention_pct: f64,
    pub employee_count: u32,
    pub years_in_business: u32,
    pub owner_dependence: OwnerDependence,
    pub competitive_position: CompetitivePosition,
}

impl BusinessProfile {
    /// Net income as a percentage of revenue; 0 when there is no revenue.
    pub fn net_margin_pct(&self) -> f64 {
        if self.annual_revenue > 0.0 {
            self.net_income / self.annual_revenue * 100.0
        } else {
            0.0
        }
    }

    /// Liabilities over assets.
    ///
    /// Zero when both are zero, infinite when only assets are zero.
    pub fn debt_ratio(&self) -> f64 {
        if self.total_assets > 0.0 {
            self.total_liabilities / self.total_assets
        } else if self.total_liabilities > 0.0 {
            f64::INFINITY
        } else {
            0.0
        }
    }

    /// Revenue per employee, `None` when the business reports no employees.
    pub fn revenue_per_employee(&self) -> Option<f64> {
        (self.employee_count > 0).then(|| self.annual_revenue / f64::from(self.employee_count))
    }
}

/// A stored evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub id: i64,
    pub user_id: i64,
    pub profile: BusinessProfile,
    pub valuation: ValuationResult,
    pub health: HealthScore,
    pub opportunities: Vec<Opportunity>,
    pub narrative: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Evaluation {
    /// Returns true if the evaluation has been soft-deleted.
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// Input data for storing a new evaluation.
#[derive(Debug, Clone)]
pub struct NewEvaluation {
    pub user_id: i64,
    pub profile: BusinessProfile,
    pub valuation: ValuationResult,
    pub health: HealthScore,
    pub opportunities: Vec<Opportunity>,
    pub narrative: Option<String>,
}

/// Replacement data for a re-evaluation.
#[derive(Debug, Clone)]
pub struct EvaluationUpdate {
    pub profile: BusinessProfile,
    pub valuation: ValuationResult,
    pub health: HealthScore,
    pub opportunities: Vec<Opportunity>,
    pub narrative: Option<String>,
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn test_net_margin() {
        assert_eq!(healthy_tech().net_margin_pct(), 15.0);

        let mut profile = healthy_tech();
        profile.annual_revenue = 0.0;
        assert_eq!(profile.net_margin_pct(), 0.0);
    }

    #[test]
    fn test_debt_ratio_edges() {
        let mut profile = healthy_tech();
        assert_eq!(profile.debt_ratio(), 0.4);

        profile.total_assets = 0.0;
        assert!(profile.debt_ratio().is_infinite());

        profile.total_liabilities = 0.0;
        assert_eq!(profile.debt_ratio(), 0.0);
    }

    #[test]
    fn test_revenue_per_employee() {
        assert_eq!(healthy_tech().revenue_per_employee(), Some(125_000.0));

        let mut profile = healthy_tech();
        profile.employee_count = 0;
        assert_eq!(profile.revenue_per_employee(), None);
    }

    #[test]
    fn test_profile_json_round_trip_uses_snake_case_enums() {
        let json = serde_json::to_value(healthy_tech()).unwrap();
        assert_eq!(json["industry"], "technology");
        assert_eq!(json["owner_dependence"], "low");
        assert_eq!(json["competitive_position"], "strong");
    }
}
