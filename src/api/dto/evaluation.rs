//! DTOs for evaluation endpoints.

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::LazyLock;
use validator::{Validate, ValidationError};

use crate::domain::Industry;
use crate::domain::entities::{
    BusinessProfile, CompetitivePosition, Evaluation, HealthScore, Opportunity, OwnerDependence,
    ValuationResult,
};

/// A business name must contain at least one visible character.
static BUSINESS_NAME_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\S").unwrap());

/// Business data submitted for evaluation.
///
/// Enum-valued fields are accepted as text and checked during validation so
/// an unknown value is reported per field like any other violation.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct EvaluationRequest {
    #[validate(length(min = 1, max = 200))]
    #[validate(regex(path = "*BUSINESS_NAME_REGEX", message = "must not be blank"))]
    pub business_name: String,

    #[validate(custom(function = "validate_industry"))]
    pub industry: String,

    #[validate(range(
        min = 0.0,
        max = 1_000_000_000_000_000.0,
        message = "must be between 0 and 1e15"
    ))]
    pub annual_revenue: f64,

    #[validate(range(
        min = -1_000_000_000_000_000.0,
        max = 1_000_000_000_000_000.0,
        message = "must be between -1e15 and 1e15"
    ))]
    pub ebitda: f64,

    #[validate(range(
        min = -1_000_000_000_000_000.0,
        max = 1_000_000_000_000_000.0,
        message = "must be between -1e15 and 1e15"
    ))]
    pub net_income: f64,

    #[validate(range(
        min = 0.0,
        max = 1_000_000_000_000_000.0,
        message = "must be between 0 and 1e15"
    ))]
    pub total_assets: f64,

    #[validate(range(
        min = 0.0,
        max = 1_000_000_000_000_000.0,
        message = "must be between 0 and 1e15"
    ))]
    pub total_liabilities: f64,

    #[validate(range(min = 0.0, max = 100.0))]
    pub gross_margin_pct: f64,

    #[validate(range(min = -100.0, max = 1000.0))]
    pub revenue_growth_pct: f64,

    #[validate(range(min = 0.0, max = 100.0))]
    pub recurring_revenue_pct: f64,

    #[validate(range(min = 0.0, max = 100.0))]
    pub customer_concentration_pct: f64,

    #[validate(range(min = 0.0, max = 100.0))]
    pub customer_retention_pct: f64,

    #[validate(range(max = 1_000_000))]
    pub employee_count: u32,

    #[validate(range(max = 200))]
    pub years_in_business: u32,

    #[validate(custom(function = "validate_owner_dependence"))]
    pub owner_dependence: String,

    #[validate(custom(function = "validate_competitive_position"))]
    pub competitive_position: String,
}

fn validate_enum<T: FromStr>(value: &str, message: &'static str) -> Result<(), ValidationError> {
    value.parse::<T>().map(|_| ()).map_err(|_| {
        ValidationError::new("unknown_variant").with_message(std::borrow::Cow::Borrowed(message))
    })
}

fn validate_industry(value: &str) -> Result<(), ValidationError> {
    validate_enum::<Industry>(
        value,
        "must be one of technology, ecommerce, retail, manufacturing, healthcare, \
         professional_services, restaurant, construction, real_estate, other",
    )
}

fn validate_owner_dependence(value: &str) -> Result<(), ValidationError> {
    validate_enum::<OwnerDependence>(value, "must be one of low, medium, high")
}

fn validate_competitive_position(value: &str) -> Result<(), ValidationError> {
    validate_enum::<CompetitivePosition>(value, "must be one of leader, strong, average, weak")
}

impl EvaluationRequest {
    /// Converts a validated request into a domain profile.
    ///
    /// Returns `None` if an enum field does not parse, which
    /// [`Validate::validate`] would have reported.
    pub fn into_profile(self) -> Option<BusinessProfile> {
        Some(BusinessProfile {
            business_name: self.business_name.trim().to_string(),
            industry: self.industry.parse().ok()?,
            annual_revenue: self.annual_revenue,
            ebitda: self.ebitda,
            net_income: self.net_income,
            total_assets: self.total_assets,
            total_liabilities: self.total_liabilities,
            gross_margin_pct: self.gross_margin_pct,
            revenue_growth_pct: self.revenue_growth_pct,
            recurring_revenue_pct: self.recurring_revenue_pct,
            customer_concentration_pct: self.customer_concentration_pct,
            customer_retention_pct: self.customer_retention_pct,
            employee_count: self.employee_count,
            years_in_business: self.years_in_business,
            owner_dependence: self.owner_dependence.parse().ok()?,
            competitive_position: self.competitive_position.parse().ok()?,
        })
    }
}

/// An evaluation as returned to clients.
///
/// `opportunities` is already truncated to what the caller's tier may see;
/// `opportunities_total` is the untruncated count.
#[derive(Debug, Serialize)]
pub struct EvaluationResponse {
    pub id: i64,
    pub profile: BusinessProfile,
    pub valuation: ValuationResult,
    pub health: HealthScore,
    pub opportunities: Vec<Opportunity>,
    pub opportunities_total: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub narrative: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl EvaluationResponse {
    /// Builds the response showing only `visible` opportunities.
    pub fn new(evaluation: Evaluation, visible: Vec<Opportunity>) -> Self {
        Self {
            id: evaluation.id,
            opportunities_total: evaluation.opportunities.len(),
            profile: evaluation.profile,
            valuation: evaluation.valuation,
            health: evaluation.health,
            opportunities: visible,
            narrative: evaluation.narrative,
            created_at: evaluation.created_at,
            updated_at: evaluation.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use serde_json::{Value, json};

    fn body() -> Value {
        json!({
            "business_name": "Acme Analytics",
            "industry": "technology",
            "annual_revenue": 1_000_000.0,
            "ebitda": 200_000.0,
            "net_income": 150_000.0,
            "total_assets": 500_000.0,
            "total_liabilities": 200_000.0,
            "gross_margin_pct": 70.0,
            "revenue_growth_pct": 20.0,
            "recurring_revenue_pct": 60.0,
            "customer_concentration_pct": 15.0,
            "customer_retention_pct": 90.0,
            "employee_count": 8,
            "years_in_business": 6,
            "owner_dependence": "low",
            "competitive_position": "strong"
        })
    }

    fn request(value: Value) -> EvaluationRequest {
        serde_json::from_value(value).unwrap()
    }

    fn invalid_fields(value: Value) -> Vec<String> {
        let err: AppError = request(value).validate().unwrap_err().into();
        err.to_error_info()
            .details
            .as_array()
            .unwrap()
            .iter()
            .map(|d| d["field"].as_str().unwrap().to_string())
            .collect()
    }

    #[test]
    fn test_valid_request_converts() {
        let req = request(body());
        assert!(req.validate().is_ok());

        let profile = req.into_profile().unwrap();
        assert_eq!(profile.industry, Industry::Technology);
        assert_eq!(profile.owner_dependence, OwnerDependence::Low);
        assert_eq!(profile.employee_count, 8);
    }

    #[test]
    fn test_enum_fields_are_case_insensitive() {
        let mut value = body();
        value["industry"] = json!("Professional_Services");
        value["competitive_position"] = json!("LEADER");

        let req = request(value);
        assert!(req.validate().is_ok());
        let profile = req.into_profile().unwrap();
        assert_eq!(profile.industry, Industry::ProfessionalServices);
        assert_eq!(profile.competitive_position, CompetitivePosition::Leader);
    }

    #[test]
    fn test_unknown_industry_is_field_error() {
        let mut value = body();
        value["industry"] = json!("mining");
        assert_eq!(invalid_fields(value), vec!["industry"]);
    }

    #[test]
    fn test_out_of_range_fields() {
        let mut value = body();
        value["annual_revenue"] = json!(-1.0);
        value["gross_margin_pct"] = json!(101.0);
        value["revenue_growth_pct"] = json!(-100.5);
        value["years_in_business"] = json!(201);

        assert_eq!(
            invalid_fields(value),
            vec![
                "annual_revenue",
                "gross_margin_pct",
                "revenue_growth_pct",
                "years_in_business"
            ]
        );
    }

    #[test]
    fn test_blank_business_name() {
        let mut value = body();
        value["business_name"] = json!("   ");
        assert_eq!(invalid_fields(value), vec!["business_name"]);

        let mut value = body();
        value["business_name"] = json!("x".repeat(201));
        assert_eq!(invalid_fields(value), vec!["business_name"]);
    }

    #[test]
    fn test_monetary_fields_are_bounded() {
        let mut value = body();
        value["annual_revenue"] = json!(1e308);
        value["ebitda"] = json!(-1e16);
        value["net_income"] = json!(1e16);
        value["total_assets"] = json!(1e300);
        value["total_liabilities"] = json!(1e16);

        assert_eq!(
            invalid_fields(value),
            vec![
                "annual_revenue",
                "ebitda",
                "net_income",
                "total_assets",
                "total_liabilities"
            ]
        );
    }

    #[test]
    fn test_largest_amounts_value_finitely() {
        let mut value = body();
        value["annual_revenue"] = json!(1e15);
        value["ebitda"] = json!(1e15);
        value["total_assets"] = json!(1e15);
        let req = request(value);
        assert!(req.validate().is_ok());

        let valuation = crate::analysis::valuation::value_business(&req.into_profile().unwrap());
        assert!(valuation.low.is_finite());
        assert!(valuation.mid.is_finite());
        assert!(valuation.high.is_finite());
    }

    #[test]
    fn test_negative_ebitda_is_allowed() {
        let mut value = body();
        value["ebitda"] = json!(-50_000.0);
        value["net_income"] = json!(-80_000.0);
        assert!(request(value).validate().is_ok());
    }

    #[test]
    fn test_business_name_is_trimmed() {
        let mut value = body();
        value["business_name"] = json!("  Acme  ");
        assert_eq!(request(value).into_profile().unwrap().business_name, "Acme");
    }
}
