//! Multiple-based business valuation.

use crate::analysis::round_money;
use crate::domain::entities::{
    BusinessProfile, OwnerDependence, ValuationMethod, ValuationResult,
};

const MIN_ADJUSTMENT: f64 = -0.40;
const MAX_ADJUSTMENT: f64 = 0.50;
const RANGE_SPREAD: f64 = 0.20;

/// Sum of qualitative adjustments applied to the industry multiples.
///
/// Clamped to `[-0.40, 0.50]`.
pub fn valuation_adjustment(profile: &BusinessProfile) -> f64 {
    let mut adjustment: f64 = 0.0;

    let growth = profile.revenue_growth_pct;
    if growth >= 25.0 {
        adjustment += 0.20;
    } else if growth >= 10.0 {
        adjustment += 0.10;
    } else if growth < 0.0 {
        adjustment -= 0.15;
    }

    if profile.recurring_revenue_pct >= 50.0 {
        adjustment += 0.10;
    }

    let concentration = profile.customer_concentration_pct;
    if concentration > 50.0 {
        adjustment -= 0.20;
    } else if concentration > 30.0 {
        adjustment -= 0.10;
    }

    adjustment -= match profile.owner_dependence {
        OwnerDependence::High => 0.15,
        OwnerDependence::Medium => 0.05,
        OwnerDependence::Low => 0.0,
    };

    if profile.years_in_business < 3 {
        adjustment -= 0.10;
    } else if profile.years_in_business >= 10 {
        adjustment += 0.05;
    }

    adjustment.clamp(MIN_ADJUSTMENT, MAX_ADJUSTMENT)
}

/// Confidence in the estimate based on how complete and mature the data is.
fn confidence(profile: &BusinessProfile) -> u8 {
    let mut score = 40u8;
    if profile.ebitda > 0.0 {
        score += 20;
    }
    if profile.years_in_business >= 5 {
        score += 15;
    }
    if profile.annual_revenue > 0.0 && profile.total_assets > 0.0 {
        score += 15;
    }
    if profile.customer_concentration_pct <= 30.0 {
        score += 10;
    }
    score
}

/// Values a business from its revenue, EBITDA and net assets.
///
/// The midpoint blends the EBITDA, revenue and asset methods (50/30/20) when
/// EBITDA is positive, otherwise the revenue and asset methods (70/30). The
/// range is +/-20% around the midpoint.
pub fn value_business(profile: &BusinessProfile) -> ValuationResult {
    let industry = profile.industry.profile();
    let adjustment = valuation_adjustment(profile);
    let factor = 1.0 + adjustment;

    let revenue_method_value =
        round_money(profile.annual_revenue * industry.revenue_multiple * factor);
    let ebitda_method_value = (profile.ebitda > 0.0)
        .then(|| round_money(profile.ebitda * industry.ebitda_multiple * factor));
    let asset_method_value = round_money(profile.total_assets - profile.total_liabilities);

    let (mid, method) = match ebitda_method_value {
        Some(ebitda_value) => (
            0.5 * ebitda_value + 0.3 * revenue_method_value + 0.2 * asset_method_value,
            ValuationMethod::Blended,
        ),
        None => (
            0.7 * revenue_method_value + 0.3 * asset_method_value,
            ValuationMethod::RevenueAndAssets,
        ),
    };
    let mid = round_money(mid);

    ValuationResult {
        low: round_money(mid * (1.0 - RANGE_SPREAD)),
        mid,
        high: round_money(mid * (1.0 + RANGE_SPREAD)),
        method,
        revenue_multiple: industry.revenue_multiple,
        ebitda_multiple: industry.ebitda_multiple,
        adjustment: (adjustment * 100.0).round() / 100.0,
        revenue_method_value,
        ebitda_method_value,
        asset_method_value,
        confidence: confidence(profile),
    }
}
