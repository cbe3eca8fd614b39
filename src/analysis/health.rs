//! Weighted business health score.

use crate::analysis::clamp_score;
use crate::domain::entities::{
    BusinessProfile, CompetitivePosition, HealthGrade, HealthScore, MarketHealth, OwnerDependence,
};

const FINANCIAL_WEIGHT: f64 = 0.30;
const OPERATIONAL_WEIGHT: f64 = 0.20;
const MARKET_WEIGHT: f64 = 0.20;
const RISK_WEIGHT: f64 = 0.15;
const GROWTH_WEIGHT: f64 = 0.15;

/// Computes the five sub-scores, the weighted overall score and its grade.
pub fn score_health(profile: &BusinessProfile, market: &MarketHealth) -> HealthScore {
    let financial = financial_score(profile);
    let operational = operational_score(profile);
    let market = market_score(profile, market);
    let risk = risk_score(profile);
    let growth = growth_score(profile);

    let overall = clamp_score(
        FINANCIAL_WEIGHT * financial
            + OPERATIONAL_WEIGHT * operational
            + MARKET_WEIGHT * market
            + RISK_WEIGHT * risk
            + GROWTH_WEIGHT * growth,
    );

    HealthScore {
        overall,
        grade: HealthGrade::from_score(overall),
        financial,
        operational,
        market,
        risk,
        growth,
    }
}

fn financial_score(profile: &BusinessProfile) -> f64 {
    let margin = clamp_score(50.0 + 2.5 * profile.net_margin_pct());
    let gross = clamp_score(1.4 * profile.gross_margin_pct);
    let leverage = if profile.total_assets > 0.0 {
        clamp_score(100.0 - 100.0 * profile.total_liabilities / profile.total_assets)
    } else if profile.total_liabilities > 0.0 {
        30.0
    } else {
        100.0
    };

    clamp_score(0.4 * margin + 0.3 * gross + 0.3 * leverage)
}

fn revenue_per_employee_score(profile: &BusinessProfile) -> f64 {
    match profile.revenue_per_employee() {
        None => 50.0,
        Some(rpe) if rpe >= 250_000.0 => 100.0,
        Some(rpe) if rpe >= 150_000.0 => 80.0,
        Some(rpe) if rpe >= 100_000.0 => 65.0,
        Some(rpe) if rpe >= 50_000.0 => 45.0,
        Some(_) => 25.0,
    }
}

fn operational_score(profile: &BusinessProfile) -> f64 {
    let retention = clamp_score(profile.customer_retention_pct);
    let owner = match profile.owner_dependence {
        OwnerDependence::Low => 100.0,
        OwnerDependence::Medium => 60.0,
        OwnerDependence::High => 25.0,
    };

    clamp_score(0.4 * retention + 0.3 * revenue_per_employee_score(profile) + 0.3 * owner)
}

fn market_score(profile: &BusinessProfile, market: &MarketHealth) -> f64 {
    let position = match profile.competitive_position {
        CompetitivePosition::Leader => 100.0,
        CompetitivePosition::Strong => 80.0,
        CompetitivePosition::Average => 55.0,
        CompetitivePosition::Weak => 30.0,
    };

    clamp_score(0.5 * market.score + 0.5 * position)
}

/// Higher is safer.
fn risk_score(profile: &BusinessProfile) -> f64 {
    let mut score: f64 = 100.0;

    if profile.customer_concentration_pct > 20.0 {
        score -= 1.5 * (profile.customer_concentration_pct - 20.0);
    }

    score -= match profile.owner_dependence {
        OwnerDependence::High => 25.0,
        OwnerDependence::Medium => 10.0,
        OwnerDependence::Low => 0.0,
    };

    if profile.years_in_business < 3 {
        score -= 20.0;
    } else if profile.years_in_business < 5 {
        score -= 10.0;
    }

    let debt_ratio = profile.debt_ratio();
    if debt_ratio > 0.8 {
        score -= 20.0;
    } else if debt_ratio > 0.5 {
        score -= 10.0;
    }

    if profile.net_income < 0.0 {
        score -= 15.0;
    }

    clamp_score(score)
}

fn growth_score(profile: &BusinessProfile) -> f64 {
    let momentum = clamp_score(50.0 + 2.0 * profile.revenue_growth_pct);
    clamp_score(0.8 * momentum + 0.2 * profile.recurring_revenue_pct)
}
