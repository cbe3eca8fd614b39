//! Deterministic business-rule engines.
//!
//! Every function in this module is pure: the same business profile always
//! yields the same valuation, scores and opportunities. Scores are clamped to
//! `[0, 100]` and rounded to one decimal; monetary values are rounded to whole
//! currency units and never negative.
//!
//! - [`valuation`] - Multiple-based valuation range
//! - [`market`] - Industry market health
//! - [`health`] - Weighted health score and grade
//! - [`opportunities`] - Threshold rules for value-creation opportunities
//! - [`scenarios`] - Conservative/base/optimistic valuation scenarios
//! - [`benchmarks`] - Comparison against industry benchmarks
//! - [`aggregate`] - Dashboard aggregation over a user's evaluations

pub mod aggregate;
pub mod benchmarks;
pub mod health;
pub mod market;
pub mod opportunities;
pub mod scenarios;
pub mod valuation;

use crate::domain::entities::{Assessment, BusinessProfile};

/// Runs every engine needed to store an evaluation.
pub fn assess(profile: &BusinessProfile) -> Assessment {
    let valuation = valuation::value_business(profile);
    let market = market::analyze_market(profile.industry);
    let health = health::score_health(profile, &market);
    let opportunities = opportunities::identify(profile, &valuation);

    Assessment {
        valuation,
        market,
        health,
        opportunities,
    }
}

/// Rounds to one decimal place.
pub(crate) fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Clamps to `[0, 100]` and rounds to one decimal; NaN becomes 0.
pub(crate) fn clamp_score(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    round1(value.clamp(0.0, 100.0))
}

/// Rounds to whole currency units, flooring at zero.
pub(crate) fn round_money(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.max(0.0).round()
}
