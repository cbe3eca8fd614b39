//! Conservative, base and optimistic valuation scenarios.

use crate::analysis::round1;
use crate::analysis::valuation::value_business;
use crate::domain::entities::{BusinessProfile, Scenario};

const GROWTH_SHIFT: f64 = 5.0;

/// Re-runs the valuation on derived profiles.
///
/// Always returns three scenarios in the order conservative, base, optimistic.
pub fn analyze_scenarios(profile: &BusinessProfile) -> Vec<Scenario> {
    let base = value_business(profile);

    let variants = [
        (
            "conservative",
            "Growth 5 points lower, EBITDA and net income down 10%",
            -GROWTH_SHIFT,
            0.9,
        ),
        ("base", "Figures as submitted", 0.0, 1.0),
        (
            "optimistic",
            "Growth 5 points higher, EBITDA and net income up 10%",
            GROWTH_SHIFT,
            1.1,
        ),
    ];

    variants
        .into_iter()
        .map(|(name, description, growth_shift, earnings_factor)| {
            let valuation = if name == "base" {
                base.clone()
            } else {
                let mut derived = profile.clone();
                derived.revenue_growth_pct += growth_shift;
                derived.ebitda *= earnings_factor;
                derived.net_income *= earnings_factor;
                value_business(&derived)
            };

            let delta_pct = if base.mid > 0.0 {
                round1((valuation.mid - base.mid) / base.mid * 100.0)
            } else {
                0.0
            };

            Scenario {
                name: name.to_string(),
                description: description.to_string(),
                low: valuation.low,
                mid: valuation.mid,
                high: valuation.high,
                delta_pct,
            }
        })
        .collect()
}
