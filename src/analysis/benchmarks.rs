//! Comparison of operating metrics against industry benchmarks.

use crate::analysis::round1;
use crate::domain::entities::{BenchmarkComparison, BenchmarkStanding, BusinessProfile};

/// Relative band around a benchmark that counts as on par.
const AT_BAND: f64 = 0.02;

/// Compares gross margin, revenue per employee and growth.
///
/// Revenue per employee is omitted when the business reports no employees.
pub fn compare_to_industry(profile: &BusinessProfile) -> Vec<BenchmarkComparison> {
    let industry = profile.industry.profile();
    let mut comparisons = vec![compare(
        "gross_margin_pct",
        profile.gross_margin_pct,
        industry.gross_margin_benchmark,
    )];

    if let Some(rpe) = profile.revenue_per_employee() {
        comparisons.push(compare(
            "revenue_per_employee",
            rpe.round(),
            industry.revenue_per_employee_benchmark,
        ));
    }

    comparisons.push(compare(
        "revenue_growth_pct",
        profile.revenue_growth_pct,
        industry.growth_benchmark,
    ));
    comparisons
}

fn compare(metric: &str, value: f64, benchmark: f64) -> BenchmarkComparison {
    let delta = value - benchmark;
    let standing = if delta.abs() <= benchmark.abs() * AT_BAND {
        BenchmarkStanding::At
    } else if delta > 0.0 {
        BenchmarkStanding::Above
    } else {
        BenchmarkStanding::Below
    };

    BenchmarkComparison {
        metric: metric.to_string(),
        value: round1(value),
        benchmark,
        delta: round1(delta),
        standing,
    }
}
