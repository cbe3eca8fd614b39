//! Threshold rules that turn weak spots into value-creation opportunities.

use std::cmp::Ordering;

use crate::analysis::{clamp_score, round_money};
use crate::domain::entities::{
    BusinessProfile, Effort, Opportunity, OpportunityCategory, OwnerDependence, ValuationResult,
};

/// Applies every rule and returns the matches, best first.
///
/// Sorted by priority score descending, then by estimated impact descending.
pub fn identify(profile: &BusinessProfile, valuation: &ValuationResult) -> Vec<Opportunity> {
    let industry = profile.industry.profile();
    let mid = valuation.mid;
    let revenue = profile.annual_revenue;
    let mut found = Vec::new();

    if profile.gross_margin_pct < industry.gross_margin_benchmark {
        let gap = (industry.gross_margin_benchmark - profile.gross_margin_pct).min(10.0);
        found.push(opportunity(
            OpportunityCategory::Pricing,
            "Improve pricing and gross margin",
            format!(
                "Gross margin of {:.1}% trails the {:.0}% industry benchmark. \
                 Revisiting pricing and supplier costs could close the gap.",
                profile.gross_margin_pct, industry.gross_margin_benchmark
            ),
            revenue * gap / 100.0 * industry.ebitda_multiple,
            Effort::Low,
            mid,
        ));
    }

    if profile.recurring_revenue_pct < 30.0 {
        found.push(opportunity(
            OpportunityCategory::RecurringRevenue,
            "Build recurring revenue",
            format!(
                "Only {:.0}% of revenue is recurring. Subscriptions, retainers or \
                 service contracts make earnings more predictable.",
                profile.recurring_revenue_pct
            ),
            0.15 * mid,
            Effort::Medium,
            mid,
        ));
    }

    if profile.customer_concentration_pct > 25.0 {
        found.push(opportunity(
            OpportunityCategory::CustomerBase,
            "Diversify the customer base",
            format!(
                "The largest customer accounts for {:.0}% of revenue. Reducing \
                 concentration lowers buyer-perceived risk.",
                profile.customer_concentration_pct
            ),
            mid * (profile.customer_concentration_pct - 25.0) / 100.0 * 0.5,
            Effort::Medium,
            mid,
        ));
    }

    let succession_share = match profile.owner_dependence {
        OwnerDependence::High => Some(0.10),
        OwnerDependence::Medium => Some(0.05),
        OwnerDependence::Low => None,
    };
    if let Some(share) = succession_share {
        found.push(opportunity(
            OpportunityCategory::Succession,
            "Reduce owner dependence",
            format!(
                "Owner dependence is {}. Documenting processes and building a \
                 management layer makes the business transferable.",
                profile.owner_dependence
            ),
            share * mid,
            Effort::High,
            mid,
        ));
    }

    if profile.customer_retention_pct < 80.0 {
        found.push(opportunity(
            OpportunityCategory::Retention,
            "Improve customer retention",
            format!(
                "Customer retention of {:.0}% is below 80%. Each retained customer \
                 compounds revenue at no acquisition cost.",
                profile.customer_retention_pct
            ),
            revenue * (80.0 - profile.customer_retention_pct) / 100.0
                * 0.5
                * industry.revenue_multiple,
            Effort::Medium,
            mid,
        ));
    }

    if profile.revenue_growth_pct < 5.0 {
        found.push(opportunity(
            OpportunityCategory::Growth,
            "Accelerate revenue growth",
            format!(
                "Revenue growth of {:.1}% is below 5%. New channels, products or \
                 markets would lift the valuation multiple.",
                profile.revenue_growth_pct
            ),
            revenue * 0.10 * industry.revenue_multiple,
            Effort::High,
            mid,
        ));
    }

    let below_benchmark = profile
        .revenue_per_employee()
        .filter(|rpe| *rpe < industry.revenue_per_employee_benchmark);
    if let Some(rpe) = below_benchmark {
        found.push(opportunity(
            OpportunityCategory::Efficiency,
            "Raise operational efficiency",
            format!(
                "Revenue per employee of {:.0} is below the {:.0} industry \
                 benchmark. Automation and process work could raise output.",
                rpe, industry.revenue_per_employee_benchmark
            ),
            revenue * 0.05 * industry.ebitda_multiple,
            Effort::Medium,
            mid,
        ));
    }

    if profile.total_assets > 0.0 && profile.debt_ratio() > 0.6 {
        found.push(opportunity(
            OpportunityCategory::CapitalStructure,
            "Strengthen the balance sheet",
            format!(
                "Liabilities are {:.0}% of assets. Paying down debt or refinancing \
                 improves the equity value a buyer would pay for.",
                profile.debt_ratio() * 100.0
            ),
            (profile.total_liabilities - 0.6 * profile.total_assets) * 0.25,
            Effort::Low,
            mid,
        ));
    }

    found.sort_by(|a, b| {
        b.priority_score
            .partial_cmp(&a.priority_score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| {
                b.estimated_value_impact
                    .partial_cmp(&a.estimated_value_impact)
                    .unwrap_or(Ordering::Equal)
            })
    });
    found
}

fn effort_bonus(effort: Effort) -> f64 {
    match effort {
        Effort::Low => 30.0,
        Effort::Medium => 15.0,
        Effort::High => 0.0,
    }
}

fn opportunity(
    category: OpportunityCategory,
    title: &str,
    description: String,
    impact: f64,
    effort: Effort,
    mid: f64,
) -> Opportunity {
    let impact = round_money(impact);
    let ratio = if mid > 0.0 { impact / mid } else { 0.0 };

    Opportunity {
        category,
        title: title.to_string(),
        description,
        estimated_value_impact: impact,
        effort,
        priority_score: clamp_score(ratio * 100.0 * 2.0 + effort_bonus(effort)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::valuation::value_business;
    use crate::domain::entities::evaluation::fixtures::{healthy_tech, struggling_retail};

    fn run(profile: &BusinessProfile) -> Vec<Opportunity> {
        identify(profile, &value_business(profile))
    }

    #[test]
    fn test_healthy_tech_only_has_efficiency() {
        let found = run(&healthy_tech());

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].category, OpportunityCategory::Efficiency);
        assert_eq!(found[0].estimated_value_impact, 600_000.0);
        assert_eq!(found[0].effort, Effort::Medium);
        assert_eq!(found[0].priority_score, 65.0);
    }

    #[test]
    fn test_struggling_retail_ordering() {
        let found = run(&struggling_retail());

        let categories: Vec<_> = found.iter().map(|o| o.category).collect();
        assert_eq!(
            categories,
            vec![
                OpportunityCategory::Pricing,
                OpportunityCategory::Efficiency,
                OpportunityCategory::Retention,
                OpportunityCategory::Growth,
                OpportunityCategory::CapitalStructure,
                OpportunityCategory::RecurringRevenue,
                OpportunityCategory::CustomerBase,
                OpportunityCategory::Succession,
            ]
        );

        let scores: Vec<_> = found.iter().map(|o| o.priority_score).collect();
        assert_eq!(scores, vec![100.0, 100.0, 77.3, 62.3, 48.2, 45.0, 35.0, 20.0]);

        assert_eq!(found[0].estimated_value_impact, 1_100_000.0);
        assert_eq!(found[1].estimated_value_impact, 550_000.0);
        assert_eq!(found[4].estimated_value_impact, 35_000.0);
    }

    #[test]
    fn test_margin_gap_is_capped_at_ten_points() {
        let mut profile = healthy_tech();
        profile.gross_margin_pct = 20.0;

        let found = run(&profile);
        let pricing = found
            .iter()
            .find(|o| o.category == OpportunityCategory::Pricing)
            .unwrap();

        // 1_000_000 * 10% * 12
        assert_eq!(pricing.estimated_value_impact, 1_200_000.0);
    }

    #[test]
    fn test_zero_valuation_yields_effort_only_priority() {
        let mut profile = struggling_retail();
        profile.annual_revenue = 0.0;
        profile.ebitda = 0.0;
        profile.total_liabilities = 500_000.0;

        let valuation = value_business(&profile);
        assert_eq!(valuation.mid, 0.0);

        let found = identify(&profile, &valuation);
        let capital = found
            .iter()
            .find(|o| o.category == OpportunityCategory::CapitalStructure)
            .unwrap();
        assert_eq!(capital.priority_score, 30.0);
        assert!(found.iter().all(|o| o.priority_score <= 30.0));
    }

    #[test]
    fn test_no_employees_skips_efficiency() {
        let mut profile = healthy_tech();
        profile.employee_count = 0;
        assert!(run(&profile).is_empty());
    }
}
