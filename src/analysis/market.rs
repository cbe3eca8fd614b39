//! Industry market health analyzer.

use crate::analysis::clamp_score;
use crate::domain::Industry;
use crate::domain::entities::{MarketHealth, MarketOutlook};

/// Scores an industry's market from its outlook, stability and competition.
///
/// `score = 0.4 * outlook + 0.3 * stability + 0.3 * (100 - competition)`
pub fn analyze_market(industry: Industry) -> MarketHealth {
    let p = industry.profile();
    let score = clamp_score(0.4 * p.outlook + 0.3 * p.stability + 0.3 * (100.0 - p.competition));

    let outlook = if score >= 65.0 {
        MarketOutlook::Expanding
    } else if score >= 45.0 {
        MarketOutlook::Stable
    } else {
        MarketOutlook::Contracting
    };

    MarketHealth {
        industry,
        score,
        outlook,
        growth_outlook: p.outlook,
        competition: p.competition,
        stability: p.stability,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_technology_is_stable() {
        let m = analyze_market(Industry::Technology);
        assert_eq!(m.score, 59.5);
        assert_eq!(m.outlook, MarketOutlook::Stable);
    }

    #[test]
    fn test_healthcare_is_expanding() {
        let m = analyze_market(Industry::Healthcare);
        assert_eq!(m.score, 71.0);
        assert_eq!(m.outlook, MarketOutlook::Expanding);
    }

    #[test]
    fn test_restaurant_is_contracting() {
        let m = analyze_market(Industry::Restaurant);
        assert_eq!(m.score, 36.0);
        assert_eq!(m.outlook, MarketOutlook::Contracting);
    }

    #[test]
    fn test_factors_are_reported() {
        let m = analyze_market(Industry::Retail);
        assert_eq!(m.industry, Industry::Retail);
        assert_eq!(m.growth_outlook, 40.0);
        assert_eq!(m.competition, 70.0);
        assert_eq!(m.stability, 60.0);
    }
}
