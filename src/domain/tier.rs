//! Subscription tiers and gated features.

text_enum! {
    /// Subscription level gating feature and API access.
    ///
    /// Tiers are totally ordered: `Basic < Professional < Enterprise`.
    #[derive(PartialOrd, Ord)]
    pub enum Tier("tier") {
        Basic => "basic",
        Professional => "professional",
        Enterprise => "enterprise",
    }
}

text_enum! {
    /// A capability that requires a minimum subscription tier.
    pub enum Feature("feature") {
        BasicReport => "basic_report",
        HtmlExport => "html_export",
        ProfessionalReport => "professional_report",
        PdfExport => "pdf_export",
        CsvExport => "csv_export",
        MarketAnalysis => "market_analysis",
        FullOpportunityList => "full_opportunity_list",
        AiNarrative => "ai_narrative",
        EnterpriseReport => "enterprise_report",
        ScenarioAnalysis => "scenario_analysis",
        PrioritySupport => "priority_support",
    }
}

impl Feature {
    /// Lowest tier that unlocks this feature.
    pub fn minimum_tier(self) -> Tier {
        match self {
            Feature::BasicReport | Feature::HtmlExport => Tier::Basic,
            Feature::ProfessionalReport
            | Feature::PdfExport
            | Feature::CsvExport
            | Feature::MarketAnalysis
            | Feature::FullOpportunityList
            | Feature::AiNarrative => Tier::Professional,
            Feature::EnterpriseReport | Feature::ScenarioAnalysis | Feature::PrioritySupport => {
                Tier::Enterprise
            }
        }
    }
}

impl Tier {
    /// Returns true if this tier unlocks `feature`.
    pub fn has_feature(self, feature: Feature) -> bool {
        self >= feature.minimum_tier()
    }

    /// All features unlocked by this tier.
    pub fn features(self) -> Vec<Feature> {
        Feature::ALL
            .iter()
            .copied()
            .filter(|f| self.has_feature(*f))
            .collect()
    }

    /// Evaluations a user may create per calendar month; `None` is unlimited.
    pub fn monthly_evaluation_quota(self) -> Option<u32> {
        match self {
            Tier::Basic => Some(3),
            Tier::Professional => Some(25),
            Tier::Enterprise => None,
        }
    }

    /// Number of opportunities shown to this tier; `None` shows all.
    pub fn opportunity_limit(self) -> Option<usize> {
        match self {
            Tier::Basic => Some(3),
            Tier::Professional | Tier::Enterprise => None,
        }
    }

    /// The feature that gates generating a report of this tier.
    pub fn report_feature(self) -> Feature {
        match self {
            Tier::Basic => Feature::BasicReport,
            Tier::Professional => Feature::ProfessionalReport,
            Tier::Enterprise => Feature::EnterpriseReport,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_ordering() {
        assert!(Tier::Basic < Tier::Professional);
        assert!(Tier::Professional < Tier::Enterprise);
    }

    #[test]
    fn test_tier_parse_case_insensitive() {
        assert_eq!("Professional".parse::<Tier>().unwrap(), Tier::Professional);
        assert_eq!(" enterprise ".parse::<Tier>().unwrap(), Tier::Enterprise);
        assert!("gold".parse::<Tier>().is_err());
    }

    #[test]
    fn test_basic_features() {
        let features = Tier::Basic.features();
        assert_eq!(features, vec![Feature::BasicReport, Feature::HtmlExport]);
        assert!(!Tier::Basic.has_feature(Feature::PdfExport));
    }

    #[test]
    fn test_enterprise_has_everything() {
        assert_eq!(Tier::Enterprise.features().len(), Feature::ALL.len());
    }

    #[test]
    fn test_professional_boundaries() {
        assert!(Tier::Professional.has_feature(Feature::CsvExport));
        assert!(Tier::Professional.has_feature(Feature::AiNarrative));
        assert!(!Tier::Professional.has_feature(Feature::EnterpriseReport));
        assert!(!Tier::Professional.has_feature(Feature::ScenarioAnalysis));
    }

    #[test]
    fn test_quotas() {
        assert_eq!(Tier::Basic.monthly_evaluation_quota(), Some(3));
        assert_eq!(Tier::Professional.monthly_evaluation_quota(), Some(25));
        assert_eq!(Tier::Enterprise.monthly_evaluation_quota(), None);
    }

    #[test]
    fn test_serde_representation() {
        assert_eq!(
            serde_json::to_string(&Feature::FullOpportunityList).unwrap(),
            "\"full_opportunity_list\""
        );
        let tier: Tier = serde_json::from_str("\"basic\"").unwrap();
        assert_eq!(tier, Tier::Basic);
    }
}
