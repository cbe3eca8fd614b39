//! Industry classification and per-industry reference data.

text_enum! {
    /// Industry a business operates in.
    pub enum Industry("industry") {
        Technology => "technology",
        Ecommerce => "ecommerce",
        Retail => "retail",
        Manufacturing => "manufacturing",
        Healthcare => "healthcare",
        ProfessionalServices => "professional_services",
        Restaurant => "restaurant",
        Construction => "construction",
        RealEstate => "real_estate",
        Other => "other",
    }
}

/// Static valuation multiples, operating benchmarks and market factors.
///
/// Market factors (`outlook`, `competition`, `stability`) are on a 0-100
/// scale; higher competition is worse for incumbents.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndustryProfile {
    pub revenue_multiple: f64,
    pub ebitda_multiple: f64,
    pub gross_margin_benchmark: f64,
    pub revenue_per_employee_benchmark: f64,
    pub growth_benchmark: f64,
    pub outlook: f64,
    pub competition: f64,
    pub stability: f64,
}

impl Industry {
    /// Reference data for this industry.
    pub fn profile(self) -> IndustryProfile {
        let (rev, ebitda, gm, rpe, growth, outlook, competition, stability) = match self {
            Industry::Technology => (2.5, 12.0, 65.0, 200_000.0, 15.0, 85.0, 75.0, 60.0),
            Industry::Ecommerce => (1.2, 8.0, 40.0, 250_000.0, 12.0, 75.0, 80.0, 55.0),
            Industry::Retail => (0.6, 5.5, 35.0, 150_000.0, 3.0, 40.0, 70.0, 60.0),
            Industry::Manufacturing => (0.9, 6.5, 30.0, 180_000.0, 4.0, 50.0, 55.0, 70.0),
            Industry::Healthcare => (1.4, 9.5, 45.0, 120_000.0, 8.0, 80.0, 50.0, 80.0),
            Industry::ProfessionalServices => (1.0, 7.0, 50.0, 130_000.0, 6.0, 60.0, 60.0, 70.0),
            Industry::Restaurant => (0.5, 4.5, 60.0, 70_000.0, 4.0, 45.0, 85.0, 45.0),
            Industry::Construction => (0.6, 5.0, 25.0, 160_000.0, 5.0, 55.0, 65.0, 50.0),
            Industry::RealEstate => (2.0, 10.0, 55.0, 300_000.0, 5.0, 55.0, 60.0, 65.0),
            Industry::Other => (0.8, 6.0, 40.0, 120_000.0, 5.0, 50.0, 60.0, 60.0),
        };

        IndustryProfile {
            revenue_multiple: rev,
            ebitda_multiple: ebitda,
            gross_margin_benchmark: gm,
            revenue_per_employee_benchmark: rpe,
            growth_benchmark: growth,
            outlook,
            competition,
            stability,
        }
    }

    /// Human-readable label for reports.
    pub fn label(self) -> &'static str {
        match self {
            Industry::Technology => "Technology",
            Industry::Ecommerce => "E-commerce",
            Industry::Retail => "Retail",
            Industry::Manufacturing => "Manufacturing",
            Industry::Healthcare => "Healthcare",
            Industry::ProfessionalServices => "Professional Services",
            Industry::Restaurant => "Restaurant",
            Industry::Construction => "Construction",
            Industry::RealEstate => "Real Estate",
            Industry::Other => "Other",
        }
    }
}
