use async_trait::async_trait;

use super::{NarrativeContext, NarrativeError, NarrativeGenerator};
use crate::infrastructure::render::format_currency;

/// Builds a narrative from fixed sentences. Never fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateNarrator;

impl TemplateNarrator {
    pub fn render(&self, context: &NarrativeContext) -> String {
        let p = &context.profile;
        let v = &context.valuation;
        let h = &context.health;

        let mut text = format!(
            "{} is a {} business valued between {} and {}, with a midpoint of {}. \
             Its overall health score is {:.1} (grade {}).",
            p.business_name,
            p.industry.label().to_lowercase(),
            format_currency(v.low),
            format_currency(v.high),
            format_currency(v.mid),
            h.overall,
            h.grade,
        );

        let strongest = [
            ("financial", h.financial),
            ("operational", h.operational),
            ("market", h.market),
            ("risk", h.risk),
            ("growth", h.growth),
        ];
        if let (Some(best), Some(worst)) = (
            strongest.iter().max_by(|a, b| a.1.total_cmp(&b.1)),
            strongest.iter().min_by(|a, b| a.1.total_cmp(&b.1)),
        ) {
            text.push_str(&format!(
                " The strongest area is {} ({:.1}); the weakest is {} ({:.1}).",
                best.0, best.1, worst.0, worst.1
            ));
        }

        match context.opportunities.first() {
            Some(top) => text.push_str(&format!(
                " The highest-priority opportunity is to {}, worth an estimated {}.",
                top.title.to_lowercase(),
                format_currency(top.estimated_value_impact)
            )),
            None => text.push_str(" No major improvement opportunities were identified."),
        }

        text
    }
}

#[async_trait]
impl NarrativeGenerator for TemplateNarrator {
    async fn generate(&self, context: &NarrativeContext) -> Result<String, NarrativeError> {
        Ok(self.render(context))
    }
}
