//! Narrative summaries for evaluations.
//!
//! - [`LlmNarrator`] - OpenAI-compatible chat-completion client
//! - [`TemplateNarrator`] - Deterministic fallback built from the numbers

mod llm;
mod template;

pub use llm::{LlmNarrator, LlmSettings};
pub use template::TemplateNarrator;

use async_trait::async_trait;

use crate::domain::entities::{BusinessProfile, HealthScore, Opportunity, ValuationResult};

/// Errors produced while generating a narrative.
#[derive(Debug, thiserror::Error)]
pub enum NarrativeError {
    #[error("LLM request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("LLM returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("LLM response contained no content")]
    EmptyContent,
}

/// Inputs a narrative is written from.
#[derive(Debug, Clone)]
pub struct NarrativeContext {
    pub profile: BusinessProfile,
    pub valuation: ValuationResult,
    pub health: HealthScore,
    pub opportunities: Vec<Opportunity>,
}

/// Produces a short plain-text executive summary.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NarrativeGenerator: Send + Sync {
    async fn generate(&self, context: &NarrativeContext) -> Result<String, NarrativeError>;
}
