use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::{NarrativeContext, NarrativeError, NarrativeGenerator};
use crate::infrastructure::render::format_currency;

const SYSTEM_PROMPT: &str = "You are a business valuation analyst. Write a concise executive \
     summary (at most 150 words) for a small business owner. Use plain language and only the \
     figures provided.";

const MAX_TOKENS: u32 = 400;

/// Connection settings for an OpenAI-compatible endpoint.
#[derive(Debug, Clone)]
pub struct LlmSettings {
    pub api_url: String,
    pub api_key: String,
    pub model: String,
    pub timeout: Duration,
}

/// Narrative generator backed by a chat-completion API.
pub struct LlmNarrator {
    settings: LlmSettings,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    #[serde(default)]
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

impl LlmNarrator {
    /// Builds the client with the configured request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`NarrativeError::Request`] if the TLS backend cannot be initialised.
    pub fn new(settings: LlmSettings) -> Result<Self, NarrativeError> {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .build()?;
        Ok(Self { settings, client })
    }

    fn build_request<'a>(&'a self, context: &NarrativeContext) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.settings.model,
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user_prompt(context),
                },
            ],
            max_tokens: MAX_TOKENS,
        }
    }
}

fn user_prompt(context: &NarrativeContext) -> String {
    let p = &context.profile;
    let v = &context.valuation;
    let h = &context.health;

    let mut prompt = format!(
        "Business: {}\nIndustry: {}\nAnnual revenue: {}\nEBITDA: {}\n\
         Valuation range: {} to {} (midpoint {})\n\
         Health score: {:.1} (grade {}); financial {:.1}, operational {:.1}, market {:.1}, \
         risk {:.1}, growth {:.1}\nTop opportunities:\n",
        p.business_name,
        p.industry.label(),
        format_currency(p.annual_revenue),
        format_currency(p.ebitda),
        format_currency(v.low),
        format_currency(v.high),
        format_currency(v.mid),
        h.overall,
        h.grade,
        h.financial,
        h.operational,
        h.market,
        h.risk,
        h.growth,
    );
    for o in context.opportunities.iter().take(3) {
        prompt.push_str(&format!(
            "- {} (estimated impact {})\n",
            o.title,
            format_currency(o.estimated_value_impact)
        ));
    }
    prompt
}

fn extract_content(response: ChatResponse) -> Result<String, NarrativeError> {
    response
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message.content.trim().to_string())
        .filter(|content| !content.is_empty())
        .ok_or(NarrativeError::EmptyContent)
}

#[async_trait]
impl NarrativeGenerator for LlmNarrator {
    #[instrument(skip(self, context), fields(model = %self.settings.model))]
    async fn generate(&self, context: &NarrativeContext) -> Result<String, NarrativeError> {
        let request = self.build_request(context);

        let response = self
            .client
            .post(&self.settings.api_url)
            .bearer_auth(&self.settings.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read response body".to_string());
            return Err(NarrativeError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = response.json().await?;
        let content = extract_content(parsed)?;
        debug!(chars = content.len(), "LLM narrative generated");
        Ok(content)
    }
}
