//! Evaluation submission, re-evaluation, retrieval and export.

use std::sync::Arc;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::Serialize;
use serde_json::json;
use tracing::{info, warn};

use crate::analysis;
use crate::application::services::AccessService;
use crate::application::services::dashboard_service::invalidate_dashboard;
use crate::domain::Feature;
use crate::domain::entities::{
    Assessment, BusinessProfile, Evaluation, EvaluationUpdate, NewEvaluation, User,
};
use crate::domain::repositories::EvaluationRepository;
use crate::error::AppError;
use crate::infrastructure::cache::CacheService;
use crate::infrastructure::narrative::{NarrativeContext, NarrativeGenerator, TemplateNarrator};

const CSV_HEADER: [&str; 11] = [
    "id",
    "business_name",
    "industry",
    "annual_revenue",
    "valuation_low",
    "valuation_mid",
    "valuation_high",
    "health_score",
    "grade",
    "opportunity_count",
    "created_at",
];

/// Monthly quota consumption for a user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuotaUsage {
    pub used: u32,
    pub limit: Option<u32>,
    pub remaining: Option<u32>,
}

/// Orchestrates the analysis engines, narrative generation and persistence.
pub struct EvaluationService {
    repository: Arc<dyn EvaluationRepository>,
    access: AccessService,
    cache: Arc<dyn CacheService>,
    llm: Option<Arc<dyn NarrativeGenerator>>,
    template: TemplateNarrator,
}

impl EvaluationService {
    /// Creates the service; `llm` is `None` when no LLM endpoint is configured.
    pub fn new(
        repository: Arc<dyn EvaluationRepository>,
        access: AccessService,
        cache: Arc<dyn CacheService>,
        llm: Option<Arc<dyn NarrativeGenerator>>,
    ) -> Self {
        Self {
            repository,
            access,
            cache,
            llm,
            template: TemplateNarrator,
        }
    }

    /// Evaluations the user created this calendar month against their quota.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    pub async fn quota_usage(&self, user: &User) -> Result<QuotaUsage, AppError> {
        let used = self
            .repository
            .count_created_since(user.id, month_start(Utc::now()))
            .await?;
        let used = u32::try_from(used).unwrap_or(u32::MAX);
        let limit = self.access.monthly_quota(user.tier);

        Ok(QuotaUsage {
            used,
            limit,
            remaining: limit.map(|l| l.saturating_sub(used)),
        })
    }

    /// Runs every engine on `profile` and stores the result.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Forbidden`] when the monthly quota is used up.
    /// Returns [`AppError::Internal`] on database errors.
    pub async fn submit(
        &self,
        user: &User,
        profile: BusinessProfile,
    ) -> Result<Evaluation, AppError> {
        // Checked up front so an exhausted quota never pays for a narrative;
        // the insert re-checks atomically.
        let quota = self.quota_usage(user).await?;
        if let Some(limit) = quota.limit.filter(|limit| quota.used >= *limit) {
            return Err(quota_exhausted(user, limit, quota.used));
        }

        let assessment = analysis::assess(&profile);
        let narrative = self.narrate(user, &profile, &assessment).await;

        let new_evaluation = NewEvaluation {
            user_id: user.id,
            profile,
            valuation: assessment.valuation,
            health: assessment.health,
            opportunities: assessment.opportunities,
            narrative: Some(narrative),
        };
        let evaluation = match quota.limit {
            Some(limit) => self
                .repository
                .create_within_quota(new_evaluation, month_start(Utc::now()), i64::from(limit))
                .await?
                .ok_or_else(|| quota_exhausted(user, limit, limit))?,
            None => self.repository.create(new_evaluation).await?,
        };

        info!(
            user_id = user.id,
            evaluation_id = evaluation.id,
            valuation_mid = evaluation.valuation.mid,
            grade = %evaluation.health.grade,
            "Evaluation created"
        );
        invalidate_dashboard(self.cache.as_ref(), user.id).await;
        Ok(evaluation)
    }

    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the evaluation is missing, deleted or
    /// owned by someone else.
    pub async fn get(&self, user: &User, id: i64) -> Result<Evaluation, AppError> {
        self.repository
            .find_by_id(id, user.id)
            .await?
            .ok_or_else(|| not_found(id))
    }

    /// Returns one page of live evaluations, newest first, and the total count.
    pub async fn list(
        &self,
        user: &User,
        page: u32,
        page_size: u32,
    ) -> Result<(Vec<Evaluation>, i64), AppError> {
        let offset = i64::from(page.saturating_sub(1)) * i64::from(page_size);
        let items = self
            .repository
            .list(user.id, offset, i64::from(page_size))
            .await?;
        let total = self.repository.count(user.id).await?;
        Ok((items, total))
    }

    pub async fn list_all(&self, user: &User) -> Result<Vec<Evaluation>, AppError> {
        self.repository.list_all(user.id).await
    }

    /// Re-evaluates with new business data. Does not count against the quota.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no live evaluation matches.
    pub async fn update(
        &self,
        user: &User,
        id: i64,
        profile: BusinessProfile,
    ) -> Result<Evaluation, AppError> {
        self.get(user, id).await?;

        let assessment = analysis::assess(&profile);
        let narrative = self.narrate(user, &profile, &assessment).await;

        let updated = self
            .repository
            .update(
                id,
                user.id,
                EvaluationUpdate {
                    profile,
                    valuation: assessment.valuation,
                    health: assessment.health,
                    opportunities: assessment.opportunities,
                    narrative: Some(narrative),
                },
            )
            .await?
            .ok_or_else(|| not_found(id))?;

        info!(user_id = user.id, evaluation_id = id, "Evaluation updated");
        invalidate_dashboard(self.cache.as_ref(), user.id).await;
        Ok(updated)
    }

    /// Soft-deletes an evaluation.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if it is missing or already deleted.
    pub async fn delete(&self, user: &User, id: i64) -> Result<(), AppError> {
        if !self.repository.soft_delete(id, user.id).await? {
            return Err(not_found(id));
        }
        info!(user_id = user.id, evaluation_id = id, "Evaluation deleted");
        invalidate_dashboard(self.cache.as_ref(), user.id).await;
        Ok(())
    }

    /// Exports every live evaluation as CSV, newest first.
    ///
    /// Text cells that a spreadsheet would treat as a formula are prefixed
    /// with `'`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Forbidden`] without the `csv_export` feature.
    pub async fn export_csv(&self, user: &User) -> Result<String, AppError> {
        self.access.require(user, Feature::CsvExport)?;
        let evaluations = self.repository.list_all(user.id).await?;

        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(CSV_HEADER).map_err(csv_error)?;

        for e in &evaluations {
            writer
                .write_record([
                    e.id.to_string(),
                    escape_formula(&e.profile.business_name),
                    e.profile.industry.to_string(),
                    format!("{:.2}", e.profile.annual_revenue),
                    format!("{:.0}", e.valuation.low),
                    format!("{:.0}", e.valuation.mid),
                    format!("{:.0}", e.valuation.high),
                    format!("{:.1}", e.health.overall),
                    e.health.grade.to_string(),
                    e.opportunities.len().to_string(),
                    e.created_at.to_rfc3339(),
                ])
                .map_err(csv_error)?;
        }

        let bytes = writer.into_inner().map_err(|e| csv_error(e.into_error()))?;
        String::from_utf8(bytes).map_err(|e| {
            AppError::internal("CSV export failed", json!({ "reason": e.to_string() }))
        })
    }

    async fn narrate(
        &self,
        user: &User,
        profile: &BusinessProfile,
        assessment: &Assessment,
    ) -> String {
        let context = NarrativeContext {
            profile: profile.clone(),
            valuation: assessment.valuation.clone(),
            health: assessment.health.clone(),
            opportunities: assessment.opportunities.clone(),
        };

        let llm = self
            .llm
            .as_ref()
            .filter(|_| self.access.check(user, Feature::AiNarrative));
        if let Some(llm) = llm {
            match llm.generate(&context).await {
                Ok(text) => return text,
                Err(e) => warn!(
                    user_id = user.id,
                    error = %e,
                    "LLM narrative failed, using template"
                ),
            }
        }

        self.template.render(&context)
    }

}

fn quota_exhausted(user: &User, limit: u32, used: u32) -> AppError {
    AppError::forbidden(
        "Monthly evaluation quota exhausted",
        json!({ "tier": user.tier, "quota": limit, "used": used }),
    )
}

/// First instant of the UTC calendar month containing `now`.
pub fn month_start(now: DateTime<Utc>) -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(now.year(), now.month(), 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .unwrap_or(now)
}

fn escape_formula(value: &str) -> String {
    if value.starts_with(['=', '+', '-', '@']) {
        format!("'{value}")
    } else {
        value.to_string()
    }
}

fn not_found(id: i64) -> AppError {
    AppError::not_found("Evaluation not found", json!({ "id": id }))
}

fn csv_error(e: impl std::fmt::Display) -> AppError {
    AppError::internal("CSV export failed", json!({ "reason": e.to_string() }))
}
