//! Report templates, generation and download.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use serde_json::json;
use tracing::info;

use crate::application::services::AccessService;
use crate::application::services::dashboard_service::invalidate_dashboard;
use crate::domain::Tier;
use crate::domain::entities::{NewReport, Report, ReportFormat, ReportSection, User};
use crate::domain::repositories::{EvaluationRepository, ReportRepository};
use crate::error::AppError;
use crate::infrastructure::cache::CacheService;
use crate::infrastructure::render::{ReportDocument, render_html, render_pdf};
use crate::infrastructure::storage::ReportStorage;

/// Description of a report template and whether the caller may use it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportTemplate {
    pub tier: Tier,
    pub name: String,
    pub description: String,
    pub sections: Vec<ReportSection>,
    pub formats: Vec<ReportFormat>,
    pub available: bool,
}

/// Parameters for [`ReportService::generate`].
#[derive(Debug, Clone)]
pub struct GenerateReport {
    pub tier: Tier,
    pub evaluation_id: i64,
    pub format: ReportFormat,
    pub title: Option<String>,
}

pub struct ReportService {
    reports: Arc<dyn ReportRepository>,
    evaluations: Arc<dyn EvaluationRepository>,
    storage: ReportStorage,
    access: AccessService,
    cache: Arc<dyn CacheService>,
}

impl ReportService {
    pub fn new(
        reports: Arc<dyn ReportRepository>,
        evaluations: Arc<dyn EvaluationRepository>,
        storage: ReportStorage,
        access: AccessService,
        cache: Arc<dyn CacheService>,
    ) -> Self {
        Self {
            reports,
            evaluations,
            storage,
            access,
            cache,
        }
    }

    /// All three templates, flagged by what `tier` unlocks.
    pub fn templates(&self, tier: Tier) -> Vec<ReportTemplate> {
        Tier::ALL
            .iter()
            .map(|&template_tier| {
                let (name, description) = match template_tier {
                    Tier::Basic => (
                        "Basic valuation report",
                        "Valuation range, overall health and the top three opportunities.",
                    ),
                    Tier::Professional => (
                        "Professional valuation report",
                        "Adds the health breakdown, every opportunity, market analysis and \
                         an analyst narrative.",
                    ),
                    Tier::Enterprise => (
                        "Enterprise valuation report",
                        "Adds scenario analysis, industry benchmarks and a phased action plan.",
                    ),
                };
                ReportTemplate {
                    tier: template_tier,
                    name: name.to_string(),
                    description: description.to_string(),
                    sections: ReportSection::for_tier(template_tier),
                    formats: ReportFormat::offered_for(template_tier).to_vec(),
                    available: self
                        .access
                        .has_feature(tier, template_tier.report_feature()),
                }
            })
            .collect()
    }

    /// Renders, stores and records a report.
    ///
    /// # Errors
    ///
    /// - [`AppError::Forbidden`] if the tier's report or the format is not unlocked
    /// - [`AppError::Validation`] if the template does not offer the format
    /// - [`AppError::NotFound`] if the evaluation does not exist
    /// - [`AppError::Internal`] on rendering, storage or database errors
    pub async fn generate(
        &self,
        user: &User,
        request: GenerateReport,
    ) -> Result<Report, AppError> {
        let GenerateReport {
            tier,
            evaluation_id,
            format,
            title,
        } = request;

        self.access.require(user, tier.report_feature())?;
        self.access.require(user, format.feature())?;
        if !ReportFormat::offered_for(tier).contains(&format) {
            return Err(AppError::bad_request(
                "Format not offered by this report template",
                json!({ "tier": tier, "format": format }),
            ));
        }

        let evaluation = self
            .evaluations
            .find_by_id(evaluation_id, user.id)
            .await?
            .ok_or_else(|| {
                AppError::not_found("Evaluation not found", json!({ "id": evaluation_id }))
            })?;

        let title = title
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| {
                format!("{} valuation report", evaluation.profile.business_name)
            });

        let document =
            ReportDocument::build(&title, tier, &evaluation, user.display_name(), Utc::now());
        let bytes = match format {
            ReportFormat::Html => render_html(&document)?,
            ReportFormat::Pdf => render_pdf(&document)?,
        };

        let storage_path = self
            .storage
            .store(user.id, format.extension(), &bytes)
            .await?;

        let created = self
            .reports
            .create(NewReport {
                user_id: user.id,
                evaluation_id,
                tier,
                format,
                title,
                storage_path: storage_path.clone(),
                size_bytes: i64::try_from(bytes.len()).unwrap_or(i64::MAX),
            })
            .await;

        let report = match created {
            Ok(report) => report,
            Err(e) => {
                self.storage.remove(&storage_path).await;
                return Err(e);
            }
        };

        info!(
            user_id = user.id,
            report_id = report.id,
            tier = %tier,
            format = %format,
            size_bytes = report.size_bytes,
            "Report generated"
        );

        invalidate_dashboard(self.cache.as_ref(), user.id).await;

        Ok(report)
    }

    pub async fn list(&self, user: &User) -> Result<Vec<Report>, AppError> {
        self.reports.list(user.id).await
    }

    /// Loads a report record and its file.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the record or its file is missing.
    pub async fn download(&self, user: &User, id: i64) -> Result<(Report, Vec<u8>), AppError> {
        let report = self
            .reports
            .find_by_id(id, user.id)
            .await?
            .ok_or_else(|| AppError::not_found("Report not found", json!({ "id": id })))?;

        let bytes = self.storage.read(&report.storage_path).await?;
        Ok((report, bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::assess;
    use crate::domain::entities::Evaluation;
    use crate::domain::entities::evaluation::fixtures::healthy_tech;
    use crate::domain::repositories::{MockEvaluationRepository, MockReportRepository};
    use crate::domain::usage_worker::TierMetricsCollector;
    use crate::infrastructure::cache::MockCacheService;

    fn user(tier: Tier) -> User {
        User {
            id: 2,
            external_id: "idp|2".to_string(),
            email: "owner@example.com".to_string(),
            name: Some("Dana".to_string()),
            tier,
            created_at: Utc::now(),
        }
    }

    fn evaluation() -> Evaluation {
        let profile = healthy_tech();
        let a = assess(&profile);
        let now = Utc::now();
        Evaluation {
            id: 5,
            user_id: 2,
            profile,
            valuation: a.valuation,
            health: a.health,
            opportunities: a.opportunities,
            narrative: Some("Narrative".to_string()),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    fn stored(new: NewReport) -> Report {
        Report {
            id: 77,
            user_id: new.user_id,
            evaluation_id: new.evaluation_id,
            tier: new.tier,
            format: new.format,
            title: new.title,
            storage_path: new.storage_path,
            size_bytes: new.size_bytes,
            created_at: Utc::now(),
        }
    }

    fn service(
        reports: MockReportRepository,
        evaluations: MockEvaluationRepository,
        dir: &tempfile::TempDir,
    ) -> ReportService {
        let (collector, _rx) = TierMetricsCollector::channel(100);
        let mut cache = MockCacheService::new();
        cache.expect_increment().returning(|_| Ok(1));
        ReportService::new(
            Arc::new(reports),
            Arc::new(evaluations),
            ReportStorage::new(dir.path()),
            AccessService::new(collector),
            Arc::new(cache),
        )
    }

    fn request(tier: Tier, format: ReportFormat) -> GenerateReport {
        GenerateReport {
            tier,
            evaluation_id: 5,
            format,
            title: None,
        }
    }

    #[test]
    fn test_templates_availability() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(
            MockReportRepository::new(),
            MockEvaluationRepository::new(),
            &dir,
        );

        let templates = svc.templates(Tier::Professional);
        assert_eq!(templates.len(), 3);
        assert!(templates[0].available);
        assert!(templates[1].available);
        assert!(!templates[2].available);
        assert_eq!(templates[0].formats, vec![ReportFormat::Html]);
        assert_eq!(templates[2].sections.len(), 11);
    }

    #[tokio::test]
    async fn test_generate_html_report() {
        let dir = tempfile::tempdir().unwrap();
        let mut reports = MockReportRepository::new();
        let mut evaluations = MockEvaluationRepository::new();
        evaluations
            .expect_find_by_id()
            .returning(|_, _| Ok(Some(evaluation())));
        reports
            .expect_create()
            .withf(|new| new.title == "Acme Analytics valuation report" && new.size_bytes > 0)
            .returning(|new| Ok(stored(new)));

        let svc = service(reports, evaluations, &dir);
        let report = svc
            .generate(&user(Tier::Basic), request(Tier::Basic, ReportFormat::Html))
            .await
            .unwrap();

        assert!(report.storage_path.starts_with("2/"));
        assert!(dir.path().join(&report.storage_path).exists());
    }

    #[tokio::test]
    async fn test_basic_user_cannot_generate_professional() {
        let dir = tempfile::tempdir().unwrap();
        let mut evaluations = MockEvaluationRepository::new();
        evaluations.expect_find_by_id().never();

        let svc = service(MockReportRepository::new(), evaluations, &dir);
        let err = svc
            .generate(
                &user(Tier::Basic),
                request(Tier::Professional, ReportFormat::Html),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Forbidden { .. }));
    }

    #[tokio::test]
    async fn test_basic_template_rejects_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(
            MockReportRepository::new(),
            MockEvaluationRepository::new(),
            &dir,
        );

        let err = svc
            .generate(
                &user(Tier::Enterprise),
                request(Tier::Basic, ReportFormat::Pdf),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_missing_evaluation() {
        let dir = tempfile::tempdir().unwrap();
        let mut evaluations = MockEvaluationRepository::new();
        evaluations.expect_find_by_id().returning(|_, _| Ok(None));

        let svc = service(MockReportRepository::new(), evaluations, &dir);
        let err = svc
            .generate(&user(Tier::Basic), request(Tier::Basic, ReportFormat::Html))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_failed_insert_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut reports = MockReportRepository::new();
        let mut evaluations = MockEvaluationRepository::new();
        evaluations
            .expect_find_by_id()
            .returning(|_, _| Ok(Some(evaluation())));
        reports
            .expect_create()
            .returning(|_| Err(AppError::internal("Database error", json!({}))));

        let svc = service(reports, evaluations, &dir);
        let result = svc
            .generate(
                &user(Tier::Enterprise),
                request(Tier::Enterprise, ReportFormat::Pdf),
            )
            .await;

        assert!(result.is_err());
        let user_dir = dir.path().join("2");
        assert_eq!(std::fs::read_dir(user_dir).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_download_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut reports = MockReportRepository::new();
        reports.expect_find_by_id().returning(|id, user_id| {
            Ok(Some(stored(NewReport {
                user_id,
                evaluation_id: 5,
                tier: Tier::Basic,
                format: ReportFormat::Html,
                title: format!("Report {id}"),
                storage_path: "2/gone.html".to_string(),
                size_bytes: 10,
            })))
        });

        let svc = service(reports, MockEvaluationRepository::new(), &dir);
        let err = svc.download(&user(Tier::Basic), 77).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound { .. }));
    }
}
