//! In-memory repository backend.
//!
//! [`MemoryStore`] implements every repository trait over a single
//! lock-protected state, mirroring the constraints the PostgreSQL schema
//! enforces (unique emails and token hashes, report foreign keys, soft
//! deletes). Selected with `STORAGE_BACKEND=memory` and used by the HTTP
//! integration tests. Data is lost on restart.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use tokio::sync::RwLock;

use crate::domain::entities::{
    Evaluation, EvaluationUpdate, NewEvaluation, NewReport, NewSupportTicket, NewUser, Report,
    SupportTicket, TicketStatus, User,
};
use crate::domain::repositories::{
    ApiToken, EvaluationRepository, ReportRepository, TicketRepository, TokenRepository,
    UsageRepository, UsageSummary, UserRepository,
};
use crate::domain::usage_event::TierUsageEvent;
use crate::domain::{Feature, Tier};
use crate::error::AppError;

#[derive(Default)]
struct State {
    next_id: i64,
    users: Vec<User>,
    tokens: Vec<ApiToken>,
    evaluations: Vec<Evaluation>,
    reports: Vec<Report>,
    tickets: Vec<SupportTicket>,
    usage: Vec<TierUsageEvent>,
}

impl State {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn insert_evaluation(&mut self, new_evaluation: NewEvaluation) -> Evaluation {
        let now = Utc::now();
        let evaluation = Evaluation {
            id: self.next_id(),
            user_id: new_evaluation.user_id,
            profile: new_evaluation.profile,
            valuation: new_evaluation.valuation,
            health: new_evaluation.health,
            opportunities: new_evaluation.opportunities,
            narrative: new_evaluation.narrative,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        self.evaluations.push(evaluation.clone());
        evaluation
    }
}

/// Thread-safe in-memory implementation of all repositories.
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn newest_first<T>(items: &mut [T], key: impl Fn(&T) -> (DateTime<Utc>, i64)) {
    items.sort_by_key(|item| std::cmp::Reverse(key(item)));
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create(&self, new_user: NewUser) -> Result<User, AppError> {
        let mut state = self.state.write().await;

        let taken = state.users.iter().any(|u| {
            u.external_id == new_user.external_id || u.email.eq_ignore_ascii_case(&new_user.email)
        });
        if taken {
            return Err(AppError::conflict(
                "User already exists",
                json!({ "email": new_user.email }),
            ));
        }

        let user = User {
            id: state.next_id(),
            external_id: new_user.external_id,
            email: new_user.email,
            name: new_user.name,
            tier: new_user.tier,
            created_at: Utc::now(),
        };
        state.users.push(user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError> {
        let state = self.state.read().await;
        Ok(state.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let state = self.state.read().await;
        Ok(state
            .users
            .iter()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn list(&self) -> Result<Vec<User>, AppError> {
        let state = self.state.read().await;
        Ok(state.users.clone())
    }

    async fn update_tier(&self, id: i64, tier: Tier) -> Result<User, AppError> {
        let mut state = self.state.write().await;
        let user = state
            .users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| AppError::not_found("User not found", json!({ "id": id })))?;
        user.tier = tier;
        Ok(user.clone())
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}

#[async_trait]
impl TokenRepository for MemoryStore {
    async fn find_user_id(&self, token_hash: &str) -> Result<Option<i64>, AppError> {
        let state = self.state.read().await;
        Ok(state
            .tokens
            .iter()
            .find(|t| t.token_hash == token_hash && t.revoked_at.is_none())
            .map(|t| t.user_id))
    }

    async fn update_last_used(&self, token_hash: &str) -> Result<(), AppError> {
        let mut state = self.state.write().await;
        if let Some(token) = state
            .tokens
            .iter_mut()
            .find(|t| t.token_hash == token_hash && t.revoked_at.is_none())
        {
            token.last_used_at = Some(Utc::now());
        }
        Ok(())
    }

    async fn create_token(
        &self,
        user_id: i64,
        name: &str,
        token_hash: &str,
    ) -> Result<ApiToken, AppError> {
        let mut state = self.state.write().await;

        if !state.users.iter().any(|u| u.id == user_id) {
            return Err(AppError::bad_request(
                "Referenced record does not exist",
                json!({ "user_id": user_id }),
            ));
        }
        if state.tokens.iter().any(|t| t.token_hash == token_hash) {
            return Err(AppError::conflict("Token already exists", json!({})));
        }

        let token = ApiToken {
            id: state.next_id(),
            user_id,
            name: name.to_string(),
            token_hash: token_hash.to_string(),
            created_at: Utc::now(),
            last_used_at: None,
            revoked_at: None,
        };
        state.tokens.push(token.clone());
        Ok(token)
    }

    async fn list_tokens(&self) -> Result<Vec<ApiToken>, AppError> {
        let state = self.state.read().await;
        let mut tokens = state.tokens.clone();
        newest_first(&mut tokens, |t| (t.created_at, t.id));
        Ok(tokens)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<ApiToken>, AppError> {
        let state = self.state.read().await;
        Ok(state.tokens.iter().find(|t| t.id == id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<ApiToken>, AppError> {
        let state = self.state.read().await;
        Ok(state.tokens.iter().find(|t| t.name == name).cloned())
    }

    async fn revoke_token(&self, id: i64) -> Result<(), AppError> {
        let mut state = self.state.write().await;
        let token = state
            .tokens
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| AppError::not_found("Token not found", json!({ "id": id })))?;
        if token.revoked_at.is_none() {
            token.revoked_at = Some(Utc::now());
        }
        Ok(())
    }
}

#[async_trait]
impl EvaluationRepository for MemoryStore {
    async fn create(&self, new_evaluation: NewEvaluation) -> Result<Evaluation, AppError> {
        let mut state = self.state.write().await;
        Ok(state.insert_evaluation(new_evaluation))
    }

    async fn create_within_quota(
        &self,
        new_evaluation: NewEvaluation,
        since: DateTime<Utc>,
        limit: i64,
    ) -> Result<Option<Evaluation>, AppError> {
        let mut state = self.state.write().await;
        let used = state
            .evaluations
            .iter()
            .filter(|e| e.user_id == new_evaluation.user_id && e.created_at >= since)
            .count() as i64;
        if used >= limit {
            return Ok(None);
        }
        Ok(Some(state.insert_evaluation(new_evaluation)))
    }

    async fn find_by_id(&self, id: i64, user_id: i64) -> Result<Option<Evaluation>, AppError> {
        let state = self.state.read().await;
        Ok(state
            .evaluations
            .iter()
            .find(|e| e.id == id && e.user_id == user_id && !e.is_deleted())
            .cloned())
    }

    async fn list(
        &self,
        user_id: i64,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Evaluation>, AppError> {
        let all = EvaluationRepository::list_all(self, user_id).await?;
        Ok(all
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn list_all(&self, user_id: i64) -> Result<Vec<Evaluation>, AppError> {
        let state = self.state.read().await;
        let mut live: Vec<Evaluation> = state
            .evaluations
            .iter()
            .filter(|e| e.user_id == user_id && !e.is_deleted())
            .cloned()
            .collect();
        newest_first(&mut live, |e| (e.created_at, e.id));
        Ok(live)
    }

    async fn count(&self, user_id: i64) -> Result<i64, AppError> {
        let state = self.state.read().await;
        Ok(state
            .evaluations
            .iter()
            .filter(|e| e.user_id == user_id && !e.is_deleted())
            .count() as i64)
    }

    async fn count_created_since(
        &self,
        user_id: i64,
        since: DateTime<Utc>,
    ) -> Result<i64, AppError> {
        let state = self.state.read().await;
        Ok(state
            .evaluations
            .iter()
            .filter(|e| e.user_id == user_id && e.created_at >= since)
            .count() as i64)
    }

    async fn update(
        &self,
        id: i64,
        user_id: i64,
        update: EvaluationUpdate,
    ) -> Result<Option<Evaluation>, AppError> {
        let mut state = self.state.write().await;
        let Some(evaluation) = state
            .evaluations
            .iter_mut()
            .find(|e| e.id == id && e.user_id == user_id && !e.is_deleted())
        else {
            return Ok(None);
        };

        evaluation.profile = update.profile;
        evaluation.valuation = update.valuation;
        evaluation.health = update.health;
        evaluation.opportunities = update.opportunities;
        evaluation.narrative = update.narrative;
        evaluation.updated_at = Utc::now();
        Ok(Some(evaluation.clone()))
    }

    async fn soft_delete(&self, id: i64, user_id: i64) -> Result<bool, AppError> {
        let mut state = self.state.write().await;
        match state
            .evaluations
            .iter_mut()
            .find(|e| e.id == id && e.user_id == user_id && !e.is_deleted())
        {
            Some(evaluation) => {
                evaluation.deleted_at = Some(Utc::now());
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl ReportRepository for MemoryStore {
    async fn create(&self, new_report: NewReport) -> Result<Report, AppError> {
        let mut state = self.state.write().await;

        if !state.evaluations.iter().any(|e| e.id == new_report.evaluation_id) {
            return Err(AppError::bad_request(
                "Referenced record does not exist",
                json!({ "evaluation_id": new_report.evaluation_id }),
            ));
        }

        let report = Report {
            id: state.next_id(),
            user_id: new_report.user_id,
            evaluation_id: new_report.evaluation_id,
            tier: new_report.tier,
            format: new_report.format,
            title: new_report.title,
            storage_path: new_report.storage_path,
            size_bytes: new_report.size_bytes,
            created_at: Utc::now(),
        };
        state.reports.push(report.clone());
        Ok(report)
    }

    async fn find_by_id(&self, id: i64, user_id: i64) -> Result<Option<Report>, AppError> {
        let state = self.state.read().await;
        Ok(state
            .reports
            .iter()
            .find(|r| r.id == id && r.user_id == user_id)
            .cloned())
    }

    async fn list(&self, user_id: i64) -> Result<Vec<Report>, AppError> {
        let state = self.state.read().await;
        let mut reports: Vec<Report> = state
            .reports
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        newest_first(&mut reports, |r| (r.created_at, r.id));
        Ok(reports)
    }

    async fn count(&self, user_id: i64) -> Result<i64, AppError> {
        let state = self.state.read().await;
        Ok(state.reports.iter().filter(|r| r.user_id == user_id).count() as i64)
    }
}

#[async_trait]
impl TicketRepository for MemoryStore {
    async fn create(&self, new_ticket: NewSupportTicket) -> Result<SupportTicket, AppError> {
        let mut state = self.state.write().await;
        let ticket = SupportTicket {
            id: state.next_id(),
            user_id: new_ticket.user_id,
            subject: new_ticket.subject,
            message: new_ticket.message,
            category: new_ticket.category,
            priority: new_ticket.priority,
            status: TicketStatus::Open,
            created_at: Utc::now(),
        };
        state.tickets.push(ticket.clone());
        Ok(ticket)
    }

    async fn list(&self, user_id: i64) -> Result<Vec<SupportTicket>, AppError> {
        let state = self.state.read().await;
        let mut tickets: Vec<SupportTicket> = state
            .tickets
            .iter()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect();
        newest_first(&mut tickets, |t| (t.created_at, t.id));
        Ok(tickets)
    }

    async fn count_open(&self, user_id: i64) -> Result<i64, AppError> {
        let state = self.state.read().await;
        Ok(state
            .tickets
            .iter()
            .filter(|t| t.user_id == user_id && t.status.is_open())
            .count() as i64)
    }
}

#[async_trait]
impl UsageRepository for MemoryStore {
    async fn record_batch(&self, events: Vec<TierUsageEvent>) -> Result<u64, AppError> {
        let mut state = self.state.write().await;
        let count = events.len() as u64;
        state.usage.extend(events);
        Ok(count)
    }

    async fn summary(&self, since: DateTime<Utc>) -> Result<Vec<UsageSummary>, AppError> {
        let state = self.state.read().await;
        let mut counts: BTreeMap<(Tier, &'static str, bool), (Feature, i64)> = BTreeMap::new();
        for event in state.usage.iter().filter(|e| e.occurred_at >= since) {
            counts
                .entry((event.tier, event.feature.as_str(), event.allowed))
                .or_insert((event.feature, 0))
                .1 += 1;
        }

        Ok(counts
            .into_iter()
            .map(|((tier, _, allowed), (feature, count))| UsageSummary {
                tier,
                feature,
                allowed,
                count,
            })
            .collect())
    }
}
