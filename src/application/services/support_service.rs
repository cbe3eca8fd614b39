//! Customer support tickets.

use std::sync::Arc;

use tracing::info;

use crate::application::services::dashboard_service::invalidate_dashboard;
use crate::domain::entities::{
    NewSupportTicket, SupportTicket, TicketCategory, TicketPriority, User,
};
use crate::domain::repositories::TicketRepository;
use crate::error::AppError;
use crate::infrastructure::cache::CacheService;

pub struct SupportService {
    tickets: Arc<dyn TicketRepository>,
    cache: Arc<dyn CacheService>,
}

impl SupportService {
    pub fn new(tickets: Arc<dyn TicketRepository>, cache: Arc<dyn CacheService>) -> Self {
        Self { tickets, cache }
    }

    /// Opens a ticket prioritized by the user's tier.
    ///
    /// Length limits on `subject` and `message` are enforced by the request DTO.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    pub async fn create(
        &self,
        user: &User,
        subject: &str,
        message: &str,
        category: TicketCategory,
    ) -> Result<SupportTicket, AppError> {
        let ticket = self
            .tickets
            .create(NewSupportTicket {
                user_id: user.id,
                subject: subject.trim().to_string(),
                message: message.trim().to_string(),
                category,
                priority: TicketPriority::for_tier(user.tier),
            })
            .await?;

        info!(
            user_id = user.id,
            ticket_id = ticket.id,
            priority = %ticket.priority,
            category = %ticket.category,
            "Support ticket opened"
        );

        invalidate_dashboard(self.cache.as_ref(), user.id).await;

        Ok(ticket)
    }

    pub async fn list(&self, user: &User) -> Result<Vec<SupportTicket>, AppError> {
        self.tickets.list(user.id).await
    }

    pub async fn count_open(&self, user: &User) -> Result<i64, AppError> {
        self.tickets.count_open(user.id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Tier;
    use crate::domain::entities::TicketStatus;
    use crate::domain::repositories::MockTicketRepository;
    use crate::infrastructure::cache::MockCacheService;
    use chrono::Utc;

    fn user(tier: Tier) -> User {
        User {
            id: 9,
            external_id: "idp|9".to_string(),
            email: "owner@example.com".to_string(),
            name: None,
            tier,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_enterprise_ticket_is_high_priority() {
        let mut tickets = MockTicketRepository::new();
        tickets
            .expect_create()
            .withf(|t| {
                t.priority == TicketPriority::High
                    && t.subject == "Export fails"
                    && t.user_id == 9
            })
            .returning(|t| {
                Ok(SupportTicket {
                    id: 1,
                    user_id: t.user_id,
                    subject: t.subject,
                    message: t.message,
                    category: t.category,
                    priority: t.priority,
                    status: TicketStatus::Open,
                    created_at: Utc::now(),
                })
            });

        let mut cache = MockCacheService::new();
        cache
            .expect_increment()
            .withf(|key| key == "dashboard:9:version")
            .times(1)
            .returning(|_| Ok(1));

        let service = SupportService::new(Arc::new(tickets), Arc::new(cache));
        let ticket = service
            .create(
                &user(Tier::Enterprise),
                "  Export fails ",
                "The PDF export times out every time.",
                TicketCategory::Technical,
            )
            .await
            .unwrap();

        assert_eq!(ticket.priority, TicketPriority::High);
        assert_eq!(ticket.status, TicketStatus::Open);
    }

    #[tokio::test]
    async fn test_count_open_delegates() {
        let mut tickets = MockTicketRepository::new();
        tickets
            .expect_count_open()
            .withf(|user_id| *user_id == 9)
            .returning(|_| Ok(2));

        let service = SupportService::new(Arc::new(tickets), Arc::new(MockCacheService::new()));
        assert_eq!(service.count_open(&user(Tier::Basic)).await.unwrap(), 2);
    }
}
