//! Support ticket entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::Tier;

text_enum! {
    /// Topic of a support request.
    pub enum TicketCategory("ticket category") {
        Billing => "billing",
        Technical => "technical",
        Valuation => "valuation",
        Other => "other",
    }
}

text_enum! {
    /// Handling priority, derived from the requester's tier.
    #[derive(PartialOrd, Ord)]
    pub enum TicketPriority("ticket priority") {
        Low => "low",
        Normal => "normal",
        High => "high",
    }
}

text_enum! {
    /// Lifecycle state of a ticket.
    pub enum TicketStatus("ticket status") {
        Open => "open",
        InProgress => "in_progress",
        Resolved => "resolved",
        Closed => "closed",
    }
}

impl TicketPriority {
    /// Priority granted to tickets opened by a user of `tier`.
    pub fn for_tier(tier: Tier) -> Self {
        match tier {
            Tier::Basic => TicketPriority::Low,
            Tier::Professional => TicketPriority::Normal,
            Tier::Enterprise => TicketPriority::High,
        }
    }
}

impl TicketStatus {
    /// Returns true while the ticket still awaits resolution.
    pub fn is_open(self) -> bool {
        matches!(self, TicketStatus::Open | TicketStatus::InProgress)
    }
}

/// A customer support request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupportTicket {
    pub id: i64,
    pub user_id: i64,
    pub subject: String,
    pub message: String,
    pub category: TicketCategory,
    pub priority: TicketPriority,
    pub status: TicketStatus,
    pub created_at: DateTime<Utc>,
}

/// Input data for opening a ticket.
#[derive(Debug, Clone)]
pub struct NewSupportTicket {
    pub user_id: i64,
    pub subject: String,
    pub message: String,
    pub category: TicketCategory,
    pub priority: TicketPriority,
}
