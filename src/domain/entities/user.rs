//! User entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::Tier;

/// An account known to the service.
///
/// Identity is owned by the external identity provider; `external_id` is the
/// provider's subject identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub external_id: String,
    pub email: String,
    pub name: Option<String>,
    pub tier: Tier,
    pub created_at: DateTime<Utc>,
}

/// Input data for registering a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub external_id: String,
    pub email: String,
    pub name: Option<String>,
    pub tier: Tier,
}

impl User {
    /// Name to display in reports and tickets, falling back to the email.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.email)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_fallback() {
        let mut user = User {
            id: 1,
            external_id: "idp|1".to_string(),
            email: "owner@example.com".to_string(),
            name: None,
            tier: Tier::Basic,
            created_at: Utc::now(),
        };
        assert_eq!(user.display_name(), "owner@example.com");

        user.name = Some("Dana".to_string());
        assert_eq!(user.display_name(), "Dana");
    }
}
