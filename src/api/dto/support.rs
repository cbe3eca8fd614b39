//! DTOs for support ticket endpoints.

use serde::{Deserialize, Deserializer};
use validator::Validate;

use crate::domain::entities::TicketCategory;

/// Request to open a support ticket.
///
/// Subject and message are trimmed before their lengths are checked.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTicketRequest {
    #[serde(deserialize_with = "trimmed")]
    #[validate(length(min = 3, max = 200))]
    pub subject: String,

    #[serde(deserialize_with = "trimmed")]
    #[validate(length(min = 10, max = 5000))]
    pub message: String,

    #[serde(default = "default_category")]
    pub category: TicketCategory,
}

fn default_category() -> TicketCategory {
    TicketCategory::Other
}

fn trimmed<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    String::deserialize(deserializer).map(|s| s.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_defaults_to_other() {
        let req: CreateTicketRequest = serde_json::from_str(
            r#"{"subject": "Help", "message": "Cannot download my report."}"#,
        )
        .unwrap();
        assert_eq!(req.category, TicketCategory::Other);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_length_limits() {
        let req = CreateTicketRequest {
            subject: "Hi".to_string(),
            message: "short".to_string(),
            category: TicketCategory::Billing,
        };
        let errors = req.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("subject"));
        assert!(fields.contains_key("message"));
    }

    #[test]
    fn test_blank_text_fails_length_checks() {
        let req: CreateTicketRequest = serde_json::from_str(
            r#"{"subject": "     ", "message": "            "}"#,
        )
        .unwrap();
        assert_eq!(req.subject, "");

        let errors = req.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("subject"));
        assert!(fields.contains_key("message"));
    }

    #[test]
    fn test_padding_does_not_count_towards_length() {
        let req: CreateTicketRequest =
            serde_json::from_str(r#"{"subject": "  Hi  ", "message": "Need help with my report"}"#)
                .unwrap();
        assert_eq!(req.subject, "Hi");
        assert!(req.validate().unwrap_err().field_errors().contains_key("subject"));
    }
}
