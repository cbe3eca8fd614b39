//! DTO for the current-user endpoint.

use serde::Serialize;

use crate::application::services::QuotaUsage;
use crate::domain::entities::User;
use crate::domain::{Feature, Tier};

/// Account profile with tier entitlements.
#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub id: i64,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub tier: Tier,
    pub features: Vec<Feature>,
    pub quota: QuotaUsage,
}

impl MeResponse {
    pub fn new(user: User, quota: QuotaUsage) -> Self {
        Self {
            features: user.tier.features(),
            id: user.id,
            email: user.email,
            name: user.name,
            tier: user.tier,
            quota,
        }
    }
}
