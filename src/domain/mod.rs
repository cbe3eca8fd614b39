//! Domain layer containing business entities and repository contracts.
//!
//! The domain layer has no dependencies on HTTP, SQL or caching. Business
//! rules that compute valuations and scores live in [`crate::analysis`];
//! orchestration lives in [`crate::application::services`].
//!
//! # Architecture
//!
//! - [`tier`] - Subscription tiers and the features they unlock
//! - [`industry`] - Industry classification with valuation multiples and benchmarks
//! - [`entities`] - Core business data structures
//! - [`repositories`] - Data access trait definitions
//! - [`usage_event`] - Tier usage event model
//! - [`usage_worker`] - Background batching and flushing of usage events
//!
//! # Usage Event Flow
//!
//! 1. A handler asks [`crate::application::services::AccessService`] for a feature
//! 2. A [`usage_event::TierUsageEvent`] is sent to an async channel (non-blocking)
//! 3. [`usage_worker::run_usage_worker`] batches events and flushes them on size or timer
//! 4. Batches are persisted via [`repositories::UsageRepository`]

/// Error returned when parsing a textual enum value fails.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} '{value}'")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl UnknownVariant {
    pub fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

/// Declares a fieldless enum persisted and serialized as text.
///
/// Generates `ALL`, `as_str`, `Display`, case-insensitive `FromStr`, and serde
/// derives using the given textual names.
macro_rules! text_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident ($kind:literal) {
            $( $(#[$vmeta:meta])* $variant:ident => $text:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        $vis enum $name {
            $( $(#[$vmeta])* #[serde(rename = $text)] $variant ),+
        }

        impl $name {
            /// Every variant in declaration order.
            pub const ALL: &'static [$name] = &[$( $name::$variant ),+];

            /// Textual representation used in JSON and storage.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $( $name::$variant => $text ),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::domain::UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let trimmed = s.trim();
                $(
                    if trimmed.eq_ignore_ascii_case($text) {
                        return Ok($name::$variant);
                    }
                )+
                Err($crate::domain::UnknownVariant::new($kind, s))
            }
        }
    };
}

pub mod entities;
pub mod industry;
pub mod repositories;
pub mod tier;
pub mod usage_event;
pub mod usage_worker;

pub use industry::{Industry, IndustryProfile};
pub use tier::{Feature, Tier};

