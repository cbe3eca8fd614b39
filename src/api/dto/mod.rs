//! Data Transfer Objects for API requests and responses.
//!
//! All DTOs use Serde for JSON serialization/deserialization and validator
//! for input validation.

pub mod evaluation;
pub mod health;
pub mod me;
pub mod pagination;
pub mod report;
pub mod support;
