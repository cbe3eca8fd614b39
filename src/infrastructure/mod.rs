//! Infrastructure layer for external integrations.
//!
//! This layer implements interfaces defined by the domain layer, providing
//! concrete implementations for data persistence, caching, file storage,
//! document rendering and the outbound LLM client.
//!
//! # Modules
//!
//! - [`cache`] - Caching abstractions (Redis and no-op implementations)
//! - [`persistence`] - PostgreSQL repository implementations
//! - [`memory`] - In-memory repository implementations
//! - [`narrative`] - LLM and template narrative generators
//! - [`render`] - HTML and PDF report rendering
//! - [`storage`] - Report file storage

pub mod cache;
pub mod memory;
pub mod narrative;
pub mod persistence;
pub mod render;
pub mod storage;
