//! Application layer services implementing business logic.
//!
//! Services coordinate repository calls, validation, and business rules, and
//! give HTTP handlers a narrow API.
//!
//! # Available Services
//!
//! - [`services::code_allocator::CodeAllocator`] - Collision-safe short code allocation
//! - [`services::link_service::LinkService`] - Short link creation and resolution
//! - [`services::stats_service::StatsService`] - Click statistics and metrics

pub mod services;
