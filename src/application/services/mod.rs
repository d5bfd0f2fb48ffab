//! Business logic services for the application layer.

pub mod code_allocator;
pub mod link_service;
pub mod stats_service;

pub use code_allocator::{AllocationError, CodeAllocator};
pub use link_service::{LinkService, LinkSettings};
pub use stats_service::{ServiceMetrics, StatsService};
