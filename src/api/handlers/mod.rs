//! HTTP request handlers for API endpoints.
//!
//! Each handler module corresponds to a logical grouping of endpoints.

pub mod health;
pub mod links;
pub mod metrics;
pub mod redirect;
pub mod shorten;
pub mod stats;

pub use health::{api_root_handler, health_handler};
pub use links::list_links_handler;
pub use metrics::metrics_handler;
pub use redirect::redirect_handler;
pub use shorten::shorten_handler;
pub use stats::{click_count_handler, link_stats_handler};
