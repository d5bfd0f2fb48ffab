//! Domain layer: entities, store contracts, and in-process state.
//!
//! - [`entities`] - Core data structures
//! - [`repositories`] - Store trait definitions
//! - [`rate_limiter`] - Fixed-window admission control and its cleanup task
//! - [`click_event`] - Click tracking event model
//! - [`click_worker`] - Best-effort asynchronous click persistence
//!
//! Nothing here depends on the infrastructure or HTTP layers.
//!
//! # Click Processing Flow
//!
//! 1. The redirect handler resolves a code and answers immediately
//! 2. A [`click_event::ClickEvent`] is pushed onto a bounded channel
//! 3. [`click_worker::run_click_worker`] persists it once, under a timeout
//! 4. Failures are logged and counted, never retried

pub mod click_event;
pub mod click_worker;
pub mod entities;
pub mod rate_limiter;
pub mod repositories;
