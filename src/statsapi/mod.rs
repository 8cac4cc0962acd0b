//! MLB StatsAPI access.
//!
//! [`StatsClient`] turns a resource path into a JSON payload, reading through
//! a [`ResponseCache`] that is built once at startup and shared by handle.

mod cache;
mod client;

pub use cache::ResponseCache;
pub use client::{extract_field, RetryPolicy, StatsClient};
