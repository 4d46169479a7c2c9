//! Sentry provider implementation for the Sentry MCP server.
//!
//! This crate talks to the Sentry REST API: it builds issue search queries,
//! issues authenticated GET requests and maps the responses onto the
//! caller-facing types from `sentry-issues-core`.

mod client;
pub mod normalize;
pub mod query;
pub mod types;

pub use client::{Endpoints, SentryClient};
pub use query::IssueQuery;
