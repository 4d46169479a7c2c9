//! Core traits, types, and error handling for the Sentry MCP server.
//!
//! This crate provides the foundational abstractions shared by the HTTP
//! client, the MCP dispatch layer and the command-line binary.

pub mod config;
pub mod error;
pub mod provider;
pub mod types;

pub use config::{Config, Settings};
pub use error::{Error, Result};
pub use provider::IssueTracker;
pub use types::{IssueLookup, IssueProject, IssueSearch, IssueSummary, ProjectSummary};
