//! Issue tracker trait implemented by the Sentry HTTP client.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;
use crate::types::{IssueLookup, IssueSearch, IssueSummary, ProjectSummary};

/// Read-only operations the MCP server exposes over an issue tracker.
#[async_trait]
pub trait IssueTracker: Send + Sync {
    /// Organization id or slug every request is scoped to.
    fn organization(&self) -> &str;

    /// List projects of the organization.
    async fn list_projects(&self) -> Result<Vec<ProjectSummary>>;

    /// Search issues of one project.
    async fn find_project_issues(&self, search: &IssueSearch) -> Result<Vec<IssueSummary>>;

    /// Read an issue's hashes with their latest events, unprojected.
    async fn read_issue(&self, lookup: &IssueLookup) -> Result<Vec<Value>>;
}
