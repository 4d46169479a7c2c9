//! Domain types shared between the HTTP client and the MCP layer.
//!
//! Argument types (`IssueSearch`, `IssueLookup`) deserialize straight from
//! tool-call arguments, so their serde attributes carry the defaults the
//! tool schemas advertise. Summary types are what callers get back.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Priority filter applied when the caller does not provide one.
pub const DEFAULT_PRIORITY: &str = "high,medium";

fn default_priority() -> String {
    DEFAULT_PRIORITY.to_string()
}

// =============================================================================
// Arguments
// =============================================================================

/// Arguments of an issue search within one project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueSearch {
    /// Project id or slug
    pub project: String,
    /// Free-text word matched against issues
    #[serde(default)]
    pub search_word: Option<String>,
    /// Only issues seen for this user id
    #[serde(default)]
    pub user_id: Option<String>,
    /// Only issues raised on this URL
    #[serde(default)]
    pub url: Option<String>,
    /// Search resolved instead of unresolved issues
    #[serde(default)]
    pub resolved: bool,
    /// Opaque pagination cursor from a previous page
    #[serde(default)]
    pub cursor: Option<String>,
    /// Comma-separated priority levels
    #[serde(default = "default_priority")]
    pub priority: String,
}

impl IssueSearch {
    /// Search with every optional field at its default.
    pub fn new(project: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            search_word: None,
            user_id: None,
            url: None,
            resolved: false,
            cursor: None,
            priority: default_priority(),
        }
    }
}

/// Whether the issue read should include the full event body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FullEvent {
    #[serde(rename = "true")]
    True,
    #[serde(rename = "false")]
    False,
}

impl FullEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            FullEvent::True => "true",
            FullEvent::False => "false",
        }
    }
}

/// Arguments of a single issue read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueLookup {
    pub issue_id: String,
    #[serde(default)]
    pub full: Option<FullEvent>,
    #[serde(default)]
    pub cursor: Option<String>,
}

impl IssueLookup {
    pub fn new(issue_id: impl Into<String>) -> Self {
        Self {
            issue_id: issue_id.into(),
            full: None,
            cursor: None,
        }
    }
}

// =============================================================================
// Results
// =============================================================================

/// Project entry of the `sentry://project` resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectSummary {
    pub project_id: String,
    pub project_name: String,
    pub project_slug: String,
}

/// Project an issue belongs to.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IssueProject {
    pub id: String,
    pub name: String,
    pub slug: String,
}

/// Issue as returned by the search tool, one content item per issue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueSummary {
    pub title: String,
    pub id: String,
    pub project: IssueProject,
    pub status: String,
    pub status_details: Value,
    pub url: String,
    #[serde(rename = "lastSeen")]
    pub last_seen: String,
}
