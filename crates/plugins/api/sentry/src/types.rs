//! Sentry API response types.
//!
//! These types mirror the raw JSON returned by the Sentry REST API. Only the
//! identifying fields are required; everything else is optional so that
//! nullable, missing or newly added fields never reject a response.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// =============================================================================
// Project
// =============================================================================

/// Project returned by `GET /api/0/organizations/{org}/projects/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentryProject {
    pub id: String,
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub platform: Option<String>,
    #[serde(default)]
    pub date_created: Option<String>,
    #[serde(default)]
    pub is_bookmarked: bool,
    #[serde(default)]
    pub is_member: bool,
    #[serde(default)]
    pub has_access: bool,
    #[serde(default)]
    pub first_event: Option<String>,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub environments: Vec<String>,
    #[serde(default)]
    pub platforms: Vec<String>,
    #[serde(default)]
    pub team: Option<SentryTeam>,
    #[serde(default)]
    pub teams: Vec<SentryTeam>,
    #[serde(default)]
    pub latest_release: Option<SentryRelease>,
}

/// Team owning a project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentryTeam {
    pub id: String,
    pub name: String,
    pub slug: String,
}

/// Latest release of a project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentryRelease {
    pub version: String,
}

// =============================================================================
// Issue
// =============================================================================

/// Issue returned by `GET /api/0/projects/{org}/{project}/issues/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentryIssue {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub short_id: Option<String>,
    #[serde(default)]
    pub culprit: Option<String>,
    #[serde(default)]
    pub permalink: Option<String>,
    #[serde(default)]
    pub level: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub status_details: Value,
    #[serde(default)]
    pub first_seen: Option<String>,
    #[serde(default)]
    pub last_seen: Option<String>,
    #[serde(default)]
    pub count: Option<String>,
    #[serde(default)]
    pub user_count: Option<u64>,
    #[serde(default)]
    pub num_comments: Option<u64>,
    #[serde(default, rename = "type")]
    pub issue_type: Option<String>,
    #[serde(default)]
    pub logger: Option<String>,
    #[serde(default)]
    pub is_public: bool,
    #[serde(default)]
    pub has_seen: bool,
    #[serde(default)]
    pub is_subscribed: bool,
    #[serde(default)]
    pub is_bookmarked: bool,
    #[serde(default)]
    pub share_id: Option<String>,
    #[serde(default)]
    pub annotations: Vec<Value>,
    #[serde(default)]
    pub assigned_to: Option<Value>,
    #[serde(default)]
    pub metadata: Option<IssueMetadata>,
    #[serde(default)]
    pub project: Option<SentryIssueProject>,
}

/// Project reference embedded in an issue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentryIssueProject {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub slug: String,
}

/// Issue metadata comes in one of two documented shapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IssueMetadata {
    /// Error issues: exception type and value, sometimes the file it was raised in.
    Error {
        #[serde(rename = "type")]
        error_type: String,
        value: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        filename: Option<String>,
    },
    /// Message issues carry only a title.
    Title { title: String },
    /// Anything else Sentry adds in the future.
    Other(Map<String, Value>),
}

// =============================================================================
// Issue hashes
// =============================================================================

/// Entry returned by `GET /api/0/organizations/{org}/issues/{issue_id}/hashes/`.
///
/// The latest event is a large, loosely structured document that callers get
/// verbatim, so everything besides the id stays raw JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentryIssueHash {
    pub id: String,
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}
