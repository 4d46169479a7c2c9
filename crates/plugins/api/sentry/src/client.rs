//! Sentry API client implementation.

use std::time::Duration;

use async_trait::async_trait;
use sentry_issues_core::config::REQUEST_TIMEOUT;
use sentry_issues_core::{
    Error, IssueLookup, IssueSearch, IssueSummary, IssueTracker, ProjectSummary, Result, Settings,
};
use serde_json::Value;
use tracing::{debug, warn};

use crate::normalize::{map_issue_hashes, map_issues, map_projects};
use crate::query::IssueQuery;
use crate::types::{SentryIssue, SentryIssueHash, SentryProject};

const PROJECT_PLACEHOLDER: &str = "{project_id_or_slug}";
const ISSUE_PLACEHOLDER: &str = "{issue_id}";

/// Endpoint templates with the organization already interpolated.
#[derive(Debug, Clone)]
pub struct Endpoints {
    pub projects: String,
    pub issues: String,
    pub issue: String,
}

impl Endpoints {
    pub fn new(organization: &str) -> Self {
        Self {
            projects: format!("/api/0/organizations/{}/projects/", organization),
            issues: format!(
                "/api/0/projects/{}/{}/issues/",
                organization, PROJECT_PLACEHOLDER
            ),
            issue: format!(
                "/api/0/organizations/{}/issues/{}/hashes/",
                organization, ISSUE_PLACEHOLDER
            ),
        }
    }

    /// Issue search path for a project id or slug.
    pub fn project_issues(&self, project: &str) -> String {
        self.issues.replace(PROJECT_PLACEHOLDER, project)
    }

    /// Hashes path for an issue id.
    pub fn issue_hashes(&self, issue_id: &str) -> String {
        self.issue.replace(ISSUE_PLACEHOLDER, issue_id)
    }
}

/// Sentry API client.
pub struct SentryClient {
    base_url: String,
    organization: String,
    endpoints: Endpoints,
    token: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl SentryClient {
    /// Create a client from resolved settings.
    pub fn new(settings: &Settings) -> Result<Self> {
        Self::with_timeout(
            &settings.base_url,
            &settings.organization,
            &settings.auth_token,
            settings.timeout,
        )
    }

    /// Create a client with a custom base URL (for testing).
    pub fn with_base_url(
        base_url: impl Into<String>,
        organization: impl Into<String>,
        token: impl Into<String>,
    ) -> Result<Self> {
        Self::with_timeout(base_url, organization, token, REQUEST_TIMEOUT)
    }

    /// Create a client with an explicit request timeout.
    pub fn with_timeout(
        base_url: impl Into<String>,
        organization: impl Into<String>,
        token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let organization = organization.into();
        let client = reqwest::Client::builder()
            .user_agent(concat!("mcp-sentry/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Http(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            endpoints: Endpoints::new(&organization),
            organization,
            token: token.into(),
            timeout,
            client,
        })
    }

    /// Join a path onto the base URL with exactly one slash.
    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Make an authenticated GET request and decode the JSON body.
    pub async fn get<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<T> {
        let url = self.url(path);
        debug!(url = %url, params = ?params, "Sentry GET request");

        let mut request = self.client.get(&url).bearer_auth(&self.token);
        if !params.is_empty() {
            request = request.query(params);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                Error::Http(format!("timeout of {}ms exceeded", self.timeout.as_millis()))
            } else {
                Error::Http(e.to_string())
            }
        })?;

        self.handle_response(response).await
    }

    /// Handle response and map errors.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T> {
        let status = response.status();

        if !status.is_success() {
            let status_code = status.as_u16();
            let body = response.text().await.unwrap_or_default();
            warn!(
                status = status_code,
                body = %body,
                "Sentry API error response"
            );
            return Err(Error::from_status(status_code, &body));
        }

        response
            .json()
            .await
            .map_err(|e| Error::InvalidData(format!("Failed to parse response: {}", e)))
    }
}

#[async_trait]
impl IssueTracker for SentryClient {
    fn organization(&self) -> &str {
        &self.organization
    }

    async fn list_projects(&self) -> Result<Vec<ProjectSummary>> {
        let projects: Vec<SentryProject> = self.get(&self.endpoints.projects, &[]).await?;
        debug!(count = projects.len(), "Fetched projects");
        Ok(map_projects(&projects))
    }

    async fn find_project_issues(&self, search: &IssueSearch) -> Result<Vec<IssueSummary>> {
        let path = self.endpoints.project_issues(&search.project);
        let query = IssueQuery::build(search);

        let issues: Vec<SentryIssue> = self.get(&path, &query.params()).await?;
        debug!(count = issues.len(), project = %search.project, "Fetched issues");
        Ok(map_issues(&issues))
    }

    async fn read_issue(&self, lookup: &IssueLookup) -> Result<Vec<Value>> {
        let path = self.endpoints.issue_hashes(&lookup.issue_id);

        let mut params: Vec<(&str, &str)> = Vec::new();
        if let Some(full) = lookup.full {
            params.push(("full", full.as_str()));
        }
        if let Some(cursor) = lookup.cursor.as_deref().filter(|c| !c.is_empty()) {
            params.push(("cursor", cursor));
        }

        let hashes: Vec<SentryIssueHash> = self.get(&path, &params).await?;
        debug!(count = hashes.len(), issue_id = %lookup.issue_id, "Fetched issue hashes");
        map_issue_hashes(hashes)
    }
}

// =============================================================================
// Tests
// =============================================================================
