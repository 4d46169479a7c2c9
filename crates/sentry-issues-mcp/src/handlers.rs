//! Tool and resource handlers for the MCP server.
//!
//! Validates call arguments, runs the matching issue tracker operation and
//! renders each result item as pretty-printed JSON text.

use std::sync::Arc;

use sentry_issues_core::{IssueLookup, IssueSearch, IssueTracker};
use serde::Serialize;
use serde_json::Value;

use crate::protocol::{
    JsonRpcError, ResourceContents, ResourceDefinition, ResourceReadResult, ToolCallResult,
    ToolDefinition,
};
use crate::tools::{self, ToolArguments};

/// Executes tools and reads resources against an issue tracker.
#[derive(Clone)]
pub struct ToolHandler {
    tracker: Arc<dyn IssueTracker>,
}

impl ToolHandler {
    pub fn new(tracker: Arc<dyn IssueTracker>) -> Self {
        Self { tracker }
    }

    /// Get available tool definitions.
    pub fn available_tools(&self) -> Vec<ToolDefinition> {
        tools::available_tools()
    }

    /// Get available resource definitions.
    pub fn available_resources(&self) -> Vec<ResourceDefinition> {
        tools::available_resources()
    }

    /// Execute a tool by name.
    ///
    /// Upstream failures of the issue search are reported inside the tool
    /// result with `isError` set. Every other failure, including all
    /// failures of `sentry_read_issue`, becomes a protocol error.
    pub async fn execute(
        &self,
        name: &str,
        arguments: Option<Value>,
    ) -> Result<ToolCallResult, JsonRpcError> {
        match tools::validate(name, arguments)? {
            ToolArguments::FindProjectIssues(search) => self.find_project_issues(&search).await,
            ToolArguments::ReadIssue(lookup) => self.read_issue(&lookup).await,
        }
    }

    /// Read a resource by URI.
    pub async fn read_resource(&self, uri: &str) -> Result<ResourceReadResult, JsonRpcError> {
        if uri != tools::PROJECTS_URI {
            return Err(JsonRpcError::unknown_operation(&format!(
                "Unknown resource: {}",
                uri
            )));
        }

        let projects = self.tracker.list_projects().await?;
        tracing::debug!(count = projects.len(), "Listed projects");

        let text = serde_json::to_string_pretty(&projects)
            .map_err(|e| JsonRpcError::internal_error(&e.to_string()))?;

        Ok(ResourceReadResult {
            contents: vec![ResourceContents {
                uri: uri.to_string(),
                mime_type: "application/json".to_string(),
                text,
            }],
        })
    }

    async fn find_project_issues(
        &self,
        search: &IssueSearch,
    ) -> Result<ToolCallResult, JsonRpcError> {
        match self.tracker.find_project_issues(search).await {
            Ok(issues) => {
                tracing::debug!(project = %search.project, count = issues.len(), "Found issues");
                Ok(ToolCallResult::texts(render_items(&issues)?))
            }
            Err(e) if e.is_upstream() => {
                tracing::warn!(project = %search.project, "Issue search failed: {}", e);
                Ok(ToolCallResult::error(e.upstream_message()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn read_issue(&self, lookup: &IssueLookup) -> Result<ToolCallResult, JsonRpcError> {
        let hashes = self.tracker.read_issue(lookup).await.map_err(|e| {
            tracing::warn!(issue_id = %lookup.issue_id, "Issue read failed: {}", e);
            JsonRpcError::from(e)
        })?;

        tracing::debug!(issue_id = %lookup.issue_id, count = hashes.len(), "Read issue");
        Ok(ToolCallResult::texts(render_items(&hashes)?))
    }
}

/// One pretty-printed JSON document per item.
fn render_items<T: Serialize>(items: &[T]) -> Result<Vec<String>, JsonRpcError> {
    items
        .iter()
        .map(|item| {
            serde_json::to_string_pretty(item)
                .map_err(|e| JsonRpcError::internal_error(&e.to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::ToolResultContent;
    use crate::test_support::MockTracker;
    use sentry_issues_core::{Error, IssueProject, IssueSummary, ProjectSummary};
    use serde_json::json;

    fn handler(tracker: MockTracker) -> ToolHandler {
        ToolHandler::new(Arc::new(tracker))
    }

    fn texts(result: &ToolCallResult) -> Vec<&str> {
        result
            .content
            .iter()
            .map(|c| match c {
                ToolResultContent::Text { text } => text.as_str(),
            })
            .collect()
    }

    fn sample_issue(id: &str) -> IssueSummary {
        IssueSummary {
            title: "TypeError: x is undefined".to_string(),
            id: id.to_string(),
            project: IssueProject {
                id: "42".to_string(),
                name: "Frontend".to_string(),
                slug: "frontend".to_string(),
            },
            status: "unresolved".to_string(),
            status_details: json!({}),
            url: format!("https://sentry.io/issues/{}/", id),
            last_seen: "2024-05-01T10:00:00Z".to_string(),
        }
    }

    #[tokio::test]
    async fn test_find_issues_one_item_per_issue() {
        let mut tracker = MockTracker::new();
        tracker
            .expect_find_project_issues()
            .withf(|search: &IssueSearch| search.project == "frontend" && !search.resolved)
            .times(1)
            .returning(|_| Ok(vec![sample_issue("1"), sample_issue("2")]));

        let result = handler(tracker)
            .execute(
                tools::FIND_PROJECT_ISSUES,
                Some(json!({"project": "frontend"})),
            )
            .await
            .unwrap();

        assert!(result.is_error.is_none());
        let items = texts(&result);
        assert_eq!(items.len(), 2);

        let first: Value = serde_json::from_str(items[0]).unwrap();
        assert_eq!(first["id"], "1");
        assert_eq!(first["project"]["slug"], "frontend");
        assert!(items[0].contains('\n'));
    }

    #[tokio::test]
    async fn test_find_issues_empty_result() {
        let mut tracker = MockTracker::new();
        tracker
            .expect_find_project_issues()
            .returning(|_| Ok(vec![]));

        let result = handler(tracker)
            .execute(
                tools::FIND_PROJECT_ISSUES,
                Some(json!({"project": "frontend"})),
            )
            .await
            .unwrap();

        assert!(result.content.is_empty());
        assert!(result.is_error.is_none());
    }

    #[tokio::test]
    async fn test_find_issues_upstream_error_is_tool_error() {
        let mut tracker = MockTracker::new();
        tracker
            .expect_find_project_issues()
            .returning(|_| Err(Error::from_status(404, r#"{"detail":"The requested resource does not exist"}"#)));

        let result = handler(tracker)
            .execute(
                tools::FIND_PROJECT_ISSUES,
                Some(json!({"project": "missing"})),
            )
            .await
            .unwrap();

        assert_eq!(result.is_error, Some(true));
        assert_eq!(
            texts(&result),
            vec!["Sentry API error: The requested resource does not exist"]
        );
    }

    #[tokio::test]
    async fn test_find_issues_transport_error_is_tool_error() {
        let mut tracker = MockTracker::new();
        tracker
            .expect_find_project_issues()
            .returning(|_| Err(Error::Http("timeout of 10000ms exceeded".to_string())));

        let result = handler(tracker)
            .execute(
                tools::FIND_PROJECT_ISSUES,
                Some(json!({"project": "frontend"})),
            )
            .await
            .unwrap();

        assert_eq!(result.is_error, Some(true));
        assert_eq!(
            texts(&result),
            vec!["Sentry API error: timeout of 10000ms exceeded"]
        );
    }

    #[tokio::test]
    async fn test_find_issues_invalid_body_is_protocol_error() {
        let mut tracker = MockTracker::new();
        tracker
            .expect_find_project_issues()
            .returning(|_| Err(Error::InvalidData("expected a sequence".to_string())));

        let err = handler(tracker)
            .execute(
                tools::FIND_PROJECT_ISSUES,
                Some(json!({"project": "frontend"})),
            )
            .await
            .unwrap_err();

        assert_eq!(err.code, JsonRpcError::INTERNAL_ERROR);
    }

    #[tokio::test]
    async fn test_find_issues_validation_skips_tracker() {
        let mut tracker = MockTracker::new();
        tracker.expect_find_project_issues().times(0);

        let err = handler(tracker)
            .execute(tools::FIND_PROJECT_ISSUES, Some(json!({"search_word": "x"})))
            .await
            .unwrap_err();

        assert_eq!(err.code, JsonRpcError::INVALID_PARAMS);
    }

    #[tokio::test]
    async fn test_read_issue_passes_items_through() {
        let mut tracker = MockTracker::new();
        tracker
            .expect_read_issue()
            .withf(|lookup: &IssueLookup| {
                lookup.issue_id == "123" && lookup.full.map(|f| f.as_str()) == Some("true")
            })
            .times(1)
            .returning(|_| {
                Ok(vec![
                    json!({"id": "h1", "latestEvent": {"eventID": "e1"}}),
                    json!({"id": "h2", "latestEvent": null}),
                ])
            });

        let result = handler(tracker)
            .execute(
                tools::READ_ISSUE,
                Some(json!({"issue_id": "123", "full": "true"})),
            )
            .await
            .unwrap();

        let items = texts(&result);
        assert_eq!(items.len(), 2);
        let second: Value = serde_json::from_str(items[1]).unwrap();
        assert_eq!(second, json!({"id": "h2", "latestEvent": null}));
    }

    #[tokio::test]
    async fn test_read_issue_upstream_error_is_protocol_error() {
        let mut tracker = MockTracker::new();
        tracker
            .expect_read_issue()
            .returning(|_| Err(Error::from_status(403, "")));

        let err = handler(tracker)
            .execute(tools::READ_ISSUE, Some(json!({"issue_id": "123"})))
            .await
            .unwrap_err();

        assert_eq!(err.code, JsonRpcError::INTERNAL_ERROR);
        assert_eq!(
            err.message,
            "Sentry API error: Request failed with status code 403"
        );
    }

    #[tokio::test]
    async fn test_read_issue_missing_id() {
        let mut tracker = MockTracker::new();
        tracker.expect_read_issue().times(0);

        let err = handler(tracker)
            .execute(tools::READ_ISSUE, None)
            .await
            .unwrap_err();

        assert_eq!(err.code, JsonRpcError::INVALID_PARAMS);
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let err = handler(MockTracker::new())
            .execute("sentry_delete_issue", Some(json!({})))
            .await
            .unwrap_err();

        assert_eq!(err.code, JsonRpcError::METHOD_NOT_FOUND);
        assert_eq!(err.message, "Unknown tool: sentry_delete_issue");
    }

    #[tokio::test]
    async fn test_read_projects_resource() {
        let mut tracker = MockTracker::new();
        tracker.expect_list_projects().times(1).returning(|| {
            Ok(vec![ProjectSummary {
                project_id: "42".to_string(),
                project_name: "Frontend".to_string(),
                project_slug: "frontend".to_string(),
            }])
        });

        let result = handler(tracker)
            .read_resource(tools::PROJECTS_URI)
            .await
            .unwrap();

        assert_eq!(result.contents.len(), 1);
        let contents = &result.contents[0];
        assert_eq!(contents.uri, "sentry://project");
        assert_eq!(contents.mime_type, "application/json");

        let projects: Value = serde_json::from_str(&contents.text).unwrap();
        assert_eq!(projects[0]["project_slug"], "frontend");
    }

    #[tokio::test]
    async fn test_read_projects_upstream_error() {
        let mut tracker = MockTracker::new();
        tracker
            .expect_list_projects()
            .returning(|| Err(Error::from_status(401, r#"{"detail":"Invalid token"}"#)));

        let err = handler(tracker)
            .read_resource(tools::PROJECTS_URI)
            .await
            .unwrap_err();

        assert_eq!(err.code, JsonRpcError::INTERNAL_ERROR);
        assert_eq!(err.message, "Sentry API error: Invalid token");
    }

    #[tokio::test]
    async fn test_unknown_resource() {
        let mut tracker = MockTracker::new();
        tracker.expect_list_projects().times(0);

        let err = handler(tracker)
            .read_resource("sentry://issue")
            .await
            .unwrap_err();

        assert_eq!(err.code, JsonRpcError::METHOD_NOT_FOUND);
        assert_eq!(err.message, "Unknown resource: sentry://issue");
    }
}
