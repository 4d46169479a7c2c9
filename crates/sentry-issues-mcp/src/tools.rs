//! MCP tool and resource definitions.
//!
//! Declares what the server advertises on `tools/list` and `resources/list`
//! and turns raw tool-call arguments into typed, validated arguments.

use sentry_issues_core::{Error, IssueLookup, IssueSearch, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::protocol::{ResourceDefinition, ToolDefinition};

/// Search issues within a project.
pub const FIND_PROJECT_ISSUES: &str = "sentry_find_project_issues";

/// Fetch one issue with its latest events.
pub const READ_ISSUE: &str = "sentry_read_issue";

/// Name of the project listing resource.
pub const FIND_PROJECTS: &str = "sentry_find_projects";

/// URI of the project listing resource.
pub const PROJECTS_URI: &str = "sentry://project";

const CURSOR_DESCRIPTION: &str = "A pointer to the last object fetched and its sort order; used to retrieve the next or previous results.";

/// Validated arguments of a tool call.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolArguments {
    FindProjectIssues(IssueSearch),
    ReadIssue(IssueLookup),
}

/// Tools in the order they are advertised.
pub fn available_tools() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition {
            name: FIND_PROJECT_ISSUES.to_string(),
            description: "search issues in project.you need to provide project_id or slug"
                .to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "project": {
                        "type": "string",
                        "description": "project_id or slug"
                    },
                    "search_word": {
                        "type": ["string", "null"],
                        "default": null,
                        "description": "search word in issue"
                    },
                    "user_id": {
                        "type": ["string", "null"],
                        "default": null,
                        "description": "search issues by user id"
                    },
                    "url": {
                        "type": ["string", "null"],
                        "default": null,
                        "description": "search issues in url"
                    },
                    "resolved": {
                        "type": "boolean",
                        "default": false,
                        "description": "search resolved issues (default: false)"
                    },
                    "cursor": {
                        "type": ["string", "null"],
                        "default": null,
                        "description": CURSOR_DESCRIPTION
                    },
                    "priority": {
                        "type": "string",
                        "default": "high,medium",
                        "description": "search issues by priority(default: high or medium)"
                    }
                },
                "required": ["project"]
            }),
        },
        ToolDefinition {
            name: READ_ISSUE.to_string(),
            description: "fetch issue in sentry. you need to provide issue_id".to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "issue_id": {
                        "type": "string",
                        "description": "The ID of the issue to retrieve."
                    },
                    "full": {
                        "type": ["string", "null"],
                        "enum": ["true", "false", null],
                        "description": "If this is set to true, the event payload will include the full event body, including the stacktrace. Set to 1 to enable."
                    },
                    "cursor": {
                        "type": ["string", "null"],
                        "default": null,
                        "description": CURSOR_DESCRIPTION
                    }
                },
                "required": ["issue_id"]
            }),
        },
    ]
}

/// Resources in the order they are advertised.
pub fn available_resources() -> Vec<ResourceDefinition> {
    vec![ResourceDefinition {
        name: FIND_PROJECTS.to_string(),
        uri: PROJECTS_URI.to_string(),
        description: "list projects in sentry organization".to_string(),
        mime_type: Some("application/json".to_string()),
    }]
}

/// Validate raw arguments for the named tool.
///
/// Missing arguments are treated as an empty object so that required-field
/// checks report the missing field.
pub fn validate(tool: &str, arguments: Option<Value>) -> Result<ToolArguments> {
    match tool {
        FIND_PROJECT_ISSUES => {
            let search: IssueSearch = parse(arguments)?;
            if search.project.is_empty() {
                return Err(Error::Validation(
                    "Invalid project issues arguments: project is required".to_string(),
                ));
            }
            Ok(ToolArguments::FindProjectIssues(search))
        }
        READ_ISSUE => {
            let lookup: IssueLookup = parse(arguments)?;
            if lookup.issue_id.is_empty() {
                return Err(Error::Validation(
                    "Invalid issue arguments: issue_id is required".to_string(),
                ));
            }
            Ok(ToolArguments::ReadIssue(lookup))
        }
        other => Err(Error::UnknownOperation(format!("Unknown tool: {}", other))),
    }
}

fn parse<T: DeserializeOwned>(arguments: Option<Value>) -> Result<T> {
    let arguments = match arguments {
        None | Some(Value::Null) => Value::Object(Default::default()),
        Some(value @ Value::Object(_)) => value,
        Some(_) => {
            return Err(Error::Validation(
                "arguments must be a JSON object".to_string(),
            ))
        }
    };

    serde_json::from_value(arguments).map_err(|e| Error::Validation(e.to_string()))
}
