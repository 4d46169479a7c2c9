//! Mapping functions: Sentry types -> caller-facing types.

use sentry_issues_core::{IssueProject, IssueSummary, ProjectSummary, Result};
use serde_json::Value;

use crate::types::{SentryIssue, SentryIssueHash, SentryProject};

pub fn map_project(project: &SentryProject) -> ProjectSummary {
    ProjectSummary {
        project_id: project.id.clone(),
        project_name: project.name.clone(),
        project_slug: project.slug.clone(),
    }
}

pub fn map_projects(projects: &[SentryProject]) -> Vec<ProjectSummary> {
    projects.iter().map(map_project).collect()
}

pub fn map_issue(issue: &SentryIssue) -> IssueSummary {
    IssueSummary {
        title: issue.title.clone(),
        id: issue.id.clone(),
        project: issue
            .project
            .as_ref()
            .map(|p| IssueProject {
                id: p.id.clone(),
                name: p.name.clone(),
                slug: p.slug.clone(),
            })
            .unwrap_or_default(),
        status: issue.status.clone().unwrap_or_default(),
        status_details: issue.status_details.clone(),
        url: issue.permalink.clone().unwrap_or_default(),
        last_seen: issue.last_seen.clone().unwrap_or_default(),
    }
}

pub fn map_issues(issues: &[SentryIssue]) -> Vec<IssueSummary> {
    issues.iter().map(map_issue).collect()
}

/// Issue hashes are handed out unprojected.
pub fn map_issue_hashes(hashes: Vec<SentryIssueHash>) -> Result<Vec<Value>> {
    hashes
        .into_iter()
        .map(|hash| serde_json::to_value(hash).map_err(Into::into))
        .collect()
}
