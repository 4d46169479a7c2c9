use std::time::Duration;

use async_trait::async_trait;
use mockall::mock;
use sentry_issues_core::{
    IssueLookup, IssueSearch, IssueSummary, IssueTracker, ProjectSummary, Result,
};
use serde_json::Value;

mock! {
    pub Tracker {}

    #[async_trait]
    impl IssueTracker for Tracker {
        fn organization(&self) -> &str;
        async fn list_projects(&self) -> Result<Vec<ProjectSummary>>;
        async fn find_project_issues(&self, search: &IssueSearch) -> Result<Vec<IssueSummary>>;
        async fn read_issue(&self, lookup: &IssueLookup) -> Result<Vec<Value>>;
    }
}

/// Tracker whose issue search takes `delay` before answering with no issues.
pub struct SlowTracker {
    pub delay: Duration,
}

#[async_trait]
impl IssueTracker for SlowTracker {
    fn organization(&self) -> &str {
        "acme"
    }

    async fn list_projects(&self) -> Result<Vec<ProjectSummary>> {
        Ok(vec![])
    }

    async fn find_project_issues(&self, _search: &IssueSearch) -> Result<Vec<IssueSummary>> {
        tokio::time::sleep(self.delay).await;
        Ok(vec![])
    }

    async fn read_issue(&self, _lookup: &IssueLookup) -> Result<Vec<Value>> {
        Ok(vec![])
    }
}
