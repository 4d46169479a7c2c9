//! Issue search query construction.
//!
//! Sentry's issue search takes a single `query` parameter holding
//! space-separated tokens that are ANDed together. Tokens are emitted in a
//! fixed order: free text, user, url, resolution, priority.

use sentry_issues_core::IssueSearch;

/// Query parameters for one issue search request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueQuery {
    pub query: String,
    pub cursor: Option<String>,
}

impl IssueQuery {
    /// Build the search query for the given arguments.
    pub fn build(search: &IssueSearch) -> Self {
        let mut tokens: Vec<String> = Vec::new();

        if let Some(word) = non_empty(&search.search_word) {
            tokens.push(word.to_string());
        }
        if let Some(user_id) = non_empty(&search.user_id) {
            tokens.push(format!("user.id:{}", user_id));
        }
        if let Some(url) = non_empty(&search.url) {
            tokens.push(format!("http.url:{}", url));
        }

        tokens.push(if search.resolved { "is:resolved" } else { "is:unresolved" }.to_string());

        if !search.priority.is_empty() {
            tokens.push(format!("issue.priority:[{}]", search.priority));
        }

        Self {
            query: tokens.join(" "),
            cursor: non_empty(&search.cursor).map(String::from),
        }
    }

    /// Request parameters in the order they are sent.
    pub fn params(&self) -> Vec<(&'static str, &str)> {
        let mut params = vec![("query", self.query.as_str())];
        if let Some(cursor) = &self.cursor {
            params.push(("cursor", cursor.as_str()));
        }
        params
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}
