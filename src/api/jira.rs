use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{ApiClient, ApiError};

/// An issue in the tracker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    /// Numeric id, some servers send it as a string
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    /// The issue key, like `ABC-123`
    pub key: String,
    /// The issue's fields
    pub fields: IssueFields,
}

/// The fields of an [`Issue`] shown in the release notes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueFields {
    /// The issue's title
    pub summary: String,
    /// The issue's description
    #[serde(default)]
    pub description: Option<String>,
}

fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    return match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(de::Error::custom(format!("Expected an id, got '{other}'"))),
    };
}

/// Client for a JIRA server's REST API.
#[derive(Debug, Clone)]
pub struct Jira {
    client: ApiClient,
}

impl Jira {
    /// Creates a client, `api_base` being something like
    /// `https://jira.example.com/rest/api/2/`.
    pub fn new(user: &str, password: &str, api_base: &str) -> Self {
        let client = ApiClient::new(api_base).with_basic_auth(user, password);
        return Self { client };
    }

    /// Calls the API, `Ok(None)` if nothing was found.
    pub fn call(&self, url: &str) -> Result<Option<Value>, ApiError> {
        return self.client.call(url);
    }

    /// Gets an issue by key or id.
    pub fn get_issue(&self, issue_id: &str) -> Result<Option<Issue>, ApiError> {
        return match self.call(&format!("issue/{issue_id}.json"))? {
            Some(issue) => Ok(Some(serde_json::from_value(issue)?)),
            None => Ok(None),
        };
    }

    /// Gets several issues, skipping the ones that don't exist.
    pub fn get_issues(&self, issue_ids: &[String]) -> Result<Vec<Issue>, ApiError> {
        let mut issues = Vec::new();
        for issue_id in issue_ids {
            match self.get_issue(issue_id)? {
                Some(issue) => issues.push(issue),
                None => log::warn!("Issue '{issue_id}' not found"),
            }
        }
        return Ok(issues);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_numeric_and_string_ids() {
        let issue: Issue = serde_json::from_str(
            r#"{"id":1,"key":"ABC-123","fields":{"summary":"Release email JIRA integration","subtasks":[]}}"#
        ).unwrap();
        assert_eq!(issue.id, "1");
        assert_eq!(issue.fields.description, None);

        let issue: Issue = serde_json::from_str(
            r#"{"id":"10002","key":"ABC-124","fields":{"summary":"x","description":"y"}}"#
        ).unwrap();
        assert_eq!(issue.id, "10002");
        assert_eq!(issue.fields.description.as_deref(), Some("y"));
    }

    #[test]
    fn rejects_other_ids() {
        let issue = serde_json::from_str::<Issue>(r#"{"id":[1],"key":"A-1","fields":{"summary":"x"}}"#);
        assert!(issue.is_err());
    }
}
