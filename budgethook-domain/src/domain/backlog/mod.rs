//! Backlog "issue created" webhook payload.
//!
//! Backlog omits fields freely and sends `null` for unset ones, so every field
//! falls back to its default in both cases. Only a syntactically broken body
//! or a type mismatch is rejected.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use serde_with::{serde_as, DefaultOnNull};

#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BacklogIssueWebhook {
    #[serde_as(as = "DefaultOnNull")]
    pub id: i64,
    #[serde_as(as = "DefaultOnNull")]
    pub project: BacklogProject,
    #[serde(rename = "type")]
    #[serde_as(as = "DefaultOnNull")]
    pub event_type: i64,
    #[serde_as(as = "DefaultOnNull")]
    pub content: BacklogIssueContent,
    #[serde_as(as = "DefaultOnNull")]
    pub notifications: Vec<Value>,
    #[serde_as(as = "DefaultOnNull")]
    pub created_user: BacklogUser,
    pub created: Option<DateTime<Utc>>,
}

impl BacklogIssueWebhook {
    pub fn description(&self) -> &str {
        &self.content.description
    }
}

#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BacklogProject {
    #[serde_as(as = "DefaultOnNull")]
    pub id: i64,
    #[serde_as(as = "DefaultOnNull")]
    pub project_key: String,
    #[serde_as(as = "DefaultOnNull")]
    pub name: String,
    #[serde_as(as = "DefaultOnNull")]
    pub chart_enabled: bool,
    #[serde_as(as = "DefaultOnNull")]
    pub subtasking_enabled: bool,
    #[serde_as(as = "DefaultOnNull")]
    pub project_leader_can_edit_project_leader: bool,
    #[serde_as(as = "DefaultOnNull")]
    pub use_wiki_tree_view: bool,
    #[serde_as(as = "DefaultOnNull")]
    pub text_formatting_rule: String,
    #[serde_as(as = "DefaultOnNull")]
    pub archived: bool,
}

#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BacklogIssueContent {
    #[serde_as(as = "DefaultOnNull")]
    pub id: i64,
    #[serde(rename = "key_id")]
    #[serde_as(as = "DefaultOnNull")]
    pub key_id: i64,
    #[serde_as(as = "DefaultOnNull")]
    pub summary: String,
    #[serde_as(as = "DefaultOnNull")]
    pub description: String,
    #[serde_as(as = "DefaultOnNull")]
    pub issue_type: BacklogIssueType,
    pub resolution: Value,
    #[serde_as(as = "DefaultOnNull")]
    pub priority: BacklogNamedItem,
    #[serde_as(as = "DefaultOnNull")]
    pub status: BacklogNamedItem,
    pub assignee: Value,
    #[serde_as(as = "DefaultOnNull")]
    pub category: Vec<Value>,
    #[serde_as(as = "DefaultOnNull")]
    pub versions: Vec<Value>,
    #[serde_as(as = "DefaultOnNull")]
    pub milestone: Vec<Value>,
    pub start_date: Value,
    pub due_date: Value,
    pub estimated_hours: Value,
    pub actual_hours: Value,
    pub parent_issue_id: Value,
    #[serde_as(as = "DefaultOnNull")]
    pub custom_fields: Vec<Value>,
    #[serde_as(as = "DefaultOnNull")]
    pub attachments: Vec<Value>,
}

#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BacklogIssueType {
    #[serde_as(as = "DefaultOnNull")]
    pub id: i64,
    #[serde_as(as = "DefaultOnNull")]
    pub project_id: i64,
    #[serde_as(as = "DefaultOnNull")]
    pub name: String,
    #[serde_as(as = "DefaultOnNull")]
    pub color: String,
    #[serde_as(as = "DefaultOnNull")]
    pub display_order: i64,
}

/// Priority and status share the same `{id, name}` shape.
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct BacklogNamedItem {
    #[serde_as(as = "DefaultOnNull")]
    pub id: i64,
    #[serde_as(as = "DefaultOnNull")]
    pub name: String,
}

#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BacklogUser {
    #[serde_as(as = "DefaultOnNull")]
    pub id: i64,
    pub user_id: Value,
    #[serde_as(as = "DefaultOnNull")]
    pub name: String,
    #[serde_as(as = "DefaultOnNull")]
    pub role_type: i64,
    pub lang: Value,
    pub mail_address: Value,
    pub nulab_account: Value,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const ISSUE_CREATED: &str = r##"{
        "id": 51232,
        "project": {
            "id": 12,
            "projectKey": "INFRA",
            "name": "Infrastructure",
            "chartEnabled": false,
            "subtaskingEnabled": false,
            "projectLeaderCanEditProjectLeader": false,
            "useWikiTreeView": true,
            "textFormattingRule": "markdown",
            "archived": false
        },
        "type": 1,
        "content": {
            "id": 3312,
            "key_id": 44,
            "summary": "Budget for proj-1",
            "description": "ProjectId: proj-1\nBillingAccountId: 012345-ABCDEF\nBudget[¥]: 50000",
            "issueType": {
                "id": 7,
                "projectId": 12,
                "name": "Task",
                "color": "#7ea800",
                "displayOrder": 0
            },
            "resolution": null,
            "priority": {"id": 3, "name": "Normal"},
            "status": {"id": 1, "name": "Open"},
            "assignee": null,
            "category": [],
            "versions": [],
            "milestone": [],
            "startDate": null,
            "dueDate": null,
            "estimatedHours": null,
            "actualHours": null,
            "parentIssueId": null,
            "customFields": [],
            "attachments": []
        },
        "notifications": [],
        "createdUser": {
            "id": 9,
            "userId": null,
            "name": "Hanako",
            "roleType": 1,
            "lang": null,
            "mailAddress": null,
            "nulabAccount": null
        },
        "created": "2024-04-01T09:30:00Z"
    }"##;

    #[test]
    fn test_deserialize_issue_created() {
        let webhook: BacklogIssueWebhook = serde_json::from_str(ISSUE_CREATED).unwrap();

        assert_eq!(webhook.id, 51232);
        assert_eq!(webhook.event_type, 1);
        assert_eq!(webhook.project.project_key, "INFRA");
        assert_eq!(webhook.content.key_id, 44);
        assert_eq!(webhook.content.issue_type.color, "#7ea800");
        assert_eq!(webhook.content.priority.name, "Normal");
        assert_eq!(webhook.created_user.name, "Hanako");
        assert_eq!(
            webhook.created,
            Some(Utc.with_ymd_and_hms(2024, 4, 1, 9, 30, 0).unwrap())
        );
        assert_eq!(
            webhook.description(),
            "ProjectId: proj-1\nBillingAccountId: 012345-ABCDEF\nBudget[¥]: 50000"
        );
    }

    #[test]
    fn test_missing_fields_default() {
        let webhook: BacklogIssueWebhook =
            serde_json::from_str(r#"{"content": {"description": "hello"}}"#).unwrap();

        assert_eq!(webhook.id, 0);
        assert_eq!(webhook.created, None);
        assert_eq!(webhook.description(), "hello");

        let webhook: BacklogIssueWebhook = serde_json::from_str("{}").unwrap();
        assert_eq!(webhook.description(), "");
    }

    #[test]
    fn test_null_description_is_empty() {
        let webhook: BacklogIssueWebhook =
            serde_json::from_str(r#"{"content": {"description": null}}"#).unwrap();

        assert_eq!(webhook.description(), "");
    }

    #[test]
    fn test_null_fields_fall_back_to_defaults() {
        let webhook: BacklogIssueWebhook = serde_json::from_str(
            r#"{
                "id": null,
                "project": null,
                "notifications": null,
                "createdUser": {"id": null, "name": null},
                "content": {
                    "summary": null,
                    "description": "ProjectId: proj-1",
                    "issueType": {"color": null},
                    "priority": null,
                    "status": {"id": 1, "name": null},
                    "customFields": null,
                    "attachments": null
                },
                "created": null
            }"#,
        )
        .unwrap();

        assert_eq!(webhook.id, 0);
        assert_eq!(webhook.project, BacklogProject::default());
        assert!(webhook.notifications.is_empty());
        assert_eq!(webhook.created_user.name, "");
        assert_eq!(webhook.content.summary, "");
        assert_eq!(webhook.content.issue_type.color, "");
        assert_eq!(webhook.content.priority, BacklogNamedItem::default());
        assert_eq!(webhook.content.status.id, 1);
        assert!(webhook.content.custom_fields.is_empty());
        assert!(webhook.content.attachments.is_empty());
        assert_eq!(webhook.created, None);
        assert_eq!(webhook.description(), "ProjectId: proj-1");
    }

    #[test]
    fn test_type_mismatch_is_rejected() {
        assert!(serde_json::from_str::<BacklogIssueWebhook>(r#"{"id": "not-a-number"}"#).is_err());
        assert!(serde_json::from_str::<BacklogIssueWebhook>("{\"id\": 1").is_err());
    }
}
