use serde::{Deserialize, Serialize};
use std::fmt;

/// Subscription state transitions accepted by `PATCH /subscriptions/{id}/action`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionAction {
    Approve,
    Reject,
}

impl SubscriptionAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionAction::Approve => "approve",
            SubscriptionAction::Reject => "reject",
        }
    }
}

impl fmt::Display for SubscriptionAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TransitionBody {
    pub action: SubscriptionAction,
}

/// Project linked to an approved subscription
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProjectRef {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TransitionResponse {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub project: Option<ProjectRef>,
}

impl TransitionResponse {
    pub fn with_project(project_id: &str) -> Self {
        Self {
            project: Some(ProjectRef {
                id: project_id.to_string(),
                name: None,
            }),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateInvoiceRequest {
    pub user_id: String,
    pub project_id: String,
    pub plan: String,
}

/// Wire shape of `POST /invoices/generate`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateInvoiceResponse {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub reference_number: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedInvoice {
    pub reference_number: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_action_body_shape() {
        let body = serde_json::to_value(TransitionBody {
            action: SubscriptionAction::Approve,
        })
        .unwrap();
        assert_eq!(body, json!({"action": "approve"}));
    }

    #[test]
    fn test_transition_response_tolerates_extra_fields() {
        let response: TransitionResponse = serde_json::from_value(json!({
            "subscription": {"status": "approved"},
            "project": {"id": "proj-9", "name": "Website rebuild", "budget": 1200}
        }))
        .unwrap();
        assert_eq!(response.project.unwrap().id, "proj-9");
    }

    #[test]
    fn test_transition_response_null_project() {
        let response: TransitionResponse =
            serde_json::from_value(json!({"project": null})).unwrap();
        assert!(response.project.is_none());
    }

    #[test]
    fn test_generate_request_is_camel_case() {
        let body = serde_json::to_value(GenerateInvoiceRequest {
            user_id: "u1".to_string(),
            project_id: "proj-9".to_string(),
            plan: "Enterprise Growth".to_string(),
        })
        .unwrap();
        assert_eq!(
            body,
            json!({"userId": "u1", "projectId": "proj-9", "plan": "Enterprise Growth"})
        );
    }
}
