use serde::{Deserialize, Serialize};
use std::fmt;

use super::errors::OrchestrationError;
use crate::notify::{Notice, Severity};
use crate::retry::GenerationAttempt;

pub const NO_PROJECT_REASON: &str = "no project";
pub const GENERATION_FAILED_REASON: &str = "document generation failed after retries";
pub const GENERATION_CANCELLED_REASON: &str = "document generation cancelled";

/// A pending subscription transition awaiting an admin decision
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalRequest {
    pub id: String,
    pub subject_user_id: String,
    pub plan: String,
}

impl ApprovalRequest {
    pub fn new(
        id: impl Into<String>,
        subject_user_id: impl Into<String>,
        plan: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            subject_user_id: subject_user_id.into(),
            plan: plan.into(),
        }
    }
}

/// Terminal result of one orchestration run. Exactly one per run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum OrchestrationOutcome {
    ApprovedWithDocument { reference_number: String },
    ApprovedWithoutDocument { reason: String },
    ApprovalFailed { reason: String },
}

impl OrchestrationOutcome {
    pub fn without_document(reason: &str) -> Self {
        OrchestrationOutcome::ApprovedWithoutDocument {
            reason: reason.to_string(),
        }
    }

    /// The primary transition went through, whatever happened afterwards
    pub fn is_approved(&self) -> bool {
        !matches!(self, OrchestrationOutcome::ApprovalFailed { .. })
    }

    pub fn reference_number(&self) -> Option<&str> {
        match self {
            OrchestrationOutcome::ApprovedWithDocument { reference_number } => {
                Some(reference_number)
            }
            _ => None,
        }
    }

    /// User-facing message and severity for this outcome
    pub fn notice(&self) -> Notice {
        match self {
            OrchestrationOutcome::ApprovedWithDocument { reference_number } => Notice::new(
                format!("Subscription approved and invoice {reference_number} generated"),
                Severity::Success,
            ),
            OrchestrationOutcome::ApprovedWithoutDocument { reason } if reason == NO_PROJECT_REASON => {
                Notice::new(
                    "Subscription approved. No project is linked, so no invoice was generated",
                    Severity::Info,
                )
            }
            OrchestrationOutcome::ApprovedWithoutDocument { reason } => Notice::new(
                format!(
                    "Subscription approved, but the invoice is pending ({reason}). \
                     Retry invoice generation manually"
                ),
                Severity::Info,
            ),
            OrchestrationOutcome::ApprovalFailed { reason } => Notice::new(
                format!("Subscription approval failed: {reason}"),
                Severity::Error,
            ),
        }
    }
}

impl fmt::Display for OrchestrationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.notice().message)
    }
}

/// Everything one run produced: the reported outcome plus diagnostics
#[derive(Debug)]
pub struct ApprovalRun {
    pub outcome: OrchestrationOutcome,
    pub attempts: Vec<GenerationAttempt>,
    pub error: Option<OrchestrationError>,
}

impl ApprovalRun {
    pub(crate) fn failed(error: OrchestrationError) -> Self {
        let reason = match &error {
            OrchestrationError::PrimaryTransition { source } => source.to_string(),
            other => other.to_string(),
        };

        Self {
            outcome: OrchestrationOutcome::ApprovalFailed { reason },
            attempts: Vec::new(),
            error: Some(error),
        }
    }

    pub(crate) fn settled(outcome: OrchestrationOutcome) -> Self {
        Self {
            outcome,
            attempts: Vec::new(),
            error: None,
        }
    }

    /// Number of document generation calls made during the run
    pub fn generation_calls(&self) -> usize {
        self.attempts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_notice_severity_per_outcome() {
        let generated = OrchestrationOutcome::ApprovedWithDocument {
            reference_number: "INV-0099".to_string(),
        };
        assert_eq!(generated.notice().severity, Severity::Success);
        assert!(generated.notice().message.contains("INV-0099"));

        let no_project = OrchestrationOutcome::without_document(NO_PROJECT_REASON);
        assert_eq!(no_project.notice().severity, Severity::Info);
        assert!(no_project.notice().message.contains("No project"));

        let pending = OrchestrationOutcome::without_document(GENERATION_FAILED_REASON);
        assert_eq!(pending.notice().severity, Severity::Info);
        assert!(pending.notice().message.contains("manually"));

        let failed = OrchestrationOutcome::ApprovalFailed {
            reason: "HTTP 500".to_string(),
        };
        assert_eq!(failed.notice().severity, Severity::Error);
        assert!(!failed.is_approved());
    }

    #[test]
    fn test_outcome_serializes_with_status_tag() {
        let outcome = OrchestrationOutcome::ApprovedWithDocument {
            reference_number: "INV-0099".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&outcome).unwrap(),
            json!({"status": "approved_with_document", "referenceNumber": "INV-0099"})
        );

        let failed = OrchestrationOutcome::ApprovalFailed {
            reason: "HTTP 500".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&failed).unwrap(),
            json!({"status": "approval_failed", "reason": "HTTP 500"})
        );
    }

    #[test]
    fn test_request_deserializes_camel_case() {
        let request: ApprovalRequest = serde_json::from_value(json!({
            "id": "sub-42", "subjectUserId": "u1", "plan": "Enterprise Growth"
        }))
        .unwrap();
        assert_eq!(request, ApprovalRequest::new("sub-42", "u1", "Enterprise Growth"));
    }
}
