//! Notification sink collaborator
//!
//! The orchestrator reports each terminal outcome through [`NotificationSink`].
//! Delivery is best-effort: sinks must return quickly and a failed delivery
//! never changes the outcome of a run.

use serde::Serialize;
use std::io::Write;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

#[cfg(test)]
use mockall::automock;

use crate::orchestrator::OrchestrationOutcome;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Error,
    Info,
}

/// A transient message for the user, e.g. a toast
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub message: String,
    pub severity: Severity,
}

impl Notice {
    pub fn new(message: impl Into<String>, severity: Severity) -> Self {
        Self {
            message: message.into(),
            severity,
        }
    }
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Notification channel closed")]
    ChannelClosed,
    #[error("Failed to write notification: {message}")]
    Io { message: String },
}

/// Receives exactly one outcome per orchestration run
#[cfg_attr(test, automock)]
pub trait NotificationSink: Send + Sync {
    fn report(&self, outcome: &OrchestrationOutcome) -> Result<(), NotifyError>;
}

/// Emits each outcome as a structured log event
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn report(&self, outcome: &OrchestrationOutcome) -> Result<(), NotifyError> {
        let notice = outcome.notice();
        match notice.severity {
            Severity::Success => info!(severity = "success", "{}", notice.message),
            Severity::Info => warn!(severity = "info", "{}", notice.message),
            Severity::Error => error!(severity = "error", "{}", notice.message),
        }
        Ok(())
    }
}

/// Prints one line per outcome on stdout, for the CLI host
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleSink;

impl ConsoleSink {
    fn icon(severity: Severity) -> &'static str {
        match severity {
            Severity::Success => "✅",
            Severity::Info => "⚠️ ",
            Severity::Error => "❌",
        }
    }
}

impl NotificationSink for ConsoleSink {
    fn report(&self, outcome: &OrchestrationOutcome) -> Result<(), NotifyError> {
        let notice = outcome.notice();
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{} {}", Self::icon(notice.severity), notice.message).map_err(|e| {
            NotifyError::Io {
                message: e.to_string(),
            }
        })
    }
}

/// Forwards notices to a UI task over an unbounded channel. Never blocks.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    sender: mpsc::UnboundedSender<Notice>,
}

impl ChannelSink {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Notice>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl NotificationSink for ChannelSink {
    fn report(&self, outcome: &OrchestrationOutcome) -> Result<(), NotifyError> {
        self.sender
            .send(outcome.notice())
            .map_err(|_| NotifyError::ChannelClosed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_sink_forwards_notice() {
        let (sink, mut receiver) = ChannelSink::channel();
        let outcome = OrchestrationOutcome::ApprovedWithDocument {
            reference_number: "INV-0099".to_string(),
        };

        sink.report(&outcome).unwrap();

        let notice = receiver.try_recv().unwrap();
        assert_eq!(notice.severity, Severity::Success);
        assert_eq!(notice, outcome.notice());
    }

    #[test]
    fn test_channel_sink_reports_closed_receiver() {
        let (sink, receiver) = ChannelSink::channel();
        drop(receiver);

        let outcome = OrchestrationOutcome::ApprovalFailed {
            reason: "boom".to_string(),
        };
        assert!(matches!(sink.report(&outcome), Err(NotifyError::ChannelClosed)));
    }

    #[test]
    fn test_tracing_and_console_sinks_succeed() {
        let outcome = OrchestrationOutcome::ApprovalFailed {
            reason: "boom".to_string(),
        };
        assert!(TracingSink.report(&outcome).is_ok());
        assert!(ConsoleSink.report(&outcome).is_ok());
    }

    #[test]
    fn test_severity_serializes_lowercase() {
        let notice = Notice::new("done", Severity::Success);
        assert_eq!(
            serde_json::to_value(&notice).unwrap(),
            serde_json::json!({"message": "done", "severity": "success"})
        );
    }
}
