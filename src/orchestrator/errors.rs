use thiserror::Error;

use crate::backend::BackendError;

#[derive(Debug, Error)]
pub enum OrchestrationError {
    #[error("approval request id is empty")]
    EmptyRequestId,
    /// Phase one failed. Terminal, nothing was applied.
    #[error("subscription approval failed: {source}")]
    PrimaryTransition {
        #[source]
        source: BackendError,
    },
    #[error("invoice generation attempt {attempt} failed: {source}")]
    SideEffectAttempt {
        attempt: u32,
        #[source]
        source: BackendError,
    },
    #[error("invoice generation attempt {attempt} timed out after {timeout_ms}ms")]
    SideEffectTimeout { attempt: u32, timeout_ms: u64 },
    /// Approval stands but no invoice exists yet
    #[error("invoice generation failed after {attempts} attempts")]
    SideEffectExhausted {
        attempts: u32,
        #[source]
        last: Box<OrchestrationError>,
    },
    #[error("invoice generation cancelled after {attempts} attempts")]
    Cancelled { attempts: u32 },
}

impl OrchestrationError {
    /// Per-attempt failures the retry loop absorbs
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            OrchestrationError::SideEffectAttempt { .. } | OrchestrationError::SideEffectTimeout { .. }
        )
    }

    /// The primary transition was applied before this error occurred
    pub fn is_partial(&self) -> bool {
        matches!(
            self,
            OrchestrationError::SideEffectExhausted { .. } | OrchestrationError::Cancelled { .. }
        )
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("approval {id} is already being processed")]
pub struct AlreadyInFlight {
    pub id: String,
}
