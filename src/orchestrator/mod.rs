//! Subscription approval orchestration
//!
//! Phase one applies the approval on the backend exactly once. Phase two
//! generates the invoice for the linked project, retrying with exponential
//! backoff. A failure in phase two never undoes or repeats phase one.

pub mod errors;
pub mod guard;
pub mod runner;
pub mod types;

pub use errors::{AlreadyInFlight, OrchestrationError};
pub use guard::{InFlightApprovals, InFlightTicket};
pub use runner::ActionOrchestrator;
pub use types::{
    ApprovalRequest, ApprovalRun, OrchestrationOutcome, GENERATION_CANCELLED_REASON,
    GENERATION_FAILED_REASON, NO_PROJECT_REASON,
};
