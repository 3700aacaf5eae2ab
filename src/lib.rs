// Portal Approvals Library - subscription approval and invoice generation
// This exposes the core components for testing and integration

pub mod backend;
pub mod cli;
pub mod config;
pub mod http;
pub mod notify;
pub mod observability;
pub mod orchestrator;
pub mod retry;
pub mod shutdown;
pub mod telemetry;

// Re-export key types for easy access
pub use backend::{BackendApi, BackendError, HttpBackend, SubscriptionAction};
pub use config::PortalConfig;
pub use http::RateLimitedHttpClient;
pub use notify::{ChannelSink, ConsoleSink, Notice, NotificationSink, Severity, TracingSink};
pub use observability::{OperationTimer, OrchestrationMetrics, OrchestrationStats};
pub use orchestrator::{
    ActionOrchestrator, AlreadyInFlight, ApprovalRequest, ApprovalRun, InFlightApprovals,
    OrchestrationError, OrchestrationOutcome,
};
pub use retry::{retry_with_backoff, AttemptOutcome, GenerationAttempt, RetryPolicy};
pub use shutdown::{ShutdownCoordinator, ShutdownSignal};
pub use telemetry::{generate_correlation_id, init_telemetry, shutdown_telemetry};
