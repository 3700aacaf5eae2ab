use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use uuid::Uuid;

use crate::config::ObservabilityConfig;

/// Initialize structured logging on stderr, leaving stdout to command output.
///
/// `RUST_LOG` wins when set; otherwise the configured level applies.
pub fn init_telemetry(config: &ObservabilityConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))?;

    let registry = tracing_subscriber::registry().with(filter);

    if config.json_logs {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_current_span(true)
                    .with_span_list(true),
            )
            .try_init()?;
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .try_init()?;
    }

    tracing::info!("Portal approvals telemetry initialized with structured logging");
    Ok(())
}

/// Generate a correlation ID for linking the calls of one orchestration run
pub fn generate_correlation_id() -> String {
    Uuid::new_v4().to_string()
}

/// Create a span carrying the approval attributes for one run
pub fn create_approval_span(
    operation: &str,
    request_id: &str,
    plan: &str,
    correlation_id: &str,
) -> tracing::Span {
    tracing::info_span!(
        "subscription_approval",
        operation = operation,
        request.id = request_id,
        request.plan = plan,
        correlation.id = correlation_id,
    )
}

/// Shutdown telemetry gracefully
pub fn shutdown_telemetry() {
    // For structured logging, no explicit shutdown needed
    tracing::info!("Portal approvals telemetry shutdown complete");
}
