use anyhow::{Context, Result};
use std::sync::Arc;

use crate::backend::HttpBackend;
use crate::config::PortalConfig;
use crate::notify::NotificationSink;
use crate::orchestrator::ActionOrchestrator;
use crate::retry::RetryPolicy;
use crate::shutdown::ShutdownSignal;

pub mod approve;
pub mod config;
pub mod regenerate;
pub mod reject;

pub use approve::ApproveCommand;
pub use config::ConfigCommand;
pub use regenerate::RegenerateCommand;
pub use reject::RejectCommand;

/// Wire an orchestrator to the configured backend
pub fn build_orchestrator(
    config: &PortalConfig,
    sink: Arc<dyn NotificationSink>,
    shutdown: ShutdownSignal,
) -> Result<ActionOrchestrator> {
    let backend =
        HttpBackend::from_config(&config.backend).context("Failed to create backend client")?;

    Ok(ActionOrchestrator::new(Arc::new(backend), sink)
        .with_policy(RetryPolicy::from(&config.generation))
        .with_shutdown(shutdown))
}
