use anyhow::{bail, Result};
use std::sync::Arc;

use crate::cli::commands::build_orchestrator;
use crate::config::PortalConfig;
use crate::notify::{ConsoleSink, NotificationSink, TracingSink};
use crate::orchestrator::{ApprovalRequest, OrchestrationOutcome};
use crate::shutdown::ShutdownSignal;

pub struct ApproveCommand {
    pub request: ApprovalRequest,
    pub json: bool,
}

impl ApproveCommand {
    pub fn new(request: ApprovalRequest) -> Self {
        Self {
            request,
            json: false,
        }
    }

    pub fn with_json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }

    pub async fn execute(&self, config: &PortalConfig, shutdown: ShutdownSignal) -> Result<()> {
        // JSON mode keeps stdout machine-readable; the notice goes to the log instead
        let sink: Arc<dyn NotificationSink> = if self.json {
            Arc::new(TracingSink)
        } else {
            println!("🔄 Approving subscription {}...", self.request.id);
            Arc::new(ConsoleSink)
        };

        let orchestrator = build_orchestrator(config, sink, shutdown)?;
        let outcome = orchestrator.try_approve(&self.request).await?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }

        if config.observability.metrics_enabled {
            orchestrator.metrics().log_stats();
        }

        if let OrchestrationOutcome::ApprovalFailed { reason } = outcome {
            bail!("Subscription {} was not approved: {reason}", self.request.id);
        }

        Ok(())
    }
}
