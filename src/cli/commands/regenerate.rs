use anyhow::{bail, Result};
use std::sync::Arc;

use crate::cli::commands::build_orchestrator;
use crate::config::PortalConfig;
use crate::notify::ConsoleSink;
use crate::orchestrator::ApprovalRequest;
use crate::shutdown::ShutdownSignal;

pub struct RegenerateCommand {
    pub request: ApprovalRequest,
    pub project_id: String,
}

impl RegenerateCommand {
    pub fn new(request: ApprovalRequest, project_id: String) -> Self {
        Self {
            request,
            project_id,
        }
    }

    pub async fn execute(&self, config: &PortalConfig, shutdown: ShutdownSignal) -> Result<()> {
        println!(
            "🔄 Regenerating invoice for subscription {} (project {})...",
            self.request.id, self.project_id
        );

        let orchestrator = build_orchestrator(config, Arc::new(ConsoleSink), shutdown)?;
        let outcome = orchestrator
            .regenerate_invoice(&self.request, &self.project_id)
            .await;

        if outcome.reference_number().is_none() {
            bail!("Invoice for subscription {} is still pending", self.request.id);
        }

        Ok(())
    }
}
