use anyhow::{Context, Result};
use tracing::info;

use crate::backend::{BackendApi, HttpBackend, SubscriptionAction};
use crate::config::PortalConfig;

pub struct RejectCommand {
    pub id: String,
}

impl RejectCommand {
    pub fn new(id: String) -> Self {
        Self { id }
    }

    /// A single transition call. Nothing depends on it, so there is no retry.
    pub async fn execute(&self, config: &PortalConfig) -> Result<()> {
        let backend = HttpBackend::from_config(&config.backend)?;

        backend
            .transition(&self.id, SubscriptionAction::Reject)
            .await
            .with_context(|| format!("Failed to reject subscription {}", self.id))?;

        info!(request.id = %self.id, "Subscription rejected");
        println!("✅ Subscription {} rejected", self.id);
        Ok(())
    }
}
