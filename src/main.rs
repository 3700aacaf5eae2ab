use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tracing::warn;

use portal_approvals::cli::commands::{
    ApproveCommand, ConfigCommand, RegenerateCommand, RejectCommand,
};
use portal_approvals::cli::{Cli, Commands};
use portal_approvals::{
    init_telemetry, shutdown_telemetry, ApprovalRequest, PortalConfig, ShutdownCoordinator,
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let env_file = PortalConfig::load_env_file();
    let config = PortalConfig::load()?;
    init_telemetry(&config.observability)?;

    if let Err(e) = env_file {
        warn!("Ignoring unreadable .env file: {e:#}");
    }

    let coordinator = Arc::new(ShutdownCoordinator::new());
    coordinator.clone().install_signal_handlers();

    let result = match cli.command {
        Commands::Approve {
            id,
            user,
            plan,
            json,
        } => {
            ApproveCommand::new(ApprovalRequest::new(id, user, plan))
                .with_json(json)
                .execute(&config, coordinator.signal())
                .await
        }
        Commands::Reject { id } => RejectCommand::new(id).execute(&config).await,
        Commands::Regenerate {
            id,
            user,
            project,
            plan,
        } => {
            RegenerateCommand::new(ApprovalRequest::new(id, user, plan), project)
                .execute(&config, coordinator.signal())
                .await
        }
        Commands::Config { write } => ConfigCommand::new(write).execute(&config),
    };

    shutdown_telemetry();
    result
}
