use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod commands;

#[derive(Parser)]
#[command(name = "portal-approvals")]
#[command(about = "Approve subscriptions and generate their invoices")]
#[command(long_about = "Drives the subscription approval workflow against the portal REST API: \
                       approve a pending subscription, then generate its invoice with bounded retries. \
                       Configuration comes from portal-approvals.toml and PORTAL__* environment variables.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Approve a pending subscription and generate its invoice
    Approve {
        /// Subscription id
        #[arg(long, help = "Id of the pending subscription")]
        id: String,
        /// Subscribing user
        #[arg(long, help = "Id of the user the subscription belongs to")]
        user: String,
        /// Pricing tier
        #[arg(long, help = "Plan name, e.g. 'Enterprise Growth'")]
        plan: String,
        /// Print the outcome as JSON instead of a message
        #[arg(long, help = "Print the terminal outcome as JSON on stdout")]
        json: bool,
    },
    /// Reject a pending subscription
    Reject {
        /// Subscription id
        #[arg(long, help = "Id of the pending subscription")]
        id: String,
    },
    /// Retry invoice generation for an already approved subscription
    Regenerate {
        /// Subscription id
        #[arg(long, help = "Id of the approved subscription")]
        id: String,
        /// Subscribing user
        #[arg(long, help = "Id of the user the subscription belongs to")]
        user: String,
        /// Project linked to the subscription
        #[arg(long, help = "Id of the project the invoice is for")]
        project: String,
        /// Pricing tier
        #[arg(long, help = "Plan name, e.g. 'Enterprise Growth'")]
        plan: String,
    },
    /// Show the effective configuration (token redacted)
    Config {
        /// Write the effective configuration to a file
        #[arg(long, help = "Write the effective configuration as TOML to this path")]
        write: Option<PathBuf>,
    },
}
