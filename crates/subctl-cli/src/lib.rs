//! subctl CLI library

pub mod commands;
pub mod error;

pub use error::{render_error, Error, Result};

use clap::{Parser, Subcommand};

/// subctl - operate cross-cluster networking deployments
#[derive(Parser, Debug)]
#[command(name = "subctl")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run verifications between two clusters
    #[command(long_about = commands::verify::long_about())]
    Verify(commands::verify::VerifyArgs),
    /// Ensure the operator's service account, roles and bindings exist
    EnsureRbac(commands::rbac::EnsureRbacArgs),
}

impl Cli {
    /// Run the CLI command
    pub async fn run(self) -> Result<()> {
        match self.command {
            Commands::Verify(args) => commands::verify::run(args).await,
            Commands::EnsureRbac(args) => commands::rbac::run(args).await,
        }
    }
}
