//! Subcommands and their handlers.
mod run;
mod schema;
mod validate;

pub use run::RunArgs;

use std::{path::PathBuf, process::ExitCode};

use anyhow::Result;
use clap::Subcommand;

use crate::config::CliConfig;

/// Exit code for invalid input or setup failures.
pub const EXIT_USAGE: u8 = 2;

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Submit a job, wait for it, print its logs and delete it
    ///
    /// Exit status: 0 when the job succeeded, 1 when it failed, 124 on timeout or interrupt,
    /// 3 when the cluster could not be queried.
    Run(RunArgs),
    /// Check a job file without contacting the cluster
    Validate {
        /// Path to the job file (JSON)
        job: PathBuf,
    },
    /// Print the JSON schema of job files
    Schema,
}

pub async fn handle_command(command: Commands, config: &CliConfig) -> Result<ExitCode> {
    match command {
        Commands::Run(args) => run::handle_run(args, config).await,
        Commands::Validate { job } => validate::handle_validate(&job),
        Commands::Schema => schema::handle_schema(),
    }
}
