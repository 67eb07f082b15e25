//! Command-line surface.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Reconcile Bitwarden organization groups and members.
#[derive(Debug, Parser)]
#[command(name = "orgsync", version, about)]
pub struct Cli {
    /// Config file (TOML, YAML or JSON). `BITWARDEN_*` variables override it.
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// What to do.
    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Credential diagnostics.
    #[command(subcommand)]
    Auth(AuthCommand),
    /// Manage an organization group.
    #[command(subcommand)]
    Group(ResourceCommand),
    /// Manage an organization member.
    #[command(subcommand)]
    Member(ResourceCommand),
}

/// Credential diagnostics.
#[derive(Debug, Subcommand)]
pub enum AuthCommand {
    /// Acquire an access token and print its status.
    Check,
}

/// Operations on one tracked resource instance.
///
/// The instance is persisted as JSON in the `--state` file, which is
/// created on first use.
#[derive(Debug, Subcommand)]
pub enum ResourceCommand {
    /// Create the remote record from a desired record file.
    Create {
        #[command(flatten)]
        state: StateArgs,
        /// Desired record as JSON.
        #[arg(long, value_name = "FILE")]
        record: PathBuf,
    },
    /// Refresh the tracked record from the remote copy.
    #[command(alias = "read")]
    Get {
        #[command(flatten)]
        state: StateArgs,
    },
    /// Send a desired record for the tracked id.
    Update {
        #[command(flatten)]
        state: StateArgs,
        /// Desired record as JSON.
        #[arg(long, value_name = "FILE")]
        record: PathBuf,
    },
    /// Delete the remote record.
    Delete {
        #[command(flatten)]
        state: StateArgs,
    },
    /// Start tracking an existing remote record.
    Import {
        #[command(flatten)]
        state: StateArgs,
        /// Remote identifier.
        #[arg(long)]
        id: String,
    },
    /// Compare the tracked record with the remote copy without changing either.
    Drift {
        #[command(flatten)]
        state: StateArgs,
    },
}

impl ResourceCommand {
    /// The state file this command works on.
    pub const fn state(&self) -> &StateArgs {
        match self {
            Self::Create { state, .. }
            | Self::Get { state }
            | Self::Update { state, .. }
            | Self::Delete { state }
            | Self::Import { state, .. }
            | Self::Drift { state } => state,
        }
    }
}

/// Location of a tracked instance.
#[derive(Debug, Clone, Args)]
pub struct StateArgs {
    /// JSON file holding the tracked instance.
    #[arg(long, value_name = "FILE")]
    pub state: PathBuf,
}
