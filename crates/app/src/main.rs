//! Orgsync - Main Entry Point
//!
//! Loads configuration, wires one authenticated connection and runs a
//! single command. Ctrl-C cancels the command in flight.

mod cli;
mod commands;
mod state_file;

use std::path::Path;

use anyhow::Context;
use clap::Parser;
use orgsync_infrastructure::{ConfigLoader, Connection};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = config_loader(cli.config.as_deref())
        .load()
        .context("invalid configuration")?;
    tracing::debug!(api_url = %config.api_url, auth_url = %config.auth_url, "configuration loaded");
    let connection = Connection::from_config(&config)?;

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupted, cancelling");
            on_interrupt.cancel();
        }
    });

    commands::run(cli.command, &connection, &cancel).await
}

fn config_loader(file: Option<&Path>) -> ConfigLoader {
    let loader = ConfigLoader::new();
    match file {
        Some(path) => loader.with_file(path),
        None => loader,
    }
}
