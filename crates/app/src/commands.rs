//! Command execution.

use anyhow::Result;
use orgsync_application::{AuthSession, Drift, Managed, ReconciliationEngine};
use orgsync_domain::Resource;
use orgsync_infrastructure::{Connection, to_json_stable};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;

use crate::cli::{AuthCommand, Command, ResourceCommand};
use crate::state_file;

/// Runs one command against `connection`.
pub async fn run(command: Command, connection: &Connection, cancel: &CancellationToken) -> Result<()> {
    match command {
        Command::Auth(AuthCommand::Check) => check_auth(connection.session(), cancel).await,
        Command::Group(command) => run_resource(&connection.groups(), command, cancel).await,
        Command::Member(command) => run_resource(&connection.members(), command, cancel).await,
    }
}

async fn check_auth(session: &AuthSession, cancel: &CancellationToken) -> Result<()> {
    tokio::select! {
        biased;
        () = cancel.cancelled() => anyhow::bail!("cancelled"),
        credential = session.credential() => {
            credential?;
        }
    }
    println!("{}", session.status().display_message());
    Ok(())
}

async fn run_resource<R>(
    engine: &ReconciliationEngine<R>,
    command: ResourceCommand,
    cancel: &CancellationToken,
) -> Result<()>
where
    R: Resource + Serialize + DeserializeOwned,
{
    let path = command.state().state.clone();
    let mut instance: Managed<R> = state_file::load(&path)?;

    let outcome = match &command {
        ResourceCommand::Create { record, .. } => {
            let desired: R = state_file::read_record(record)?;
            engine.create(cancel, &mut instance, &desired).await.map(Some)
        }
        ResourceCommand::Get { .. } => engine.read(cancel, &mut instance).await.map(Some),
        ResourceCommand::Update { record, .. } => {
            let desired: R = state_file::read_record(record)?;
            engine.update(cancel, &mut instance, &desired).await.map(Some)
        }
        ResourceCommand::Delete { .. } => engine.delete(cancel, &mut instance).await.map(|()| None),
        ResourceCommand::Import { id, .. } => {
            engine.import(cancel, &mut instance, id).await.map(Some)
        }
        ResourceCommand::Drift { .. } => {
            let drift = engine.detect_drift(cancel, &instance).await?;
            return report_drift(&drift);
        }
    };

    // Failed reads can still move the instance (NotFound resets it).
    state_file::save(&path, &instance)?;

    match outcome? {
        Some(record) => println!("{}", to_json_stable(&record)?.trim_end()),
        None => println!("{} {}", R::KIND, instance.state()),
    }
    Ok(())
}

fn report_drift<R: Serialize>(drift: &Drift<R>) -> Result<()> {
    match drift {
        Drift::InSync => println!("in sync"),
        Drift::Gone => println!("gone"),
        Drift::Drifted { tracked, observed } => {
            println!("drifted");
            println!("tracked:\n{}", to_json_stable(tracked)?.trim_end());
            println!("observed:\n{}", to_json_stable(observed)?.trim_end());
        }
    }
    Ok(())
}
