//! Tracked instances and desired records on disk.

use std::io::ErrorKind;
use std::path::Path;

use anyhow::{Context, Result};
use orgsync_application::Managed;
use orgsync_domain::Resource;
use orgsync_infrastructure::{from_json, to_json_stable};
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Loads a tracked instance. A missing file is an unmanaged instance.
pub fn load<R>(path: &Path) -> Result<Managed<R>>
where
    R: Resource + DeserializeOwned,
{
    match std::fs::read_to_string(path) {
        Ok(json) => from_json(&json)
            .with_context(|| format!("invalid state file {}", path.display())),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(Managed::unmanaged()),
        Err(e) => Err(e).with_context(|| format!("failed to read {}", path.display())),
    }
}

/// Writes a tracked instance, replacing the file.
pub fn save<R>(path: &Path, instance: &Managed<R>) -> Result<()>
where
    R: Resource + Serialize,
{
    let json = to_json_stable(instance)?;
    std::fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))
}

/// Reads a desired record.
pub fn read_record<R>(path: &Path) -> Result<R>
where
    R: DeserializeOwned,
{
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    from_json(&json).with_context(|| format!("invalid record in {}", path.display()))
}
