//! Per-instance reconciliation state

use std::fmt;

use orgsync_domain::Resource;
use serde::{Deserialize, Serialize};

use crate::error::{ReconcileError, ReconcileResult};

/// Lifecycle state of one tracked resource instance.
///
/// `Creating`, `Importing`, `Updating` and `Deleting` only exist while an
/// operation is in flight; a stored instance is always `Unmanaged`, `Synced`
/// or `Gone`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncState {
    /// Not tracking any remote record.
    #[default]
    Unmanaged,
    /// A create call is in flight.
    Creating,
    /// An import call is in flight.
    Importing,
    /// Tracking a remote record as last observed.
    Synced,
    /// An update call is in flight.
    Updating,
    /// A delete call is in flight.
    Deleting,
    /// The remote record was deleted.
    Gone,
}

impl SyncState {
    /// Returns the state as a static string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unmanaged => "unmanaged",
            Self::Creating => "creating",
            Self::Importing => "importing",
            Self::Synced => "synced",
            Self::Updating => "updating",
            Self::Deleting => "deleting",
            Self::Gone => "gone",
        }
    }

    /// Checks that `operation` may start from this state and returns the
    /// phase the instance is in while it runs.
    ///
    /// # Errors
    ///
    /// Returns `ReconcileError::InvalidTransition` for a disallowed pair.
    pub fn begin(self, operation: Operation) -> ReconcileResult<Self> {
        match (self, operation) {
            (Self::Unmanaged, Operation::Create) => Ok(Self::Creating),
            (Self::Unmanaged, Operation::Import) => Ok(Self::Importing),
            (Self::Synced, Operation::Read) => Ok(Self::Synced),
            (Self::Gone, Operation::Read) => Ok(Self::Gone),
            (Self::Synced, Operation::Update) => Ok(Self::Updating),
            (Self::Synced | Self::Gone, Operation::Delete) => Ok(Self::Deleting),
            (from, operation) => Err(ReconcileError::InvalidTransition { from, operation }),
        }
    }
}

impl fmt::Display for SyncState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The operations the engine exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Provision a new remote record.
    Create,
    /// Refresh the tracked record.
    Read,
    /// Replace the remote record.
    Update,
    /// Remove the remote record.
    Delete,
    /// Attach an existing remote record.
    Import,
}

impl Operation {
    /// Returns the operation as a static string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Read => "read",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Import => "import",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resource instance under reconciliation: its state plus the last
/// authoritative copy of the remote record.
///
/// `Gone` keeps the last record so its id can still be read or deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound(
    serialize = "R: Serialize",
    deserialize = "R: Deserialize<'de>"
))]
pub struct Managed<R> {
    state: SyncState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    record: Option<R>,
}

impl<R: Resource> Managed<R> {
    /// An instance that tracks nothing yet.
    #[must_use]
    pub const fn unmanaged() -> Self {
        Self {
            state: SyncState::Unmanaged,
            record: None,
        }
    }

    /// Restores a `Synced` instance from a record previously returned by
    /// the engine. Returns `None` if the record carries no id.
    #[must_use]
    pub fn tracking(record: R) -> Option<Self> {
        record.id()?;
        Some(Self {
            state: SyncState::Synced,
            record: Some(record),
        })
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> SyncState {
        self.state
    }

    /// Last authoritative record, if any.
    #[must_use]
    pub const fn record(&self) -> Option<&R> {
        self.record.as_ref()
    }

    /// Identifier of the tracked record.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.record.as_ref().and_then(Resource::id)
    }

    /// Drops tracking, returning the instance to `Unmanaged`.
    pub fn reset(&mut self) {
        self.state = SyncState::Unmanaged;
        self.record = None;
    }

    pub(crate) fn settle(&mut self, state: SyncState, record: R) {
        self.state = state;
        self.record = Some(record);
    }

    pub(crate) fn mark_gone(&mut self) {
        self.state = SyncState::Gone;
    }
}

impl<R: Resource> Default for Managed<R> {
    fn default() -> Self {
        Self::unmanaged()
    }
}
