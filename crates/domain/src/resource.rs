//! The capability shared by every reconciled resource type.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::DomainResult;

/// The remote resource types the reconciler manages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    /// An organization group.
    Group,
    /// An organization member.
    Member,
}

impl ResourceKind {
    /// Returns the kind as a static string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Group => "group",
            Self::Member => "member",
        }
    }

    /// Returns the collection path segment for this kind (`groups`, `members`).
    #[must_use]
    pub const fn collection(self) -> &'static str {
        match self {
            Self::Group => "groups",
            Self::Member => "members",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A record that can be created, read, updated and deleted remotely.
///
/// Implementors split their fields into caller-owned ones (sent as-is on
/// create/update) and server-owned ones (assigned by the remote API and
/// never taken from a desired record).
pub trait Resource: Clone + PartialEq + fmt::Debug + Send + Sync + 'static {
    /// The resource type.
    const KIND: ResourceKind;

    /// Server-assigned identifier, `None` until the record has been created.
    fn id(&self) -> Option<&str>;

    /// Checks the caller-owned fields before the record is sent remotely.
    ///
    /// # Errors
    ///
    /// Returns a `DomainError` naming the first invalid field.
    fn validate(&self) -> DomainResult<()>;
}
