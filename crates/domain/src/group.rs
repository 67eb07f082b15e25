//! Organization groups

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::resource::{Resource, ResourceKind};

/// An organization group.
///
/// `id` is server-owned; `name`, `external_id` and `access_all` are
/// caller-owned and are always sent in full.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    /// Server-assigned identifier, `None` until created.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Display name of the group.
    pub name: String,
    /// Identifier linking the group to an external directory.
    #[serde(default)]
    pub external_id: String,
    /// Whether members of the group can access every collection.
    #[serde(default)]
    pub access_all: bool,
}

impl Group {
    /// Creates a desired group record with the given name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Sets the external identifier.
    #[must_use]
    pub fn with_external_id(mut self, external_id: impl Into<String>) -> Self {
        self.external_id = external_id.into();
        self
    }

    /// Sets whether the group can access all collections.
    #[must_use]
    pub const fn with_access_all(mut self, access_all: bool) -> Self {
        self.access_all = access_all;
        self
    }
}

impl Resource for Group {
    const KIND: ResourceKind = ResourceKind::Group;

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn validate(&self) -> DomainResult<()> {
        if self.name.trim().is_empty() {
            return Err(DomainError::EmptyGroupName);
        }
        Ok(())
    }
}
