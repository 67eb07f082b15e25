//! Organization members

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{DomainError, DomainResult};
use crate::resource::{Resource, ResourceKind};

/// A member's role within the organization.
///
/// Wire values: Owner = 0, Admin = 1, User = 2, Manager = 3, Custom = 4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum MemberType {
    /// Full control of the organization.
    #[default]
    Owner,
    /// Administers the organization.
    Admin,
    /// Regular member.
    User,
    /// Manages assigned collections.
    Manager,
    /// Custom permission set.
    Custom,
}

impl MemberType {
    /// Returns the integer sent on the wire.
    #[must_use]
    pub const fn code(self) -> i64 {
        match self {
            Self::Owner => 0,
            Self::Admin => 1,
            Self::User => 2,
            Self::Manager => 3,
            Self::Custom => 4,
        }
    }

    /// Returns the type as a static string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::Admin => "admin",
            Self::User => "user",
            Self::Manager => "manager",
            Self::Custom => "custom",
        }
    }
}

impl TryFrom<i64> for MemberType {
    type Error = DomainError;

    fn try_from(code: i64) -> DomainResult<Self> {
        match code {
            0 => Ok(Self::Owner),
            1 => Ok(Self::Admin),
            2 => Ok(Self::User),
            3 => Ok(Self::Manager),
            4 => Ok(Self::Custom),
            other => Err(DomainError::InvalidMemberType(other)),
        }
    }
}

impl From<MemberType> for i64 {
    fn from(value: MemberType) -> Self {
        value.code()
    }
}

impl fmt::Display for MemberType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MemberType {
    type Err = DomainError;

    /// Accepts either the name (`user`) or the wire integer (`2`).
    fn from_str(s: &str) -> DomainResult<Self> {
        match s.to_lowercase().as_str() {
            "owner" => Ok(Self::Owner),
            "admin" => Ok(Self::Admin),
            "user" => Ok(Self::User),
            "manager" => Ok(Self::Manager),
            "custom" => Ok(Self::Custom),
            other => other
                .parse::<i64>()
                .map_err(|_| DomainError::UnknownMemberType(s.to_string()))
                .and_then(Self::try_from),
        }
    }
}

/// A member's enrolment status.
///
/// Wire values: Invited = 0, Accepted = 1, Confirmed = 2, Revoked = -1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum MemberStatus {
    /// Invitation sent, not yet accepted.
    #[default]
    Invited,
    /// Invitation accepted, awaiting confirmation.
    Accepted,
    /// Fully confirmed member.
    Confirmed,
    /// Access revoked.
    Revoked,
}

impl MemberStatus {
    /// Returns the integer sent on the wire.
    #[must_use]
    pub const fn code(self) -> i64 {
        match self {
            Self::Invited => 0,
            Self::Accepted => 1,
            Self::Confirmed => 2,
            Self::Revoked => -1,
        }
    }
}

impl TryFrom<i64> for MemberStatus {
    type Error = DomainError;

    fn try_from(code: i64) -> DomainResult<Self> {
        match code {
            0 => Ok(Self::Invited),
            1 => Ok(Self::Accepted),
            2 => Ok(Self::Confirmed),
            -1 => Ok(Self::Revoked),
            other => Err(DomainError::InvalidMemberStatus(other)),
        }
    }
}

impl From<MemberStatus> for i64 {
    fn from(value: MemberStatus) -> Self {
        value.code()
    }
}

/// Access granted to a member on one collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionAccess {
    /// Collection identifier.
    #[serde(rename = "id")]
    pub collection_id: String,
    /// Whether the member may only read the collection.
    #[serde(default)]
    pub read_only: bool,
}

/// An organization member.
///
/// Server-owned fields are `id`, `name` and `status`; everything else is
/// caller-owned. On create `collections` is always sent as an empty array,
/// whatever the record holds, because the endpoint does not assign
/// collections on create and rejects a null array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    /// Server-assigned identifier, `None` until created.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Role within the organization.
    #[serde(rename = "type")]
    pub member_type: MemberType,
    /// Whether the member can access every collection.
    #[serde(default)]
    pub access_all: bool,
    /// Identifier linking the member to an external directory.
    #[serde(default)]
    pub external_id: String,
    /// The member's email address.
    pub email: String,
    /// Whether the member is enrolled in account recovery.
    #[serde(default)]
    pub reset_password_enrolled: bool,
    /// Collections assigned to the member.
    #[serde(default)]
    pub collections: Vec<CollectionAccess>,
    /// Name taken from the member's account profile.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Enrolment status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<MemberStatus>,
}

impl Member {
    /// Creates a desired member record.
    #[must_use]
    pub fn new(email: impl Into<String>, member_type: MemberType) -> Self {
        Self {
            email: email.into(),
            member_type,
            ..Self::default()
        }
    }

    /// Sets whether the member can access all collections.
    #[must_use]
    pub const fn with_access_all(mut self, access_all: bool) -> Self {
        self.access_all = access_all;
        self
    }

    /// Sets the external identifier.
    #[must_use]
    pub fn with_external_id(mut self, external_id: impl Into<String>) -> Self {
        self.external_id = external_id.into();
        self
    }

    /// Sets the account-recovery enrolment flag.
    #[must_use]
    pub const fn with_reset_password_enrolled(mut self, enrolled: bool) -> Self {
        self.reset_password_enrolled = enrolled;
        self
    }
}

impl Resource for Member {
    const KIND: ResourceKind = ResourceKind::Member;

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn validate(&self) -> DomainResult<()> {
        if self.email.trim().is_empty() {
            return Err(DomainError::MissingEmail);
        }
        Ok(())
    }
}
