//! Domain error types

use thiserror::Error;

use crate::resource::ResourceKind;

/// Domain-level errors raised while validating resource records.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A member type integer outside the known value table.
    #[error("invalid member type: {0} (expected 0..=4)")]
    InvalidMemberType(i64),

    /// A member type name that is neither a known name nor an integer.
    #[error("unknown member type `{0}` (expected owner, admin, user, manager, custom or 0..=4)")]
    UnknownMemberType(String),

    /// A member status integer outside the known value table.
    #[error("invalid member status: {0} (expected -1..=2)")]
    InvalidMemberStatus(i64),

    /// Groups must carry a non-empty name.
    #[error("group name must not be empty")]
    EmptyGroupName,

    /// Members must carry an email address.
    #[error("member email must not be empty")]
    MissingEmail,

    /// An identifier argument was blank.
    #[error("{kind} id must not be empty")]
    EmptyId {
        /// Resource type the id was meant for.
        kind: ResourceKind,
    },

    /// A desired record handed to create already carries an identifier.
    #[error("{kind} already has id {id}; create expects a record without an id")]
    IdAlreadyAssigned {
        /// Resource type of the record.
        kind: ResourceKind,
        /// The identifier found on the record.
        id: String,
    },

    /// A desired record names a different identifier than the tracked one.
    #[error("{kind} id mismatch: tracking {tracked}, desired record names {desired}")]
    IdMismatch {
        /// Resource type of the record.
        kind: ResourceKind,
        /// Identifier currently tracked.
        tracked: String,
        /// Identifier carried by the desired record.
        desired: String,
    },
}

/// Result type alias for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
