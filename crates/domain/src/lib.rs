//! Orgsync Domain - Core business types
//!
//! This crate defines the resource model reconciled against the
//! organization-management API: groups, members, and the bearer
//! credential used to reach them. All types here are pure Rust with no
//! I/O dependencies.

pub mod auth;
pub mod error;
pub mod group;
pub mod member;
pub mod resource;

pub use auth::{AuthError, Credential, DEFAULT_TOKEN_TTL_SECS, TokenGrant};
pub use error::{DomainError, DomainResult};
pub use group::Group;
pub use member::{CollectionAccess, Member, MemberStatus, MemberType};
pub use resource::{Resource, ResourceKind};
