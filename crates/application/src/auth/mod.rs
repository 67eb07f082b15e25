//! Authentication module for Orgsync.
//!
//! This module provides the `AuthSession`, the only owner of the bearer
//! credential: it acquires it lazily, caches it with an expiry buffer, and
//! collapses concurrent refreshes into a single token request.

mod session;

pub use session::{AuthSession, CredentialStatus, DEFAULT_REFRESH_BUFFER_SECS};
