//! Credential ports
//!
//! `TokenFetcher` performs one outbound token request; `CredentialProvider`
//! is what the transport consults before every request.

use async_trait::async_trait;
use orgsync_domain::{AuthError, Credential, TokenGrant};

/// Port for acquiring a fresh token grant from the token endpoint.
///
/// Implementations issue exactly one request per call and never cache;
/// turning the grant into a timed credential is the caller's job.
#[async_trait]
pub trait TokenFetcher: Send + Sync {
    /// Requests a new token grant.
    ///
    /// # Errors
    ///
    /// Returns `AuthError` on a non-success response, a network failure,
    /// or a malformed token payload.
    async fn fetch_token(&self) -> Result<TokenGrant, AuthError>;
}

/// Port for obtaining the credential to attach to an outgoing request.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// Returns a credential that is not expired.
    ///
    /// # Errors
    ///
    /// Returns `AuthError` if a credential could not be acquired.
    async fn credential(&self) -> Result<Credential, AuthError>;

    /// Reports that the server rejected `rejected`. If it is still the
    /// cached credential it is dropped, so the next call acquires a new one.
    fn invalidate(&self, rejected: &Credential);
}
