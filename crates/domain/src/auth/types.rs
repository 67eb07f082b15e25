//! Bearer credential types

use chrono::{DateTime, Duration, Utc};
use std::fmt;

/// Fallback lifetime when a token response omits `expires_in`.
pub const DEFAULT_TOKEN_TTL_SECS: u64 = 3600;

/// The payload of a successful token response.
#[derive(Clone, PartialEq, Eq)]
pub struct TokenGrant {
    /// The opaque access token.
    pub access_token: String,
    /// Token type, `Bearer` in practice.
    pub token_type: String,
    /// Lifetime in seconds, if the server reported one.
    pub expires_in: Option<u64>,
}

impl TokenGrant {
    /// Turns the grant into a credential, counting its lifetime from
    /// `requested_at`.
    #[must_use]
    pub fn into_credential(self, requested_at: DateTime<Utc>) -> Credential {
        Credential::new(
            self.access_token,
            self.token_type,
            self.expires_in.unwrap_or(DEFAULT_TOKEN_TTL_SECS),
            requested_at,
        )
    }
}

impl fmt::Debug for TokenGrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenGrant")
            .field("access_token", &"[REDACTED]")
            .field("token_type", &self.token_type)
            .field("expires_in", &self.expires_in)
            .finish()
    }
}

/// A bearer credential obtained through the client-credentials grant.
///
/// The `Debug` impl redacts the access token so a credential can be logged
/// without leaking it.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    access_token: String,
    token_type: String,
    expires_at: DateTime<Utc>,
}

impl Credential {
    /// Create a credential that expires `ttl_secs` after `obtained_at`.
    #[must_use]
    pub fn new(
        access_token: impl Into<String>,
        token_type: impl Into<String>,
        ttl_secs: u64,
        obtained_at: DateTime<Utc>,
    ) -> Self {
        let ttl = i64::try_from(ttl_secs)
            .ok()
            .and_then(Duration::try_seconds)
            .unwrap_or(Duration::MAX);
        Self {
            access_token: access_token.into(),
            token_type: token_type.into(),
            expires_at: obtained_at
                .checked_add_signed(ttl)
                .unwrap_or(DateTime::<Utc>::MAX_UTC),
        }
    }

    /// The opaque access token.
    #[must_use]
    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    /// When the credential stops being accepted.
    #[must_use]
    pub const fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Check if the credential is expired or will expire within `buffer`.
    #[must_use]
    pub fn is_expired_or_expiring(&self, now: DateTime<Utc>, buffer: Duration) -> bool {
        now + buffer >= self.expires_at
    }

    /// Time until expiry in seconds; negative once expired.
    #[must_use]
    pub fn seconds_until_expiry(&self, now: DateTime<Utc>) -> i64 {
        (self.expires_at - now).num_seconds()
    }

    /// Returns the Authorization header value.
    ///
    /// The identity server answers with `token_type: "Bearer"`; any other
    /// casing is normalised so the header is always well-formed.
    #[must_use]
    pub fn authorization_header(&self) -> String {
        let scheme = if self.token_type.eq_ignore_ascii_case("bearer") {
            "Bearer"
        } else {
            self.token_type.as_str()
        };
        format!("{scheme} {}", self.access_token)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("access_token", &"[REDACTED]")
            .field("token_type", &self.token_type)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Credential acquisition errors.
///
/// `Clone` so a single token request's outcome can be handed to every caller
/// that was waiting on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// The token endpoint answered with a non-success status.
    TokenRequestFailed {
        /// HTTP status returned by the token endpoint.
        status: u16,
        /// Error description or raw body.
        message: String,
    },
    /// The token endpoint answered with a body that is not a token response.
    MalformedResponse {
        /// Error description.
        message: String,
    },
    /// Invalid client-credentials configuration.
    InvalidConfiguration {
        /// Error description.
        message: String,
    },
    /// Network error while talking to the token endpoint.
    NetworkError {
        /// Error description.
        message: String,
    },
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TokenRequestFailed { status, message } => {
                write!(f, "token request failed with status {status}: {message}")
            }
            Self::MalformedResponse { message } => {
                write!(f, "malformed token response: {message}")
            }
            Self::InvalidConfiguration { message } => {
                write!(f, "invalid client-credentials configuration: {message}")
            }
            Self::NetworkError { message } => write!(f, "network error: {message}"),
        }
    }
}

impl std::error::Error for AuthError {}
