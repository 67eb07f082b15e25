//! Application error types

use orgsync_domain::{AuthError, DomainError, ResourceKind};
use thiserror::Error;

use crate::ports::TransportError;
use crate::reconcile::{Operation, SyncState};

/// Errors returned by a `ResourceClient`.
#[derive(Debug, Clone, Error)]
pub enum ClientError {
    /// Credential acquisition failed; nothing was sent.
    #[error("authentication failed: {0}")]
    Auth(AuthError),

    /// Network-level failure.
    #[error("transport error: {0}")]
    Transport(TransportError),

    /// The remote rejected the request.
    #[error("API error {status}: {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body, kept for diagnostics.
        body: String,
    },

    /// The target record does not exist remotely.
    #[error("{kind} {id} not found")]
    NotFound {
        /// Resource type.
        kind: ResourceKind,
        /// Identifier that was looked up.
        id: String,
    },

    /// A payload could not be encoded, or a response had an unexpected shape.
    #[error("serialization error: {message}")]
    Serialization {
        /// Error description.
        message: String,
    },
}

impl ClientError {
    /// Creates a serialization error from anything displayable.
    pub fn serialization(message: impl ToString) -> Self {
        Self::Serialization {
            message: message.to_string(),
        }
    }
}

impl From<TransportError> for ClientError {
    fn from(error: TransportError) -> Self {
        match error {
            TransportError::Auth(auth) => Self::Auth(auth),
            other => Self::Transport(other),
        }
    }
}

impl From<AuthError> for ClientError {
    fn from(error: AuthError) -> Self {
        Self::Auth(error)
    }
}

/// Result type alias for resource client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors returned by the reconciliation engine.
#[derive(Debug, Clone, Error)]
pub enum ReconcileError {
    /// A remote call failed.
    #[error(transparent)]
    Client(#[from] ClientError),

    /// The desired record is invalid.
    #[error("invalid record: {0}")]
    Domain(#[from] DomainError),

    /// The operation is not allowed from the instance's current state.
    #[error("cannot {operation} a resource in state {from}")]
    InvalidTransition {
        /// State the instance was in.
        from: SyncState,
        /// Operation that was attempted.
        operation: Operation,
    },

    /// The caller cancelled the operation before it completed.
    #[error("operation cancelled")]
    Cancelled,
}

impl ReconcileError {
    /// Returns true when the remote record does not exist.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::Client(ClientError::NotFound { .. }))
    }

    /// Returns true for failures a caller may retry with backoff.
    ///
    /// Only network-level failures qualify; API rejections, auth failures
    /// and malformed responses are surfaced as-is.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Client(ClientError::Transport(_)))
    }
}

/// Result type alias for reconciliation operations.
pub type ReconcileResult<T> = Result<T, ReconcileError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_auth_failure_becomes_auth_error() {
        let error = ClientError::from(TransportError::Auth(AuthError::NetworkError {
            message: "refused".to_string(),
        }));
        assert!(matches!(error, ClientError::Auth(_)));

        let error = ClientError::from(TransportError::Timeout { timeout_ms: 10 });
        assert!(matches!(error, ClientError::Transport(_)));
    }

    #[test]
    fn test_classification_helpers() {
        let not_found = ReconcileError::from(ClientError::NotFound {
            kind: ResourceKind::Group,
            id: "g-1".to_string(),
        });
        assert!(not_found.is_not_found());
        assert!(!not_found.is_retryable());

        let timeout = ReconcileError::from(ClientError::Transport(TransportError::Timeout {
            timeout_ms: 10,
        }));
        assert!(timeout.is_retryable());
        assert_eq!(not_found.to_string(), "group g-1 not found");
    }
}
