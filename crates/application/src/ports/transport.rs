//! Transport port
//!
//! A transport performs one authenticated request/response exchange. It
//! attaches the current credential and passes every response through with
//! its status untouched; interpreting statuses is the resource client's job.

use std::fmt;

use async_trait::async_trait;
use orgsync_domain::{AuthError, Credential, ResourceKind};
use thiserror::Error;

/// HTTP methods used by the resource endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    /// HTTP GET method
    Get,
    /// HTTP POST method
    Post,
    /// HTTP PUT method
    Put,
    /// HTTP DELETE method
    Delete,
}

impl HttpMethod {
    /// Returns the method as a static string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A path relative to the API base URL, kept as raw segments so that
/// identifiers are percent-encoded by the transport rather than spliced
/// into a string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiPath {
    segments: Vec<String>,
}

impl ApiPath {
    /// The collection endpoint for a resource kind, e.g. `/groups`.
    #[must_use]
    pub fn collection(kind: ResourceKind) -> Self {
        Self {
            segments: vec![kind.collection().to_string()],
        }
    }

    /// The item endpoint for a resource, e.g. `/groups/{id}`.
    #[must_use]
    pub fn item(kind: ResourceKind, id: &str) -> Self {
        Self {
            segments: vec![kind.collection().to_string(), id.to_string()],
        }
    }

    /// The raw, unescaped path segments.
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }
}

impl fmt::Display for ApiPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            write!(f, "/{segment}")?;
        }
        Ok(())
    }
}

/// A response returned verbatim by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body bytes.
    pub body: Vec<u8>,
    /// The credential the request was sent with.
    pub credential: Option<Credential>,
}

impl RawResponse {
    /// Creates a response from a status and body.
    #[must_use]
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
            credential: None,
        }
    }

    /// Records the credential the request was authorized with.
    #[must_use]
    pub fn with_credential(mut self, credential: Credential) -> Self {
        self.credential = Some(credential);
        self
    }

    /// Returns true for 2xx statuses.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// The body decoded lossily as UTF-8, for diagnostics.
    #[must_use]
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Network-level failures of a single exchange.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// No credential could be attached to the request.
    #[error("credential unavailable: {0}")]
    Auth(#[from] AuthError),

    /// The request exceeded its timeout.
    #[error("request timed out after {timeout_ms}ms")]
    Timeout {
        /// The timeout that elapsed.
        timeout_ms: u64,
    },

    /// The host name could not be resolved.
    #[error("DNS resolution failed for {host}: {message}")]
    Dns {
        /// Host being resolved.
        host: String,
        /// Resolver message.
        message: String,
    },

    /// The remote refused the connection.
    #[error("connection refused by {host}:{port}")]
    ConnectionRefused {
        /// Remote host.
        host: String,
        /// Remote port.
        port: u16,
    },

    /// Connecting failed for another reason (including TLS).
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// The request URL could not be built.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// Any other transport failure, e.g. a body that could not be read.
    #[error("transport error: {0}")]
    Other(String),
}

/// Port for sending a single authenticated request.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends `body` (if any) to `path` and returns the response verbatim.
    ///
    /// No retries happen here. A 401 from a revoked credential comes back as
    /// an ordinary response.
    ///
    /// # Errors
    ///
    /// Returns `TransportError::Auth` if no credential could be obtained and
    /// another `TransportError` variant for network-level failures.
    async fn send(
        &self,
        method: HttpMethod,
        path: &ApiPath,
        body: Option<Vec<u8>>,
    ) -> Result<RawResponse, TransportError>;
}
