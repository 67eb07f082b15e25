//! `OAuth2` client-credentials token fetcher.
//!
//! Performs one token request per call against the identity endpoint. Caching
//! and single-flight are the `AuthSession`'s job.

use async_trait::async_trait;
use orgsync_application::ports::TokenFetcher;
use orgsync_domain::{AuthError, TokenGrant};
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::debug;
use url::Url;

/// Content-Type for form-urlencoded data.
const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Scope granting access to the organization API.
pub const ORGANIZATION_SCOPE: &str = "api.organization";

/// Token response from the token endpoint.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    token_type: Option<String>,
    #[serde(default)]
    expires_in: Option<u64>,
}

/// `OAuth2` error response.
#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

/// Where the client id and secret travel in the token request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthStyle {
    /// As `client_id` / `client_secret` form parameters.
    #[default]
    InParams,
    /// As an HTTP Basic `Authorization` header.
    BasicHeader,
}

/// Fetches bearer tokens with the client-credentials grant.
pub struct ClientCredentialsFetcher {
    http_client: reqwest::Client,
    token_url: Url,
    client_id: String,
    client_secret: SecretString,
    scope: String,
    auth_style: AuthStyle,
}

impl ClientCredentialsFetcher {
    /// Create a fetcher for the organization scope, sending credentials as
    /// form parameters.
    #[must_use]
    pub fn new(
        http_client: reqwest::Client,
        token_url: Url,
        client_id: impl Into<String>,
        client_secret: SecretString,
    ) -> Self {
        Self {
            http_client,
            token_url,
            client_id: client_id.into(),
            client_secret,
            scope: ORGANIZATION_SCOPE.to_string(),
            auth_style: AuthStyle::default(),
        }
    }

    /// Set the requested scope.
    #[must_use]
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = scope.into();
        self
    }

    /// Set how client credentials are sent.
    #[must_use]
    pub const fn with_auth_style(mut self, auth_style: AuthStyle) -> Self {
        self.auth_style = auth_style;
        self
    }

    /// Encodes the form body for the configured auth style.
    fn form_body(&self) -> Result<String, AuthError> {
        let mut params = vec![
            ("grant_type", "client_credentials"),
            ("scope", self.scope.as_str()),
        ];
        if self.auth_style == AuthStyle::InParams {
            params.push(("client_id", self.client_id.as_str()));
            params.push(("client_secret", self.client_secret.expose_secret()));
        }

        serde_urlencoded::to_string(&params).map_err(|e| AuthError::InvalidConfiguration {
            message: format!("failed to encode token request: {e}"),
        })
    }

    /// Basic auth header value (base64 of `id:secret`).
    fn basic_header(&self) -> String {
        use base64::Engine;
        let credentials = format!("{}:{}", self.client_id, self.client_secret.expose_secret());
        let encoded = base64::engine::general_purpose::STANDARD.encode(credentials.as_bytes());
        format!("Basic {encoded}")
    }

    fn rejection(status: u16, body: &str) -> AuthError {
        let message = serde_json::from_str::<TokenErrorResponse>(body).map_or_else(
            |_| body.to_string(),
            |error| error.error_description.unwrap_or(error.error),
        );
        AuthError::TokenRequestFailed { status, message }
    }
}

#[async_trait]
impl TokenFetcher for ClientCredentialsFetcher {
    async fn fetch_token(&self) -> Result<TokenGrant, AuthError> {
        let mut builder = self
            .http_client
            .post(self.token_url.clone())
            .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
            .header(ACCEPT, "application/json")
            .body(self.form_body()?);
        if self.auth_style == AuthStyle::BasicHeader {
            builder = builder.header(AUTHORIZATION, self.basic_header());
        }

        let response = builder
            .send()
            .await
            .map_err(|e: reqwest::Error| AuthError::NetworkError {
                message: e.to_string(),
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e: reqwest::Error| AuthError::NetworkError {
                message: format!("failed to read token response: {e}"),
            })?;
        debug!(status = status.as_u16(), "token endpoint responded");

        if !status.is_success() {
            return Err(Self::rejection(status.as_u16(), &body));
        }

        let token: TokenResponse =
            serde_json::from_str(&body).map_err(|e| AuthError::MalformedResponse {
                message: e.to_string(),
            })?;
        if token.access_token.is_empty() {
            return Err(AuthError::MalformedResponse {
                message: "empty access_token".to_string(),
            });
        }
        if token.expires_in == Some(0) {
            return Err(AuthError::MalformedResponse {
                message: "expires_in must be positive".to_string(),
            });
        }

        Ok(TokenGrant {
            access_token: token.access_token,
            token_type: token
                .token_type
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| "Bearer".to_string()),
            expires_in: token.expires_in,
        })
    }
}
