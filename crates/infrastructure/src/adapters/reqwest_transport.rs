//! Transport implementation using reqwest.
//!
//! This adapter implements the `Transport` port: it resolves the API path
//! against the base URL, attaches the current bearer credential and returns
//! the response verbatim.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use orgsync_application::ports::{
    ApiPath, CredentialProvider, HttpMethod, RawResponse, Transport, TransportError,
};
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method};
use tracing::debug;
use url::Url;

/// Content type of every resource payload.
const JSON_CONTENT_TYPE: &str = "application/json";

/// Authenticated transport over a shared `reqwest::Client`.
pub struct ReqwestTransport {
    client: Client,
    base_url: Url,
    credentials: Arc<dyn CredentialProvider>,
    timeout: Duration,
}

impl ReqwestTransport {
    /// Creates a transport sending requests below `base_url`.
    #[must_use]
    pub fn new(
        client: Client,
        base_url: Url,
        credentials: Arc<dyn CredentialProvider>,
        timeout: Duration,
    ) -> Self {
        Self {
            client,
            base_url,
            credentials,
            timeout,
        }
    }

    /// Converts the port's `HttpMethod` to reqwest `Method`.
    const fn to_reqwest_method(method: HttpMethod) -> Method {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Delete => Method::DELETE,
        }
    }

    /// Appends the path segments to the base URL, percent-encoding each.
    fn url_for(&self, path: &ApiPath) -> Result<Url, TransportError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| TransportError::InvalidUrl(format!("{} cannot be a base", self.base_url)))?
            .pop_if_empty()
            .extend(path.segments());
        Ok(url)
    }

    fn timeout_ms(&self) -> u64 {
        u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX)
    }

    /// Maps reqwest errors to `TransportError`.
    fn map_error(error: &reqwest::Error, timeout_ms: u64) -> TransportError {
        let host = || {
            error
                .url()
                .and_then(Url::host_str)
                .unwrap_or("unknown")
                .to_string()
        };

        if error.is_timeout() {
            return TransportError::Timeout { timeout_ms };
        }

        if error.is_connect() {
            let message = error.to_string();
            let lower = message.to_lowercase();
            if lower.contains("dns") || lower.contains("resolve") {
                return TransportError::Dns {
                    host: host(),
                    message,
                };
            }
            if lower.contains("refused") {
                return TransportError::ConnectionRefused {
                    host: host(),
                    port: error
                        .url()
                        .and_then(Url::port_or_known_default)
                        .unwrap_or(443),
                };
            }
            return TransportError::ConnectionFailed(message);
        }

        TransportError::Other(error.to_string())
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(
        &self,
        method: HttpMethod,
        path: &ApiPath,
        body: Option<Vec<u8>>,
    ) -> Result<RawResponse, TransportError> {
        let credential = self.credentials.credential().await?;
        let url = self.url_for(path)?;
        let timeout_ms = self.timeout_ms();

        let mut builder = self
            .client
            .request(Self::to_reqwest_method(method), url)
            .timeout(self.timeout)
            .header(AUTHORIZATION, credential.authorization_header())
            .header(ACCEPT, JSON_CONTENT_TYPE);
        if let Some(body) = body {
            builder = builder.header(CONTENT_TYPE, JSON_CONTENT_TYPE).body(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| Self::map_error(&e, timeout_ms))?;
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError::Other(format!("failed to read body: {e}")))?
            .to_vec();

        debug!(%method, %path, status, "api exchange");
        Ok(RawResponse::new(status, body).with_credential(credential))
    }
}
