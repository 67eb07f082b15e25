//! Wiring of the HTTP stack from a `ClientConfig`.

use std::sync::Arc;

use orgsync_application::ports::{CredentialProvider, ResourceClient, Transport};
use orgsync_application::{AuthSession, ReconciliationEngine};
use orgsync_domain::{Group, Member};
use secrecy::{ExposeSecret, SecretString};

use crate::adapters::{ReqwestTransport, SystemClock};
use crate::auth::ClientCredentialsFetcher;
use crate::bitwarden::{ApiClient, GroupClient, MemberClient};
use crate::settings::{ClientConfig, ConfigError};

/// One authenticated session plus the resource clients sharing it.
///
/// Cloning is cheap; clones share the credential cache.
#[derive(Clone)]
pub struct Connection {
    session: AuthSession,
    groups: Arc<GroupClient>,
    members: Arc<MemberClient>,
}

impl Connection {
    /// Builds the session, transport and clients for `config`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if the HTTP client cannot be built.
    pub fn from_config(config: &ClientConfig) -> Result<Self, ConfigError> {
        let http_client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout)
            .build()
            .map_err(|e| ConfigError::Invalid {
                field: "http_client",
                message: e.to_string(),
            })?;

        let fetcher = ClientCredentialsFetcher::new(
            http_client.clone(),
            config.auth_url.clone(),
            config.client_id.clone(),
            SecretString::from(config.client_secret.expose_secret().to_string()),
        )
        .with_auth_style(config.auth_style);
        let session = AuthSession::new(Arc::new(fetcher), Arc::new(SystemClock));

        let credentials: Arc<dyn CredentialProvider> = Arc::new(session.clone());
        let transport: Arc<dyn Transport> = Arc::new(ReqwestTransport::new(
            http_client,
            config.api_url.clone(),
            Arc::clone(&credentials),
            config.timeout,
        ));
        let api = ApiClient::new(transport, credentials)
            .with_retry_on_unauthorized(config.retry_on_unauthorized);

        Ok(Self {
            session,
            groups: Arc::new(GroupClient::new(api.clone())),
            members: Arc::new(MemberClient::new(api)),
        })
    }

    /// The shared credential cache.
    #[must_use]
    pub const fn session(&self) -> &AuthSession {
        &self.session
    }

    /// The raw group client.
    #[must_use]
    pub fn group_client(&self) -> Arc<dyn ResourceClient<Group>> {
        self.groups.clone()
    }

    /// The raw member client.
    #[must_use]
    pub fn member_client(&self) -> Arc<dyn ResourceClient<Member>> {
        self.members.clone()
    }

    /// A reconciliation engine for groups.
    #[must_use]
    pub fn groups(&self) -> ReconciliationEngine<Group> {
        ReconciliationEngine::new(self.group_client())
    }

    /// A reconciliation engine for members.
    #[must_use]
    pub fn members(&self) -> ReconciliationEngine<Member> {
        ReconciliationEngine::new(self.member_client())
    }
}
