//! Organization API resource clients.
//!
//! `ApiClient` owns the request/response plumbing shared by the group and
//! member clients: JSON encoding, status classification and the single
//! retry after a rejected credential.

mod dto;
mod groups;
mod members;

use std::sync::Arc;

use orgsync_application::ports::{ApiPath, CredentialProvider, HttpMethod, RawResponse, Transport};
use orgsync_application::{ClientError, ClientResult};
use orgsync_domain::ResourceKind;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::serialization::{from_json_bytes, to_json_body};

pub use groups::GroupClient;
pub use members::MemberClient;

/// HTTP status the API answers when the bearer credential is rejected.
const UNAUTHORIZED: u16 = 401;
const NOT_FOUND: u16 = 404;

/// Shared request plumbing for the resource clients.
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    credentials: Arc<dyn CredentialProvider>,
    retry_on_unauthorized: bool,
}

impl ApiClient {
    /// Creates a client that retries once after a 401.
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>, credentials: Arc<dyn CredentialProvider>) -> Self {
        Self {
            transport,
            credentials,
            retry_on_unauthorized: true,
        }
    }

    /// Enables or disables the forced refresh and retry after a 401.
    #[must_use]
    pub const fn with_retry_on_unauthorized(mut self, retry: bool) -> Self {
        self.retry_on_unauthorized = retry;
        self
    }

    pub(crate) async fn create<Req, Resp>(&self, kind: ResourceKind, body: &Req) -> ClientResult<Resp>
    where
        Req: Serialize + Sync,
        Resp: DeserializeOwned,
    {
        let path = ApiPath::collection(kind);
        let response = self
            .exchange(HttpMethod::Post, &path, Some(to_json_body(body)?))
            .await?;
        decode(classify(response, kind, None)?)
    }

    pub(crate) async fn get<Resp>(&self, kind: ResourceKind, id: &str) -> ClientResult<Resp>
    where
        Resp: DeserializeOwned,
    {
        let path = ApiPath::item(kind, id);
        let response = self.exchange(HttpMethod::Get, &path, None).await?;
        decode(classify(response, kind, Some(id))?)
    }

    pub(crate) async fn update<Req, Resp>(
        &self,
        kind: ResourceKind,
        id: &str,
        body: &Req,
    ) -> ClientResult<Resp>
    where
        Req: Serialize + Sync,
        Resp: DeserializeOwned,
    {
        let path = ApiPath::item(kind, id);
        let response = self
            .exchange(HttpMethod::Put, &path, Some(to_json_body(body)?))
            .await?;
        decode(classify(response, kind, Some(id))?)
    }

    pub(crate) async fn delete(&self, kind: ResourceKind, id: &str) -> ClientResult<()> {
        let path = ApiPath::item(kind, id);
        let response = self.exchange(HttpMethod::Delete, &path, None).await?;
        classify(response, kind, Some(id)).map(|_| ())
    }

    /// Sends the request; on a 401 drops the cached credential and sends it
    /// once more with a fresh one.
    async fn exchange(
        &self,
        method: HttpMethod,
        path: &ApiPath,
        body: Option<Vec<u8>>,
    ) -> ClientResult<RawResponse> {
        if !self.retry_on_unauthorized {
            return Ok(self.transport.send(method, path, body).await?);
        }

        let response = self.transport.send(method, path, body.clone()).await?;
        if response.status != UNAUTHORIZED {
            return Ok(response);
        }

        warn!(%method, %path, "credential rejected, retrying with a fresh token");
        if let Some(rejected) = &response.credential {
            self.credentials.invalidate(rejected);
        }
        Ok(self.transport.send(method, path, body).await?)
    }
}

/// Maps a raw response to success, `NotFound` (404 on an item path) or `Api`.
fn classify(response: RawResponse, kind: ResourceKind, id: Option<&str>) -> ClientResult<RawResponse> {
    if response.is_success() {
        return Ok(response);
    }
    match id {
        Some(id) if response.status == NOT_FOUND => Err(ClientError::NotFound {
            kind,
            id: id.to_string(),
        }),
        _ => Err(ClientError::Api {
            status: response.status,
            body: response.body_text(),
        }),
    }
}

fn decode<T: DeserializeOwned>(response: RawResponse) -> ClientResult<T> {
    Ok(from_json_bytes(&response.body)?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use orgsync_application::ports::TransportError;
    use orgsync_domain::{AuthError, Credential};
    use std::collections::VecDeque;
    use std::sync::Mutex;

    fn credential(token: &str) -> Credential {
        let issued = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        Credential::new(token, "Bearer", 3600, issued)
    }

    /// Answers with the queued responses in order.
    struct QueuedTransport(Mutex<VecDeque<RawResponse>>);

    #[async_trait]
    impl Transport for QueuedTransport {
        async fn send(
            &self,
            _method: HttpMethod,
            _path: &ApiPath,
            _body: Option<Vec<u8>>,
        ) -> Result<RawResponse, TransportError> {
            self.0
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| TransportError::Other("no response queued".to_string()))
        }
    }

    /// Records which tokens were reported as rejected.
    #[derive(Default)]
    struct RecordingProvider(Mutex<Vec<String>>);

    #[async_trait]
    impl CredentialProvider for RecordingProvider {
        async fn credential(&self) -> Result<Credential, AuthError> {
            Ok(credential("unused"))
        }

        fn invalidate(&self, rejected: &Credential) {
            self.0.lock().unwrap().push(rejected.access_token().to_string());
        }
    }

    fn client(responses: Vec<RawResponse>) -> (ApiClient, Arc<RecordingProvider>) {
        let provider = Arc::new(RecordingProvider::default());
        let transport = Arc::new(QueuedTransport(Mutex::new(responses.into())));
        (ApiClient::new(transport, provider.clone()), provider)
    }

    #[tokio::test]
    async fn test_unauthorized_reports_the_rejected_token() {
        let (api, provider) = client(vec![
            RawResponse::new(401, Vec::new()).with_credential(credential("stale")),
            RawResponse::new(200, br#"{"id":"g-1"}"#.to_vec()).with_credential(credential("fresh")),
        ]);

        let body: serde_json::Value = api.get(ResourceKind::Group, "g-1").await.unwrap();

        assert_eq!(body["id"], "g-1");
        assert_eq!(*provider.0.lock().unwrap(), vec!["stale".to_string()]);
    }

    #[tokio::test]
    async fn test_unauthorized_without_retry_invalidates_nothing() {
        let (api, provider) =
            client(vec![RawResponse::new(401, Vec::new()).with_credential(credential("stale"))]);
        let api = api.with_retry_on_unauthorized(false);

        let result: ClientResult<serde_json::Value> = api.get(ResourceKind::Group, "g-1").await;

        assert!(matches!(result, Err(ClientError::Api { status: 401, .. })));
        assert!(provider.0.lock().unwrap().is_empty());
    }

    #[test]
    fn test_classify_statuses() {
        let ok = classify(RawResponse::new(200, b"{}".to_vec()), ResourceKind::Group, Some("g-1"));
        assert!(ok.is_ok());

        let missing = classify(RawResponse::new(404, Vec::new()), ResourceKind::Group, Some("g-1"));
        assert!(matches!(missing, Err(ClientError::NotFound { ref id, .. }) if id == "g-1"));

        let collection_404 = classify(RawResponse::new(404, Vec::new()), ResourceKind::Group, None);
        assert!(matches!(collection_404, Err(ClientError::Api { status: 404, .. })));

        let rejected = classify(
            RawResponse::new(400, br#"{"message":"invalid"}"#.to_vec()),
            ResourceKind::Member,
            None,
        );
        match rejected {
            Err(ClientError::Api { status, body }) => {
                assert_eq!(status, 400);
                assert_eq!(body, r#"{"message":"invalid"}"#);
            }
            other => panic!("expected API error, got {other:?}"),
        }
    }
}
