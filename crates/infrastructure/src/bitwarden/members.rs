//! Member resource client

use async_trait::async_trait;
use orgsync_application::ports::ResourceClient;
use orgsync_application::{ClientError, ClientResult};
use orgsync_domain::{Member, Resource};

use super::ApiClient;
use super::dto::{MemberRequest, MemberResponse};

/// `ResourceClient` for `/members`.
///
/// Create always sends an empty `collections` array, whatever the record
/// holds; update sends the record's collections as-is.
#[derive(Clone)]
pub struct MemberClient {
    api: ApiClient,
}

impl MemberClient {
    /// Creates a member client on top of the shared API plumbing.
    #[must_use]
    pub const fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

fn into_member(response: MemberResponse) -> ClientResult<Member> {
    Member::try_from(response).map_err(ClientError::serialization)
}

#[async_trait]
impl ResourceClient<Member> for MemberClient {
    async fn create(&self, record: &Member) -> ClientResult<Member> {
        let response: MemberResponse = self
            .api
            .create(Member::KIND, &MemberRequest::for_create(record))
            .await?;
        into_member(response)
    }

    async fn get(&self, id: &str) -> ClientResult<Member> {
        into_member(self.api.get(Member::KIND, id).await?)
    }

    async fn update(&self, id: &str, record: &Member) -> ClientResult<Member> {
        let response: MemberResponse = self
            .api
            .update(Member::KIND, id, &MemberRequest::for_update(record))
            .await?;
        into_member(response)
    }

    async fn delete(&self, id: &str) -> ClientResult<()> {
        self.api.delete(Member::KIND, id).await
    }
}
