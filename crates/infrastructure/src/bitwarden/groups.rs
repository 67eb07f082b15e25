//! Group resource client

use async_trait::async_trait;
use orgsync_application::ClientResult;
use orgsync_application::ports::ResourceClient;
use orgsync_domain::{Group, Resource};

use super::ApiClient;
use super::dto::{GroupRequest, GroupResponse};

/// `ResourceClient` for `/groups`.
#[derive(Clone)]
pub struct GroupClient {
    api: ApiClient,
}

impl GroupClient {
    /// Creates a group client on top of the shared API plumbing.
    #[must_use]
    pub const fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait]
impl ResourceClient<Group> for GroupClient {
    async fn create(&self, record: &Group) -> ClientResult<Group> {
        let response: GroupResponse = self
            .api
            .create(Group::KIND, &GroupRequest::from(record))
            .await?;
        Ok(response.into())
    }

    async fn get(&self, id: &str) -> ClientResult<Group> {
        let response: GroupResponse = self.api.get(Group::KIND, id).await?;
        Ok(response.into())
    }

    async fn update(&self, id: &str, record: &Group) -> ClientResult<Group> {
        let response: GroupResponse = self
            .api
            .update(Group::KIND, id, &GroupRequest::from(record))
            .await?;
        Ok(response.into())
    }

    async fn delete(&self, id: &str) -> ClientResult<()> {
        self.api.delete(Group::KIND, id).await
    }
}
