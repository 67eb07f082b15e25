//! Resource client port

use async_trait::async_trait;
use orgsync_domain::Resource;

use crate::error::ClientResult;

/// Maps the logical operations on one resource type to remote calls.
///
/// One implementation exists per resource type; the reconciliation engine
/// only ever talks to this trait.
#[async_trait]
pub trait ResourceClient<R: Resource>: Send + Sync {
    /// Creates the record remotely and returns the stored copy.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Api`, `ClientError::Transport`,
    /// `ClientError::Auth` or `ClientError::Serialization`.
    async fn create(&self, record: &R) -> ClientResult<R>;

    /// Fetches the stored record.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::NotFound` when the remote answers 404, otherwise
    /// the same set as `create`.
    async fn get(&self, id: &str) -> ClientResult<R>;

    /// Replaces the stored record and returns the stored copy.
    ///
    /// # Errors
    ///
    /// Same set as `get`.
    async fn update(&self, id: &str, record: &R) -> ClientResult<R>;

    /// Deletes the stored record.
    ///
    /// # Errors
    ///
    /// Same set as `get`.
    async fn delete(&self, id: &str) -> ClientResult<()>;
}
