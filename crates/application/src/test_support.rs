//! In-memory fakes of the ports, shared by the unit tests of this crate.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use orgsync_domain::{AuthError, Group, Member, MemberStatus, Resource, TokenGrant};
use parking_lot::Mutex;
use tokio::sync::Notify;

use crate::error::{ClientError, ClientResult};
use crate::ports::{Clock, ResourceClient, TokenFetcher};

/// A clock that only moves when told to.
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new() -> Self {
        let start = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).single().unwrap();
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock();
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}

/// Token fetcher with a fixed outcome that counts its calls and can hold
/// every request until `release` is called.
pub struct ScriptedFetcher {
    calls: AtomicUsize,
    outcome: Result<u64, AuthError>,
    gate: Option<Notify>,
}

impl ScriptedFetcher {
    pub const fn succeeding(expires_in: u64) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            outcome: Ok(expires_in),
            gate: None,
        }
    }

    pub const fn failing(error: AuthError) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            outcome: Err(error),
            gate: None,
        }
    }

    pub fn gated(mut self) -> Self {
        self.gate = Some(Notify::new());
        self
    }

    pub fn release(&self) {
        if let Some(gate) = &self.gate {
            gate.notify_one();
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TokenFetcher for ScriptedFetcher {
    async fn fetch_token(&self) -> Result<TokenGrant, AuthError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.outcome.clone().map(|expires_in| TokenGrant {
            access_token: format!("token-{call}"),
            token_type: "Bearer".to_string(),
            expires_in: Some(expires_in),
        })
    }
}

/// How the fake server fills server-owned fields.
pub trait RemoteRecord: Resource {
    fn id_prefix() -> &'static str;
    fn stored(desired: &Self, id: &str, previous: Option<&Self>) -> Self;
}

impl RemoteRecord for Group {
    fn id_prefix() -> &'static str {
        "g"
    }

    fn stored(desired: &Self, id: &str, _previous: Option<&Self>) -> Self {
        Self {
            id: Some(id.to_string()),
            ..desired.clone()
        }
    }
}

impl RemoteRecord for Member {
    fn id_prefix() -> &'static str {
        "m"
    }

    fn stored(desired: &Self, id: &str, previous: Option<&Self>) -> Self {
        Self {
            id: Some(id.to_string()),
            name: Some(
                previous
                    .and_then(|p| p.name.clone())
                    .unwrap_or_default(),
            ),
            status: Some(
                previous
                    .and_then(|p| p.status)
                    .unwrap_or(MemberStatus::Invited),
            ),
            ..desired.clone()
        }
    }
}

/// A resource client backed by a hash map, mimicking the remote API.
pub struct InMemoryRemote<R> {
    records: Mutex<HashMap<String, R>>,
    next_id: AtomicUsize,
    calls: Mutex<Vec<&'static str>>,
    failure: Mutex<Option<ClientError>>,
    hang: bool,
}

impl<R: RemoteRecord> InMemoryRemote<R> {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(HashMap::new()),
            next_id: AtomicUsize::new(1),
            calls: Mutex::new(Vec::new()),
            failure: Mutex::new(None),
            hang: false,
        }
    }

    /// Every call waits forever, so only cancellation can end it.
    pub fn hanging() -> Self {
        Self {
            hang: true,
            ..Self::new()
        }
    }

    /// Seeds a record as if it had been created out of band.
    pub fn seed(&self, record: R) {
        let id = record.id().unwrap().to_string();
        self.records.lock().insert(id, record);
    }

    /// Changes a stored record behind the engine's back.
    pub fn tamper(&self, id: &str, change: impl FnOnce(&mut R)) {
        let mut records = self.records.lock();
        change(records.get_mut(id).unwrap());
    }

    pub fn remove(&self, id: &str) {
        self.records.lock().remove(id);
    }

    pub fn stored(&self, id: &str) -> Option<R> {
        self.records.lock().get(id).cloned()
    }

    pub fn fail_next(&self, error: ClientError) {
        *self.failure.lock() = Some(error);
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().clone()
    }

    async fn enter(&self, call: &'static str) -> ClientResult<()> {
        self.calls.lock().push(call);
        if self.hang {
            std::future::pending::<()>().await;
        }
        self.failure.lock().take().map_or(Ok(()), Err)
    }

    fn not_found(id: &str) -> ClientError {
        ClientError::NotFound {
            kind: R::KIND,
            id: id.to_string(),
        }
    }
}

#[async_trait]
impl<R: RemoteRecord> ResourceClient<R> for InMemoryRemote<R> {
    async fn create(&self, record: &R) -> ClientResult<R> {
        self.enter("create").await?;
        let id = format!(
            "{}-{}",
            R::id_prefix(),
            self.next_id.fetch_add(1, Ordering::SeqCst)
        );
        let stored = R::stored(record, &id, None);
        self.records.lock().insert(id, stored.clone());
        Ok(stored)
    }

    async fn get(&self, id: &str) -> ClientResult<R> {
        self.enter("get").await?;
        self.stored(id).ok_or_else(|| Self::not_found(id))
    }

    async fn update(&self, id: &str, record: &R) -> ClientResult<R> {
        self.enter("update").await?;
        let mut records = self.records.lock();
        let previous = records.get(id).ok_or_else(|| Self::not_found(id))?;
        let stored = R::stored(record, id, Some(previous));
        records.insert(id.to_string(), stored.clone());
        Ok(stored)
    }

    async fn delete(&self, id: &str) -> ClientResult<()> {
        self.enter("delete").await?;
        self.records
            .lock()
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| Self::not_found(id))
    }
}
