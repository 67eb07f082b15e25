//! Single-flight credential cache.
//!
//! `AuthSession` holds at most one credential and at most one outstanding
//! token request. Callers that find no usable credential join the
//! outstanding request instead of issuing their own, and every one of them
//! receives that request's outcome, success or failure.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use futures::future::{BoxFuture, FutureExt, Shared};
use orgsync_domain::{AuthError, Credential};
use parking_lot::Mutex;
use tracing::{debug, trace, warn};

use crate::ports::{Clock, CredentialProvider, TokenFetcher};

/// Seconds before expiry at which a credential is no longer handed out.
pub const DEFAULT_REFRESH_BUFFER_SECS: i64 = 60;

type PendingFetch = Shared<BoxFuture<'static, Result<Credential, AuthError>>>;

#[derive(Default)]
struct SessionState {
    cached: Option<Cached>,
    pending: Option<PendingFetch>,
}

/// A stored credential with the refresh buffer that applies to it.
///
/// The buffer never exceeds half the credential's lifetime, so a
/// short-lived token is still handed out and reused for a while.
struct Cached {
    credential: Credential,
    buffer: Duration,
}

impl Cached {
    fn is_usable(&self, now: DateTime<Utc>) -> bool {
        !self.credential.is_expired_or_expiring(now, self.buffer)
    }
}

/// Acquires, caches and lazily refreshes the bearer credential.
///
/// Cloning is cheap; clones share the same cache.
#[derive(Clone)]
pub struct AuthSession {
    fetcher: Arc<dyn TokenFetcher>,
    clock: Arc<dyn Clock>,
    refresh_buffer: Duration,
    state: Arc<Mutex<SessionState>>,
}

impl AuthSession {
    /// Create a session with the default refresh buffer.
    #[must_use]
    pub fn new(fetcher: Arc<dyn TokenFetcher>, clock: Arc<dyn Clock>) -> Self {
        Self {
            fetcher,
            clock,
            refresh_buffer: Duration::seconds(DEFAULT_REFRESH_BUFFER_SECS),
            state: Arc::new(Mutex::new(SessionState::default())),
        }
    }

    /// Create with a custom refresh buffer.
    #[must_use]
    pub fn with_refresh_buffer(mut self, refresh_buffer: Duration) -> Self {
        self.refresh_buffer = refresh_buffer;
        self
    }

    /// Returns a credential that is valid beyond the refresh buffer.
    ///
    /// # Errors
    ///
    /// Returns the `AuthError` of the token request this call waited on.
    /// Failures are not cached; the next call issues a new request.
    pub async fn credential(&self) -> Result<Credential, AuthError> {
        let pending = {
            let mut state = self.state.lock();
            let now = self.clock.now();

            if let Some(cached) = state.cached.as_ref()
                && cached.is_usable(now)
            {
                return Ok(cached.credential.clone());
            }

            if let Some(pending) = state.pending.as_ref() {
                trace!("joining in-flight token request");
                pending.clone()
            } else {
                let pending = self.start_fetch();
                state.pending = Some(pending.clone());
                pending
            }
        };

        pending.await
    }

    /// Drops the cached credential; an in-flight request is left alone.
    pub fn invalidate(&self) {
        let mut state = self.state.lock();
        if state.cached.take().is_some() {
            debug!("cached access token invalidated");
        }
    }

    /// Drops the cached credential only if it is the one the server
    /// rejected. A credential refreshed in the meantime is kept.
    pub fn invalidate_rejected(&self, rejected: &Credential) {
        let mut state = self.state.lock();
        if state
            .cached
            .as_ref()
            .is_some_and(|cached| cached.credential.access_token() == rejected.access_token())
        {
            state.cached = None;
            debug!("rejected access token invalidated");
        } else {
            trace!("rejected access token already replaced");
        }
    }

    /// Reports the cached credential's state without refreshing it.
    #[must_use]
    pub fn status(&self) -> CredentialStatus {
        let state = self.state.lock();
        let now = self.clock.now();
        state
            .cached
            .as_ref()
            .map_or(CredentialStatus::Absent, |Cached { credential, buffer }| {
                if credential.is_expired_or_expiring(now, Duration::zero()) {
                    CredentialStatus::Expired
                } else if credential.is_expired_or_expiring(now, *buffer) {
                    CredentialStatus::Expiring {
                        seconds_remaining: credential.seconds_until_expiry(now),
                    }
                } else {
                    CredentialStatus::Valid {
                        seconds_remaining: credential.seconds_until_expiry(now),
                    }
                }
            })
    }

    /// Builds the shared token request. The future publishes its own result
    /// to the cache, so it completes the bookkeeping no matter which waiter
    /// ends up driving it.
    fn start_fetch(&self) -> PendingFetch {
        let fetcher = Arc::clone(&self.fetcher);
        let clock = Arc::clone(&self.clock);
        let state = Arc::clone(&self.state);
        let refresh_buffer = self.refresh_buffer;

        async move {
            let requested_at = clock.now();
            debug!("requesting access token");
            let result = fetcher
                .fetch_token()
                .await
                .map(|grant| grant.into_credential(requested_at));

            let mut state = state.lock();
            state.pending = None;
            match &result {
                Ok(credential) => {
                    debug!(expires_at = %credential.expires_at(), "access token acquired");
                    let lifetime = credential.expires_at() - requested_at;
                    state.cached = Some(Cached {
                        credential: credential.clone(),
                        buffer: refresh_buffer.min(lifetime / 2),
                    });
                }
                Err(error) => {
                    warn!(%error, "access token request failed");
                    state.cached = None;
                }
            }
            result
        }
        .boxed()
        .shared()
    }
}

#[async_trait]
impl CredentialProvider for AuthSession {
    async fn credential(&self) -> Result<Credential, AuthError> {
        Self::credential(self).await
    }

    fn invalidate(&self, rejected: &Credential) {
        self.invalidate_rejected(rejected);
    }
}

/// State of the cached credential, for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialStatus {
    /// No credential has been acquired yet, or the last one was dropped.
    Absent,
    /// Usable and not near expiry.
    Valid {
        /// Seconds until expiry.
        seconds_remaining: i64,
    },
    /// Still valid but inside the refresh buffer; the next request refreshes it.
    Expiring {
        /// Seconds until expiry.
        seconds_remaining: i64,
    },
    /// Past its expiry.
    Expired,
}

impl CredentialStatus {
    /// Returns true if the credential can still be sent.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        matches!(self, Self::Valid { .. } | Self::Expiring { .. })
    }

    /// Get a user-friendly display message.
    #[must_use]
    pub fn display_message(&self) -> String {
        match self {
            Self::Absent => "No access token".to_string(),
            Self::Valid { seconds_remaining } => {
                if *seconds_remaining > 3600 {
                    format!("Valid for {} hours", seconds_remaining / 3600)
                } else if *seconds_remaining > 60 {
                    format!("Valid for {} minutes", seconds_remaining / 60)
                } else {
                    format!("Valid for {seconds_remaining} seconds")
                }
            }
            Self::Expiring { seconds_remaining } => {
                format!("Expiring in {seconds_remaining} seconds (refreshes on next request)")
            }
            Self::Expired => "Expired".to_string(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::test_support::{ManualClock, ScriptedFetcher};
    use futures::future::join_all;
    use pretty_assertions::assert_eq;

    fn session(fetcher: &Arc<ScriptedFetcher>, clock: &Arc<ManualClock>) -> AuthSession {
        AuthSession::new(fetcher.clone(), clock.clone())
    }

    #[tokio::test]
    async fn test_first_call_fetches_then_caches() {
        let fetcher = Arc::new(ScriptedFetcher::succeeding(3600));
        let clock = Arc::new(ManualClock::new());
        let session = session(&fetcher, &clock);

        let first = session.credential().await.unwrap();
        let second = session.credential().await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first.access_token(), "token-1");
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn test_refreshes_inside_buffer() {
        let fetcher = Arc::new(ScriptedFetcher::succeeding(3600));
        let clock = Arc::new(ManualClock::new());
        let session = session(&fetcher, &clock);

        session.credential().await.unwrap();
        clock.advance(Duration::seconds(3600 - DEFAULT_REFRESH_BUFFER_SECS - 1));
        assert_eq!(session.credential().await.unwrap().access_token(), "token-1");

        clock.advance(Duration::seconds(1));
        assert!(matches!(session.status(), CredentialStatus::Expiring { .. }));
        assert_eq!(session.credential().await.unwrap().access_token(), "token-2");
        assert_eq!(fetcher.calls(), 2);
    }

    #[tokio::test]
    async fn test_concurrent_callers_share_one_request() {
        let fetcher = Arc::new(ScriptedFetcher::succeeding(3600).gated());
        let clock = Arc::new(ManualClock::new());
        let session = session(&fetcher, &clock);

        let callers = join_all((0..8).map(|_| session.credential()));
        let release = async {
            while fetcher.calls() == 0 {
                tokio::task::yield_now().await;
            }
            fetcher.release();
        };
        let (results, ()) = tokio::join!(callers, release);

        assert_eq!(fetcher.calls(), 1);
        let first = results[0].clone().unwrap();
        for result in results {
            assert_eq!(result.unwrap(), first);
        }
    }

    #[tokio::test]
    async fn test_concurrent_callers_share_one_failure() {
        let error = AuthError::TokenRequestFailed {
            status: 400,
            message: "invalid_client".to_string(),
        };
        let fetcher = Arc::new(ScriptedFetcher::failing(error.clone()).gated());
        let clock = Arc::new(ManualClock::new());
        let session = session(&fetcher, &clock);

        let callers = join_all((0..5).map(|_| session.credential()));
        let release = async {
            while fetcher.calls() == 0 {
                tokio::task::yield_now().await;
            }
            fetcher.release();
        };
        let (results, ()) = tokio::join!(callers, release);

        assert_eq!(fetcher.calls(), 1);
        for result in results {
            assert_eq!(result, Err(error.clone()));
        }
        assert_eq!(session.status(), CredentialStatus::Absent);

        // failures are not cached
        fetcher.release();
        assert!(session.credential().await.is_err());
        assert_eq!(fetcher.calls(), 2);
    }

    #[tokio::test]
    async fn test_abandoned_request_is_joined_by_next_caller() {
        let fetcher = Arc::new(ScriptedFetcher::succeeding(3600).gated());
        let clock = Arc::new(ManualClock::new());
        let session = session(&fetcher, &clock);

        {
            let first = session.credential();
            tokio::pin!(first);
            assert!(futures::poll!(first.as_mut()).is_pending());
        }

        fetcher.release();
        let credential = session.credential().await.unwrap();
        assert_eq!(credential.access_token(), "token-1");
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn test_invalidate_forces_new_request() {
        let fetcher = Arc::new(ScriptedFetcher::succeeding(3600));
        let clock = Arc::new(ManualClock::new());
        let session = session(&fetcher, &clock);

        session.credential().await.unwrap();
        session.invalidate();
        assert_eq!(session.status(), CredentialStatus::Absent);

        assert_eq!(session.credential().await.unwrap().access_token(), "token-2");
    }

    #[tokio::test]
    async fn test_short_lived_token_is_reused() {
        let fetcher = Arc::new(ScriptedFetcher::succeeding(30));
        let clock = Arc::new(ManualClock::new());
        let session = session(&fetcher, &clock);

        for _ in 0..5 {
            assert_eq!(session.credential().await.unwrap().access_token(), "token-1");
        }
        assert_eq!(fetcher.calls(), 1);
        assert_eq!(
            session.status(),
            CredentialStatus::Valid {
                seconds_remaining: 30
            }
        );

        // half the lifetime is the effective buffer
        clock.advance(Duration::seconds(14));
        assert_eq!(session.credential().await.unwrap().access_token(), "token-1");
        clock.advance(Duration::seconds(1));
        assert!(matches!(session.status(), CredentialStatus::Expiring { .. }));
        assert_eq!(session.credential().await.unwrap().access_token(), "token-2");
        assert_eq!(fetcher.calls(), 2);
    }

    #[tokio::test]
    async fn test_token_lasting_exactly_the_buffer_is_usable() {
        let fetcher = Arc::new(ScriptedFetcher::succeeding(60));
        let clock = Arc::new(ManualClock::new());
        let session = session(&fetcher, &clock);

        let credential = session.credential().await.unwrap();
        assert!(session.status().is_valid());
        clock.advance(Duration::seconds(29));
        assert_eq!(session.credential().await.unwrap(), credential);
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn test_custom_refresh_buffer() {
        let fetcher = Arc::new(ScriptedFetcher::succeeding(3600));
        let clock = Arc::new(ManualClock::new());
        let session = session(&fetcher, &clock).with_refresh_buffer(Duration::seconds(300));

        session.credential().await.unwrap();
        clock.advance(Duration::seconds(3299));
        assert_eq!(session.credential().await.unwrap().access_token(), "token-1");
        clock.advance(Duration::seconds(1));
        assert_eq!(session.credential().await.unwrap().access_token(), "token-2");
    }

    #[tokio::test]
    async fn test_late_rejection_keeps_refreshed_token() {
        let fetcher = Arc::new(ScriptedFetcher::succeeding(3600));
        let clock = Arc::new(ManualClock::new());
        let session = session(&fetcher, &clock);

        let stale = session.credential().await.unwrap();
        session.invalidate_rejected(&stale);
        let fresh = session.credential().await.unwrap();
        assert_eq!(fresh.access_token(), "token-2");

        // a slow request still holding the old token comes back with a 401
        session.invalidate_rejected(&stale);
        assert_eq!(session.credential().await.unwrap(), fresh);
        assert_eq!(fetcher.calls(), 2);

        CredentialProvider::invalidate(&session, &fresh);
        assert_eq!(session.status(), CredentialStatus::Absent);
    }

    #[tokio::test]
    async fn test_status_transitions() {
        let fetcher = Arc::new(ScriptedFetcher::succeeding(7200));
        let clock = Arc::new(ManualClock::new());
        let session = session(&fetcher, &clock);

        assert_eq!(session.status(), CredentialStatus::Absent);
        session.credential().await.unwrap();
        assert_eq!(
            session.status(),
            CredentialStatus::Valid {
                seconds_remaining: 7200
            }
        );
        assert!(session.status().display_message().contains("hours"));

        clock.advance(Duration::seconds(7200));
        assert_eq!(session.status(), CredentialStatus::Expired);
        assert!(!session.status().is_valid());
    }
}
