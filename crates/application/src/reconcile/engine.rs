//! Reconciliation engine

use std::future::Future;
use std::sync::Arc;

use orgsync_domain::{DomainError, Resource};
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, Span, field, info, info_span, warn};

use crate::error::{ClientError, ClientResult, ReconcileError, ReconcileResult};
use crate::ports::ResourceClient;
use crate::reconcile::{Drift, Managed, Operation, SyncState};

/// Converges one resource instance at a time with its remote record.
///
/// The engine holds no per-instance state; every operation takes the
/// caller's `Managed` instance and overwrites it only after the remote
/// call completed successfully. A cancelled or failed operation leaves the
/// instance untouched, with one exception: a read that finds the record
/// gone drops tracking.
pub struct ReconciliationEngine<R: Resource> {
    client: Arc<dyn ResourceClient<R>>,
}

impl<R: Resource> Clone for ReconciliationEngine<R> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
        }
    }
}

impl<R: Resource> ReconciliationEngine<R> {
    /// Creates an engine driving the given resource client.
    #[must_use]
    pub fn new(client: Arc<dyn ResourceClient<R>>) -> Self {
        Self { client }
    }

    /// Creates the desired record remotely and starts tracking the stored
    /// copy. Server-owned fields in `desired` are ignored.
    ///
    /// # Errors
    ///
    /// - `InvalidTransition` unless the instance is `Unmanaged`
    /// - `Domain` if `desired` carries an id or fails validation
    /// - `Client` if the remote call fails; the instance stays `Unmanaged`
    /// - `Cancelled` if `cancel` fires first
    pub async fn create(
        &self,
        cancel: &CancellationToken,
        instance: &mut Managed<R>,
        desired: &R,
    ) -> ReconcileResult<R> {
        let phase = instance.state().begin(Operation::Create)?;
        if let Some(id) = desired.id() {
            return Err(DomainError::IdAlreadyAssigned {
                kind: R::KIND,
                id: id.to_string(),
            }
            .into());
        }
        desired.validate()?;

        let span = operation_span::<R>(phase, None);
        let stored = guarded(cancel, self.client.create(desired))
            .instrument(span.clone())
            .await?;
        let id = require_id(&stored)?;
        span.record("id", id);
        span.in_scope(|| info!("created"));

        instance.settle(SyncState::Synced, stored.clone());
        Ok(stored)
    }

    /// Refreshes the tracked record from the remote copy.
    ///
    /// Allowed from `Synced`, and from `Gone` to confirm the deletion.
    ///
    /// # Errors
    ///
    /// A `NotFound` client error means the remote record no longer exists;
    /// the instance is reset to `Unmanaged` so a later create can
    /// re-provision it. Other failures leave the instance untouched.
    pub async fn read(
        &self,
        cancel: &CancellationToken,
        instance: &mut Managed<R>,
    ) -> ReconcileResult<R> {
        let phase = instance.state().begin(Operation::Read)?;
        let id = tracked_id(instance, Operation::Read)?;

        let span = operation_span::<R>(phase, Some(&id));
        match guarded(cancel, self.client.get(&id))
            .instrument(span.clone())
            .await
        {
            Ok(observed) => {
                require_id(&observed)?;
                instance.settle(SyncState::Synced, observed.clone());
                Ok(observed)
            }
            Err(error) if error.is_not_found() => {
                span.in_scope(|| warn!("remote record no longer exists, dropping tracking"));
                instance.reset();
                Err(error)
            }
            Err(error) => Err(error),
        }
    }

    /// Replaces the remote record with `desired` in full.
    ///
    /// # Errors
    ///
    /// - `InvalidTransition` unless the instance is `Synced`
    /// - `Domain` if `desired` names a different id or fails validation
    /// - `Client` or `Cancelled`; the instance is left untouched
    pub async fn update(
        &self,
        cancel: &CancellationToken,
        instance: &mut Managed<R>,
        desired: &R,
    ) -> ReconcileResult<R> {
        let phase = instance.state().begin(Operation::Update)?;
        let id = tracked_id(instance, Operation::Update)?;
        if let Some(desired_id) = desired.id()
            && desired_id != id
        {
            return Err(DomainError::IdMismatch {
                kind: R::KIND,
                tracked: id,
                desired: desired_id.to_string(),
            }
            .into());
        }
        desired.validate()?;

        let span = operation_span::<R>(phase, Some(&id));
        let stored = guarded(cancel, self.client.update(&id, desired))
            .instrument(span.clone())
            .await?;
        require_id(&stored)?;
        span.in_scope(|| info!("updated"));

        instance.settle(SyncState::Synced, stored.clone());
        Ok(stored)
    }

    /// Deletes the remote record and marks the instance `Gone`.
    ///
    /// A record that is already absent counts as deleted, so repeating a
    /// delete (also from `Gone`) succeeds.
    ///
    /// # Errors
    ///
    /// `InvalidTransition` from `Unmanaged`; any client failure other than
    /// `NotFound`, or `Cancelled`, leaves the instance untouched.
    pub async fn delete(
        &self,
        cancel: &CancellationToken,
        instance: &mut Managed<R>,
    ) -> ReconcileResult<()> {
        let phase = instance.state().begin(Operation::Delete)?;
        let id = tracked_id(instance, Operation::Delete)?;

        let span = operation_span::<R>(phase, Some(&id));
        match guarded(cancel, self.client.delete(&id))
            .instrument(span.clone())
            .await
        {
            Ok(()) => span.in_scope(|| info!("deleted")),
            Err(error) if error.is_not_found() => {
                span.in_scope(|| warn!("remote record already absent, treating delete as done"));
            }
            Err(error) => return Err(error),
        }

        instance.mark_gone();
        Ok(())
    }

    /// Attaches an existing remote record to an `Unmanaged` instance
    /// without creating anything.
    ///
    /// # Errors
    ///
    /// `InvalidTransition` unless the instance is `Unmanaged`, `Domain` for
    /// a blank id, `Client` (including `NotFound`) or `Cancelled`. On
    /// failure the instance stays `Unmanaged`.
    pub async fn import(
        &self,
        cancel: &CancellationToken,
        instance: &mut Managed<R>,
        id: &str,
    ) -> ReconcileResult<R> {
        let phase = instance.state().begin(Operation::Import)?;
        if id.trim().is_empty() {
            return Err(DomainError::EmptyId { kind: R::KIND }.into());
        }

        let span = operation_span::<R>(phase, Some(id));
        let observed = guarded(cancel, self.client.get(id))
            .instrument(span.clone())
            .await?;
        require_id(&observed)?;
        span.in_scope(|| info!("imported"));

        instance.settle(SyncState::Synced, observed.clone());
        Ok(observed)
    }

    /// Compares the tracked record with the remote copy without changing
    /// the instance.
    ///
    /// # Errors
    ///
    /// `InvalidTransition` unless the instance is `Synced`; client failures
    /// other than `NotFound` (reported as `Drift::Gone`); `Cancelled`.
    pub async fn detect_drift(
        &self,
        cancel: &CancellationToken,
        instance: &Managed<R>,
    ) -> ReconcileResult<Drift<R>> {
        let tracked = match (instance.state(), instance.record()) {
            (SyncState::Synced, Some(record)) => record,
            (from, _) => {
                return Err(ReconcileError::InvalidTransition {
                    from,
                    operation: Operation::Read,
                });
            }
        };
        let id = tracked_id(instance, Operation::Read)?;

        let span = operation_span::<R>(SyncState::Synced, Some(&id));
        match guarded(cancel, self.client.get(&id))
            .instrument(span.clone())
            .await
        {
            Ok(observed) if observed == *tracked => Ok(Drift::InSync),
            Ok(observed) => {
                span.in_scope(|| warn!("remote record drifted from tracked state"));
                Ok(Drift::Drifted {
                    tracked: tracked.clone(),
                    observed,
                })
            }
            Err(error) if error.is_not_found() => {
                span.in_scope(|| warn!("remote record no longer exists"));
                Ok(Drift::Gone)
            }
            Err(error) => Err(error),
        }
    }
}

fn operation_span<R: Resource>(phase: SyncState, id: Option<&str>) -> Span {
    let span = info_span!(
        "reconcile",
        kind = R::KIND.as_str(),
        phase = phase.as_str(),
        id = field::Empty,
    );
    if let Some(id) = id {
        span.record("id", id);
    }
    span
}

/// Runs a client call unless `cancel` fires first.
async fn guarded<T>(
    cancel: &CancellationToken,
    call: impl Future<Output = ClientResult<T>>,
) -> ReconcileResult<T> {
    tokio::select! {
        biased;
        () = cancel.cancelled() => Err(ReconcileError::Cancelled),
        result = call => result.map_err(ReconcileError::from),
    }
}

fn tracked_id<R: Resource>(instance: &Managed<R>, operation: Operation) -> ReconcileResult<String> {
    instance
        .id()
        .map(str::to_string)
        .ok_or(ReconcileError::InvalidTransition {
            from: instance.state(),
            operation,
        })
}

fn require_id<R: Resource>(record: &R) -> ReconcileResult<&str> {
    record.id().ok_or_else(|| {
        ClientError::serialization(format!("{} response carried no id", R::KIND)).into()
    })
}
