//! Orgsync Application - Ports, auth session and reconciliation
//!
//! This crate contains the application logic that sits between the pure
//! domain types and the HTTP adapters:
//!
//! - **Ports**: interfaces the infrastructure layer implements
//!   (`Transport`, `TokenFetcher`, `ResourceClient`, `Clock`)
//! - **Auth**: the single-flight `AuthSession` credential cache
//! - **Reconcile**: the per-instance state machine and its engine

pub mod auth;
pub mod error;
pub mod ports;
pub mod reconcile;

#[cfg(test)]
mod test_support;

pub use auth::{AuthSession, CredentialStatus, DEFAULT_REFRESH_BUFFER_SECS};
pub use error::{ClientError, ClientResult, ReconcileError, ReconcileResult};
pub use reconcile::{Drift, Managed, Operation, ReconciliationEngine, SyncState};
