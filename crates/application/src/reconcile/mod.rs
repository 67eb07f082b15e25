//! Reconciliation of declared records with remote state.
//!
//! The `ReconciliationEngine` sequences `ResourceClient` calls for one
//! resource instance at a time. The instance itself (`Managed`) is owned
//! by the caller and only changes after a complete, successful response.

mod drift;
mod engine;
mod state;

pub use drift::Drift;
pub use engine::ReconciliationEngine;
pub use state::{Managed, Operation, SyncState};
