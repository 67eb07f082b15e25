//! Orgsync Infrastructure - Adapters and implementations
//!
//! This crate provides concrete implementations of the ports
//! defined in the application layer: the reqwest transport, the
//! client-credentials token fetcher, the group and member resource
//! clients, and configuration loading.

pub mod adapters;
pub mod auth;
pub mod bitwarden;
pub mod connection;
pub mod serialization;
pub mod settings;

pub use adapters::{ReqwestTransport, SystemClock};
pub use auth::{AuthStyle, ClientCredentialsFetcher};
pub use bitwarden::{ApiClient, GroupClient, MemberClient};
pub use connection::Connection;
pub use serialization::{SerializationError, from_json, to_json_stable};
pub use settings::{ClientConfig, ConfigError, ConfigLoader};
