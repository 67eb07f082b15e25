//! Token acquisition against the identity endpoint.

mod client_credentials;

pub use client_credentials::{AuthStyle, ClientCredentialsFetcher, ORGANIZATION_SCOPE};
