//! Port definitions (interfaces)
//!
//! Ports define the boundaries between the application core and external systems.
//! Each port is a trait that can be implemented by adapters in the infrastructure layer.

mod clock;
mod credentials;
mod resource_client;
mod transport;

pub use clock::Clock;
pub use credentials::{CredentialProvider, TokenFetcher};
pub use resource_client::ResourceClient;
pub use transport::{ApiPath, HttpMethod, RawResponse, Transport, TransportError};
