//! Bearer credential and credential-acquisition errors.

mod types;

pub use types::*;
