//! JSON encoding for API payloads and persisted instance state.
//!
//! API bodies are compact; state files written by the command line use
//! 2-space indentation and a trailing newline so they diff cleanly.

mod json;

pub use json::*;
