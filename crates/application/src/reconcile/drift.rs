//! Drift report

/// Outcome of comparing a tracked record with the remote copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Drift<R> {
    /// The remote copy equals the tracked record.
    InSync,
    /// The remote copy changed outside this engine.
    Drifted {
        /// Record as last tracked.
        tracked: R,
        /// Record as currently stored remotely.
        observed: R,
    },
    /// The remote record no longer exists.
    Gone,
}

impl<R> Drift<R> {
    /// Returns true unless the remote copy matches.
    #[must_use]
    pub const fn has_drifted(&self) -> bool {
        !matches!(self, Self::InSync)
    }
}
