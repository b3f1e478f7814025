//! Optimistic concurrency expectations.

/// Optimistic concurrency expectation for a stored row.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ExpectedVersion {
    /// Skip version checking (untracked updates).
    Any,
    /// Require the row to be at an exact version.
    Exact(u64),
}

impl ExpectedVersion {
    /// The version that was expected, when a row at `actual` breaks the expectation.
    pub fn violated_by(self, actual: u64) -> Option<u64> {
        match self {
            ExpectedVersion::Exact(expected) if expected != actual => Some(expected),
            _ => None,
        }
    }
}
