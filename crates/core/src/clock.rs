//! Time and identity collaborators.
//!
//! Execute-phase code never reads the wall clock or mints UUIDs directly; it asks
//! the `Clock` and `IdGenerator` carried by its request scope.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use uuid::Uuid;

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock frozen at a single instant (tests, replays).
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

pub trait IdGenerator: Send + Sync {
    fn next_uuid(&self) -> Uuid;

    /// Generate a typed identifier.
    fn next_id<T: From<Uuid>>(&self) -> T
    where
        Self: Sized,
    {
        T::from(self.next_uuid())
    }
}

/// Time-ordered UUIDv7 identifiers.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidV7Generator;

impl IdGenerator for UuidV7Generator {
    fn next_uuid(&self) -> Uuid {
        Uuid::now_v7()
    }
}

/// Deterministic generator yielding `1, 2, 3, ...` as UUIDs.
#[derive(Debug, Default)]
pub struct SequentialIdGenerator {
    next: AtomicU64,
}

impl SequentialIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn next_uuid(&self) -> Uuid {
        let n = self.next.fetch_add(1, Ordering::Relaxed) + 1;
        Uuid::from_u128(u128::from(n))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::BatchId;

    #[test]
    fn sequential_ids_are_deterministic() {
        let ids = SequentialIdGenerator::new();
        let a: BatchId = ids.next_id();
        let b: BatchId = ids.next_id();
        assert_eq!(a.as_uuid(), &Uuid::from_u128(1));
        assert_eq!(b.as_uuid(), &Uuid::from_u128(2));
    }

    #[test]
    fn fixed_clock_never_moves() {
        let at = Utc::now();
        let clock = FixedClock(at);
        assert_eq!(clock.now(), at);
        assert_eq!(clock.now(), at);
    }
}
