use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use farmops_core::{BatchId, Choice, DomainResult, Entity};

use crate::mortality::{MortalityOutcome, MortalityPolicy, apply_deaths};

/// Batch lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BatchStatus {
    Active,
    Sold,
    Closed,
}

impl Choice for BatchStatus {
    const ALL: &'static [Self] = &[BatchStatus::Active, BatchStatus::Sold, BatchStatus::Closed];

    fn name(self) -> &'static str {
        match self {
            BatchStatus::Active => "Active",
            BatchStatus::Sold => "Sold",
            BatchStatus::Closed => "Closed",
        }
    }
}

/// Head count per sex segment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SexCounts {
    pub male: u64,
    pub female: u64,
    pub unsexed: u64,
}

impl SexCounts {
    pub fn new(male: u64, female: u64, unsexed: u64) -> Self {
        Self {
            male,
            female,
            unsexed,
        }
    }

    /// Head count across all segments, or `None` when it does not fit in a `u64`.
    pub fn checked_total(&self) -> Option<u64> {
        self.male.checked_add(self.female)?.checked_add(self.unsexed)
    }

    /// Saturating head count. Untrusted input goes through `checked_total`.
    pub fn total(&self) -> u64 {
        self.male.saturating_add(self.female).saturating_add(self.unsexed)
    }
}

/// Aggregate root: a sex-segmented flock.
///
/// The population is never stored; it is always the sum of the segments.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Batch {
    id: BatchId,
    name: String,
    breed: Option<String>,
    status: BatchStatus,
    counts: SexCounts,
    started_at: DateTime<Utc>,
}

impl Batch {
    pub fn new(
        id: BatchId,
        name: impl Into<String>,
        breed: Option<String>,
        counts: SexCounts,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            breed,
            status: BatchStatus::Active,
            counts,
            started_at,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn breed(&self) -> Option<&str> {
        self.breed.as_deref()
    }

    pub fn status(&self) -> BatchStatus {
        self.status
    }

    pub fn counts(&self) -> SexCounts {
        self.counts
    }

    pub fn population(&self) -> u64 {
        self.counts.total()
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn set_breed(&mut self, breed: Option<String>) {
        self.breed = breed;
    }

    pub fn switch_status(&mut self, status: BatchStatus) {
        self.status = status;
    }

    /// Remove deaths segment by segment. Each segment is handled on its own, so
    /// under `Clamp` an excess in one segment never eats into another.
    ///
    /// Nothing is mutated when any segment is rejected.
    pub fn record_deaths(&mut self, deaths: SexCounts, policy: MortalityPolicy) -> DomainResult<u64> {
        let male = apply_deaths(self.counts.male, deaths.male, policy)?;
        let female = apply_deaths(self.counts.female, deaths.female, policy)?;
        let unsexed = apply_deaths(self.counts.unsexed, deaths.unsexed, policy)?;

        self.counts = SexCounts::new(male.remaining, female.remaining, unsexed.remaining);
        Ok(absorbed(&[male, female, unsexed]))
    }
}

fn absorbed(outcomes: &[MortalityOutcome]) -> u64 {
    outcomes.iter().fold(0, |total, o| total.saturating_add(o.absorbed))
}

impl Entity for Batch {
    type Id = BatchId;

    const KIND: &'static str = "batch";

    fn id(&self) -> &BatchId {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use farmops_core::DomainError;

    fn batch_id() -> BatchId {
        "00000000-0000-0000-0000-000000000001".parse().unwrap()
    }

    fn batch(male: u64, female: u64, unsexed: u64) -> Batch {
        Batch::new(
            batch_id(),
            "Layers A",
            Some("Isa Brown".to_string()),
            SexCounts::new(male, female, unsexed),
            Utc::now(),
        )
    }

    #[test]
    fn population_is_sum_of_segments() {
        let batch = batch(3, 5, 7);
        assert_eq!(batch.population(), 15);
        assert_eq!(batch.status(), BatchStatus::Active);
    }

    #[test]
    fn deaths_reduce_each_segment() {
        let mut batch = batch(3, 5, 7);
        let absorbed = batch
            .record_deaths(SexCounts::new(1, 2, 3), MortalityPolicy::Clamp)
            .unwrap();
        assert_eq!(absorbed, 0);
        assert_eq!(batch.counts(), SexCounts::new(2, 3, 4));
        assert_eq!(batch.population(), 9);
    }

    #[test]
    fn clamped_excess_stays_in_its_segment() {
        let mut batch = batch(2, 5, 0);
        let absorbed = batch
            .record_deaths(SexCounts::new(4, 1, 0), MortalityPolicy::Clamp)
            .unwrap();
        assert_eq!(absorbed, 2);
        assert_eq!(batch.counts(), SexCounts::new(0, 4, 0));
    }

    #[test]
    fn rejected_deaths_leave_batch_untouched() {
        let mut batch = batch(2, 5, 0);
        let err = batch
            .record_deaths(SexCounts::new(1, 9, 0), MortalityPolicy::Reject)
            .unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
        assert_eq!(batch.counts(), SexCounts::new(2, 5, 0));
    }

    #[test]
    fn checked_total_reports_overflow() {
        assert_eq!(SexCounts::new(3, 5, 7).checked_total(), Some(15));
        assert_eq!(SexCounts::new(u64::MAX, 1, 0).checked_total(), None);
        assert_eq!(SexCounts::new(u64::MAX, 0, 1).total(), u64::MAX);
    }

    #[test]
    fn huge_clamped_deaths_empty_every_segment() {
        let mut batch = batch(2, 5, 1);
        let absorbed = batch
            .record_deaths(SexCounts::new(u64::MAX, u64::MAX, 0), MortalityPolicy::Clamp)
            .unwrap();
        assert_eq!(absorbed, u64::MAX);
        assert_eq!(batch.counts(), SexCounts::new(0, 0, 1));
    }

    #[test]
    fn status_parses_case_insensitively() {
        assert_eq!(BatchStatus::parse("sold"), Some(BatchStatus::Sold));
        assert_eq!(BatchStatus::parse("archived"), None);
    }
}
