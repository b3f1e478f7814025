use chrono::{DateTime, Utc};
use serde::Serialize;

use farmops_core::{BroilerBatchId, DomainResult, Entity};

use crate::mortality::{MortalityOutcome, MortalityPolicy, apply_deaths};

/// Aggregate root: a broiler flock tracked by head count only.
///
/// `current_population` starts at the placed population and changes only when an
/// `Activity` is dispatched against the batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BroilerBatch {
    id: BroilerBatchId,
    name: String,
    initial_population: u64,
    current_population: u64,
    placed_at: DateTime<Utc>,
}

impl BroilerBatch {
    pub fn new(
        id: BroilerBatchId,
        name: impl Into<String>,
        initial_population: u64,
        placed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            initial_population,
            current_population: initial_population,
            placed_at,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn initial_population(&self) -> u64 {
        self.initial_population
    }

    pub fn current_population(&self) -> u64 {
        self.current_population
    }

    pub fn placed_at(&self) -> DateTime<Utc> {
        self.placed_at
    }

    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn record_mortality(&mut self, deaths: u64, policy: MortalityPolicy) -> DomainResult<MortalityOutcome> {
        let outcome = apply_deaths(self.current_population, deaths, policy)?;
        self.current_population = outcome.remaining;
        Ok(outcome)
    }
}

impl Entity for BroilerBatch {
    type Id = BroilerBatchId;

    const KIND: &'static str = "broiler_batch";

    fn id(&self) -> &BroilerBatchId {
        &self.id
    }
}
