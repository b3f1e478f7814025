//! Deaths against a population.

use serde::{Deserialize, Serialize};

use farmops_core::{Choice, DomainError, DomainResult};

/// What to do when a mortality record reports more deaths than there are
/// animals left.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MortalityPolicy {
    /// Floor the population at zero and absorb the excess.
    #[default]
    Clamp,
    /// Refuse the record.
    Reject,
}

impl Choice for MortalityPolicy {
    const ALL: &'static [Self] = &[MortalityPolicy::Clamp, MortalityPolicy::Reject];

    fn name(self) -> &'static str {
        match self {
            MortalityPolicy::Clamp => "clamp",
            MortalityPolicy::Reject => "reject",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MortalityOutcome {
    pub remaining: u64,
    /// Deaths beyond the population (always 0 under `Reject`).
    pub absorbed: u64,
}

pub fn apply_deaths(population: u64, deaths: u64, policy: MortalityPolicy) -> DomainResult<MortalityOutcome> {
    if deaths <= population {
        return Ok(MortalityOutcome {
            remaining: population - deaths,
            absorbed: 0,
        });
    }
    match policy {
        MortalityPolicy::Clamp => Ok(MortalityOutcome {
            remaining: 0,
            absorbed: deaths - population,
        }),
        MortalityPolicy::Reject => Err(DomainError::invariant(format!(
            "{deaths} deaths exceed the current population of {population}"
        ))),
    }
}
