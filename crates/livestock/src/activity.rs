//! Activity records and their side effects.
//!
//! Two logs exist:
//! - `BatchActivity`: a closed sum type of everything that can happen to a
//!   `Batch`, applied with an exhaustive match.
//! - `Activity`: the generic operations log of a `BroilerBatch`, whose
//!   `ActivityType` selects a dispatcher in the application layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use farmops_core::{
    ActivityId, BatchActivityId, BatchId, BroilerBatchId, Choice, DomainError, DomainResult, Entity,
    ProductId,
};

use crate::batch::{Batch, BatchStatus, SexCounts};
use crate::mortality::MortalityPolicy;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BatchActivityKind {
    Mortality(SexCounts),
    StatusSwitch {
        status: BatchStatus,
    },
    ProductConsumption {
        product_id: ProductId,
        quantity: f64,
    },
    WeightMeasurement {
        average_weight_grams: f64,
        sample_size: u64,
    },
}

impl BatchActivityKind {
    pub fn name(&self) -> &'static str {
        match self {
            BatchActivityKind::Mortality(_) => "mortality",
            BatchActivityKind::StatusSwitch { .. } => "status_switch",
            BatchActivityKind::ProductConsumption { .. } => "product_consumption",
            BatchActivityKind::WeightMeasurement { .. } => "weight_measurement",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchActivity {
    id: BatchActivityId,
    batch_id: BatchId,
    recorded_at: DateTime<Utc>,
    kind: BatchActivityKind,
}

impl BatchActivity {
    pub fn new(
        id: BatchActivityId,
        batch_id: BatchId,
        recorded_at: DateTime<Utc>,
        kind: BatchActivityKind,
    ) -> Self {
        Self {
            id,
            batch_id,
            recorded_at,
            kind,
        }
    }

    pub fn batch_id(&self) -> BatchId {
        self.batch_id
    }

    pub fn recorded_at(&self) -> DateTime<Utc> {
        self.recorded_at
    }

    pub fn kind(&self) -> &BatchActivityKind {
        &self.kind
    }

    /// Apply the batch-side effect of this activity.
    ///
    /// Product consumption changes the consumed product, not the batch, so it is a
    /// no-op here; weight measurements are history only.
    ///
    /// Returns the deaths absorbed by a clamp (0 for every other kind).
    pub fn apply_to(&self, batch: &mut Batch, policy: MortalityPolicy) -> DomainResult<u64> {
        if batch.id() != &self.batch_id {
            return Err(DomainError::invariant("batch_id mismatch"));
        }
        match &self.kind {
            BatchActivityKind::Mortality(deaths) => return batch.record_deaths(*deaths, policy),
            BatchActivityKind::StatusSwitch { status } => batch.switch_status(*status),
            BatchActivityKind::ProductConsumption { .. } => {}
            BatchActivityKind::WeightMeasurement { .. } => {}
        }
        Ok(0)
    }
}

impl Entity for BatchActivity {
    type Id = BatchActivityId;

    const KIND: &'static str = "batch_activity";

    fn id(&self) -> &BatchActivityId {
        &self.id
    }
}

/// Discriminant of a broiler `Activity`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActivityType {
    Mortality,
    WeightMeasurement,
}

impl Choice for ActivityType {
    const ALL: &'static [Self] = &[ActivityType::Mortality, ActivityType::WeightMeasurement];

    fn name(self) -> &'static str {
        match self {
            ActivityType::Mortality => "Mortality",
            ActivityType::WeightMeasurement => "WeightMeasurement",
        }
    }
}

/// One entry in a broiler batch's operations log.
///
/// `value` is interpreted by type: a head count for mortality, grams for a
/// weight measurement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Activity {
    id: ActivityId,
    broiler_batch_id: BroilerBatchId,
    activity_type: ActivityType,
    value: f64,
    notes: Option<String>,
    recorded_at: DateTime<Utc>,
}

impl Activity {
    pub fn new(
        id: ActivityId,
        broiler_batch_id: BroilerBatchId,
        activity_type: ActivityType,
        value: f64,
        notes: Option<String>,
        recorded_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            broiler_batch_id,
            activity_type,
            value,
            notes,
            recorded_at,
        }
    }

    pub fn broiler_batch_id(&self) -> BroilerBatchId {
        self.broiler_batch_id
    }

    pub fn activity_type(&self) -> ActivityType {
        self.activity_type
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    pub fn recorded_at(&self) -> DateTime<Utc> {
        self.recorded_at
    }

    /// The value as a head count. Validation guarantees mortality values are
    /// whole and non-negative.
    pub fn head_count(&self) -> u64 {
        self.value.max(0.0).round() as u64
    }
}

impl Entity for Activity {
    type Id = ActivityId;

    const KIND: &'static str = "activity";

    fn id(&self) -> &ActivityId {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batch() -> Batch {
        Batch::new(
            "00000000-0000-0000-0000-000000000001".parse().unwrap(),
            "Layers A",
            None,
            SexCounts::new(10, 10, 0),
            Utc::now(),
        )
    }

    fn activity(batch: &Batch, kind: BatchActivityKind) -> BatchActivity {
        BatchActivity::new(
            "00000000-0000-0000-0000-0000000000a1".parse().unwrap(),
            *batch.id(),
            Utc::now(),
            kind,
        )
    }

    #[test]
    fn mortality_reduces_population() {
        let mut batch = batch();
        let activity = activity(&batch, BatchActivityKind::Mortality(SexCounts::new(2, 1, 0)));
        let absorbed = activity.apply_to(&mut batch, MortalityPolicy::Clamp).unwrap();
        assert_eq!(absorbed, 0);
        assert_eq!(batch.population(), 17);
    }

    #[test]
    fn status_switch_sets_status() {
        let mut batch = batch();
        let activity = activity(
            &batch,
            BatchActivityKind::StatusSwitch {
                status: BatchStatus::Sold,
            },
        );
        activity.apply_to(&mut batch, MortalityPolicy::Clamp).unwrap();
        assert_eq!(batch.status(), BatchStatus::Sold);
    }

    #[test]
    fn weight_measurement_changes_nothing() {
        let mut batch = batch();
        let before = batch.clone();
        let activity = activity(
            &batch,
            BatchActivityKind::WeightMeasurement {
                average_weight_grams: 1850.0,
                sample_size: 20,
            },
        );
        activity.apply_to(&mut batch, MortalityPolicy::Clamp).unwrap();
        assert_eq!(batch, before);
    }

    #[test]
    fn activity_for_another_batch_is_refused() {
        let mut batch = batch();
        let other = BatchActivity::new(
            "00000000-0000-0000-0000-0000000000a2".parse().unwrap(),
            "00000000-0000-0000-0000-000000000099".parse().unwrap(),
            Utc::now(),
            BatchActivityKind::Mortality(SexCounts::new(1, 0, 0)),
        );
        assert!(other.apply_to(&mut batch, MortalityPolicy::Clamp).is_err());
        assert_eq!(batch.population(), 20);
    }

    #[test]
    fn kind_names_are_snake_case() {
        let kind = BatchActivityKind::StatusSwitch {
            status: BatchStatus::Closed,
        };
        assert_eq!(kind.name(), "status_switch");
    }
}
