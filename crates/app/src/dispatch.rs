//! Side effects of broiler `Activity` records.
//!
//! Each `ActivityType` maps to exactly one dispatcher through an exhaustive
//! match, so adding a type without a dispatcher does not compile. Dispatchers
//! only stage writes; the calling handler saves the activity and its effect
//! together.

use async_trait::async_trait;
use tracing::{debug, warn};

use farmops_core::{Entity, ExecResult};
use farmops_livestock::{Activity, ActivityType, BroilerBatch};

use crate::scope::AppScope;
use crate::support::load;

#[async_trait]
pub trait ActivityDispatcher: Send + Sync {
    /// The activity type this dispatcher applies.
    fn handles(&self) -> ActivityType;

    async fn dispatch(&self, activity: &Activity, scope: &AppScope) -> ExecResult<()>;
}

pub fn dispatcher_for(activity_type: ActivityType) -> &'static dyn ActivityDispatcher {
    match activity_type {
        ActivityType::Mortality => &MortalityDispatcher,
        ActivityType::WeightMeasurement => &WeightMeasurementDispatcher,
    }
}

/// Deaths reduce the batch's current population, floored at zero under the
/// clamp policy.
pub struct MortalityDispatcher;

#[async_trait]
impl ActivityDispatcher for MortalityDispatcher {
    fn handles(&self) -> ActivityType {
        ActivityType::Mortality
    }

    async fn dispatch(&self, activity: &Activity, scope: &AppScope) -> ExecResult<()> {
        let mut batch = load::<BroilerBatch>(scope, &activity.broiler_batch_id()).await?;
        let outcome = batch.record_mortality(activity.head_count(), scope.mortality_policy())?;

        if outcome.absorbed > 0 {
            warn!(
                broiler_batch_id = %activity.broiler_batch_id(),
                absorbed = outcome.absorbed,
                "mortality exceeded current population; clamped at zero"
            );
        }

        scope.uow().broiler_batches().update(batch).await?;
        Ok(())
    }
}

/// Weights are history only.
pub struct WeightMeasurementDispatcher;

#[async_trait]
impl ActivityDispatcher for WeightMeasurementDispatcher {
    fn handles(&self) -> ActivityType {
        ActivityType::WeightMeasurement
    }

    async fn dispatch(&self, activity: &Activity, _scope: &AppScope) -> ExecResult<()> {
        debug!(activity_id = %activity.id(), "weight recorded");
        Ok(())
    }
}
