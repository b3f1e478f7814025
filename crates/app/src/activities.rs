//! Broiler operations log.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::info;

use farmops_core::{BroilerBatchId, Entity, ExecResult};
use farmops_livestock::{Activity, ActivityType, BroilerBatch, MortalityPolicy};
use farmops_requests::{Request, RequestHandler, ValidationErrors};

use crate::dispatch::dispatcher_for;
use crate::scope::AppScope;
use crate::support::{NOTES_MAX, parse_choice, peek};

#[derive(Debug, Clone, Deserialize)]
pub struct CreateActivity {
    pub broiler_batch_id: BroilerBatchId,
    pub activity_type: String,
    /// Head count for mortality, grams for a weight measurement.
    pub value: f64,
    pub notes: Option<String>,
}

impl Request for CreateActivity {
    type Output = Activity;
}

pub struct CreateActivityHandler;

#[async_trait]
impl RequestHandler<AppScope> for CreateActivityHandler {
    type Args = CreateActivity;

    async fn validate(&self, args: &CreateActivity, scope: &AppScope) -> ExecResult<ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let batch = peek::<BroilerBatch>(scope, &args.broiler_batch_id).await?;
        errors.exists("broiler_batch_id", BroilerBatch::KIND, batch.is_some());
        errors.max_len("notes", args.notes.as_deref(), NOTES_MAX);

        match errors.choice::<ActivityType>("activity_type", &args.activity_type) {
            Some(ActivityType::Mortality) => {
                errors.positive("value", args.value);
                errors.check(
                    args.value.is_finite() && args.value.fract() != 0.0,
                    "value",
                    "value must be a whole number of animals",
                );
                if let (Some(batch), MortalityPolicy::Reject) = (&batch, scope.mortality_policy()) {
                    errors.check(
                        args.value > batch.current_population() as f64,
                        "value",
                        format!(
                            "value exceeds the current population of {}",
                            batch.current_population()
                        ),
                    );
                }
            }
            Some(ActivityType::WeightMeasurement) | None => errors.non_negative("value", args.value),
        }
        Ok(errors)
    }

    async fn execute(&self, args: CreateActivity, scope: &AppScope) -> ExecResult<Activity> {
        let activity_type = parse_choice::<ActivityType>("activity_type", &args.activity_type)?;
        let activity = Activity::new(
            scope.next_id(),
            args.broiler_batch_id,
            activity_type,
            args.value,
            args.notes,
            scope.now(),
        );

        scope.uow().activities().create(activity.clone()).await?;
        dispatcher_for(activity_type).dispatch(&activity, scope).await?;
        scope.uow().save_changes().await?;

        info!(
            activity_id = %activity.id(),
            broiler_batch_id = %activity.broiler_batch_id(),
            activity_type = ?activity_type,
            "activity recorded"
        );
        Ok(activity)
    }
}
