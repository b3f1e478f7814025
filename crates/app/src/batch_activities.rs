//! Events recorded against a sex-segmented batch.
//!
//! The activity row and its side effect on the batch (and, for consumption,
//! on the product) are staged in the same unit of work and saved once.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{info, warn};

use farmops_core::{BatchId, Entity, ExecResult, ProductId};
use farmops_inventory::Product;
use farmops_livestock::{Batch, BatchActivity, BatchActivityKind, BatchStatus, MortalityPolicy, SexCounts};
use farmops_requests::{Request, RequestHandler, ValidationErrors};

use crate::scope::AppScope;
use crate::support::{load, parse_choice, peek};

/// Activity payload as it arrives from the outside; `status` is still text.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActivityInput {
    Mortality {
        #[serde(default)]
        male: u64,
        #[serde(default)]
        female: u64,
        #[serde(default)]
        unsexed: u64,
    },
    StatusSwitch {
        status: String,
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

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterBatchActivity {
    pub batch_id: BatchId,
    pub activity: ActivityInput,
}

impl Request for RegisterBatchActivity {
    type Output = BatchActivity;
}

fn into_kind(input: ActivityInput) -> ExecResult<BatchActivityKind> {
    Ok(match input {
        ActivityInput::Mortality { male, female, unsexed } => {
            BatchActivityKind::Mortality(SexCounts::new(male, female, unsexed))
        }
        ActivityInput::StatusSwitch { status } => BatchActivityKind::StatusSwitch {
            status: parse_choice::<BatchStatus>("status", &status)?,
        },
        ActivityInput::ProductConsumption { product_id, quantity } => {
            BatchActivityKind::ProductConsumption { product_id, quantity }
        }
        ActivityInput::WeightMeasurement {
            average_weight_grams,
            sample_size,
        } => BatchActivityKind::WeightMeasurement {
            average_weight_grams,
            sample_size,
        },
    })
}

fn mortality_rules(errors: &mut ValidationErrors, deaths: SexCounts, batch: Option<&Batch>, policy: MortalityPolicy) {
    match deaths.checked_total() {
        Some(total) => errors.check(total == 0, "mortality", "at least one death must be recorded"),
        None => errors.push("mortality", "total deaths exceed the largest countable head count"),
    }

    let (Some(batch), MortalityPolicy::Reject) = (batch, policy) else {
        return;
    };
    let alive = batch.counts();
    for (field, dead, left) in [
        ("male", deaths.male, alive.male),
        ("female", deaths.female, alive.female),
        ("unsexed", deaths.unsexed, alive.unsexed),
    ] {
        errors.check(
            dead > left,
            field,
            format!("{field} deaths ({dead}) exceed the {left} animals left in that segment"),
        );
    }
}

pub struct RegisterBatchActivityHandler;

#[async_trait]
impl RequestHandler<AppScope> for RegisterBatchActivityHandler {
    type Args = RegisterBatchActivity;

    async fn validate(&self, args: &RegisterBatchActivity, scope: &AppScope) -> ExecResult<ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let batch = peek::<Batch>(scope, &args.batch_id).await?;
        errors.exists("batch_id", Batch::KIND, batch.is_some());

        match &args.activity {
            ActivityInput::Mortality { male, female, unsexed } => {
                let deaths = SexCounts::new(*male, *female, *unsexed);
                mortality_rules(&mut errors, deaths, batch.as_ref(), scope.mortality_policy());
            }
            ActivityInput::StatusSwitch { status } => {
                errors.choice::<BatchStatus>("status", status);
            }
            ActivityInput::ProductConsumption { product_id, quantity } => {
                errors.positive("quantity", *quantity);
                let product = peek::<Product>(scope, product_id).await?;
                errors.exists("product_id", Product::KIND, product.is_some());
                if let Some(product) = product {
                    errors.check(
                        *quantity > product.stock(),
                        "quantity",
                        format!("quantity exceeds the {} in stock", product.stock()),
                    );
                }
            }
            ActivityInput::WeightMeasurement {
                average_weight_grams,
                sample_size,
            } => {
                errors.positive("average_weight_grams", *average_weight_grams);
                errors.positive_count("sample_size", *sample_size);
            }
        }
        Ok(errors)
    }

    async fn execute(&self, args: RegisterBatchActivity, scope: &AppScope) -> ExecResult<BatchActivity> {
        let mut batch = load::<Batch>(scope, &args.batch_id).await?;
        let kind = into_kind(args.activity)?;
        let activity = BatchActivity::new(scope.next_id(), args.batch_id, scope.now(), kind);

        let absorbed = activity.apply_to(&mut batch, scope.mortality_policy())?;
        if absorbed > 0 {
            warn!(batch_id = %batch.id(), absorbed, "mortality exceeded population; clamped at zero");
        }

        match activity.kind() {
            BatchActivityKind::ProductConsumption { product_id, quantity } => {
                let mut product = load::<Product>(scope, product_id).await?;
                product.consume(*quantity)?;
                scope.uow().products().update(product).await?;
            }
            BatchActivityKind::Mortality(_)
            | BatchActivityKind::StatusSwitch { .. }
            | BatchActivityKind::WeightMeasurement { .. } => {}
        }

        scope.uow().batch_activities().create(activity.clone()).await?;
        scope.uow().batches().update(batch).await?;
        scope.uow().save_changes().await?;

        info!(
            batch_id = %activity.batch_id(),
            activity_id = %activity.id(),
            kind = activity.kind().name(),
            "batch activity registered"
        );
        Ok(activity)
    }
}
