use async_trait::async_trait;
use serde::Deserialize;
use tracing::info;

use farmops_core::{BroilerBatchId, Entity, ExecResult};
use farmops_livestock::BroilerBatch;
use farmops_requests::{Request, RequestHandler, ValidationErrors};

use crate::scope::AppScope;
use crate::support::{NAME_MAX, load, peek};

#[derive(Debug, Clone, Deserialize)]
pub struct CreateBroilerBatch {
    pub name: String,
    pub initial_population: u64,
}

impl Request for CreateBroilerBatch {
    type Output = BroilerBatch;
}

/// Only the name is editable; the population moves through activities.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateBroilerBatch {
    pub id: BroilerBatchId,
    pub name: Option<String>,
}

impl Request for UpdateBroilerBatch {
    type Output = BroilerBatch;
}

pub struct CreateBroilerBatchHandler;

#[async_trait]
impl RequestHandler<AppScope> for CreateBroilerBatchHandler {
    type Args = CreateBroilerBatch;

    async fn validate(&self, args: &CreateBroilerBatch, _scope: &AppScope) -> ExecResult<ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.require_text("name", &args.name, NAME_MAX);
        errors.positive_count("initial_population", args.initial_population);
        Ok(errors)
    }

    async fn execute(&self, args: CreateBroilerBatch, scope: &AppScope) -> ExecResult<BroilerBatch> {
        let batch = BroilerBatch::new(scope.next_id(), args.name, args.initial_population, scope.now());

        scope.uow().broiler_batches().create(batch.clone()).await?;
        scope.uow().save_changes().await?;

        info!(
            broiler_batch_id = %batch.id(),
            population = batch.initial_population(),
            "broiler batch placed"
        );
        Ok(batch)
    }
}

pub struct UpdateBroilerBatchHandler;

#[async_trait]
impl RequestHandler<AppScope> for UpdateBroilerBatchHandler {
    type Args = UpdateBroilerBatch;

    async fn validate(&self, args: &UpdateBroilerBatch, scope: &AppScope) -> ExecResult<ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let existing = peek::<BroilerBatch>(scope, &args.id).await?;
        errors.exists("id", BroilerBatch::KIND, existing.is_some());
        errors.optional_text("name", args.name.as_deref(), NAME_MAX);
        Ok(errors)
    }

    async fn execute(&self, args: UpdateBroilerBatch, scope: &AppScope) -> ExecResult<BroilerBatch> {
        let mut batch = load::<BroilerBatch>(scope, &args.id).await?;
        if let Some(name) = args.name {
            batch.rename(name);
        }

        scope.uow().broiler_batches().update(batch.clone()).await?;
        scope.uow().save_changes().await?;

        info!(broiler_batch_id = %batch.id(), "broiler batch updated");
        Ok(batch)
    }
}
