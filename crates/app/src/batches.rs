use async_trait::async_trait;
use serde::Deserialize;
use tracing::info;

use farmops_core::{BatchId, Entity, ExecResult};
use farmops_livestock::{Batch, SexCounts};
use farmops_requests::{Request, RequestHandler, ValidationErrors};

use crate::scope::AppScope;
use crate::support::{NAME_MAX, load, peek};

#[derive(Debug, Clone, Deserialize)]
pub struct CreateBatch {
    pub name: String,
    pub breed: Option<String>,
    #[serde(default)]
    pub male: u64,
    #[serde(default)]
    pub female: u64,
    #[serde(default)]
    pub unsexed: u64,
}

impl Request for CreateBatch {
    type Output = Batch;
}

/// Patch of the descriptive fields. Population only changes through activities.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateBatch {
    pub id: BatchId,
    pub name: Option<String>,
    pub breed: Option<String>,
}

impl Request for UpdateBatch {
    type Output = Batch;
}

pub struct CreateBatchHandler;

#[async_trait]
impl RequestHandler<AppScope> for CreateBatchHandler {
    type Args = CreateBatch;

    async fn validate(&self, args: &CreateBatch, _scope: &AppScope) -> ExecResult<ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.require_text("name", &args.name, NAME_MAX);
        errors.max_len("breed", args.breed.as_deref(), NAME_MAX);
        match SexCounts::new(args.male, args.female, args.unsexed).checked_total() {
            Some(population) => errors.positive_count("population", population),
            None => errors.push("population", "population exceeds the largest countable head count"),
        }
        Ok(errors)
    }

    async fn execute(&self, args: CreateBatch, scope: &AppScope) -> ExecResult<Batch> {
        let counts = SexCounts::new(args.male, args.female, args.unsexed);
        let batch = Batch::new(scope.next_id(), args.name, args.breed, counts, scope.now());

        scope.uow().batches().create(batch.clone()).await?;
        scope.uow().save_changes().await?;

        info!(batch_id = %batch.id(), population = batch.population(), "batch created");
        Ok(batch)
    }
}

pub struct UpdateBatchHandler;

#[async_trait]
impl RequestHandler<AppScope> for UpdateBatchHandler {
    type Args = UpdateBatch;

    async fn validate(&self, args: &UpdateBatch, scope: &AppScope) -> ExecResult<ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let existing = peek::<Batch>(scope, &args.id).await?;
        errors.exists("id", Batch::KIND, existing.is_some());
        errors.optional_text("name", args.name.as_deref(), NAME_MAX);
        errors.max_len("breed", args.breed.as_deref(), NAME_MAX);
        Ok(errors)
    }

    async fn execute(&self, args: UpdateBatch, scope: &AppScope) -> ExecResult<Batch> {
        let mut batch = load::<Batch>(scope, &args.id).await?;
        if let Some(name) = args.name {
            batch.rename(name);
        }
        if args.breed.is_some() {
            batch.set_breed(args.breed);
        }

        scope.uow().batches().update(batch.clone()).await?;
        scope.uow().save_changes().await?;

        info!(batch_id = %batch.id(), "batch updated");
        Ok(batch)
    }
}
