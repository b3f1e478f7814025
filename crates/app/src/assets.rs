use async_trait::async_trait;
use serde::Deserialize;
use tracing::info;

use farmops_assets::{Asset, AssetState, AssetStatus, duplicate_statuses};
use farmops_core::{AssetId, Entity, ExecResult};
use farmops_requests::{Request, RequestHandler, ValidationErrors};

use crate::scope::AppScope;
use crate::support::{NAME_MAX, NOTES_MAX, load, parse_choice, peek};

#[derive(Debug, Clone, Deserialize)]
pub struct AssetStateInput {
    pub status: String,
    pub quantity: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateAsset {
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub states: Vec<AssetStateInput>,
}

impl Request for CreateAsset {
    type Output = Asset;
}

/// Replaces name, description and the full list of states.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateAsset {
    pub id: AssetId,
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub states: Vec<AssetStateInput>,
}

impl Request for UpdateAsset {
    type Output = Asset;
}

fn asset_rules(errors: &mut ValidationErrors, name: &str, description: Option<&str>, states: &[AssetStateInput]) {
    errors.require_text("name", name, NAME_MAX);
    errors.max_len("description", description, NOTES_MAX);

    for (index, state) in states.iter().enumerate() {
        errors.choice::<AssetStatus>(&format!("states[{index}].status"), &state.status);
    }
    for status in duplicate_statuses(states.iter().map(|s| s.status.as_str())) {
        errors.push("states", format!("status '{status}' is listed more than once"));
    }
}

fn into_states(states: Vec<AssetStateInput>) -> ExecResult<Vec<AssetState>> {
    states
        .into_iter()
        .map(|state| {
            Ok(AssetState {
                status: parse_choice("status", &state.status)?,
                quantity: state.quantity,
            })
        })
        .collect()
}

pub struct CreateAssetHandler;

#[async_trait]
impl RequestHandler<AppScope> for CreateAssetHandler {
    type Args = CreateAsset;

    async fn validate(&self, args: &CreateAsset, _scope: &AppScope) -> ExecResult<ValidationErrors> {
        let mut errors = ValidationErrors::new();
        asset_rules(&mut errors, &args.name, args.description.as_deref(), &args.states);
        Ok(errors)
    }

    async fn execute(&self, args: CreateAsset, scope: &AppScope) -> ExecResult<Asset> {
        let states = into_states(args.states)?;
        let asset = Asset::new(scope.next_id(), args.name, args.description, states);

        scope.uow().assets().create(asset.clone()).await?;
        scope.uow().save_changes().await?;

        info!(asset_id = %asset.id(), total = asset.total_quantity(), "asset created");
        Ok(asset)
    }
}

pub struct UpdateAssetHandler;

#[async_trait]
impl RequestHandler<AppScope> for UpdateAssetHandler {
    type Args = UpdateAsset;

    async fn validate(&self, args: &UpdateAsset, scope: &AppScope) -> ExecResult<ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let existing = peek::<Asset>(scope, &args.id).await?;
        errors.exists("id", Asset::KIND, existing.is_some());
        asset_rules(&mut errors, &args.name, args.description.as_deref(), &args.states);
        Ok(errors)
    }

    async fn execute(&self, args: UpdateAsset, scope: &AppScope) -> ExecResult<Asset> {
        let states = into_states(args.states)?;
        let mut asset = load::<Asset>(scope, &args.id).await?;
        asset.rename(args.name);
        asset.set_description(args.description);
        asset.replace_states(states);

        scope.uow().assets().update(asset.clone()).await?;
        scope.uow().save_changes().await?;

        info!(asset_id = %asset.id(), total = asset.total_quantity(), "asset updated");
        Ok(asset)
    }
}
