use std::sync::Arc;

use serde::Serialize;

use farmops_app::activities::CreateActivity;
use farmops_app::broiler_batches::CreateBroilerBatch;
use farmops_app::product_variants::CreateProductVariant;
use farmops_app::products::CreateProduct;
use farmops_app::queries::GetProductById;
use farmops_app::transactions::CreateTransaction;
use farmops_app::{AppScopeFactory, build_mediator};
use farmops_core::Entity;
use farmops_infra::{CoreConfig, InMemoryDatabase};
use farmops_requests::RequestResult;

fn print<T: Serialize>(label: &str, result: &RequestResult<T>) -> anyhow::Result<()> {
    println!("== {label}\n{}", serde_json::to_string_pretty(result)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    match std::env::var("FARMOPS_LOG_FORMAT").as_deref() {
        Ok("pretty") => farmops_observability::tracing::init_pretty(),
        _ => farmops_observability::init(),
    }

    let config = CoreConfig::from_env();
    tracing::info!(mortality_policy = ?config.mortality_policy, "starting farmops demo");

    let db = Arc::new(InMemoryDatabase::new());
    let mediator = build_mediator(AppScopeFactory::in_memory(db.clone()).with_config(config))?;

    let feed = mediator
        .send(CreateProduct {
            name: "Starter feed".into(),
            unit: "g".into(),
            stock: 0.0,
            vendor_id: None,
        })
        .await?;
    print("create product", &feed)?;
    let Some(feed) = feed.into_value() else {
        anyhow::bail!("demo product was not created");
    };

    let bag = mediator
        .send(CreateProductVariant {
            product_id: *feed.id(),
            name: "3 kg bag".into(),
            unit: "kg".into(),
            quantity: 3.0,
            stock: 2.0,
        })
        .await?;
    print("create variant", &bag)?;

    let restocked = mediator.send(GetProductById::new(*feed.id())).await?;
    print("product after variant", &restocked)?;

    let house = mediator
        .send(CreateBroilerBatch {
            name: "House 1".into(),
            initial_population: 10,
        })
        .await?;
    print("place broilers", &house)?;
    if let Some(house) = house.into_value() {
        let mortality = mediator
            .send(CreateActivity {
                broiler_batch_id: *house.id(),
                activity_type: "mortality".into(),
                value: 15.0,
                notes: Some("heat stress".into()),
            })
            .await?;
        print("record mortality", &mortality)?;
    }

    let invalid = mediator
        .send(CreateTransaction {
            transaction_type: "Income".into(),
            description: String::new(),
            quantity: None,
            unit_price: 0,
            customer_id: None,
            vendor_id: None,
            product_variant_id: None,
            occurred_at: None,
        })
        .await?;
    print("invalid transaction", &invalid)?;

    tracing::info!(commits = db.commit_count(), "demo finished");
    Ok(())
}
