//! Mediator assembly: one handler per request type.

use farmops_infra::Stored;
use farmops_requests::{Mediator, MediatorBuilder, MediatorError};

use farmops_assets::Asset;
use farmops_finance::{FinancialTransaction, Transaction};
use farmops_inventory::{Product, ProductVariant};
use farmops_livestock::{Activity, Batch, BatchActivity, BroilerBatch};
use farmops_parties::{Person, Vendor};

use crate::activities::CreateActivityHandler;
use crate::assets::{CreateAssetHandler, UpdateAssetHandler};
use crate::batch_activities::RegisterBatchActivityHandler;
use crate::batches::{CreateBatchHandler, UpdateBatchHandler};
use crate::broiler_batches::{CreateBroilerBatchHandler, UpdateBroilerBatchHandler};
use crate::financial_transactions::{CreateFinancialTransactionHandler, UpdateFinancialTransactionHandler};
use crate::persons::{CreatePersonHandler, UpdatePersonHandler};
use crate::product_variants::{CreateProductVariantHandler, UpdateProductVariantHandler};
use crate::products::{CreateProductHandler, UpdateProductHandler};
use crate::queries::{GetAllHandler, GetByIdHandler};
use crate::scope::AppScopeFactory;
use crate::transactions::{CreateTransactionHandler, UpdateTransactionHandler};
use crate::vendors::{CreateVendorHandler, UpdateVendorHandler};

pub type AppMediator = Mediator<AppScopeFactory>;

fn with_queries<E: Stored>(builder: MediatorBuilder<AppScopeFactory>) -> MediatorBuilder<AppScopeFactory> {
    builder
        .register(GetByIdHandler::<E>::default())
        .register(GetAllHandler::<E>::default())
}

pub fn build_mediator(factory: AppScopeFactory) -> Result<AppMediator, MediatorError> {
    let builder = Mediator::builder(factory)
        .register(CreatePersonHandler)
        .register(UpdatePersonHandler)
        .register(CreateVendorHandler)
        .register(UpdateVendorHandler)
        .register(CreateProductHandler)
        .register(UpdateProductHandler)
        .register(CreateProductVariantHandler)
        .register(UpdateProductVariantHandler)
        .register(CreateBatchHandler)
        .register(UpdateBatchHandler)
        .register(RegisterBatchActivityHandler)
        .register(CreateBroilerBatchHandler)
        .register(UpdateBroilerBatchHandler)
        .register(CreateActivityHandler)
        .register(CreateTransactionHandler)
        .register(UpdateTransactionHandler)
        .register(CreateFinancialTransactionHandler)
        .register(UpdateFinancialTransactionHandler)
        .register(CreateAssetHandler)
        .register(UpdateAssetHandler);

    let builder = with_queries::<Batch>(builder);
    let builder = with_queries::<BatchActivity>(builder);
    let builder = with_queries::<BroilerBatch>(builder);
    let builder = with_queries::<Activity>(builder);
    let builder = with_queries::<Transaction>(builder);
    let builder = with_queries::<FinancialTransaction>(builder);
    let builder = with_queries::<Product>(builder);
    let builder = with_queries::<ProductVariant>(builder);
    let builder = with_queries::<Vendor>(builder);
    let builder = with_queries::<Person>(builder);
    let builder = with_queries::<Asset>(builder);

    builder.build()
}
