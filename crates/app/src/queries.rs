//! Lookups. Queries never fail validation; a missing row is a successful
//! `None`, which the façade turns into a 404.

use std::marker::PhantomData;

use async_trait::async_trait;

use farmops_assets::Asset;
use farmops_core::ExecResult;
use farmops_finance::{FinancialTransaction, Transaction};
use farmops_infra::{Stored, Tracking};
use farmops_inventory::{Product, ProductVariant};
use farmops_livestock::{Activity, Batch, BatchActivity, BroilerBatch};
use farmops_parties::{Person, Vendor};
use farmops_requests::{Request, RequestHandler, ValidationErrors};

use crate::scope::AppScope;

#[derive(Debug, Clone)]
pub struct GetById<E: Stored> {
    pub id: E::Id,
    entity: PhantomData<fn() -> E>,
}

impl<E: Stored> GetById<E> {
    pub fn new(id: E::Id) -> Self {
        Self {
            id,
            entity: PhantomData,
        }
    }
}

impl<E: Stored> Request for GetById<E> {
    type Output = Option<E>;
}

#[derive(Debug, Clone)]
pub struct GetAll<E: Stored> {
    entity: PhantomData<fn() -> E>,
}

impl<E: Stored> GetAll<E> {
    pub fn new() -> Self {
        Self { entity: PhantomData }
    }
}

impl<E: Stored> Default for GetAll<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Stored> Request for GetAll<E> {
    type Output = Vec<E>;
}

pub type GetBatchById = GetById<Batch>;
pub type GetAllBatches = GetAll<Batch>;
pub type GetBatchActivityById = GetById<BatchActivity>;
pub type GetAllBatchActivities = GetAll<BatchActivity>;
pub type GetBroilerBatchById = GetById<BroilerBatch>;
pub type GetAllBroilerBatches = GetAll<BroilerBatch>;
pub type GetActivityById = GetById<Activity>;
pub type GetAllActivities = GetAll<Activity>;
pub type GetTransactionById = GetById<Transaction>;
pub type GetAllTransactions = GetAll<Transaction>;
pub type GetFinancialTransactionById = GetById<FinancialTransaction>;
pub type GetAllFinancialTransactions = GetAll<FinancialTransaction>;
pub type GetProductById = GetById<Product>;
pub type GetAllProducts = GetAll<Product>;
pub type GetProductVariantById = GetById<ProductVariant>;
pub type GetAllProductVariants = GetAll<ProductVariant>;
pub type GetVendorById = GetById<Vendor>;
pub type GetAllVendors = GetAll<Vendor>;
pub type GetPersonById = GetById<Person>;
pub type GetAllPersons = GetAll<Person>;
pub type GetAssetById = GetById<Asset>;
pub type GetAllAssets = GetAll<Asset>;

pub struct GetByIdHandler<E>(PhantomData<fn() -> E>);

impl<E> Default for GetByIdHandler<E> {
    fn default() -> Self {
        Self(PhantomData)
    }
}

#[async_trait]
impl<E: Stored> RequestHandler<AppScope> for GetByIdHandler<E> {
    type Args = GetById<E>;

    async fn validate(&self, _args: &GetById<E>, _scope: &AppScope) -> ExecResult<ValidationErrors> {
        Ok(ValidationErrors::new())
    }

    async fn execute(&self, args: GetById<E>, scope: &AppScope) -> ExecResult<Option<E>> {
        Ok(E::repository(scope.uow())
            .get_by_id(&args.id, Tracking::NoTracking)
            .await?)
    }
}

pub struct GetAllHandler<E>(PhantomData<fn() -> E>);

impl<E> Default for GetAllHandler<E> {
    fn default() -> Self {
        Self(PhantomData)
    }
}

#[async_trait]
impl<E: Stored> RequestHandler<AppScope> for GetAllHandler<E> {
    type Args = GetAll<E>;

    async fn validate(&self, _args: &GetAll<E>, _scope: &AppScope) -> ExecResult<ValidationErrors> {
        Ok(ValidationErrors::new())
    }

    async fn execute(&self, _args: GetAll<E>, scope: &AppScope) -> ExecResult<Vec<E>> {
        Ok(E::repository(scope.uow()).get_all().await?)
    }
}
