//! Persistence gateway contract.
//!
//! A `UnitOfWork` is opened once per request scope. Reads go through typed
//! repositories; writes are staged and only become visible to other units of
//! work once `save_changes` commits them as a whole.

use async_trait::async_trait;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use farmops_assets::Asset;
use farmops_core::{Entity, ExecutionError};
use farmops_finance::{FinancialTransaction, Transaction};
use farmops_inventory::{Product, ProductVariant};
use farmops_livestock::{Activity, Batch, BatchActivity, BroilerBatch};
use farmops_parties::{Person, Vendor};

pub mod in_memory;

pub use in_memory::{InMemoryDatabase, InMemoryUnitOfWork};

/// Whether a read should take part in optimistic concurrency checks.
///
/// A tracked read remembers the row version; a later `update` of the same row
/// only commits if nobody else committed in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tracking {
    Tracked,
    NoTracking,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("{kind} '{id}' was not found")]
    NotFound { kind: &'static str, id: String },

    #[error("{kind} '{id}' already exists")]
    AlreadyExists { kind: &'static str, id: String },

    #[error("concurrency conflict on {kind} '{id}': expected version {expected}, found {actual}")]
    Conflict {
        kind: &'static str,
        id: String,
        expected: u64,
        actual: u64,
    },

    #[error("operation cancelled")]
    Cancelled,

    #[error("storage backend failure: {0}")]
    Backend(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

impl From<StoreError> for ExecutionError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { kind, id } => ExecutionError::NotFound { kind, id },
            StoreError::AlreadyExists { .. } | StoreError::Conflict { .. } => {
                ExecutionError::conflict(err.to_string())
            }
            StoreError::Cancelled => ExecutionError::Cancelled,
            StoreError::Backend(msg) => ExecutionError::Internal(msg),
        }
    }
}

/// Async CRUD surface for one aggregate type.
#[async_trait]
pub trait Repository<E: Entity>: Send + Sync {
    async fn get_by_id(&self, id: &E::Id, tracking: Tracking) -> StoreResult<Option<E>>;

    async fn get_all(&self) -> StoreResult<Vec<E>>;

    /// Stage a new row. Fails at commit time if the id is already taken.
    async fn create(&self, entity: E) -> StoreResult<()>;

    /// Stage a replacement for an existing row.
    async fn update(&self, entity: E) -> StoreResult<()>;

    async fn exists(&self, id: &E::Id) -> StoreResult<bool> {
        Ok(self.get_by_id(id, Tracking::NoTracking).await?.is_some())
    }
}

/// Transactional boundary for one request.
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    fn batches(&self) -> &dyn Repository<Batch>;
    fn batch_activities(&self) -> &dyn Repository<BatchActivity>;
    fn broiler_batches(&self) -> &dyn Repository<BroilerBatch>;
    fn activities(&self) -> &dyn Repository<Activity>;
    fn transactions(&self) -> &dyn Repository<Transaction>;
    fn financial_transactions(&self) -> &dyn Repository<FinancialTransaction>;
    fn products(&self) -> &dyn Repository<Product>;
    fn product_variants(&self) -> &dyn Repository<ProductVariant>;
    fn vendors(&self) -> &dyn Repository<Vendor>;
    fn persons(&self) -> &dyn Repository<Person>;
    fn assets(&self) -> &dyn Repository<Asset>;

    /// Commit every staged write atomically; returns the number of rows written.
    async fn save_changes(&self) -> StoreResult<usize>;
}

pub trait UnitOfWorkFactory: Send + Sync {
    fn begin(&self, cancel: CancellationToken) -> Box<dyn UnitOfWork>;
}

/// Maps an aggregate type to its repository on a unit of work.
pub trait Stored: Entity {
    fn repository(uow: &dyn UnitOfWork) -> &dyn Repository<Self>;
}

macro_rules! stored {
    ($($entity:ty => $accessor:ident),+ $(,)?) => {
        $(
            impl Stored for $entity {
                fn repository(uow: &dyn UnitOfWork) -> &dyn Repository<Self> {
                    uow.$accessor()
                }
            }
        )+
    };
}

stored! {
    Batch => batches,
    BatchActivity => batch_activities,
    BroilerBatch => broiler_batches,
    Activity => activities,
    Transaction => transactions,
    FinancialTransaction => financial_transactions,
    Product => products,
    ProductVariant => product_variants,
    Vendor => vendors,
    Person => persons,
    Asset => assets,
}
