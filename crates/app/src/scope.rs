use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use farmops_core::{Clock, IdGenerator, SystemClock, UuidV7Generator};
use farmops_infra::{CoreConfig, InMemoryDatabase, UnitOfWork, UnitOfWorkFactory};
use farmops_livestock::MortalityPolicy;
use farmops_requests::{RequestScope, ScopeFactory};

/// Collaborators for one request. Dropped when the request completes, which
/// discards any writes that were staged but never saved.
pub struct AppScope {
    uow: Box<dyn UnitOfWork>,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
    config: CoreConfig,
    cancel: CancellationToken,
}

impl AppScope {
    pub fn uow(&self) -> &dyn UnitOfWork {
        self.uow.as_ref()
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn next_id<T: From<Uuid>>(&self) -> T {
        T::from(self.ids.next_uuid())
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    pub fn mortality_policy(&self) -> MortalityPolicy {
        self.config.mortality_policy
    }
}

impl RequestScope for AppScope {
    fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }
}

/// Builds an `AppScope` per request. Clock, id generator and config are
/// shared; the unit of work is always fresh.
#[derive(Clone)]
pub struct AppScopeFactory {
    store: Arc<dyn UnitOfWorkFactory>,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
    config: CoreConfig,
}

impl AppScopeFactory {
    pub fn new(store: Arc<dyn UnitOfWorkFactory>) -> Self {
        Self {
            store,
            clock: Arc::new(SystemClock),
            ids: Arc::new(UuidV7Generator),
            config: CoreConfig::default(),
        }
    }

    pub fn in_memory(db: Arc<InMemoryDatabase>) -> Self {
        Self::new(Arc::new(db))
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn with_ids(mut self, ids: impl IdGenerator + 'static) -> Self {
        self.ids = Arc::new(ids);
        self
    }

    pub fn with_config(mut self, config: CoreConfig) -> Self {
        self.config = config;
        self
    }
}

impl ScopeFactory for AppScopeFactory {
    type Scope = AppScope;

    fn create_scope(&self, cancel: CancellationToken) -> AppScope {
        AppScope {
            uow: self.store.begin(cancel.clone()),
            clock: Arc::clone(&self.clock),
            ids: Arc::clone(&self.ids),
            config: self.config,
            cancel,
        }
    }
}
