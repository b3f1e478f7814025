#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};

use farmops_app::{AppMediator, AppScopeFactory, build_mediator};
use farmops_core::{FixedClock, SequentialIdGenerator};
use farmops_infra::{CoreConfig, InMemoryDatabase};
use farmops_requests::{Request, RequestResult};

pub fn noon() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 17, 12, 0, 0).unwrap()
}

pub struct Farm {
    pub db: Arc<InMemoryDatabase>,
    pub factory: AppScopeFactory,
    pub mediator: AppMediator,
}

impl Farm {
    pub fn new() -> Self {
        Self::with_config(CoreConfig::default())
    }

    pub fn with_config(config: CoreConfig) -> Self {
        let db = Arc::new(InMemoryDatabase::new());
        let factory = AppScopeFactory::in_memory(db.clone())
            .with_clock(FixedClock(noon()))
            .with_ids(SequentialIdGenerator::new())
            .with_config(config);
        let mediator = build_mediator(factory.clone()).unwrap();
        Self { db, factory, mediator }
    }

    pub async fn send<A: Request>(&self, args: A) -> RequestResult<A::Output> {
        self.mediator.send(args).await.unwrap()
    }

    /// Send and unwrap a successful value.
    pub async fn ok<A: Request>(&self, args: A) -> A::Output {
        let result = self.send(args).await;
        assert!(
            result.is_success(),
            "request failed: {} {:?}",
            result.message(),
            result.validation_errors()
        );
        result.into_value().unwrap()
    }
}

/// Fields of every validation error, in order.
pub fn fields<T>(result: &RequestResult<T>) -> Vec<String> {
    result
        .validation_errors()
        .iter()
        .map(|e| e.field.clone())
        .collect()
}
