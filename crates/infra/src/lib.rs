//! Infrastructure for the farmops core.
//!
//! - `store`: the persistence gateway contract (repositories + unit of work)
//!   and its in-memory implementation
//! - `config`: runtime configuration for business-rule knobs

pub mod config;
pub mod store;

pub use config::{CoreConfig, MORTALITY_POLICY_VAR};
pub use store::{
    InMemoryDatabase, InMemoryUnitOfWork, Repository, StoreError, StoreResult, Stored, Tracking,
    UnitOfWork, UnitOfWorkFactory,
};
