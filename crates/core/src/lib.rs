//! `farmops-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! identifiers, the entity contract, the error taxonomy, and the clock/id
//! collaborators that keep execute-phase logic deterministic.

pub mod choice;
pub mod clock;
pub mod entity;
pub mod error;
pub mod id;
pub mod version;

pub use choice::Choice;
pub use clock::{Clock, FixedClock, IdGenerator, SequentialIdGenerator, SystemClock, UuidV7Generator};
pub use entity::Entity;
pub use error::{DomainError, DomainResult, ExecResult, ExecutionError};
pub use id::{
    ActivityId, AssetId, BatchActivityId, BatchId, BroilerBatchId, FinancialTransactionId,
    PersonId, ProductId, ProductVariantId, TransactionId, VendorId,
};
pub use version::ExpectedVersion;
