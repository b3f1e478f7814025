//! Livestock domain module.
//!
//! Population aggregates (`Batch`, `BroilerBatch`), the activity records logged
//! against them, and the pure rules that apply an activity's side effect. No IO:
//! loading, staging and saving are the application layer's job.

pub mod activity;
pub mod batch;
pub mod broiler;
pub mod mortality;

pub use activity::{Activity, ActivityType, BatchActivity, BatchActivityKind};
pub use batch::{Batch, BatchStatus, SexCounts};
pub use broiler::BroilerBatch;
pub use mortality::{MortalityOutcome, MortalityPolicy, apply_deaths};
