//! Request handlers for the farm-management core, wired into a mediator.
//!
//! Every command and query is a typed request with a two-phase handler
//! (`validate`, then `execute`). Handlers run inside an `AppScope` that owns
//! the request's unit of work, clock and id generator.

pub mod activities;
pub mod assets;
pub mod batch_activities;
pub mod batches;
pub mod broiler_batches;
pub mod dispatch;
pub mod financial_transactions;
pub mod persons;
pub mod product_variants;
pub mod products;
pub mod queries;
pub mod scope;
pub mod transactions;
pub mod vendors;
pub mod wiring;

mod support;

pub use scope::{AppScope, AppScopeFactory};
pub use wiring::{AppMediator, build_mediator};
