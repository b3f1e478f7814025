//! Request pipeline: result envelope, two-phase handlers, and the mediator.
//!
//! Every command and query in the system goes through the same path:
//!
//! ```text
//! Mediator::send(args)
//!   ↓ fresh RequestScope (unit-of-work, clock, ids, cancellation)
//! RequestHandler::validate  → every field error at once
//!   ↓ only if clean
//! RequestHandler::execute   → value or typed ExecutionError
//!   ↓
//! RequestResult { is_success, message, validation_errors, value }
//! ```

pub mod handler;
pub mod mediator;
pub mod result;
pub mod scope;
pub mod validation;

pub use handler::{Handle, OutputOf, Request, RequestHandler};
pub use mediator::{Mediator, MediatorBuilder, MediatorError};
pub use result::{FailureKind, RequestResult};
pub use scope::{RequestScope, ScopeFactory};
pub use validation::{FieldError, ValidationErrors};

pub use tokio_util::sync::CancellationToken;
