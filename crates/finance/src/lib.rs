//! Finance domain module.
//!
//! Amounts are in the smallest currency unit (e.g. cents). Every derived value
//! here (transaction totals, payment status) is recomputed from its inputs and
//! never set on its own.

pub mod financial;
pub mod transaction;

pub use financial::{FinancialTransaction, PaymentStatus, payment_status};
pub use transaction::{
    PolarityViolation, Transaction, TransactionParts, TransactionType, polarity_violations,
    total_amount,
};
