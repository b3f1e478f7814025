use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use farmops_core::{Entity, FinancialTransactionId, PersonId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentStatus {
    Pending,
    PartiallyPaid,
    Paid,
}

/// Payment status from the amount due and the amount paid so far.
pub fn payment_status(amount: u64, paid_amount: Option<u64>) -> PaymentStatus {
    match paid_amount {
        None | Some(0) => PaymentStatus::Pending,
        Some(paid) if paid < amount => PaymentStatus::PartiallyPaid,
        Some(_) => PaymentStatus::Paid,
    }
}

/// A receivable/payable tracked until it is settled.
///
/// There is deliberately no `status` field: `status()` is computed on every read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FinancialTransaction {
    id: FinancialTransactionId,
    description: String,
    amount: u64,
    paid_amount: Option<u64>,
    person_id: Option<PersonId>,
    due_date: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl FinancialTransaction {
    pub fn new(
        id: FinancialTransactionId,
        description: impl Into<String>,
        amount: u64,
        paid_amount: Option<u64>,
        person_id: Option<PersonId>,
        due_date: Option<DateTime<Utc>>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            description: description.into(),
            amount,
            paid_amount,
            person_id,
            due_date,
            created_at,
        }
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn amount(&self) -> u64 {
        self.amount
    }

    pub fn paid_amount(&self) -> Option<u64> {
        self.paid_amount
    }

    pub fn person_id(&self) -> Option<PersonId> {
        self.person_id
    }

    pub fn due_date(&self) -> Option<DateTime<Utc>> {
        self.due_date
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn status(&self) -> PaymentStatus {
        payment_status(self.amount, self.paid_amount)
    }

    pub fn outstanding(&self) -> u64 {
        self.amount.saturating_sub(self.paid_amount.unwrap_or(0))
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    pub fn set_amount(&mut self, amount: u64) {
        self.amount = amount;
    }

    pub fn set_paid_amount(&mut self, paid_amount: Option<u64>) {
        self.paid_amount = paid_amount;
    }

    pub fn set_due_date(&mut self, due_date: Option<DateTime<Utc>>) {
        self.due_date = due_date;
    }
}

impl Entity for FinancialTransaction {
    type Id = FinancialTransactionId;

    const KIND: &'static str = "financial_transaction";

    fn id(&self) -> &FinancialTransactionId {
        &self.id
    }
}
