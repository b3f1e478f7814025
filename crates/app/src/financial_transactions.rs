//! Receivables and payables with a derived payment status.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::info;

use farmops_core::{Entity, ExecResult, FinancialTransactionId, PersonId};
use farmops_finance::FinancialTransaction;
use farmops_parties::Person;
use farmops_requests::{Request, RequestHandler, ValidationErrors};

use crate::scope::AppScope;
use crate::support::{DESCRIPTION_MAX, check_reference, load, peek};

#[derive(Debug, Clone, Deserialize)]
pub struct CreateFinancialTransaction {
    pub description: String,
    /// Minor currency units.
    pub amount: u64,
    pub paid_amount: Option<u64>,
    pub person_id: Option<PersonId>,
    pub due_date: Option<DateTime<Utc>>,
}

impl Request for CreateFinancialTransaction {
    type Output = FinancialTransaction;
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateFinancialTransaction {
    pub id: FinancialTransactionId,
    pub description: Option<String>,
    pub amount: Option<u64>,
    pub paid_amount: Option<u64>,
    pub due_date: Option<DateTime<Utc>>,
}

impl Request for UpdateFinancialTransaction {
    type Output = FinancialTransaction;
}

fn paid_within_amount(errors: &mut ValidationErrors, paid_amount: Option<u64>, amount: Option<u64>) {
    if let (Some(paid), Some(amount)) = (paid_amount, amount) {
        errors.check(
            paid > amount,
            "paid_amount",
            format!("paid_amount ({paid}) cannot exceed amount ({amount})"),
        );
    }
}

pub struct CreateFinancialTransactionHandler;

#[async_trait]
impl RequestHandler<AppScope> for CreateFinancialTransactionHandler {
    type Args = CreateFinancialTransaction;

    async fn validate(&self, args: &CreateFinancialTransaction, scope: &AppScope) -> ExecResult<ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.require_text("description", &args.description, DESCRIPTION_MAX);
        errors.positive_count("amount", args.amount);
        paid_within_amount(&mut errors, args.paid_amount, Some(args.amount));
        check_reference::<Person>(&mut errors, scope, "person_id", args.person_id.as_ref()).await?;
        Ok(errors)
    }

    async fn execute(&self, args: CreateFinancialTransaction, scope: &AppScope) -> ExecResult<FinancialTransaction> {
        let entry = FinancialTransaction::new(
            scope.next_id(),
            args.description,
            args.amount,
            args.paid_amount,
            args.person_id,
            args.due_date,
            scope.now(),
        );

        scope.uow().financial_transactions().create(entry.clone()).await?;
        scope.uow().save_changes().await?;

        info!(
            financial_transaction_id = %entry.id(),
            status = ?entry.status(),
            "financial transaction created"
        );
        Ok(entry)
    }
}

pub struct UpdateFinancialTransactionHandler;

#[async_trait]
impl RequestHandler<AppScope> for UpdateFinancialTransactionHandler {
    type Args = UpdateFinancialTransaction;

    async fn validate(&self, args: &UpdateFinancialTransaction, scope: &AppScope) -> ExecResult<ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let stored = peek::<FinancialTransaction>(scope, &args.id).await?;
        errors.exists("id", FinancialTransaction::KIND, stored.is_some());
        errors.optional_text("description", args.description.as_deref(), DESCRIPTION_MAX);
        if let Some(amount) = args.amount {
            errors.positive_count("amount", amount);
        }

        // Compare the values the row will hold after the patch.
        let amount = args.amount.or(stored.as_ref().map(FinancialTransaction::amount));
        let paid_amount = args
            .paid_amount
            .or(stored.as_ref().and_then(FinancialTransaction::paid_amount));
        paid_within_amount(&mut errors, paid_amount, amount);
        Ok(errors)
    }

    async fn execute(&self, args: UpdateFinancialTransaction, scope: &AppScope) -> ExecResult<FinancialTransaction> {
        let mut entry = load::<FinancialTransaction>(scope, &args.id).await?;
        if let Some(description) = args.description {
            entry.set_description(description);
        }
        if let Some(amount) = args.amount {
            entry.set_amount(amount);
        }
        if args.paid_amount.is_some() {
            entry.set_paid_amount(args.paid_amount);
        }
        if args.due_date.is_some() {
            entry.set_due_date(args.due_date);
        }

        scope.uow().financial_transactions().update(entry.clone()).await?;
        scope.uow().save_changes().await?;

        info!(
            financial_transaction_id = %entry.id(),
            status = ?entry.status(),
            outstanding = entry.outstanding(),
            "financial transaction updated"
        );
        Ok(entry)
    }
}
