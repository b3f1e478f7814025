use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::info;

use farmops_core::{Entity, ExecResult, PersonId, ProductVariantId, TransactionId, VendorId};
use farmops_finance::{Transaction, TransactionParts, TransactionType, polarity_violations, total_amount};
use farmops_inventory::ProductVariant;
use farmops_parties::{Person, Vendor};
use farmops_requests::{Request, RequestHandler, ValidationErrors};

use crate::scope::AppScope;
use crate::support::{DESCRIPTION_MAX, check_reference, load, parse_choice, peek};

#[derive(Debug, Clone, Deserialize)]
pub struct CreateTransaction {
    /// `"Income"` or `"Expense"`, any case.
    pub transaction_type: String,
    pub description: String,
    pub quantity: Option<f64>,
    /// Minor currency units.
    pub unit_price: u64,
    pub customer_id: Option<PersonId>,
    pub vendor_id: Option<VendorId>,
    pub product_variant_id: Option<ProductVariantId>,
    /// Defaults to the time the request executes.
    pub occurred_at: Option<DateTime<Utc>>,
}

impl Request for CreateTransaction {
    type Output = Transaction;
}

/// Patch; changing quantity or price recomputes the total.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateTransaction {
    pub id: TransactionId,
    pub description: Option<String>,
    pub quantity: Option<f64>,
    pub unit_price: Option<u64>,
}

impl Request for UpdateTransaction {
    type Output = Transaction;
}

/// Quantity and price must multiply to a representable total.
fn total_rule(errors: &mut ValidationErrors, quantity: Option<f64>, unit_price: u64) {
    // Bad quantities are already reported on their own field.
    if quantity.is_some_and(|q| !q.is_finite() || q <= 0.0) {
        return;
    }
    errors.check(
        total_amount(quantity, unit_price).is_none(),
        "unit_price",
        "quantity x unit_price exceeds the largest representable amount",
    );
}

pub struct CreateTransactionHandler;

#[async_trait]
impl RequestHandler<AppScope> for CreateTransactionHandler {
    type Args = CreateTransaction;

    async fn validate(&self, args: &CreateTransaction, scope: &AppScope) -> ExecResult<ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let transaction_type = errors.choice::<TransactionType>("transaction_type", &args.transaction_type);
        errors.require_text("description", &args.description, DESCRIPTION_MAX);
        errors.positive_count("unit_price", args.unit_price);
        if let Some(quantity) = args.quantity {
            errors.positive("quantity", quantity);
        }
        total_rule(&mut errors, args.quantity, args.unit_price);

        check_reference::<Person>(&mut errors, scope, "customer_id", args.customer_id.as_ref()).await?;
        check_reference::<Vendor>(&mut errors, scope, "vendor_id", args.vendor_id.as_ref()).await?;
        check_reference::<ProductVariant>(
            &mut errors,
            scope,
            "product_variant_id",
            args.product_variant_id.as_ref(),
        )
        .await?;

        if let Some(transaction_type) = transaction_type {
            let violations = polarity_violations(
                transaction_type,
                args.customer_id.is_some(),
                args.product_variant_id.is_some(),
            );
            for violation in violations {
                errors.push(violation.field(), violation.message());
            }
        }
        Ok(errors)
    }

    async fn execute(&self, args: CreateTransaction, scope: &AppScope) -> ExecResult<Transaction> {
        let parts = TransactionParts {
            transaction_type: parse_choice("transaction_type", &args.transaction_type)?,
            description: args.description,
            quantity: args.quantity,
            unit_price: args.unit_price,
            customer_id: args.customer_id,
            vendor_id: args.vendor_id,
            product_variant_id: args.product_variant_id,
            occurred_at: args.occurred_at.unwrap_or_else(|| scope.now()),
        };
        let transaction = Transaction::new(scope.next_id(), parts)?;

        scope.uow().transactions().create(transaction.clone()).await?;
        scope.uow().save_changes().await?;

        info!(
            transaction_id = %transaction.id(),
            total_amount = transaction.total_amount(),
            "transaction recorded"
        );
        Ok(transaction)
    }
}

pub struct UpdateTransactionHandler;

#[async_trait]
impl RequestHandler<AppScope> for UpdateTransactionHandler {
    type Args = UpdateTransaction;

    async fn validate(&self, args: &UpdateTransaction, scope: &AppScope) -> ExecResult<ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let existing = peek::<Transaction>(scope, &args.id).await?;
        errors.exists("id", Transaction::KIND, existing.is_some());
        errors.optional_text("description", args.description.as_deref(), DESCRIPTION_MAX);
        if let Some(quantity) = args.quantity {
            errors.positive("quantity", quantity);
        }
        if let Some(unit_price) = args.unit_price {
            errors.positive_count("unit_price", unit_price);
        }
        if let Some(existing) = existing {
            let quantity = args.quantity.or(existing.quantity());
            let unit_price = args.unit_price.unwrap_or(existing.unit_price());
            total_rule(&mut errors, quantity, unit_price);
        }
        Ok(errors)
    }

    async fn execute(&self, args: UpdateTransaction, scope: &AppScope) -> ExecResult<Transaction> {
        let mut transaction = load::<Transaction>(scope, &args.id).await?;
        if let Some(description) = args.description {
            transaction.set_description(description);
        }
        if args.quantity.is_some() || args.unit_price.is_some() {
            let quantity = args.quantity.or(transaction.quantity());
            let unit_price = args.unit_price.unwrap_or(transaction.unit_price());
            transaction.reprice(quantity, unit_price)?;
        }

        scope.uow().transactions().update(transaction.clone()).await?;
        scope.uow().save_changes().await?;

        info!(
            transaction_id = %transaction.id(),
            total_amount = transaction.total_amount(),
            "transaction updated"
        );
        Ok(transaction)
    }
}
