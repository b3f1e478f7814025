use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use farmops_core::{
    Choice, DomainError, DomainResult, Entity, PersonId, ProductVariantId, TransactionId, VendorId,
};

/// Direction of money.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionType {
    Income,
    Expense,
}

impl Choice for TransactionType {
    const ALL: &'static [Self] = &[TransactionType::Income, TransactionType::Expense];

    fn name(self) -> &'static str {
        match self {
            TransactionType::Income => "Income",
            TransactionType::Expense => "Expense",
        }
    }
}

/// `(quantity ?? 1) * unit_price`, rounded to the nearest minor unit.
///
/// `None` when the total is not a finite amount that fits in a `u64`.
pub fn total_amount(quantity: Option<f64>, unit_price: u64) -> Option<u64> {
    let Some(quantity) = quantity else {
        return Some(unit_price);
    };
    let total = (quantity * unit_price as f64).round();
    // 2^64 is exactly representable; anything at or above it does not fit.
    (total.is_finite() && total >= 0.0 && total < u64::MAX as f64).then_some(total as u64)
}

fn checked_total(quantity: Option<f64>, unit_price: u64) -> DomainResult<u64> {
    total_amount(quantity, unit_price).ok_or_else(|| {
        DomainError::invariant(format!("total of {quantity:?} x {unit_price} is out of range"))
    })
}

/// A broken transaction polarity rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolarityViolation {
    /// Buying a product variant is always an expense.
    VariantRequiresExpense,
    /// A product-variant purchase has a vendor side only.
    VariantForbidsCustomer,
    /// Income must say who paid.
    IncomeRequiresCustomer,
}

impl PolarityViolation {
    /// Argument the violation is reported against.
    pub fn field(self) -> &'static str {
        match self {
            PolarityViolation::VariantRequiresExpense => "transaction_type",
            PolarityViolation::VariantForbidsCustomer => "customer_id",
            PolarityViolation::IncomeRequiresCustomer => "customer_id",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            PolarityViolation::VariantRequiresExpense => {
                "transactions for a product variant must be of type Expense"
            }
            PolarityViolation::VariantForbidsCustomer => {
                "transactions for a product variant cannot have a customer"
            }
            PolarityViolation::IncomeRequiresCustomer => "income transactions require a customer",
        }
    }
}

/// Every polarity rule the combination breaks, in a stable order.
pub fn polarity_violations(
    transaction_type: TransactionType,
    has_customer: bool,
    has_product_variant: bool,
) -> Vec<PolarityViolation> {
    let mut violations = Vec::new();
    if has_product_variant && transaction_type != TransactionType::Expense {
        violations.push(PolarityViolation::VariantRequiresExpense);
    }
    if has_product_variant && has_customer {
        violations.push(PolarityViolation::VariantForbidsCustomer);
    }
    if transaction_type == TransactionType::Income && !has_customer {
        violations.push(PolarityViolation::IncomeRequiresCustomer);
    }
    violations
}

/// Construction input for `Transaction`.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionParts {
    pub transaction_type: TransactionType,
    pub description: String,
    pub quantity: Option<f64>,
    pub unit_price: u64,
    pub customer_id: Option<PersonId>,
    pub vendor_id: Option<VendorId>,
    pub product_variant_id: Option<ProductVariantId>,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transaction {
    id: TransactionId,
    transaction_type: TransactionType,
    description: String,
    quantity: Option<f64>,
    unit_price: u64,
    total_amount: u64,
    customer_id: Option<PersonId>,
    vendor_id: Option<VendorId>,
    product_variant_id: Option<ProductVariantId>,
    occurred_at: DateTime<Utc>,
}

impl Transaction {
    pub fn new(id: TransactionId, parts: TransactionParts) -> DomainResult<Self> {
        let total_amount = checked_total(parts.quantity, parts.unit_price)?;
        Ok(Self {
            id,
            transaction_type: parts.transaction_type,
            description: parts.description,
            quantity: parts.quantity,
            unit_price: parts.unit_price,
            total_amount,
            customer_id: parts.customer_id,
            vendor_id: parts.vendor_id,
            product_variant_id: parts.product_variant_id,
            occurred_at: parts.occurred_at,
        })
    }

    pub fn transaction_type(&self) -> TransactionType {
        self.transaction_type
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn quantity(&self) -> Option<f64> {
        self.quantity
    }

    pub fn unit_price(&self) -> u64 {
        self.unit_price
    }

    pub fn total_amount(&self) -> u64 {
        self.total_amount
    }

    pub fn customer_id(&self) -> Option<PersonId> {
        self.customer_id
    }

    pub fn vendor_id(&self) -> Option<VendorId> {
        self.vendor_id
    }

    pub fn product_variant_id(&self) -> Option<ProductVariantId> {
        self.product_variant_id
    }

    pub fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    /// Change quantity and/or unit price; the total follows. Nothing changes
    /// when the new total is out of range.
    pub fn reprice(&mut self, quantity: Option<f64>, unit_price: u64) -> DomainResult<()> {
        self.total_amount = checked_total(quantity, unit_price)?;
        self.quantity = quantity;
        self.unit_price = unit_price;
        Ok(())
    }
}

impl Entity for Transaction {
    type Id = TransactionId;

    const KIND: &'static str = "transaction";

    fn id(&self) -> &TransactionId {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn parts() -> TransactionParts {
        TransactionParts {
            transaction_type: TransactionType::Expense,
            description: "Feed".to_string(),
            quantity: Some(2.5),
            unit_price: 400,
            customer_id: None,
            vendor_id: None,
            product_variant_id: None,
            occurred_at: Utc::now(),
        }
    }

    #[test]
    fn total_defaults_quantity_to_one() {
        assert_eq!(total_amount(None, 1250), Some(1250));
        assert_eq!(total_amount(Some(3.0), 1250), Some(3750));
        assert_eq!(total_amount(Some(0.5), 3), Some(2));
        assert_eq!(total_amount(None, u64::MAX), Some(u64::MAX));
    }

    #[test]
    fn out_of_range_total_is_refused() {
        assert_eq!(total_amount(Some(4.0), u64::MAX / 2), None);
        assert_eq!(total_amount(Some(f64::INFINITY), 1), None);
        assert_eq!(total_amount(Some(f64::NAN), 1), None);

        let mut big = parts();
        big.quantity = Some(4.0);
        big.unit_price = u64::MAX / 2;
        let err = Transaction::new("00000000-0000-0000-0000-0000000000d2".parse().unwrap(), big).unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
    }

    #[test]
    fn reprice_recomputes_total() {
        let mut tx = Transaction::new("00000000-0000-0000-0000-0000000000d1".parse().unwrap(), parts()).unwrap();
        assert_eq!(tx.total_amount(), 1000);

        tx.reprice(None, 700).unwrap();
        assert_eq!(tx.total_amount(), 700);

        assert!(tx.reprice(Some(1e30), 700).is_err());
        assert_eq!(tx.total_amount(), 700);
        assert_eq!(tx.quantity(), None);
    }

    #[test]
    fn variant_purchase_must_be_expense_without_customer() {
        let violations = polarity_violations(TransactionType::Income, true, true);
        assert_eq!(
            violations,
            vec![
                PolarityViolation::VariantRequiresExpense,
                PolarityViolation::VariantForbidsCustomer,
            ]
        );
        assert!(polarity_violations(TransactionType::Expense, false, true).is_empty());
    }

    #[test]
    fn income_requires_customer() {
        assert_eq!(
            polarity_violations(TransactionType::Income, false, false),
            vec![PolarityViolation::IncomeRequiresCustomer]
        );
        assert!(polarity_violations(TransactionType::Income, true, false).is_empty());
        assert!(polarity_violations(TransactionType::Expense, false, false).is_empty());
    }

    proptest! {
        #[test]
        fn whole_quantities_multiply_exactly(quantity in 0u32..10_000, unit_price in 0u64..1_000_000) {
            prop_assert_eq!(total_amount(Some(f64::from(quantity)), unit_price), Some(u64::from(quantity) * unit_price));
        }
    }
}
