mod common;

use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use farmops_app::financial_transactions::{CreateFinancialTransaction, UpdateFinancialTransaction};
use farmops_app::persons::{CreatePerson, UpdatePerson};
use farmops_app::product_variants::CreateProductVariant;
use farmops_app::products::CreateProduct;
use farmops_app::queries::{GetAllPersons, GetPersonById};
use farmops_app::transactions::{CreateTransaction, UpdateTransaction};
use farmops_app::vendors::CreateVendor;
use farmops_core::{Entity, PersonId, VendorId};
use farmops_finance::{PaymentStatus, Transaction, TransactionType};
use farmops_infra::Tracking;
use farmops_parties::Person;
use farmops_requests::{FailureKind, MediatorError, Request, ScopeFactory};

use common::{Farm, fields, noon};

fn person(name: &str) -> CreatePerson {
    CreatePerson {
        name: name.into(),
        phone: None,
        email: None,
        address: None,
    }
}

fn transaction(transaction_type: &str) -> CreateTransaction {
    CreateTransaction {
        transaction_type: transaction_type.into(),
        description: "Eggs".into(),
        quantity: None,
        unit_price: 250,
        customer_id: None,
        vendor_id: None,
        product_variant_id: None,
        occurred_at: None,
    }
}

#[tokio::test]
async fn invalid_command_reports_every_error_and_writes_nothing() {
    let farm = Farm::new();

    let result = farm
        .send(CreatePerson {
            name: "  ".into(),
            phone: Some("0".repeat(25)),
            email: Some("not-an-email".into()),
            address: None,
        })
        .await;

    assert!(!result.is_success());
    assert_eq!(result.failure(), Some(FailureKind::Validation));
    assert_eq!(fields(&result), ["name", "phone", "email"]);
    assert!(result.value().is_none());
    assert_eq!(farm.db.count::<Person>(), 0);
    assert_eq!(farm.db.commit_count(), 0);
}

#[tokio::test]
async fn created_entities_use_injected_ids() {
    let farm = Farm::new();

    let alice = farm.ok(person("Alice")).await;

    assert_eq!(*alice.id(), PersonId::from(Uuid::from_u128(1)));
    let found = farm.ok(GetPersonById::new(*alice.id())).await;
    assert_eq!(found, Some(alice));
}

#[tokio::test]
async fn missing_lookup_is_a_successful_none() {
    let farm = Farm::new();

    let result = farm.send(GetPersonById::new(PersonId::from(Uuid::from_u128(42)))).await;

    assert!(result.is_success());
    assert_eq!(result.into_value(), Some(None));
}

#[tokio::test]
async fn update_of_unknown_id_is_a_field_error() {
    let farm = Farm::new();

    let result = farm
        .send(UpdatePerson {
            id: PersonId::from(Uuid::from_u128(7)),
            name: "Nobody".into(),
            phone: None,
            email: None,
            address: None,
        })
        .await;

    assert_eq!(fields(&result), ["id"]);
    assert_eq!(result.validation_errors().for_field("id").next(), Some("person does not exist"));
}

#[tokio::test]
async fn update_replaces_person_fields() {
    let farm = Farm::new();
    let alice = farm.ok(person("Alice")).await;

    let updated = farm
        .ok(UpdatePerson {
            id: *alice.id(),
            name: "Alice Smith".into(),
            phone: Some("555-0100".into()),
            email: Some("alice@example.com".into()),
            address: None,
        })
        .await;

    assert_eq!(updated.name(), "Alice Smith");
    assert_eq!(updated.contact().email.as_deref(), Some("alice@example.com"));
    assert_eq!(farm.ok(GetAllPersons::new()).await, vec![updated]);
}

#[tokio::test]
async fn income_requires_a_customer() {
    let farm = Farm::new();

    let result = farm.send(transaction("income")).await;

    assert_eq!(fields(&result), ["customer_id"]);
    assert_eq!(
        result.validation_errors().for_field("customer_id").next(),
        Some("income transactions require a customer")
    );
}

#[tokio::test]
async fn income_with_customer_is_recorded_with_total() {
    let farm = Farm::new();
    let alice = farm.ok(person("Alice")).await;

    let tx = farm
        .ok(CreateTransaction {
            quantity: Some(12.0),
            customer_id: Some(*alice.id()),
            ..transaction("Income")
        })
        .await;

    assert_eq!(tx.transaction_type(), TransactionType::Income);
    assert_eq!(tx.total_amount(), 3000);
    assert_eq!(tx.occurred_at(), noon());
}

#[tokio::test]
async fn variant_purchase_must_be_expense_without_customer() {
    let farm = Farm::new();
    let alice = farm.ok(person("Alice")).await;
    let feed = farm
        .ok(CreateProduct {
            name: "Feed".into(),
            unit: "kg".into(),
            stock: 0.0,
            vendor_id: None,
        })
        .await;
    let bag = farm
        .ok(CreateProductVariant {
            product_id: *feed.id(),
            name: "25 kg sack".into(),
            unit: "kg".into(),
            quantity: 25.0,
            stock: 1.0,
        })
        .await;

    let rejected = farm
        .send(CreateTransaction {
            customer_id: Some(*alice.id()),
            product_variant_id: Some(*bag.id()),
            ..transaction("Income")
        })
        .await;
    assert_eq!(fields(&rejected), ["transaction_type", "customer_id"]);

    let purchase = farm
        .ok(CreateTransaction {
            quantity: Some(3.0),
            product_variant_id: Some(*bag.id()),
            ..transaction("Expense")
        })
        .await;
    assert_eq!(purchase.total_amount(), 750);
}

#[tokio::test]
async fn dangling_references_are_field_errors() {
    let farm = Farm::new();

    let result = farm
        .send(CreateTransaction {
            vendor_id: Some(VendorId::from(Uuid::from_u128(99))),
            ..transaction("Expense")
        })
        .await;

    assert_eq!(fields(&result), ["vendor_id"]);
    assert_eq!(result.validation_errors().for_field("vendor_id").next(), Some("vendor does not exist"));
}

#[tokio::test]
async fn unknown_transaction_type_lists_the_options() {
    let farm = Farm::new();

    let result = farm.send(transaction("Refund")).await;

    let message = result.validation_errors().for_field("transaction_type").next().unwrap();
    assert!(message.contains("Income, Expense"), "{message}");
}

#[tokio::test]
async fn repricing_recomputes_total() {
    let farm = Farm::new();
    let vendor = farm
        .ok(CreateVendor {
            name: "Mill & Co".into(),
            contact_name: None,
            phone: None,
            email: None,
        })
        .await;
    let tx = farm
        .ok(CreateTransaction {
            vendor_id: Some(*vendor.id()),
            quantity: Some(2.0),
            ..transaction("Expense")
        })
        .await;

    let repriced = farm
        .ok(UpdateTransaction {
            id: *tx.id(),
            description: None,
            quantity: None,
            unit_price: Some(400),
        })
        .await;

    assert_eq!(repriced.total_amount(), 800);
    assert_eq!(repriced.description(), "Eggs");
}

#[tokio::test]
async fn totals_beyond_the_money_range_are_rejected() {
    let farm = Farm::new();

    let result = farm
        .send(CreateTransaction {
            quantity: Some(4.0),
            unit_price: u64::MAX / 2,
            ..transaction("Expense")
        })
        .await;
    assert_eq!(fields(&result), ["unit_price"]);
    assert_eq!(farm.db.count::<Transaction>(), 0);

    let tx = farm
        .ok(CreateTransaction {
            quantity: Some(2.0),
            ..transaction("Expense")
        })
        .await;

    // The stored quantity still applies when only the price changes.
    let result = farm
        .send(UpdateTransaction {
            id: *tx.id(),
            description: None,
            quantity: None,
            unit_price: Some(u64::MAX),
        })
        .await;
    assert_eq!(fields(&result), ["unit_price"]);
    assert_eq!(farm.db.find::<Transaction>(tx.id()).unwrap().total_amount(), 500);
}

#[tokio::test]
async fn financial_status_follows_payments() {
    let farm = Farm::new();
    let entry = farm
        .ok(CreateFinancialTransaction {
            description: "Vet visit".into(),
            amount: 100,
            paid_amount: None,
            person_id: None,
            due_date: None,
        })
        .await;
    assert_eq!(entry.status(), PaymentStatus::Pending);

    let pay = |paid| UpdateFinancialTransaction {
        id: *entry.id(),
        description: None,
        amount: None,
        paid_amount: Some(paid),
        due_date: None,
    };

    assert_eq!(farm.ok(pay(50)).await.status(), PaymentStatus::PartiallyPaid);
    assert_eq!(farm.ok(pay(100)).await.status(), PaymentStatus::Paid);

    let overpaid = farm.send(pay(150)).await;
    assert_eq!(fields(&overpaid), ["paid_amount"]);
}

#[tokio::test]
async fn lowering_amount_below_paid_is_rejected() {
    let farm = Farm::new();
    let entry = farm
        .ok(CreateFinancialTransaction {
            description: "Fencing".into(),
            amount: 500,
            paid_amount: Some(300),
            person_id: None,
            due_date: None,
        })
        .await;

    let result = farm
        .send(UpdateFinancialTransaction {
            id: *entry.id(),
            description: None,
            amount: Some(200),
            paid_amount: None,
            due_date: None,
        })
        .await;

    assert_eq!(fields(&result), ["paid_amount"]);
}

#[tokio::test]
async fn unregistered_request_is_a_configuration_error() {
    struct Unrouted;

    impl Request for Unrouted {
        type Output = ();
    }

    let farm = Farm::new();

    let err = farm.mediator.send(Unrouted).await.unwrap_err();

    assert!(matches!(err, MediatorError::HandlerNotRegistered(_)));
}

#[tokio::test]
async fn cancelled_request_does_nothing() {
    let farm = Farm::new();
    let cancel = CancellationToken::new();
    cancel.cancel();

    let result = farm
        .mediator
        .send_with_cancellation(person("Alice"), cancel)
        .await
        .unwrap();

    assert_eq!(result.failure(), Some(FailureKind::Cancelled));
    assert_eq!(farm.db.count::<Person>(), 0);
}

#[tokio::test]
async fn concurrent_tracked_updates_conflict() {
    let farm = Farm::new();
    let alice = farm.ok(person("Alice")).await;

    let first = farm.factory.create_scope(CancellationToken::new());
    let second = farm.factory.create_scope(CancellationToken::new());
    let mut a = first.uow().persons().get_by_id(alice.id(), Tracking::Tracked).await.unwrap().unwrap();
    let mut b = second.uow().persons().get_by_id(alice.id(), Tracking::Tracked).await.unwrap().unwrap();
    a.rename("Alicia");
    b.rename("Ally");
    first.uow().persons().update(a).await.unwrap();
    second.uow().persons().update(b).await.unwrap();

    first.uow().save_changes().await.unwrap();
    let err = farmops_core::ExecutionError::from(second.uow().save_changes().await.unwrap_err());

    assert!(matches!(err, farmops_core::ExecutionError::Conflict(_)));
    assert_eq!(farm.db.find::<Person>(alice.id()).unwrap().name(), "Alicia");
}
