//! People the farm deals with (customers, payees).

use async_trait::async_trait;
use serde::Deserialize;
use tracing::info;

use farmops_core::{Entity, ExecResult, PersonId};
use farmops_parties::{ContactInfo, Person};
use farmops_requests::{Request, RequestHandler, ValidationErrors};

use crate::scope::AppScope;
use crate::support::{NAME_MAX, contact_rules, load, peek};

const ADDRESS_MAX: usize = 200;

#[derive(Debug, Clone, Deserialize)]
pub struct CreatePerson {
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
}

impl Request for CreatePerson {
    type Output = Person;
}

/// Replaces every field of an existing person.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdatePerson {
    pub id: PersonId,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
}

impl Request for UpdatePerson {
    type Output = Person;
}

fn person_rules(
    errors: &mut ValidationErrors,
    name: &str,
    phone: Option<&str>,
    email: Option<&str>,
    address: Option<&str>,
) {
    errors.require_text("name", name, NAME_MAX);
    contact_rules(errors, phone, email);
    errors.max_len("address", address, ADDRESS_MAX);
}

pub struct CreatePersonHandler;

#[async_trait]
impl RequestHandler<AppScope> for CreatePersonHandler {
    type Args = CreatePerson;

    async fn validate(&self, args: &CreatePerson, _scope: &AppScope) -> ExecResult<ValidationErrors> {
        let mut errors = ValidationErrors::new();
        person_rules(
            &mut errors,
            &args.name,
            args.phone.as_deref(),
            args.email.as_deref(),
            args.address.as_deref(),
        );
        Ok(errors)
    }

    async fn execute(&self, args: CreatePerson, scope: &AppScope) -> ExecResult<Person> {
        let contact = ContactInfo {
            phone: args.phone,
            email: args.email,
        };
        let person = Person::new(scope.next_id(), args.name, contact, args.address);

        scope.uow().persons().create(person.clone()).await?;
        scope.uow().save_changes().await?;

        info!(person_id = %person.id(), "person created");
        Ok(person)
    }
}

pub struct UpdatePersonHandler;

#[async_trait]
impl RequestHandler<AppScope> for UpdatePersonHandler {
    type Args = UpdatePerson;

    async fn validate(&self, args: &UpdatePerson, scope: &AppScope) -> ExecResult<ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let existing = peek::<Person>(scope, &args.id).await?;
        errors.exists("id", Person::KIND, existing.is_some());
        person_rules(
            &mut errors,
            &args.name,
            args.phone.as_deref(),
            args.email.as_deref(),
            args.address.as_deref(),
        );
        Ok(errors)
    }

    async fn execute(&self, args: UpdatePerson, scope: &AppScope) -> ExecResult<Person> {
        let mut person = load::<Person>(scope, &args.id).await?;
        person.rename(args.name);
        *person.contact_mut() = ContactInfo {
            phone: args.phone,
            email: args.email,
        };
        person.set_address(args.address);

        scope.uow().persons().update(person.clone()).await?;
        scope.uow().save_changes().await?;

        info!(person_id = %person.id(), "person updated");
        Ok(person)
    }
}
