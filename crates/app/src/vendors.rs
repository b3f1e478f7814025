//! Suppliers the farm buys from.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::info;

use farmops_core::{Entity, ExecResult, VendorId};
use farmops_parties::{ContactInfo, Vendor};
use farmops_requests::{Request, RequestHandler, ValidationErrors};

use crate::scope::AppScope;
use crate::support::{NAME_MAX, contact_rules, load, peek};

#[derive(Debug, Clone, Deserialize)]
pub struct CreateVendor {
    pub name: String,
    pub contact_name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

impl Request for CreateVendor {
    type Output = Vendor;
}

/// Replaces every field of an existing vendor.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateVendor {
    pub id: VendorId,
    pub name: String,
    pub contact_name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

impl Request for UpdateVendor {
    type Output = Vendor;
}

fn vendor_rules(
    errors: &mut ValidationErrors,
    name: &str,
    contact_name: Option<&str>,
    phone: Option<&str>,
    email: Option<&str>,
) {
    errors.require_text("name", name, NAME_MAX);
    errors.max_len("contact_name", contact_name, NAME_MAX);
    contact_rules(errors, phone, email);
}

pub struct CreateVendorHandler;

#[async_trait]
impl RequestHandler<AppScope> for CreateVendorHandler {
    type Args = CreateVendor;

    async fn validate(&self, args: &CreateVendor, _scope: &AppScope) -> ExecResult<ValidationErrors> {
        let mut errors = ValidationErrors::new();
        vendor_rules(
            &mut errors,
            &args.name,
            args.contact_name.as_deref(),
            args.phone.as_deref(),
            args.email.as_deref(),
        );
        Ok(errors)
    }

    async fn execute(&self, args: CreateVendor, scope: &AppScope) -> ExecResult<Vendor> {
        let contact = ContactInfo {
            phone: args.phone,
            email: args.email,
        };
        let vendor = Vendor::new(scope.next_id(), args.name, args.contact_name, contact);

        scope.uow().vendors().create(vendor.clone()).await?;
        scope.uow().save_changes().await?;

        info!(vendor_id = %vendor.id(), "vendor created");
        Ok(vendor)
    }
}

pub struct UpdateVendorHandler;

#[async_trait]
impl RequestHandler<AppScope> for UpdateVendorHandler {
    type Args = UpdateVendor;

    async fn validate(&self, args: &UpdateVendor, scope: &AppScope) -> ExecResult<ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let existing = peek::<Vendor>(scope, &args.id).await?;
        errors.exists("id", Vendor::KIND, existing.is_some());
        vendor_rules(
            &mut errors,
            &args.name,
            args.contact_name.as_deref(),
            args.phone.as_deref(),
            args.email.as_deref(),
        );
        Ok(errors)
    }

    async fn execute(&self, args: UpdateVendor, scope: &AppScope) -> ExecResult<Vendor> {
        let mut vendor = load::<Vendor>(scope, &args.id).await?;
        vendor.rename(args.name);
        vendor.set_contact_name(args.contact_name);
        *vendor.contact_mut() = ContactInfo {
            phone: args.phone,
            email: args.email,
        };

        scope.uow().vendors().update(vendor.clone()).await?;
        scope.uow().save_changes().await?;

        info!(vendor_id = %vendor.id(), "vendor updated");
        Ok(vendor)
    }
}
