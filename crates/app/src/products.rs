use async_trait::async_trait;
use serde::Deserialize;
use tracing::info;

use farmops_core::{Entity, ExecResult, ProductId, VendorId};
use farmops_inventory::{Product, UnitOfMeasure};
use farmops_parties::Vendor;
use farmops_requests::{Request, RequestHandler, ValidationErrors};

use crate::scope::AppScope;
use crate::support::{NAME_MAX, check_reference, load, parse_choice, peek};

#[derive(Debug, Clone, Deserialize)]
pub struct CreateProduct {
    pub name: String,
    /// Unit name or abbreviation (`"Kilogram"`, `"kg"`).
    pub unit: String,
    #[serde(default)]
    pub stock: f64,
    pub vendor_id: Option<VendorId>,
}

impl Request for CreateProduct {
    type Output = Product;
}

/// Patch: unset fields are left alone. Stock and unit only move through
/// variants and consumption.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateProduct {
    pub id: ProductId,
    pub name: Option<String>,
    pub vendor_id: Option<VendorId>,
}

impl Request for UpdateProduct {
    type Output = Product;
}

pub struct CreateProductHandler;

#[async_trait]
impl RequestHandler<AppScope> for CreateProductHandler {
    type Args = CreateProduct;

    async fn validate(&self, args: &CreateProduct, scope: &AppScope) -> ExecResult<ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.require_text("name", &args.name, NAME_MAX);
        errors.choice::<UnitOfMeasure>("unit", &args.unit);
        errors.non_negative("stock", args.stock);
        check_reference::<Vendor>(&mut errors, scope, "vendor_id", args.vendor_id.as_ref()).await?;
        Ok(errors)
    }

    async fn execute(&self, args: CreateProduct, scope: &AppScope) -> ExecResult<Product> {
        let unit = parse_choice::<UnitOfMeasure>("unit", &args.unit)?;
        let product = Product::new(scope.next_id(), args.name, unit, args.stock, args.vendor_id);

        scope.uow().products().create(product.clone()).await?;
        scope.uow().save_changes().await?;

        info!(product_id = %product.id(), unit = ?unit, "product created");
        Ok(product)
    }
}

pub struct UpdateProductHandler;

#[async_trait]
impl RequestHandler<AppScope> for UpdateProductHandler {
    type Args = UpdateProduct;

    async fn validate(&self, args: &UpdateProduct, scope: &AppScope) -> ExecResult<ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let existing = peek::<Product>(scope, &args.id).await?;
        errors.exists("id", Product::KIND, existing.is_some());
        errors.optional_text("name", args.name.as_deref(), NAME_MAX);
        check_reference::<Vendor>(&mut errors, scope, "vendor_id", args.vendor_id.as_ref()).await?;
        Ok(errors)
    }

    async fn execute(&self, args: UpdateProduct, scope: &AppScope) -> ExecResult<Product> {
        let mut product = load::<Product>(scope, &args.id).await?;
        if let Some(name) = args.name {
            product.rename(name);
        }
        if let Some(vendor_id) = args.vendor_id {
            product.set_vendor(Some(vendor_id));
        }

        scope.uow().products().update(product.clone()).await?;
        scope.uow().save_changes().await?;

        info!(product_id = %product.id(), "product updated");
        Ok(product)
    }
}
