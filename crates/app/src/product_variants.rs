//! Packaged forms of a product.
//!
//! Creating a variant is a compound write: the variant row and the parent's
//! stock increment commit together or not at all.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::info;

use farmops_core::{Choice, Entity, ExecResult, ExecutionError, ProductId, ProductVariantId};
use farmops_inventory::{Product, ProductVariant, UnitOfMeasure};
use farmops_requests::{Request, RequestHandler, ValidationErrors};

use crate::scope::AppScope;
use crate::support::{NAME_MAX, load, parse_choice, peek};

#[derive(Debug, Clone, Deserialize)]
pub struct CreateProductVariant {
    pub product_id: ProductId,
    pub name: String,
    pub unit: String,
    /// Package size in `unit`.
    pub quantity: f64,
    /// Packages on hand.
    #[serde(default)]
    pub stock: f64,
}

impl Request for CreateProductVariant {
    type Output = ProductVariant;
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateProductVariant {
    pub id: ProductVariantId,
    pub name: Option<String>,
}

impl Request for UpdateProductVariant {
    type Output = ProductVariant;
}

pub struct CreateProductVariantHandler;

#[async_trait]
impl RequestHandler<AppScope> for CreateProductVariantHandler {
    type Args = CreateProductVariant;

    async fn validate(&self, args: &CreateProductVariant, scope: &AppScope) -> ExecResult<ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.require_text("name", &args.name, NAME_MAX);
        errors.positive("quantity", args.quantity);
        errors.non_negative("stock", args.stock);
        let unit = errors.choice::<UnitOfMeasure>("unit", &args.unit);

        let product = peek::<Product>(scope, &args.product_id).await?;
        errors.exists("product_id", Product::KIND, product.is_some());

        if let (Some(product), Some(unit)) = (product, unit) {
            errors.check(
                !unit.is_convertible_to(product.unit()),
                "unit",
                format!(
                    "{} cannot be converted to the product's unit ({})",
                    unit.name(),
                    product.unit().name()
                ),
            );
        }
        Ok(errors)
    }

    async fn execute(&self, args: CreateProductVariant, scope: &AppScope) -> ExecResult<ProductVariant> {
        let unit = parse_choice::<UnitOfMeasure>("unit", &args.unit)?;
        let mut product = load::<Product>(scope, &args.product_id).await?;

        let variant = product
            .add_variant(scope.next_id(), args.name, unit, args.quantity, args.stock)
            .map_err(|err| ExecutionError::internal(format!("variant stock rejected: {err}")))?;

        scope.uow().product_variants().create(variant.clone()).await?;
        scope.uow().products().update(product.clone()).await?;
        scope.uow().save_changes().await?;

        info!(
            product_id = %product.id(),
            variant_id = %variant.id(),
            product_stock = product.stock(),
            "product variant created"
        );
        Ok(variant)
    }
}

pub struct UpdateProductVariantHandler;

#[async_trait]
impl RequestHandler<AppScope> for UpdateProductVariantHandler {
    type Args = UpdateProductVariant;

    async fn validate(&self, args: &UpdateProductVariant, scope: &AppScope) -> ExecResult<ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let existing = peek::<ProductVariant>(scope, &args.id).await?;
        errors.exists("id", ProductVariant::KIND, existing.is_some());
        errors.optional_text("name", args.name.as_deref(), NAME_MAX);
        Ok(errors)
    }

    async fn execute(&self, args: UpdateProductVariant, scope: &AppScope) -> ExecResult<ProductVariant> {
        let mut variant = load::<ProductVariant>(scope, &args.id).await?;
        if let Some(name) = args.name {
            variant.rename(name);
        }

        scope.uow().product_variants().update(variant.clone()).await?;
        scope.uow().save_changes().await?;

        info!(variant_id = %variant.id(), "product variant updated");
        Ok(variant)
    }
}
