use serde::Serialize;

use farmops_core::{DomainError, DomainResult, Entity, ProductId, ProductVariantId, VendorId};

use crate::unit::{ConversionError, UnitOfMeasure, convert};

/// Aggregate root: a stocked product.
///
/// `stock` is always expressed in the product's own `unit`. It moves only through
/// variant creation (`add_variant`) and consumption; it is never set directly.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Product {
    id: ProductId,
    name: String,
    unit: UnitOfMeasure,
    stock: f64,
    vendor_id: Option<VendorId>,
}

impl Product {
    pub fn new(
        id: ProductId,
        name: impl Into<String>,
        unit: UnitOfMeasure,
        stock: f64,
        vendor_id: Option<VendorId>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            unit,
            stock,
            vendor_id,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn unit(&self) -> UnitOfMeasure {
        self.unit
    }

    pub fn stock(&self) -> f64 {
        self.stock
    }

    pub fn vendor_id(&self) -> Option<VendorId> {
        self.vendor_id
    }

    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn set_vendor(&mut self, vendor_id: Option<VendorId>) {
        self.vendor_id = vendor_id;
    }

    /// Create a variant and add its effective stock to this product.
    ///
    /// The effective quantity is converted into the product's unit *before*
    /// anything changes: if the conversion fails, neither the product nor a
    /// variant comes out of this call.
    pub fn add_variant(
        &mut self,
        id: ProductVariantId,
        name: impl Into<String>,
        unit: UnitOfMeasure,
        quantity: f64,
        stock: f64,
    ) -> Result<ProductVariant, ConversionError> {
        let effective = effective_variant_stock(stock, quantity);
        let increment = convert(unit, self.unit, effective)?;

        self.stock += increment;
        Ok(ProductVariant {
            id,
            product_id: self.id,
            name: name.into(),
            unit,
            quantity,
            stock: effective,
        })
    }

    /// Remove `quantity` (in the product's unit) from stock.
    pub fn consume(&mut self, quantity: f64) -> DomainResult<()> {
        if quantity > self.stock {
            return Err(DomainError::invariant(format!(
                "cannot consume {quantity} {:?} of '{}': only {} in stock",
                self.unit, self.name, self.stock
            )));
        }
        self.stock -= quantity;
        Ok(())
    }
}

impl Entity for Product {
    type Id = ProductId;

    const KIND: &'static str = "product";

    fn id(&self) -> &ProductId {
        &self.id
    }
}

/// A packaged form of a product (e.g. a 3 kg bag of a feed stocked in grams).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductVariant {
    id: ProductVariantId,
    product_id: ProductId,
    name: String,
    unit: UnitOfMeasure,
    quantity: f64,
    stock: f64,
}

impl ProductVariant {
    pub fn product_id(&self) -> ProductId {
        self.product_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn unit(&self) -> UnitOfMeasure {
        self.unit
    }

    /// Size of one package, in `unit`.
    pub fn quantity(&self) -> f64 {
        self.quantity
    }

    pub fn stock(&self) -> f64 {
        self.stock
    }

    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }
}

impl Entity for ProductVariant {
    type Id = ProductVariantId;

    const KIND: &'static str = "product_variant";

    fn id(&self) -> &ProductVariantId {
        &self.id
    }
}

/// Stock a new variant contributes: the declared stock plus stock × package size.
pub fn effective_variant_stock(stock: f64, quantity: f64) -> f64 {
    stock + stock * quantity
}
