//! Inventory domain module: units of measure and unit-consistent product stock.

pub mod product;
pub mod unit;

pub use product::{Product, ProductVariant, effective_variant_stock};
pub use unit::{ConversionError, Dimension, UnitOfMeasure, convert};
