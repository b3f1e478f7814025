//! Units of measure and conversion between them.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use farmops_core::Choice;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dimension {
    Mass,
    Volume,
    Count,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitOfMeasure {
    Kilogram,
    Gram,
    Pound,
    Liter,
    Milliliter,
    Gallon,
    Unit,
    Piece,
}

impl UnitOfMeasure {
    pub fn dimension(self) -> Dimension {
        match self {
            UnitOfMeasure::Kilogram | UnitOfMeasure::Gram | UnitOfMeasure::Pound => Dimension::Mass,
            UnitOfMeasure::Liter | UnitOfMeasure::Milliliter | UnitOfMeasure::Gallon => {
                Dimension::Volume
            }
            UnitOfMeasure::Unit | UnitOfMeasure::Piece => Dimension::Count,
        }
    }

    /// Size of one of `self` in its dimension's base unit (gram, milliliter, unit).
    fn base_factor(self) -> f64 {
        match self {
            UnitOfMeasure::Kilogram => 1000.0,
            UnitOfMeasure::Gram => 1.0,
            UnitOfMeasure::Pound => 453.592_37,
            UnitOfMeasure::Liter => 1000.0,
            UnitOfMeasure::Milliliter => 1.0,
            UnitOfMeasure::Gallon => 3785.411_784,
            UnitOfMeasure::Unit | UnitOfMeasure::Piece => 1.0,
        }
    }

    pub fn is_convertible_to(self, other: UnitOfMeasure) -> bool {
        self.dimension() == other.dimension()
    }

    fn abbreviation(self) -> &'static str {
        match self {
            UnitOfMeasure::Kilogram => "kg",
            UnitOfMeasure::Gram => "g",
            UnitOfMeasure::Pound => "lb",
            UnitOfMeasure::Liter => "l",
            UnitOfMeasure::Milliliter => "ml",
            UnitOfMeasure::Gallon => "gal",
            UnitOfMeasure::Unit => "u",
            UnitOfMeasure::Piece => "pcs",
        }
    }
}

impl Choice for UnitOfMeasure {
    const ALL: &'static [Self] = &[
        UnitOfMeasure::Kilogram,
        UnitOfMeasure::Gram,
        UnitOfMeasure::Pound,
        UnitOfMeasure::Liter,
        UnitOfMeasure::Milliliter,
        UnitOfMeasure::Gallon,
        UnitOfMeasure::Unit,
        UnitOfMeasure::Piece,
    ];

    fn name(self) -> &'static str {
        match self {
            UnitOfMeasure::Kilogram => "Kilogram",
            UnitOfMeasure::Gram => "Gram",
            UnitOfMeasure::Pound => "Pound",
            UnitOfMeasure::Liter => "Liter",
            UnitOfMeasure::Milliliter => "Milliliter",
            UnitOfMeasure::Gallon => "Gallon",
            UnitOfMeasure::Unit => "Unit",
            UnitOfMeasure::Piece => "Piece",
        }
    }

    /// Accepts canonical names and abbreviations (`"kg"`, `"ml"`, ...).
    fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::ALL.iter().copied().find(|u| {
            u.name().eq_ignore_ascii_case(s) || u.abbreviation().eq_ignore_ascii_case(s)
        })
    }
}

#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum ConversionError {
    #[error("cannot convert {from:?} to {to:?}")]
    Incompatible {
        from: UnitOfMeasure,
        to: UnitOfMeasure,
    },

    #[error("cannot convert a negative quantity ({0})")]
    Negative(f64),

    #[error("cannot convert a non-finite quantity")]
    NotFinite,
}

/// Convert `quantity` from one unit to another.
///
/// Conversion goes through the dimension's base unit: multiply by the source
/// factor, divide by the target factor. Same-unit conversion returns the input
/// untouched.
pub fn convert(from: UnitOfMeasure, to: UnitOfMeasure, quantity: f64) -> Result<f64, ConversionError> {
    if !quantity.is_finite() {
        return Err(ConversionError::NotFinite);
    }
    if quantity < 0.0 {
        return Err(ConversionError::Negative(quantity));
    }
    if from == to {
        return Ok(quantity);
    }
    if !from.is_convertible_to(to) {
        return Err(ConversionError::Incompatible { from, to });
    }
    Ok(quantity * from.base_factor() / to.base_factor())
}
