//! Unit representation and conversion errors

use std::fmt;
use serde::{Serialize, Deserialize};
use tally_core::{TallyError, codes};
use thiserror::Error;

/// Default number of fractional digits shown for linear quantities
pub const LINEAR_DECIMALS: u32 = 6;

/// Most fractional digits a unit may display; an f64 carries no more
pub const MAX_DECIMALS: u32 = 15;

/// A unit of one physical quantity, expressed relative to that quantity's pivot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    /// The unit symbol (e.g., "m", "kg", "mi")
    pub symbol: String,
    /// The unit name (e.g., "meter", "kilogram", "mile")
    pub name: String,
    /// Multiplier that converts a value in this unit to the pivot unit
    pub scale_to_base: f64,
    /// Fractional digits used when rendering a value in this unit
    pub display_decimals: u32,
}

impl Unit {
    pub fn new(symbol: &str, name: &str, scale_to_base: f64) -> Self {
        Unit {
            symbol: symbol.to_string(),
            name: name.to_string(),
            scale_to_base,
            display_decimals: LINEAR_DECIMALS,
        }
    }

    pub fn with_decimals(mut self, decimals: u32) -> Self {
        self.display_decimals = decimals;
        self
    }

    /// Is this the pivot unit of its registry
    pub fn is_pivot(&self) -> bool {
        self.scale_to_base == 1.0
    }

    /// Convert a value in this unit to the pivot unit
    pub fn to_base(&self, value: f64) -> f64 {
        value * self.scale_to_base
    }

    /// Convert a value in the pivot unit to this unit
    pub fn from_base(&self, value: f64) -> f64 {
        value / self.scale_to_base
    }

    /// Convert a value from this unit to another unit of the same quantity
    pub fn convert_to(&self, value: f64, target: &Unit) -> f64 {
        target.from_base(self.to_base(value))
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol)
    }
}

/// Errors raised by the conversion engine
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConversionError {
    #[error("Unknown unit: {0}")]
    UnknownUnit(String),

    #[error("Invalid scale {scale} for unit '{symbol}': must be finite and positive")]
    InvalidScale { symbol: String, scale: f64 },

    #[error("Invalid precision {decimals} for unit '{symbol}': at most {max} decimals", max = MAX_DECIMALS)]
    InvalidDecimals { symbol: String, decimals: u32 },

    #[error("Unit '{0}' would become a second pivot (scale 1)")]
    DuplicatePivot(String),

    #[error("Pivot unit '{0}' cannot be replaced")]
    PivotLocked(String),

    #[error("Value is not a finite number")]
    NonFinite,

    #[error("Exchange rates unavailable: {0}")]
    RatesUnavailable(String),

    #[error("{0} converter does not support this operation")]
    Unsupported(String),

    #[error("Unknown preset: {0}")]
    UnknownPreset(String),
}

impl From<ConversionError> for TallyError {
    fn from(err: ConversionError) -> Self {
        match &err {
            ConversionError::UnknownUnit(symbol) => TallyError::unknown_unit(symbol),
            ConversionError::InvalidScale { .. }
            | ConversionError::InvalidDecimals { .. }
            | ConversionError::DuplicatePivot(_)
            | ConversionError::PivotLocked(_) => TallyError::new(codes::INVALID_UNIT, err.to_string()),
            ConversionError::NonFinite => TallyError::parse_error(err.to_string()),
            ConversionError::RatesUnavailable(_) => TallyError::new(codes::RATE_REFRESH, err.to_string()),
            ConversionError::Unsupported(_) => TallyError::new(codes::INVALID_UNIT, err.to_string()),
            ConversionError::UnknownPreset(_) => TallyError::new(codes::UNKNOWN_PRESET, err.to_string())
                .with_suggestion("Save it first with 'preset save <name> <from> <to>'"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_through_pivot() {
        let km = Unit::new("km", "kilometer", 1000.0);
        let m = Unit::new("m", "meter", 1.0);
        assert_eq!(km.convert_to(1.5, &m), 1500.0);
        assert_eq!(m.convert_to(250.0, &km), 0.25);
        assert!(m.is_pivot());
        assert!(!km.is_pivot());
    }

    #[test]
    fn test_error_codes() {
        let err: TallyError = ConversionError::UnknownUnit("zz".into()).into();
        assert_eq!(err.code, codes::UNKNOWN_UNIT);
        let err: TallyError = ConversionError::PivotLocked("m".into()).into();
        assert_eq!(err.code, codes::INVALID_UNIT);
    }
}
