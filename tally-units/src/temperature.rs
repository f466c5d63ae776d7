//! Temperature scales, converted through Celsius

use std::fmt;
use serde::{Serialize, Deserialize};
use crate::ConversionError;

/// Fractional digits shown for temperatures
pub const TEMPERATURE_DECIMALS: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TemperatureScale {
    Celsius,
    Fahrenheit,
    Kelvin,
    Rankine,
    Reaumur,
}

impl TemperatureScale {
    pub const ALL: [TemperatureScale; 5] = [
        TemperatureScale::Celsius,
        TemperatureScale::Fahrenheit,
        TemperatureScale::Kelvin,
        TemperatureScale::Rankine,
        TemperatureScale::Reaumur,
    ];

    pub fn symbol(&self) -> &'static str {
        match self {
            TemperatureScale::Celsius => "C",
            TemperatureScale::Fahrenheit => "F",
            TemperatureScale::Kelvin => "K",
            TemperatureScale::Rankine => "Ra",
            TemperatureScale::Reaumur => "Re",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            TemperatureScale::Celsius => "Celsius",
            TemperatureScale::Fahrenheit => "Fahrenheit",
            TemperatureScale::Kelvin => "Kelvin",
            TemperatureScale::Rankine => "Rankine",
            TemperatureScale::Reaumur => "Reaumur",
        }
    }

    pub fn from_symbol(symbol: &str) -> Result<Self, ConversionError> {
        let trimmed = symbol.trim().trim_start_matches('°');
        match trimmed {
            "C" | "c" | "celsius" | "Celsius" => Ok(TemperatureScale::Celsius),
            "F" | "f" | "fahrenheit" | "Fahrenheit" => Ok(TemperatureScale::Fahrenheit),
            "K" | "k" | "kelvin" | "Kelvin" => Ok(TemperatureScale::Kelvin),
            "Ra" | "R" | "rankine" | "Rankine" => Ok(TemperatureScale::Rankine),
            "Re" | "Ré" | "reaumur" | "Reaumur" => Ok(TemperatureScale::Reaumur),
            _ => Err(ConversionError::UnknownUnit(symbol.trim().to_string())),
        }
    }

    pub fn to_celsius(&self, value: f64) -> f64 {
        match self {
            TemperatureScale::Celsius => value,
            TemperatureScale::Fahrenheit => (value - 32.0) * 5.0 / 9.0,
            TemperatureScale::Kelvin => value - 273.15,
            TemperatureScale::Rankine => (value - 491.67) * 5.0 / 9.0,
            TemperatureScale::Reaumur => value * 5.0 / 4.0,
        }
    }

    pub fn from_celsius(&self, celsius: f64) -> f64 {
        match self {
            TemperatureScale::Celsius => celsius,
            TemperatureScale::Fahrenheit => celsius * 9.0 / 5.0 + 32.0,
            TemperatureScale::Kelvin => celsius + 273.15,
            TemperatureScale::Rankine => (celsius + 273.15) * 9.0 / 5.0,
            TemperatureScale::Reaumur => celsius * 4.0 / 5.0,
        }
    }
}

impl fmt::Display for TemperatureScale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Convert a temperature between two scale symbols
pub fn temperature_convert(value: f64, from: &str, to: &str) -> Result<f64, ConversionError> {
    let from = TemperatureScale::from_symbol(from)?;
    let to = TemperatureScale::from_symbol(to)?;
    if !value.is_finite() {
        return Err(ConversionError::NonFinite);
    }
    Ok(to.from_celsius(from.to_celsius(value)))
}
