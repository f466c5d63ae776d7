//! Tally Units - Unit conversion engine and converters
//!
//! Every converter pairs a `ConversionStrategy` with a bidirectional
//! field sync:
//! - Linear quantities convert through a pivot unit (`UnitRegistry`)
//! - Temperatures pivot through Celsius
//! - Currencies use a rate table that a `RateSource` can refresh
//!
//! Quantities: length, weight, volume, area, speed, time, energy, power,
//! data, pressure, angle, concentration, temperature, currency.

mod unit;
mod quantity;
mod registry;
mod temperature;
mod currency;
mod convert;
mod sync;

pub use unit::{Unit, ConversionError, LINEAR_DECIMALS, MAX_DECIMALS};
pub use quantity::{Quantity, CONVERTER_ELEMENTS, INFO_ELEMENT};
pub use registry::UnitRegistry;
pub use temperature::{TemperatureScale, temperature_convert, TEMPERATURE_DECIMALS};
pub use currency::{CurrencyRates, RateSource, StaticRateSource, BASE_CURRENCY, CURRENCY_DECIMALS};
pub use convert::{Convert, ConversionStrategy, Converter, Preset};
pub use sync::{BidirectionalSync, Field, SyncUpdate};

/// One converter per quantity, in menu order
pub fn all_converters() -> Vec<Converter> {
    Quantity::ALL.iter().map(|&q| Converter::new(q)).collect()
}
