//! Conversion strategies and the converter tool

use std::collections::BTreeMap;
use serde::Serialize;
use crate::{
    temperature_convert, BidirectionalSync, ConversionError, CurrencyRates, Quantity, RateSource,
    SyncUpdate, TemperatureScale, UnitRegistry, CURRENCY_DECIMALS, INFO_ELEMENT, TEMPERATURE_DECIMALS,
};
use tally_core::format_fixed;
use tally_plugin::{Lifecycle, Surface, Tool, ToolMeta};
use tracing::debug;

/// Capability shared by every quantity
pub trait Convert {
    fn convert(&self, value: f64, from: &str, to: &str) -> Result<f64, ConversionError>;

    /// Fractional digits for values rendered in `unit`; fails for unknown units
    fn display_decimals(&self, unit: &str) -> Result<u32, ConversionError>;

    fn format_value(&self, value: f64, unit: &str) -> Result<String, ConversionError> {
        Ok(format_fixed(value, self.display_decimals(unit)?))
    }

    /// Convert and render at the target precision; `None` for non-finite input
    fn convert_display(&self, value: f64, from: &str, to: &str) -> Result<Option<String>, ConversionError> {
        if !value.is_finite() {
            self.display_decimals(from)?;
            self.display_decimals(to)?;
            return Ok(None);
        }
        let result = self.convert(value, from, to)?;
        if !result.is_finite() {
            return Ok(None);
        }
        self.format_value(result, to).map(Some)
    }
}

/// How a quantity converts, chosen once per converter
#[derive(Debug, Clone)]
pub enum ConversionStrategy {
    /// `value * scale(from) / scale(to)` through the pivot unit
    LinearRatio(UnitRegistry),
    /// Affine transforms through Celsius
    Temperature,
    /// `value * rate(to) / rate(from)`
    Currency(CurrencyRates),
}

impl ConversionStrategy {
    pub fn for_quantity(quantity: Quantity) -> Self {
        match quantity {
            Quantity::Temperature => ConversionStrategy::Temperature,
            Quantity::Currency => ConversionStrategy::Currency(CurrencyRates::builtin()),
            Quantity::Length
            | Quantity::Weight
            | Quantity::Volume
            | Quantity::Area
            | Quantity::Speed
            | Quantity::Time
            | Quantity::Energy
            | Quantity::Power
            | Quantity::Data
            | Quantity::Pressure
            | Quantity::Angle
            | Quantity::Concentration => ConversionStrategy::LinearRatio(UnitRegistry::linear(quantity)),
        }
    }

    /// Selectable unit symbols in display order
    pub fn unit_symbols(&self) -> Vec<String> {
        match self {
            ConversionStrategy::LinearRatio(reg) => reg.symbols().iter().map(|s| s.to_string()).collect(),
            ConversionStrategy::Temperature => {
                TemperatureScale::ALL.iter().map(|s| s.symbol().to_string()).collect()
            }
            ConversionStrategy::Currency(rates) => rates.codes().iter().map(|c| c.to_string()).collect(),
        }
    }
}

impl Convert for ConversionStrategy {
    fn convert(&self, value: f64, from: &str, to: &str) -> Result<f64, ConversionError> {
        match self {
            ConversionStrategy::LinearRatio(reg) => reg.convert(value, from, to),
            ConversionStrategy::Temperature => temperature_convert(value, from, to),
            ConversionStrategy::Currency(rates) => rates.convert(value, from, to),
        }
    }

    fn display_decimals(&self, unit: &str) -> Result<u32, ConversionError> {
        match self {
            ConversionStrategy::LinearRatio(reg) => Ok(reg.get(unit)?.display_decimals),
            ConversionStrategy::Temperature => {
                TemperatureScale::from_symbol(unit)?;
                Ok(TEMPERATURE_DECIMALS)
            }
            ConversionStrategy::Currency(rates) => {
                rates.rate(unit)?;
                Ok(CURRENCY_DECIMALS)
            }
        }
    }
}

/// A saved from/to unit pair
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Preset {
    pub from: String,
    pub to: String,
}

/// One converter mode: a strategy plus the linked field pair it drives
#[derive(Debug, Clone)]
pub struct Converter {
    quantity: Quantity,
    strategy: ConversionStrategy,
    sync: BidirectionalSync,
    presets: BTreeMap<String, Preset>,
    lifecycle: Lifecycle,
}

impl Converter {
    pub fn new(quantity: Quantity) -> Self {
        let (from, to) = quantity.default_units();
        Converter {
            quantity,
            strategy: ConversionStrategy::for_quantity(quantity),
            sync: BidirectionalSync::new(from, to),
            presets: BTreeMap::new(),
            lifecycle: Lifecycle::new(),
        }
    }

    pub fn quantity(&self) -> Quantity {
        self.quantity
    }

    pub fn strategy(&self) -> &ConversionStrategy {
        &self.strategy
    }

    pub fn fields(&self) -> &BidirectionalSync {
        &self.sync
    }

    pub fn units(&self) -> Vec<String> {
        self.strategy.unit_symbols()
    }

    pub fn edit_source(&mut self, text: &str) -> Result<SyncUpdate, ConversionError> {
        self.sync.edit_source(&self.strategy, text)
    }

    pub fn edit_target(&mut self, text: &str) -> Result<SyncUpdate, ConversionError> {
        self.sync.edit_target(&self.strategy, text)
    }

    pub fn set_source_unit(&mut self, unit: &str) -> Result<SyncUpdate, ConversionError> {
        self.sync.set_source_unit(&self.strategy, unit)
    }

    pub fn set_target_unit(&mut self, unit: &str) -> Result<SyncUpdate, ConversionError> {
        self.sync.set_target_unit(&self.strategy, unit)
    }

    /// Empty both fields; units stay selected
    pub fn clear(&mut self) {
        self.sync.clear();
    }

    /// Convert many values at once, rendered at the target precision
    ///
    /// Non-finite inputs yield empty strings.
    pub fn batch_convert(&self, values: &[f64], from: &str, to: &str) -> Result<Vec<String>, ConversionError> {
        values
            .iter()
            .map(|&v| Ok(self.strategy.convert_display(v, from, to)?.unwrap_or_default()))
            .collect()
    }

    /// Add a unit to this converter's registry (a rate for currencies)
    pub fn add_custom_unit(&mut self, symbol: &str, scale: f64, decimals: u32) -> Result<(), ConversionError> {
        match &mut self.strategy {
            ConversionStrategy::LinearRatio(reg) => reg.add_custom_unit(symbol, scale, decimals),
            ConversionStrategy::Currency(rates) => rates.set_rate(symbol, scale),
            ConversionStrategy::Temperature => Err(ConversionError::Unsupported(self.quantity.name().to_string())),
        }
    }

    pub fn save_preset(&mut self, name: &str, from: &str, to: &str) -> Result<(), ConversionError> {
        self.strategy.display_decimals(from)?;
        self.strategy.display_decimals(to)?;
        debug!(quantity = %self.quantity, name, from, to, "preset saved");
        self.presets.insert(
            name.trim().to_string(),
            Preset { from: from.trim().to_string(), to: to.trim().to_string() },
        );
        Ok(())
    }

    pub fn preset(&self, name: &str) -> Option<&Preset> {
        self.presets.get(name.trim())
    }

    pub fn presets(&self) -> &BTreeMap<String, Preset> {
        &self.presets
    }

    /// Switch both units to a saved preset
    pub fn apply_preset(&mut self, name: &str) -> Result<SyncUpdate, ConversionError> {
        let preset = self
            .preset(name)
            .cloned()
            .ok_or_else(|| ConversionError::UnknownPreset(name.trim().to_string()))?;
        self.sync.set_units(&self.strategy, &preset.from, &preset.to)
    }

    /// Currency rate line for the selected pair
    pub fn rate_display(&self) -> Option<String> {
        match &self.strategy {
            ConversionStrategy::Currency(rates) => {
                rates.rate_display(self.sync.source_unit(), self.sync.target_unit()).ok()
            }
            _ => None,
        }
    }

    pub fn set_rate(&mut self, code: &str, rate: f64) -> Result<(), ConversionError> {
        match &mut self.strategy {
            ConversionStrategy::Currency(rates) => rates.set_rate(code, rate),
            _ => Err(ConversionError::Unsupported(self.quantity.name().to_string())),
        }
    }

    /// Refresh currency rates from a source and recompute the target field
    pub fn refresh_rates(&mut self, source: &dyn RateSource) -> Result<bool, ConversionError> {
        let refreshed = match &mut self.strategy {
            ConversionStrategy::Currency(rates) => rates.refresh(source),
            _ => return Err(ConversionError::Unsupported(self.quantity.name().to_string())),
        };
        if refreshed {
            // A refreshed table may no longer price the selected pair
            if self.sync.recompute_target(&self.strategy).is_err() {
                let (from, to) = self.quantity.default_units();
                self.sync.set_units(&self.strategy, from, to)?;
            }
        }
        Ok(refreshed)
    }
}

impl Tool for Converter {
    fn meta(&self) -> ToolMeta {
        self.quantity.meta()
    }

    fn is_initialized(&self) -> bool {
        self.lifecycle.is_initialized()
    }

    fn init(&mut self, surface: &dyn Surface) -> bool {
        let meta = self.quantity.meta();
        self.lifecycle.bind(&meta, surface)
    }

    fn update_display(&self, surface: &mut dyn Surface) {
        if !self.is_initialized() {
            return;
        }
        surface.set_text("from-input", self.sync.source_text());
        surface.set_text("to-input", self.sync.target_text());
        surface.set_text("from-select", self.sync.source_unit());
        surface.set_text("to-select", self.sync.target_unit());
        surface.set_text(INFO_ELEMENT, &self.rate_display().unwrap_or_default());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StaticRateSource;
    use std::collections::HashMap;
    use tally_plugin::MemorySurface;

    #[test]
    fn test_display_round_trip_every_linear_pair() {
        for q in Quantity::ALL {
            let ConversionStrategy::LinearRatio(reg) = ConversionStrategy::for_quantity(q) else {
                continue;
            };
            assert!(!reg.units().is_empty(), "{} has no units", q);
            let strategy = ConversionStrategy::LinearRatio(reg.clone());
            for a in reg.units() {
                for b in reg.units() {
                    let x = 3.7;
                    let shown = strategy.convert_display(x, &a.symbol, &b.symbol).unwrap().unwrap();
                    let back = strategy.convert(shown.parse().unwrap(), &b.symbol, &a.symbol).unwrap();
                    // Half a last place in B, carried back into A
                    let rounding = 0.5 * 10f64.powi(-(b.display_decimals as i32)) * b.scale_to_base / a.scale_to_base;
                    let tol = 10f64.powi(-(a.display_decimals as i32)) + rounding;
                    assert!(
                        (back - x).abs() <= tol,
                        "{}: {} {} -> {} {} -> {}", q, x, a.symbol, shown, b.symbol, back
                    );
                }
            }
        }
    }

    #[test]
    fn test_strategy_dispatch() {
        let temp = ConversionStrategy::for_quantity(Quantity::Temperature);
        assert_eq!(temp.convert_display(0.0, "C", "F").unwrap(), Some("32.000".into()));

        let money = ConversionStrategy::for_quantity(Quantity::Currency);
        assert_eq!(money.convert_display(100.0, "CNY", "USD").unwrap(), Some("14.0000".into()));

        let length = ConversionStrategy::for_quantity(Quantity::Length);
        assert_eq!(length.convert_display(1.0, "km", "mi").unwrap(), Some("0.621371".into()));
    }

    #[test]
    fn test_non_finite_gives_no_result() {
        let length = ConversionStrategy::for_quantity(Quantity::Length);
        assert_eq!(length.convert_display(f64::NAN, "m", "km").unwrap(), None);
        assert_eq!(length.convert_display(f64::INFINITY, "m", "km").unwrap(), None);
        assert!(length.convert_display(f64::NAN, "m", "zz").is_err());
    }

    #[test]
    fn test_batch_convert() {
        let conv = Converter::new(Quantity::Length);
        let out = conv.batch_convert(&[1.0, 2.5, f64::NAN], "km", "m").unwrap();
        assert_eq!(out, vec!["1000.000000", "2500.000000", ""]);
        assert!(conv.batch_convert(&[1.0], "km", "zz").is_err());
    }

    #[test]
    fn test_presets() {
        let mut conv = Converter::new(Quantity::Length);
        conv.edit_source("2").unwrap();
        conv.save_preset("road", "mi", "km").unwrap();
        assert_eq!(conv.preset("road"), Some(&Preset { from: "mi".into(), to: "km".into() }));
        let update = conv.apply_preset("road").unwrap();
        assert_eq!(update.text, "3.218688");
        assert!(matches!(conv.apply_preset("nope"), Err(ConversionError::UnknownPreset(_))));
        assert!(conv.save_preset("bad", "mi", "zz").is_err());
    }

    #[test]
    fn test_custom_units_per_strategy() {
        let mut length = Converter::new(Quantity::Length);
        length.add_custom_unit("league", 4828.032, 6).unwrap();
        assert!(length.units().contains(&"league".to_string()));

        let mut temp = Converter::new(Quantity::Temperature);
        assert!(matches!(temp.add_custom_unit("X", 2.0, 3), Err(ConversionError::Unsupported(_))));

        let mut money = Converter::new(Quantity::Currency);
        money.add_custom_unit("HKD", 1.09, 4).unwrap();
        assert!(money.units().contains(&"HKD".to_string()));
    }

    #[test]
    fn test_currency_refresh_recomputes() {
        let mut conv = Converter::new(Quantity::Currency);
        conv.edit_source("100").unwrap();
        assert_eq!(conv.fields().target_text(), "14.0000");
        assert_eq!(conv.rate_display().unwrap(), "1 CNY = 0.1400 USD");

        let source = StaticRateSource::new(HashMap::from([("USD".to_string(), 0.2)]));
        assert!(conv.refresh_rates(&source).unwrap());
        assert_eq!(conv.fields().target_text(), "20.0000");

        let mut length = Converter::new(Quantity::Length);
        assert!(length.refresh_rates(&source).is_err());
    }

    #[test]
    fn test_refresh_dropping_selected_currency_falls_back() {
        let mut conv = Converter::new(Quantity::Currency);
        conv.set_target_unit("JPY").unwrap();
        let source = StaticRateSource::new(HashMap::from([("USD".to_string(), 0.2)]));
        assert!(conv.refresh_rates(&source).unwrap());
        assert_eq!(conv.fields().target_unit(), "USD");
    }

    #[test]
    fn test_init_and_display() {
        let mut conv = Converter::new(Quantity::Currency);
        let mut surface = MemorySurface::with_elements(["from-input", "to-input", "from-select"]);
        assert!(!conv.init(&surface));

        surface.add_element("to-select");
        surface.add_element(INFO_ELEMENT);
        assert!(conv.init(&surface));
        conv.edit_source("10").unwrap();
        conv.update_display(&mut surface);
        assert_eq!(surface.text("to-input"), Some("1.4000"));
        assert_eq!(surface.text("to-select"), Some("USD"));
        assert_eq!(surface.text(INFO_ELEMENT), Some("1 CNY = 0.1400 USD"));
    }
}
