//! Unit registry: per-quantity symbol tables with a single pivot unit

use std::collections::HashMap;
use std::sync::LazyLock;
use crate::{ConversionError, Quantity, Unit, MAX_DECIMALS};
use tracing::debug;

/// Built-in registries for every linear quantity
static BUILTIN: LazyLock<HashMap<Quantity, UnitRegistry>> = LazyLock::new(|| {
    Quantity::ALL
        .iter()
        .filter_map(|&q| UnitRegistry::build(q).map(|reg| (q, reg)))
        .collect()
});

/// Symbol table for one quantity
///
/// Exactly one unit has `scale_to_base == 1`; every scale is finite and
/// strictly positive. Units keep their registration order for listing.
#[derive(Debug, Clone)]
pub struct UnitRegistry {
    quantity: Quantity,
    units: Vec<Unit>,
    index: HashMap<String, usize>,
    aliases: HashMap<String, String>,
}

impl UnitRegistry {
    fn empty(quantity: Quantity) -> Self {
        UnitRegistry {
            quantity,
            units: Vec::new(),
            index: HashMap::new(),
            aliases: HashMap::new(),
        }
    }

    /// A fresh copy of the built-in registry, `None` for quantities that
    /// use a non-linear strategy (temperature, currency)
    pub fn builtin(quantity: Quantity) -> Option<UnitRegistry> {
        BUILTIN.get(&quantity).cloned()
    }

    /// Built-in registry of a quantity converted by scale ratios
    ///
    /// Empty for temperature and currency, which never reach here.
    pub(crate) fn linear(quantity: Quantity) -> UnitRegistry {
        UnitRegistry::builtin(quantity).unwrap_or_else(|| UnitRegistry::empty(quantity))
    }

    fn build(quantity: Quantity) -> Option<UnitRegistry> {
        let mut reg = UnitRegistry::empty(quantity);
        match quantity {
            Quantity::Length => reg.register_length_units(),
            Quantity::Weight => reg.register_weight_units(),
            Quantity::Volume => reg.register_volume_units(),
            Quantity::Area => reg.register_area_units(),
            Quantity::Speed => reg.register_speed_units(),
            Quantity::Time => reg.register_time_units(),
            Quantity::Energy => reg.register_energy_units(),
            Quantity::Power => reg.register_power_units(),
            Quantity::Data => reg.register_data_units(),
            Quantity::Pressure => reg.register_pressure_units(),
            Quantity::Angle => reg.register_angle_units(),
            Quantity::Concentration => reg.register_concentration_units(),
            Quantity::Temperature | Quantity::Currency => return None,
        }
        Some(reg)
    }

    fn register(&mut self, unit: Unit) {
        match self.index.get(&unit.symbol) {
            Some(&i) => self.units[i] = unit,
            None => {
                self.index.insert(unit.symbol.clone(), self.units.len());
                self.units.push(unit);
            }
        }
    }

    fn alias(&mut self, alias: &str, symbol: &str) {
        self.aliases.insert(alias.to_string(), symbol.to_string());
    }

    pub fn quantity(&self) -> Quantity {
        self.quantity
    }

    /// Look up a unit by symbol or alias
    ///
    /// Exact symbols win; a case-insensitive match is accepted only when
    /// it is unambiguous.
    pub fn get(&self, symbol: &str) -> Result<&Unit, ConversionError> {
        let symbol = symbol.trim();
        if let Some(&i) = self.index.get(symbol) {
            return Ok(&self.units[i]);
        }
        if let Some(target) = self.aliases.get(symbol) {
            if let Some(&i) = self.index.get(target) {
                return Ok(&self.units[i]);
            }
        }

        let lower = symbol.to_lowercase();
        let mut matches = self.units.iter().filter(|u| u.symbol.to_lowercase() == lower);
        match (matches.next(), matches.next()) {
            (Some(unit), None) => Ok(unit),
            _ => Err(ConversionError::UnknownUnit(symbol.to_string())),
        }
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.get(symbol).is_ok()
    }

    /// The unit every other unit is expressed against
    pub fn pivot(&self) -> &Unit {
        // A registry is only constructed with its pivot registered first
        &self.units[0]
    }

    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    pub fn symbols(&self) -> Vec<&str> {
        self.units.iter().map(|u| u.symbol.as_str()).collect()
    }

    /// `value * scale(from) / scale(to)`
    pub fn convert(&self, value: f64, from: &str, to: &str) -> Result<f64, ConversionError> {
        let from_unit = self.get(from)?;
        let to_unit = self.get(to)?;
        if !value.is_finite() {
            return Err(ConversionError::NonFinite);
        }
        Ok(from_unit.convert_to(value, to_unit))
    }

    /// Register a user-defined unit
    ///
    /// Existing non-pivot units may be redefined. The scale must be finite,
    /// positive and different from 1 so the pivot stays unique; `decimals`
    /// is capped at `MAX_DECIMALS`.
    pub fn add_custom_unit(&mut self, symbol: &str, scale: f64, decimals: u32) -> Result<(), ConversionError> {
        let symbol = symbol.trim();
        if symbol.is_empty() {
            return Err(ConversionError::UnknownUnit(String::new()));
        }
        if !scale.is_finite() || scale <= 0.0 {
            return Err(ConversionError::InvalidScale { symbol: symbol.to_string(), scale });
        }
        if symbol == self.pivot().symbol {
            return Err(ConversionError::PivotLocked(symbol.to_string()));
        }
        if scale == 1.0 {
            return Err(ConversionError::DuplicatePivot(symbol.to_string()));
        }
        if decimals > MAX_DECIMALS {
            return Err(ConversionError::InvalidDecimals { symbol: symbol.to_string(), decimals });
        }

        debug!(quantity = %self.quantity, symbol, scale, "custom unit registered");
        self.register(Unit::new(symbol, symbol, scale).with_decimals(decimals));
        Ok(())
    }

    fn register_length_units(&mut self) {
        self.register(Unit::new("m", "meter", 1.0));
        // Metric
        self.register(Unit::new("km", "kilometer", 1000.0));
        self.register(Unit::new("dm", "decimeter", 0.1));
        self.register(Unit::new("cm", "centimeter", 0.01));
        self.register(Unit::new("mm", "millimeter", 0.001));
        self.register(Unit::new("μm", "micrometer", 1e-6));
        self.register(Unit::new("nm", "nanometer", 1e-9));
        // Imperial
        self.register(Unit::new("mi", "mile", 1609.344));
        self.register(Unit::new("fur", "furlong", 201.168));
        self.register(Unit::new("ch", "chain", 20.1168));
        self.register(Unit::new("rd", "rod", 5.0292));
        self.register(Unit::new("yd", "yard", 0.9144));
        self.register(Unit::new("ft", "foot", 0.3048));
        self.register(Unit::new("in", "inch", 0.0254));
        self.register(Unit::new("mil", "thou", 0.0000254));
        // Nautical
        self.register(Unit::new("nmi", "nautical mile", 1852.0));
        self.register(Unit::new("ftm", "fathom", 1.8288));
        self.register(Unit::new("cable", "cable length", 185.2));
        // Astronomical
        self.register(Unit::new("ly", "light year", 9.461e15));
        self.register(Unit::new("au", "astronomical unit", 1.496e11));
        self.register(Unit::new("pc", "parsec", 3.086e16));
        self.register(Unit::new("angstrom", "angstrom", 1e-10));

        self.alias("meter", "m");
        self.alias("meters", "m");
        self.alias("metre", "m");
        self.alias("kilometer", "km");
        self.alias("kilometers", "km");
        self.alias("um", "μm");
        self.alias("micron", "μm");
        self.alias("mile", "mi");
        self.alias("miles", "mi");
        self.alias("foot", "ft");
        self.alias("feet", "ft");
        self.alias("inch", "in");
        self.alias("inches", "in");
        self.alias("yard", "yd");
        self.alias("Å", "angstrom");
    }

    fn register_weight_units(&mut self) {
        self.register(Unit::new("kg", "kilogram", 1.0));
        // Metric
        self.register(Unit::new("t", "tonne", 1000.0));
        self.register(Unit::new("hg", "hectogram", 0.1));
        self.register(Unit::new("dag", "decagram", 0.01));
        self.register(Unit::new("g", "gram", 0.001));
        self.register(Unit::new("dg", "decigram", 1e-4));
        self.register(Unit::new("cg", "centigram", 1e-5));
        self.register(Unit::new("mg", "milligram", 1e-6));
        self.register(Unit::new("μg", "microgram", 1e-9));
        // Imperial / avoirdupois
        self.register(Unit::new("lt", "long ton", 1016.047));
        self.register(Unit::new("st", "short ton", 907.1847));
        self.register(Unit::new("cwt", "hundredweight", 50.80235));
        self.register(Unit::new("qr", "quarter", 12.70059));
        self.register(Unit::new("st_weight", "stone", 6.35029));
        self.register(Unit::new("lb", "pound", 0.453592));
        self.register(Unit::new("oz", "ounce", 0.0283495));
        self.register(Unit::new("dr", "dram", 0.001772));
        self.register(Unit::new("gr", "grain", 0.0000648));
        // Gem weights
        self.register(Unit::new("ct", "carat", 0.0002));
        self.register(Unit::new("point", "point", 0.000002));
        // Chinese market units
        self.register(Unit::new("dan", "dan", 50.0));
        self.register(Unit::new("jin", "jin", 0.5));
        self.register(Unit::new("liang", "liang", 0.05));
        self.register(Unit::new("qian", "qian", 0.005));
        self.register(Unit::new("fen", "fen", 0.0005));

        self.alias("kilogram", "kg");
        self.alias("kilograms", "kg");
        self.alias("gram", "g");
        self.alias("grams", "g");
        self.alias("ug", "μg");
        self.alias("mcg", "μg");
        self.alias("pound", "lb");
        self.alias("pounds", "lb");
        self.alias("lbs", "lb");
        self.alias("ounce", "oz");
        self.alias("stone", "st_weight");
    }

    fn register_volume_units(&mut self) {
        self.register(Unit::new("l", "liter", 1.0));
        self.register(Unit::new("m3", "cubic meter", 1000.0));
        self.register(Unit::new("dl", "deciliter", 0.1));
        self.register(Unit::new("cl", "centiliter", 0.01));
        self.register(Unit::new("ml", "milliliter", 0.001));
        self.register(Unit::new("cm3", "cubic centimeter", 0.001));
        self.register(Unit::new("mm3", "cubic millimeter", 1e-6));
        // US liquid
        self.register(Unit::new("gal", "gallon", 3.78541));
        self.register(Unit::new("qt", "quart", 0.946353));
        self.register(Unit::new("pt", "pint", 0.473176));
        self.register(Unit::new("cup", "cup", 0.236588));
        self.register(Unit::new("floz", "fluid ounce", 0.0295735));
        self.register(Unit::new("tbsp", "tablespoon", 0.0147868));
        self.register(Unit::new("tsp", "teaspoon", 0.00492892));

        self.alias("L", "l");
        self.alias("liter", "l");
        self.alias("litre", "l");
        self.alias("mL", "ml");
        self.alias("m³", "m3");
        self.alias("cc", "cm3");
        self.alias("gallon", "gal");
    }

    fn register_area_units(&mut self) {
        self.register(Unit::new("m2", "square meter", 1.0));
        self.register(Unit::new("km2", "square kilometer", 1e6));
        self.register(Unit::new("ha", "hectare", 1e4));
        self.register(Unit::new("a", "are", 100.0));
        self.register(Unit::new("dm2", "square decimeter", 0.01));
        self.register(Unit::new("cm2", "square centimeter", 1e-4));
        self.register(Unit::new("mm2", "square millimeter", 1e-6));
        // Imperial
        self.register(Unit::new("mi2", "square mile", 2589988.11));
        self.register(Unit::new("acre", "acre", 4046.86));
        self.register(Unit::new("rood", "rood", 1011.71));
        self.register(Unit::new("yd2", "square yard", 0.836127));
        self.register(Unit::new("ft2", "square foot", 0.092903));
        self.register(Unit::new("in2", "square inch", 0.00064516));
        // Chinese land units
        self.register(Unit::new("qing", "qing", 66666.67));
        self.register(Unit::new("mu", "mu", 666.67));
        self.register(Unit::new("fen", "fen", 66.667));
        self.register(Unit::new("li2", "square li", 0.0001));

        self.alias("m²", "m2");
        self.alias("km²", "km2");
        self.alias("ft²", "ft2");
        self.alias("acres", "acre");
        self.alias("hectare", "ha");
    }

    fn register_speed_units(&mut self) {
        self.register(Unit::new("m/s", "meter per second", 1.0));
        self.register(Unit::new("km/h", "kilometer per hour", 1.0 / 3.6));
        self.register(Unit::new("cm/s", "centimeter per second", 0.01));
        self.register(Unit::new("mm/s", "millimeter per second", 0.001));
        self.register(Unit::new("mi/h", "mile per hour", 0.44704));
        self.register(Unit::new("ft/s", "foot per second", 0.3048));
        self.register(Unit::new("in/s", "inch per second", 0.0254));
        self.register(Unit::new("knot", "knot", 0.514444));
        self.register(Unit::new("mach", "mach", 340.29));
        self.register(Unit::new("c", "speed of light", 299792458.0));

        self.alias("kph", "km/h");
        self.alias("kmh", "km/h");
        self.alias("mph", "mi/h");
        self.alias("kn", "knot");
        self.alias("knots", "knot");
    }

    fn register_time_units(&mut self) {
        self.register(Unit::new("s", "second", 1.0));
        self.register(Unit::new("min", "minute", 60.0));
        self.register(Unit::new("h", "hour", 3600.0));
        self.register(Unit::new("day", "day", 86400.0));
        self.register(Unit::new("week", "week", 604800.0));
        // Julian month and year
        self.register(Unit::new("month", "month", 2629800.0));
        self.register(Unit::new("year", "year", 31557600.0));

        self.alias("sec", "s");
        self.alias("hr", "h");
        self.alias("d", "day");
        self.alias("days", "day");
        self.alias("wk", "week");
        self.alias("yr", "year");
    }

    fn register_energy_units(&mut self) {
        self.register(Unit::new("J", "joule", 1.0));
        self.register(Unit::new("kJ", "kilojoule", 1000.0));
        self.register(Unit::new("cal", "calorie", 4.184));
        self.register(Unit::new("kcal", "kilocalorie", 4184.0));
        self.register(Unit::new("Wh", "watt hour", 3600.0));
        self.register(Unit::new("kWh", "kilowatt hour", 3.6e6));
        self.register(Unit::new("BTU", "British thermal unit", 1055.06));
        self.register(Unit::new("eV", "electronvolt", 1.60218e-19));
        self.register(Unit::new("ft-lb", "foot-pound", 1.35582));

        self.alias("joule", "J");
        self.alias("Cal", "kcal");
    }

    fn register_power_units(&mut self) {
        self.register(Unit::new("W", "watt", 1.0));
        self.register(Unit::new("kW", "kilowatt", 1000.0));
        self.register(Unit::new("MW", "megawatt", 1e6));
        self.register(Unit::new("hp", "mechanical horsepower", 745.7));
        self.register(Unit::new("hp_e", "metric horsepower", 735.5));
        self.register(Unit::new("ft-lb/s", "foot-pound per second", 1.35582));

        self.alias("watt", "W");
        self.alias("PS", "hp_e");
    }

    fn register_data_units(&mut self) {
        self.register(Unit::new("B", "byte", 1.0));
        self.register(Unit::new("bit", "bit", 1.0 / 8.0));
        let prefixes = [
            ("KB", "kilobyte"),
            ("MB", "megabyte"),
            ("GB", "gigabyte"),
            ("TB", "terabyte"),
            ("PB", "petabyte"),
            ("EB", "exabyte"),
            ("ZB", "zettabyte"),
            ("YB", "yottabyte"),
        ];
        let mut scale = 1.0;
        for (symbol, name) in prefixes {
            scale *= 1024.0;
            self.register(Unit::new(symbol, name, scale));
        }

        self.alias("byte", "B");
        self.alias("bytes", "B");
        self.alias("bits", "bit");
        self.alias("b", "bit");
    }

    fn register_pressure_units(&mut self) {
        self.register(Unit::new("Pa", "pascal", 1.0));
        self.register(Unit::new("kPa", "kilopascal", 1e3));
        self.register(Unit::new("MPa", "megapascal", 1e6));
        self.register(Unit::new("bar", "bar", 1e5));
        self.register(Unit::new("atm", "standard atmosphere", 101325.0));
        self.register(Unit::new("psi", "pound per square inch", 6894.76));
        self.register(Unit::new("torr", "torr", 133.322));

        self.alias("mmHg", "torr");
    }

    fn register_angle_units(&mut self) {
        self.register(Unit::new("deg", "degree", 1.0));
        self.register(Unit::new("rad", "radian", 180.0 / std::f64::consts::PI));
        self.register(Unit::new("grad", "gradian", 0.9));
        self.register(Unit::new("min", "arcminute", 1.0 / 60.0));
        self.register(Unit::new("sec", "arcsecond", 1.0 / 3600.0));

        self.alias("°", "deg");
        self.alias("gon", "grad");
        self.alias("arcmin", "min");
        self.alias("arcsec", "sec");
    }

    fn register_concentration_units(&mut self) {
        // Pivot is mass percent; 1 ppm = 1e-4 %, 1 ppb = 1e-7 %
        self.register(Unit::new("% w/w", "mass percent", 1.0));
        self.register(Unit::new("mol/L", "molar", 10.0));
        self.register(Unit::new("g/L", "gram per liter", 0.1));
        self.register(Unit::new("mg/L", "milligram per liter", 1e-4));
        self.register(Unit::new("ppm", "parts per million", 1e-4));
        self.register(Unit::new("ppb", "parts per billion", 1e-7));

        self.alias("%", "% w/w");
        self.alias("percent", "% w/w");
        self.alias("M", "mol/L");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LINEAR_DECIMALS;

    fn assert_close(a: f64, b: f64) {
        let tol = 1e-9 * b.abs().max(1.0);
        assert!((a - b).abs() < tol, "{} != {}", a, b);
    }

    #[test]
    fn test_every_builtin_has_single_pivot() {
        for q in Quantity::ALL {
            let Some(reg) = UnitRegistry::builtin(q) else {
                assert!(matches!(q, Quantity::Temperature | Quantity::Currency));
                continue;
            };
            let pivots = reg.units().iter().filter(|u| u.is_pivot()).count();
            assert_eq!(pivots, 1, "{} has {} pivots", q, pivots);
            assert!(reg.pivot().is_pivot());
            for unit in reg.units() {
                assert!(unit.scale_to_base.is_finite() && unit.scale_to_base > 0.0, "{}", unit.symbol);
                assert_eq!(unit.display_decimals, LINEAR_DECIMALS);
            }
        }
    }

    #[test]
    fn test_pivot_correctness() {
        let reg = UnitRegistry::builtin(Quantity::Length).unwrap();
        assert_close(reg.convert(1.0, "km", "mi").unwrap(), 0.621371192237334);

        for q in Quantity::ALL {
            let Some(reg) = UnitRegistry::builtin(q) else { continue };
            for a in reg.units() {
                for b in reg.units() {
                    let x = 42.5;
                    let expected = x * a.scale_to_base / b.scale_to_base;
                    assert_close(reg.convert(x, &a.symbol, &b.symbol).unwrap(), expected);
                }
            }
        }
    }

    #[test]
    fn test_round_trip() {
        for q in Quantity::ALL {
            let Some(reg) = UnitRegistry::builtin(q) else { continue };
            for a in reg.units() {
                for b in reg.units() {
                    for x in [0.0, 3.7, 1234.5] {
                        let there = reg.convert(x, &a.symbol, &b.symbol).unwrap();
                        let back = reg.convert(there, &b.symbol, &a.symbol).unwrap();
                        let tol = 10f64.powi(-(a.display_decimals as i32)) * x.abs().max(1.0);
                        assert!(
                            (back - x).abs() < tol,
                            "{}: {} {} -> {} -> {}", q, x, a.symbol, b.symbol, back
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_data_binary_prefixes() {
        let reg = UnitRegistry::builtin(Quantity::Data).unwrap();
        assert_eq!(reg.convert(1.0, "MB", "KB").unwrap(), 1024.0);
        assert_eq!(reg.convert(1.0, "B", "bit").unwrap(), 8.0);
        assert_eq!(reg.get("YB").unwrap().scale_to_base, 1024f64.powi(8));
    }

    #[test]
    fn test_concentration_parts_per() {
        let reg = UnitRegistry::builtin(Quantity::Concentration).unwrap();
        assert_close(reg.convert(1.0, "% w/w", "ppm").unwrap(), 1e4);
        assert_close(reg.convert(1.0, "ppm", "ppb").unwrap(), 1000.0);
    }

    #[test]
    fn test_aliases_and_case() {
        let reg = UnitRegistry::builtin(Quantity::Length).unwrap();
        assert_eq!(reg.get("miles").unwrap().symbol, "mi");
        assert_eq!(reg.get("um").unwrap().symbol, "μm");
        assert_eq!(reg.get("KM").unwrap().symbol, "km");
        assert!(matches!(reg.get("parsnip"), Err(ConversionError::UnknownUnit(_))));
    }

    #[test]
    fn test_unknown_unit() {
        let reg = UnitRegistry::builtin(Quantity::Weight).unwrap();
        let err = reg.convert(1.0, "kg", "furlong").unwrap_err();
        assert_eq!(err, ConversionError::UnknownUnit("furlong".into()));
    }

    #[test]
    fn test_add_custom_unit() {
        let mut reg = UnitRegistry::builtin(Quantity::Length).unwrap();
        reg.add_custom_unit("smoot", 1.7018, 2).unwrap();
        assert_close(reg.convert(364.4, "smoot", "m").unwrap(), 364.4 * 1.7018);
        assert_eq!(reg.get("smoot").unwrap().display_decimals, 2);

        // Built-in copies are unaffected
        assert!(!UnitRegistry::builtin(Quantity::Length).unwrap().contains("smoot"));
    }

    #[test]
    fn test_add_custom_unit_keeps_pivot_unique() {
        let mut reg = UnitRegistry::builtin(Quantity::Length).unwrap();
        assert!(matches!(reg.add_custom_unit("m", 2.0, 6), Err(ConversionError::PivotLocked(_))));
        assert!(matches!(reg.add_custom_unit("unit", 1.0, 6), Err(ConversionError::DuplicatePivot(_))));
        assert!(matches!(reg.add_custom_unit("neg", -1.0, 6), Err(ConversionError::InvalidScale { .. })));
        assert!(matches!(reg.add_custom_unit("nan", f64::NAN, 6), Err(ConversionError::InvalidScale { .. })));
    }

    #[test]
    fn test_add_custom_unit_limits_decimals() {
        let mut reg = UnitRegistry::builtin(Quantity::Length).unwrap();
        let err = reg.add_custom_unit("zz", 2.0, 4_000_000_000).unwrap_err();
        assert_eq!(err, ConversionError::InvalidDecimals { symbol: "zz".into(), decimals: 4_000_000_000 });
        assert!(!reg.contains("zz"));

        reg.add_custom_unit("zz", 2.0, MAX_DECIMALS).unwrap();
        assert_eq!(reg.get("zz").unwrap().display_decimals, MAX_DECIMALS);
        assert_eq!(reg.pivot().symbol, "m");
    }
}
