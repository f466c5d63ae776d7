//! Physical quantities offered as converter modes

use std::fmt;
use serde::{Serialize, Deserialize};
use tally_plugin::ToolMeta;

/// Elements every converter binds to inside its container
pub const CONVERTER_ELEMENTS: &[&str] = &["from-input", "to-input", "from-select", "to-select"];

/// Optional element that receives the conversion info line
pub const INFO_ELEMENT: &str = "conversion-info";

/// A kind of physical quantity, one converter mode each
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quantity {
    Length,
    Weight,
    Volume,
    Area,
    Speed,
    Time,
    Energy,
    Power,
    Data,
    Pressure,
    Angle,
    Concentration,
    Temperature,
    Currency,
}

impl Quantity {
    pub const ALL: [Quantity; 14] = [
        Quantity::Length,
        Quantity::Weight,
        Quantity::Volume,
        Quantity::Area,
        Quantity::Speed,
        Quantity::Time,
        Quantity::Energy,
        Quantity::Power,
        Quantity::Data,
        Quantity::Pressure,
        Quantity::Angle,
        Quantity::Concentration,
        Quantity::Temperature,
        Quantity::Currency,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Quantity::Length => "length",
            Quantity::Weight => "weight",
            Quantity::Volume => "volume",
            Quantity::Area => "area",
            Quantity::Speed => "speed",
            Quantity::Time => "time",
            Quantity::Energy => "energy",
            Quantity::Power => "power",
            Quantity::Data => "data",
            Quantity::Pressure => "pressure",
            Quantity::Angle => "angle",
            Quantity::Concentration => "concentration",
            Quantity::Temperature => "temperature",
            Quantity::Currency => "currency",
        }
    }

    /// Mode name used for navigation ("length-converter")
    pub fn mode_name(&self) -> &'static str {
        match self {
            Quantity::Length => "length-converter",
            Quantity::Weight => "weight-converter",
            Quantity::Volume => "volume-converter",
            Quantity::Area => "area-converter",
            Quantity::Speed => "speed-converter",
            Quantity::Time => "time-converter",
            Quantity::Energy => "energy-converter",
            Quantity::Power => "power-converter",
            Quantity::Data => "data-converter",
            Quantity::Pressure => "pressure-converter",
            Quantity::Angle => "angle-converter",
            Quantity::Concentration => "concentration-converter",
            Quantity::Temperature => "temperature-converter",
            Quantity::Currency => "currency-converter",
        }
    }

    fn description(&self) -> &'static str {
        match self {
            Quantity::Length => "Convert between metric, imperial, nautical and astronomical lengths",
            Quantity::Weight => "Convert between metric, imperial, troy and Chinese weights",
            Quantity::Volume => "Convert between metric and US liquid volumes",
            Quantity::Area => "Convert between metric, imperial and Chinese land areas",
            Quantity::Speed => "Convert between speeds, including knots, Mach and light speed",
            Quantity::Time => "Convert between seconds and calendar-scale durations",
            Quantity::Energy => "Convert between joules, calories, watt-hours and BTU",
            Quantity::Power => "Convert between watts and horsepower",
            Quantity::Data => "Convert between bits and binary-prefixed bytes",
            Quantity::Pressure => "Convert between pascals, bar, atmospheres, psi and torr",
            Quantity::Angle => "Convert between degrees, radians, gradians and arc units",
            Quantity::Concentration => "Convert between percent, molarity and parts-per notations",
            Quantity::Temperature => "Convert between Celsius, Fahrenheit, Kelvin, Rankine and Reaumur",
            Quantity::Currency => "Convert between currencies using the current rate table",
        }
    }

    /// Default (from, to) unit pair shown when the converter opens
    pub fn default_units(&self) -> (&'static str, &'static str) {
        match self {
            Quantity::Length => ("m", "km"),
            Quantity::Weight => ("kg", "lb"),
            Quantity::Volume => ("l", "ml"),
            Quantity::Area => ("m2", "ft2"),
            Quantity::Speed => ("km/h", "m/s"),
            Quantity::Time => ("h", "min"),
            Quantity::Energy => ("kJ", "kcal"),
            Quantity::Power => ("kW", "hp"),
            Quantity::Data => ("MB", "KB"),
            Quantity::Pressure => ("atm", "kPa"),
            Quantity::Angle => ("deg", "rad"),
            Quantity::Concentration => ("% w/w", "ppm"),
            Quantity::Temperature => ("C", "F"),
            Quantity::Currency => ("CNY", "USD"),
        }
    }

    /// Parse a quantity from its name or mode name ("mass" is accepted for weight)
    pub fn from_name(name: &str) -> Option<Quantity> {
        let lower = name.trim().to_lowercase();
        let bare = lower.trim_end_matches("-converter");
        if bare == "mass" {
            return Some(Quantity::Weight);
        }
        Quantity::ALL.iter().copied().find(|q| q.name() == bare)
    }

    pub fn meta(&self) -> ToolMeta {
        ToolMeta {
            name: self.mode_name(),
            description: self.description(),
            category: "converter",
            elements: CONVERTER_ELEMENTS,
        }
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
