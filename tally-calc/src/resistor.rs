//! Standard resistor value tables (E-series) with colour codes

use std::fmt;
use serde::{Serialize, Deserialize};
use crate::CalcError;
use tally_plugin::{Lifecycle, Surface, Tool, ToolMeta};

static RESISTOR_META: ToolMeta = ToolMeta {
    name: "resistor",
    description: "E6-E96 standard resistor values with tolerance ranges and colour bands",
    category: "utility",
    elements: &["resistor-series", "resistor-table"],
};

// Base values per decade, in hundredths of an ohm
const E6: [u32; 6] = [100, 150, 220, 330, 470, 680];
const E12: [u32; 12] = [100, 120, 150, 180, 220, 270, 330, 390, 470, 560, 680, 820];
const E24: [u32; 24] = [
    100, 110, 120, 130, 150, 160, 180, 200, 220, 240, 270, 300,
    330, 360, 390, 430, 470, 510, 560, 620, 680, 750, 820, 910,
];
const E48: [u32; 48] = [
    100, 105, 110, 115, 121, 127, 133, 140, 147, 154, 162, 169,
    178, 187, 196, 205, 215, 226, 237, 249, 261, 274, 287, 301,
    316, 332, 348, 365, 383, 402, 422, 442, 464, 487, 511, 536,
    562, 590, 619, 649, 681, 715, 750, 787, 825, 866, 909, 953,
];
const E96: [u32; 96] = [
    100, 102, 105, 107, 110, 113, 115, 118, 121, 124, 127, 130,
    133, 137, 140, 143, 147, 150, 154, 158, 162, 165, 169, 174,
    178, 182, 187, 191, 196, 200, 205, 210, 215, 221, 226, 232,
    237, 243, 249, 255, 261, 267, 274, 280, 287, 294, 301, 309,
    316, 324, 332, 340, 348, 357, 365, 374, 383, 392, 402, 412,
    422, 432, 442, 453, 464, 475, 487, 499, 511, 523, 536, 549,
    562, 576, 590, 604, 619, 634, 649, 665, 681, 698, 715, 732,
    750, 768, 787, 806, 825, 845, 866, 887, 909, 931, 953, 976,
];

const DIGIT_COLORS: [&str; 10] = [
    "black", "brown", "red", "orange", "yellow", "green", "blue", "violet", "gray", "white",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ResistorSeries {
    #[default]
    E6,
    E12,
    E24,
    E48,
    E96,
}

impl ResistorSeries {
    pub const ALL: [ResistorSeries; 5] = [
        ResistorSeries::E6,
        ResistorSeries::E12,
        ResistorSeries::E24,
        ResistorSeries::E48,
        ResistorSeries::E96,
    ];

    pub fn parse(s: &str) -> Result<Self, CalcError> {
        match s.trim().to_uppercase().as_str() {
            "E6" => Ok(ResistorSeries::E6),
            "E12" => Ok(ResistorSeries::E12),
            "E24" => Ok(ResistorSeries::E24),
            "E48" => Ok(ResistorSeries::E48),
            "E96" => Ok(ResistorSeries::E96),
            _ => Err(CalcError::UnknownSeries(s.trim().to_string())),
        }
    }

    pub fn tolerance(&self) -> f64 {
        match self {
            ResistorSeries::E6 => 0.2,
            ResistorSeries::E12 => 0.1,
            ResistorSeries::E24 => 0.05,
            ResistorSeries::E48 => 0.02,
            ResistorSeries::E96 => 0.01,
        }
    }

    fn base_values(&self) -> &'static [u32] {
        match self {
            ResistorSeries::E6 => &E6,
            ResistorSeries::E12 => &E12,
            ResistorSeries::E24 => &E24,
            ResistorSeries::E48 => &E48,
            ResistorSeries::E96 => &E96,
        }
    }

    /// Significant-digit bands on the part
    pub fn significant_digits(&self) -> u32 {
        match self {
            ResistorSeries::E48 | ResistorSeries::E96 => 3,
            _ => 2,
        }
    }

    fn tolerance_color(&self) -> &'static str {
        match self {
            ResistorSeries::E6 => "none",
            ResistorSeries::E12 => "silver",
            ResistorSeries::E24 => "gold",
            ResistorSeries::E48 => "red",
            ResistorSeries::E96 => "brown",
        }
    }

    /// One row per value in the 1 Ω and 10 Ω decades, ascending
    pub fn table(&self) -> Vec<ResistorRow> {
        let tolerance = self.tolerance();
        let mut rows = Vec::with_capacity(self.base_values().len() * 2);
        for decade in 0..2 {
            for &base in self.base_values() {
                let ohms = base as f64 / 100.0 * 10f64.powi(decade);
                rows.push(ResistorRow {
                    ohms,
                    value: format_resistance(ohms),
                    min: format_resistance(ohms * (1.0 - tolerance)),
                    max: format_resistance(ohms * (1.0 + tolerance)),
                    bands: self.bands(base, decade),
                });
            }
        }
        rows
    }

    /// Digit bands, multiplier band, tolerance band
    fn bands(&self, base: u32, decade: i32) -> Vec<&'static str> {
        let sig = self.significant_digits();
        // base has three digits; E6-E24 bases always end in zero
        let mantissa = if sig == 3 { base } else { base / 10 };
        let exponent = decade - sig as i32 + 1;

        let mut bands: Vec<&'static str> = mantissa
            .to_string()
            .chars()
            .filter_map(|c| c.to_digit(10))
            .map(|d| DIGIT_COLORS[d as usize])
            .collect();
        bands.push(multiplier_color(exponent));
        bands.push(self.tolerance_color());
        bands
    }
}

impl fmt::Display for ResistorSeries {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

fn multiplier_color(exponent: i32) -> &'static str {
    match exponent {
        -2 => "silver",
        -1 => "gold",
        0..=9 => DIGIT_COLORS[exponent as usize],
        _ => "none",
    }
}

/// mΩ below 1 Ω, Ω below 1 kΩ, kΩ above
pub fn format_resistance(ohms: f64) -> String {
    if ohms < 1.0 {
        format!("{:.1}mΩ", ohms * 1000.0)
    } else if ohms < 1000.0 {
        format!("{:.2}Ω", ohms)
    } else {
        format!("{:.2}kΩ", ohms / 1000.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResistorRow {
    pub ohms: f64,
    pub value: String,
    pub min: String,
    pub max: String,
    pub bands: Vec<&'static str>,
}

/// The resistor table tool: one selected series
#[derive(Debug, Clone, Default)]
pub struct ResistorTable {
    series: ResistorSeries,
    lifecycle: Lifecycle,
}

impl ResistorTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn series(&self) -> ResistorSeries {
        self.series
    }

    pub fn select(&mut self, series: ResistorSeries) {
        self.series = series;
    }

    pub fn rows(&self) -> Vec<ResistorRow> {
        self.series.table()
    }
}

impl Tool for ResistorTable {
    fn meta(&self) -> ToolMeta {
        RESISTOR_META.clone()
    }

    fn is_initialized(&self) -> bool {
        self.lifecycle.is_initialized()
    }

    fn init(&mut self, surface: &dyn Surface) -> bool {
        self.lifecycle.bind(&RESISTOR_META, surface)
    }

    fn update_display(&self, surface: &mut dyn Surface) {
        if !self.is_initialized() {
            return;
        }
        let table = self
            .rows()
            .iter()
            .map(|r| format!("{}\t{}\t{}\t{}", r.value, r.bands.join(" "), r.min, r.max))
            .collect::<Vec<_>>()
            .join("\n");
        surface.set_text("resistor-series", &self.series.to_string());
        surface.set_text("resistor-table", &table);
    }
}
