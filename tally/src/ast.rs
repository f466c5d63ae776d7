//! Command syntax tree
//!
//! One command per input line. Several commands mean different things
//! depending on the active mode: `from` edits the source field of a
//! converter but sets the first date of the date calculator, `clear`
//! resets whichever tool is showing.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    /// Navigate to a mode ("standard", "length", "currency-converter")
    Mode { name: String },
    /// List modes, optionally one category
    List { category: Option<String> },
    Help { topic: Option<String> },
    /// Current display elements and tool state
    Show,

    // Calculator keypad
    Digits { token: String },
    Operator { token: String },
    Equals,
    Clear,
    ClearEntry,
    Backspace,
    Function { name: String },
    Memory { label: String },
    Key { name: String },
    History,

    // Scientific
    Second,
    Angle { mode: Option<String> },
    Constant { name: String },
    Power,

    // Programmer
    Radix { radix: String },
    WordSize { size: String },
    Not,
    RotateLeft { amount: Option<u32> },
    RotateRight { amount: Option<u32> },

    // Converters and the date calculator
    From { text: String },
    To { text: String },
    Unit { field: UnitField, symbol: String },
    /// Units of the active converter, or of a named quantity
    Units { quantity: Option<String> },
    Batch { from: String, to: String, values: Vec<f64> },
    CustomUnit { symbol: String, scale: f64, decimals: Option<u32> },
    PresetSave { name: String, from: String, to: String },
    PresetApply { name: String },
    Presets,
    Rate { code: String, rate: f64 },
    Refresh { rates: Vec<(String, f64)> },

    // Date calculator
    Base { text: String },
    Days { text: String },
    AddDays,
    SubtractDays,

    // Resistor table
    Series { name: String },
}

/// Which unit selector a `unit` command targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitField {
    From,
    To,
}

impl Command {
    /// Keyword used in error messages
    pub fn name(&self) -> &'static str {
        match self {
            Command::Mode { .. } => "mode",
            Command::List { .. } => "list",
            Command::Help { .. } => "help",
            Command::Show => "show",
            Command::Digits { .. } => "digit",
            Command::Operator { .. } => "op",
            Command::Equals => "=",
            Command::Clear => "clear",
            Command::ClearEntry => "ce",
            Command::Backspace => "backspace",
            Command::Function { .. } => "fn",
            Command::Memory { .. } => "mem",
            Command::Key { .. } => "key",
            Command::History => "history",
            Command::Second => "2nd",
            Command::Angle { .. } => "angle",
            Command::Constant { .. } => "const",
            Command::Power => "pow",
            Command::Radix { .. } => "radix",
            Command::WordSize { .. } => "word",
            Command::Not => "not",
            Command::RotateLeft { .. } => "rol",
            Command::RotateRight { .. } => "ror",
            Command::From { .. } => "from",
            Command::To { .. } => "to",
            Command::Unit { .. } => "unit",
            Command::Units { .. } => "units",
            Command::Batch { .. } => "batch",
            Command::CustomUnit { .. } => "custom",
            Command::PresetSave { .. } | Command::PresetApply { .. } => "preset",
            Command::Presets => "presets",
            Command::Rate { .. } => "rate",
            Command::Refresh { .. } => "refresh",
            Command::Base { .. } => "base",
            Command::Days { .. } => "days",
            Command::AddDays => "add",
            Command::SubtractDays => "sub",
            Command::Series { .. } => "series",
        }
    }

    /// Commands that only read state
    pub fn is_query(&self) -> bool {
        matches!(
            self,
            Command::List { .. }
                | Command::Help { .. }
                | Command::Show
                | Command::History
                | Command::Units { .. }
                | Command::Presets
                | Command::Batch { .. }
        )
    }
}
