//! Tally Calculators
//!
//! - `Calculator`: standard keypad with memory, history and keyboard input
//! - `ScientificCalculator`: adds xʸ, trig/hyperbolic/log functions, 2nd and DEG/RAD
//! - `ProgrammerCalculator`: integers in HEX/DEC/OCT/BIN with bitwise operations
//! - `DateCalculator`: day differences and offsets
//! - `ResistorTable`: E-series values with colour bands

mod error;
pub mod functions;
pub mod standard;
pub mod scientific;
pub mod programmer;
pub mod date;
pub mod resistor;

pub use error::CalcError;
pub use functions::{AngleMode, MathFn};
pub use standard::{Calculator, CalculatorState, KeypadFn, MemoryOp, Operator, Phase, ERROR_TEXT};
pub use scientific::{Constant, ScientificCalculator};
pub use programmer::{ProgrammerCalculator, ProgrammerOp, Radix, RadixViews, WordSize};
pub use date::{DateCalculator, DateSummary};
pub use resistor::{ResistorRow, ResistorSeries, ResistorTable};
