//! Calculator errors

use tally_core::{codes, DateError, TallyError};
use thiserror::Error;

/// Why a calculator entered its error state
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalcError {
    #[error("Division by zero")]
    DivisionByZero,

    #[error("{function}: {reason}")]
    Domain { function: &'static str, reason: &'static str },

    #[error("Result out of range")]
    OutOfRange,

    #[error("Invalid shift amount {amount} for a {bits}-bit word")]
    InvalidShift { amount: String, bits: u32 },

    #[error("Invalid operand: {0}")]
    InvalidOperand(String),

    #[error("Unknown operator: {0}")]
    UnknownOperator(String),

    #[error("Unknown function: {0}")]
    UnknownFunction(String),

    #[error("Unsupported radix: {0}")]
    InvalidRadix(String),

    #[error("Unsupported word size: {0}")]
    InvalidWordSize(String),

    #[error("Unknown resistor series: {0}")]
    UnknownSeries(String),

    #[error(transparent)]
    Date(#[from] DateError),
}

impl CalcError {
    pub(crate) fn domain(function: &'static str, reason: &'static str) -> Self {
        CalcError::Domain { function, reason }
    }
}

impl From<CalcError> for TallyError {
    fn from(err: CalcError) -> Self {
        match err {
            CalcError::DivisionByZero => TallyError::div_zero(),
            CalcError::Domain { .. } => TallyError::domain_error(err.to_string()),
            CalcError::OutOfRange => TallyError::new(codes::OVERFLOW, err.to_string()),
            CalcError::InvalidShift { .. } => TallyError::new(codes::INVALID_SHIFT, err.to_string())
                .with_suggestion("Shift amounts must lie in [0, word size)"),
            CalcError::InvalidOperand(_)
            | CalcError::UnknownOperator(_)
            | CalcError::UnknownFunction(_)
            | CalcError::InvalidRadix(_)
            | CalcError::InvalidWordSize(_)
            | CalcError::UnknownSeries(_) => TallyError::parse_error(err.to_string()),
            CalcError::Date(e) => e.into(),
        }
    }
}
