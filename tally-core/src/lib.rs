//! Tally Core - Fundamental types
//!
//! This crate provides the core types used throughout Tally:
//! - `TallyError`: Structured errors for the shell
//! - `format`: display rules shared by calculators and converters
//! - `CalendarDate`: whole-day dates for the date calculator

mod error;
mod datetime;
pub mod format;

pub use error::{TallyError, Severity, codes};
pub use datetime::{CalendarDate, DateError, is_leap_year, days_in_month};
pub use format::{format_result, format_fixed, parse_leading_float};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{TallyError, Severity, CalendarDate};
    pub use crate::error::codes;
    pub use crate::format::{format_result, format_fixed, parse_leading_float};
}
