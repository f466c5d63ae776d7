//! Structured errors for the tool shell
//!
//! Errors never crash a tool. Domain failures are turned into values that
//! the shell can display, and carry a machine-readable code plus an
//! optional hint for the user.

use crate::DateError;
use serde::{Deserialize, Serialize};

/// Standard error codes (machine-readable)
pub mod codes {
    pub const PARSE_ERROR: &str = "PARSE_ERROR";
    pub const DIV_ZERO: &str = "DIV_ZERO";
    pub const DOMAIN_ERROR: &str = "DOMAIN_ERROR";
    pub const OVERFLOW: &str = "OVERFLOW";
    pub const UNKNOWN_UNIT: &str = "UNKNOWN_UNIT";
    pub const INVALID_UNIT: &str = "INVALID_UNIT";
    pub const INVALID_SHIFT: &str = "INVALID_SHIFT";
    pub const UNKNOWN_MODE: &str = "UNKNOWN_MODE";
    pub const UNKNOWN_COMMAND: &str = "UNKNOWN_COMMAND";
    pub const MISSING_ELEMENT: &str = "MISSING_ELEMENT";
    pub const NOT_INITIALIZED: &str = "NOT_INITIALIZED";
    pub const RATE_REFRESH: &str = "RATE_REFRESH";
    pub const UNKNOWN_PRESET: &str = "UNKNOWN_PRESET";
    pub const INTERNAL: &str = "INTERNAL";
    // Date-specific error codes
    pub const INVALID_DATE: &str = "INVALID_DATE";
    pub const DATE_PARSE_ERROR: &str = "DATE_PARSE_ERROR";
}

/// Severity level of an error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Input was ignored, state unchanged
    Warning,
    /// The tool entered its error state
    Error,
    /// The tool cannot operate (e.g. failed initialization)
    Fatal,
}

/// Structured error returned to the shell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TallyError {
    /// Machine-readable error code
    pub code: String,

    /// Human-readable error message
    pub message: String,

    /// Suggestion for fixing the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,

    /// Tool that reported the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool: Option<String>,

    /// Severity level
    pub severity: Severity,
}

impl TallyError {
    /// Create a new error
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            suggestion: None,
            tool: None,
            severity: Severity::Error,
        }
    }

    /// Builder: add suggestion
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Builder: tag with the reporting tool
    pub fn in_tool(mut self, tool: impl Into<String>) -> Self {
        self.tool = Some(tool.into());
        self
    }

    /// Builder: set severity
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    // ========== Common Error Constructors ==========

    pub fn parse_error(details: impl Into<String>) -> Self {
        Self::new(codes::PARSE_ERROR, format!("Parse error: {}", details.into()))
            .with_suggestion("Enter a plain decimal number")
    }

    pub fn div_zero() -> Self {
        Self::new(codes::DIV_ZERO, "Division by zero")
            .with_suggestion("Press C to clear, then use a non-zero divisor")
    }

    pub fn domain_error(details: impl Into<String>) -> Self {
        Self::new(codes::DOMAIN_ERROR, format!("Domain error: {}", details.into()))
            .with_suggestion("Press C to clear")
    }

    pub fn unknown_unit(symbol: &str) -> Self {
        Self::new(codes::UNKNOWN_UNIT, format!("Unknown unit: {}", symbol))
            .with_suggestion("Use 'units <quantity>' to list available units")
    }

    pub fn unknown_mode(name: &str) -> Self {
        Self::new(codes::UNKNOWN_MODE, format!("Unknown mode: {}", name))
            .with_suggestion("Use 'list' to see available modes")
    }

    pub fn unknown_command(name: &str) -> Self {
        Self::new(codes::UNKNOWN_COMMAND, format!("Unknown command: {}", name))
            .with_suggestion("Use 'help' for the command list")
            .with_severity(Severity::Warning)
    }

    pub fn missing_element(tool: &str, element: &str) -> Self {
        Self::new(codes::MISSING_ELEMENT,
            format!("Required element '{}' not found", element))
            .in_tool(tool)
            .with_severity(Severity::Fatal)
    }

    pub fn not_initialized(tool: &str) -> Self {
        Self::new(codes::NOT_INITIALIZED, format!("{} is not initialized", tool))
            .in_tool(tool)
            .with_suggestion("Switch to the mode first so it can bind its display")
    }

    pub fn internal(details: impl Into<String>) -> Self {
        Self::new(codes::INTERNAL, format!("Internal error: {}", details.into()))
            .with_suggestion("This is a bug, please report it")
            .with_severity(Severity::Fatal)
    }

    // ========== Date Error Constructors ==========

    pub fn invalid_date(details: impl Into<String>) -> Self {
        Self::new(codes::INVALID_DATE, format!("Invalid date: {}", details.into()))
            .with_suggestion("Check date components (year, month 1-12, day 1-31)")
    }

    pub fn date_parse_error(details: impl Into<String>) -> Self {
        Self::new(codes::DATE_PARSE_ERROR, format!("Date parse error: {}", details.into()))
            .with_suggestion("Use ISO 8601 format (YYYY-MM-DD)")
    }
}

impl std::fmt::Display for TallyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(ref suggestion) = self.suggestion {
            write!(f, " (suggestion: {})", suggestion)?;
        }
        Ok(())
    }
}

impl std::error::Error for TallyError {}

impl From<DateError> for TallyError {
    fn from(err: DateError) -> Self {
        match err {
            DateError::InvalidMonth(m) => Self::invalid_date(format!("month {} out of range 1-12", m)),
            DateError::InvalidDay(d, m, y) => Self::invalid_date(format!("day {} invalid for {}/{}", d, m, y)),
            DateError::ParseError(s) => Self::date_parse_error(s),
            DateError::Overflow => Self::new(codes::OVERFLOW, "Date out of supported range"),
        }
    }
}
