//! Date calculator: day differences and day offsets

use serde::Serialize;
use crate::CalcError;
use tally_core::{parse_leading_float, CalendarDate};
use tally_plugin::{Lifecycle, Surface, Tool, ToolMeta};

static DATE_META: ToolMeta = ToolMeta {
    name: "date",
    description: "Days between two dates, or a date plus or minus a number of days",
    category: "calculator",
    elements: &[
        "from-date",
        "to-date",
        "base-date",
        "days-count",
        "date-difference",
        "date-calculation",
    ],
};

/// Snapshot of the two date computations
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DateSummary {
    pub difference_days: Option<i64>,
    pub result_date: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct DateCalculator {
    from: Option<CalendarDate>,
    to: Option<CalendarDate>,
    base: Option<CalendarDate>,
    days: Option<i64>,
    lifecycle: Lifecycle,
}

impl DateCalculator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the first date of the difference pair; blank text clears it
    pub fn set_from(&mut self, text: &str) -> Result<(), CalcError> {
        self.from = parse_date(text)?;
        Ok(())
    }

    pub fn set_to(&mut self, text: &str) -> Result<(), CalcError> {
        self.to = parse_date(text)?;
        Ok(())
    }

    pub fn set_base(&mut self, text: &str) -> Result<(), CalcError> {
        self.base = parse_date(text)?;
        Ok(())
    }

    /// Set the day count; the integer prefix of the text is used
    pub fn set_days(&mut self, text: &str) {
        self.days = parse_leading_float(text).map(|d| d.trunc() as i64);
    }

    pub fn days(&self) -> Option<i64> {
        self.days
    }

    /// The "add" button: make the day count positive
    pub fn add(&mut self) {
        self.days = Some(self.days.unwrap_or(0).abs());
    }

    /// The "subtract" button: make the day count negative
    pub fn subtract(&mut self) {
        self.days = Some(-self.days.unwrap_or(0).abs());
    }

    /// Absolute number of days between the two dates
    pub fn difference(&self) -> Option<i64> {
        Some(self.from?.days_between(&self.to?))
    }

    /// Base date shifted by the day count
    pub fn result_date(&self) -> Result<Option<CalendarDate>, CalcError> {
        match (self.base, self.days) {
            (Some(base), Some(days)) => Ok(Some(base.add_days(days)?)),
            _ => Ok(None),
        }
    }

    pub fn summary(&self) -> DateSummary {
        DateSummary {
            difference_days: self.difference(),
            result_date: self.result_date().ok().flatten().map(|d| d.to_iso_string()),
        }
    }
}

fn parse_date(text: &str) -> Result<Option<CalendarDate>, CalcError> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }
    Ok(Some(CalendarDate::parse(text)?))
}

fn iso(date: Option<CalendarDate>) -> String {
    date.map(|d| d.to_iso_string()).unwrap_or_default()
}

impl Tool for DateCalculator {
    fn meta(&self) -> ToolMeta {
        DATE_META.clone()
    }

    fn is_initialized(&self) -> bool {
        self.lifecycle.is_initialized()
    }

    fn init(&mut self, surface: &dyn Surface) -> bool {
        self.lifecycle.bind(&DATE_META, surface)
    }

    fn update_display(&self, surface: &mut dyn Surface) {
        if !self.is_initialized() {
            return;
        }
        surface.set_text("from-date", &iso(self.from));
        surface.set_text("to-date", &iso(self.to));
        surface.set_text("base-date", &iso(self.base));
        surface.set_text("days-count", &self.days.map(|d| d.to_string()).unwrap_or_default());

        let summary = self.summary();
        let difference = summary.difference_days.map(|d| format!("{} days", d)).unwrap_or_default();
        surface.set_text("date-difference", &difference);
        surface.set_text("date-calculation", &summary.result_date.unwrap_or_default());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_core::DateError;
    use tally_plugin::MemorySurface;

    #[test]
    fn test_difference_is_absolute() {
        let mut calc = DateCalculator::new();
        calc.set_from("2024-03-01").unwrap();
        calc.set_to("2024-02-01").unwrap();
        assert_eq!(calc.difference(), Some(29));
        calc.set_to("").unwrap();
        assert_eq!(calc.difference(), None);
    }

    #[test]
    fn test_add_and_subtract_buttons() {
        let mut calc = DateCalculator::new();
        calc.set_base("2023-12-25").unwrap();
        calc.set_days("-10");
        calc.add();
        assert_eq!(calc.days(), Some(10));
        assert_eq!(calc.result_date().unwrap().unwrap().to_iso_string(), "2024-01-04");

        calc.subtract();
        assert_eq!(calc.days(), Some(-10));
        assert_eq!(calc.result_date().unwrap().unwrap().to_iso_string(), "2023-12-15");
    }

    #[test]
    fn test_days_use_integer_prefix() {
        let mut calc = DateCalculator::new();
        calc.set_days("12.9 days");
        assert_eq!(calc.days(), Some(12));
        calc.set_days("soon");
        assert_eq!(calc.days(), None);
    }

    #[test]
    fn test_invalid_dates_rejected() {
        let mut calc = DateCalculator::new();
        assert_eq!(
            calc.set_from("2023-02-29"),
            Err(CalcError::Date(DateError::InvalidDay(29, 2, 2023)))
        );
        assert!(calc.set_from("yesterday").is_err());
        calc.set_from("2024-02-29").unwrap();
    }

    #[test]
    fn test_display() {
        let mut calc = DateCalculator::new();
        let mut surface = MemorySurface::for_tools([&DATE_META]);
        assert!(calc.init(&surface));
        calc.set_from("2024-01-01").unwrap();
        calc.set_to("2024-12-31").unwrap();
        calc.update_display(&mut surface);
        assert_eq!(surface.text("date-difference"), Some("365 days"));
        assert_eq!(surface.text("date-calculation"), Some(""));
    }
}
