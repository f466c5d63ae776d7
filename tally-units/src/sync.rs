//! Two linked input fields kept in agreement through a converter

use serde::Serialize;
use crate::{Convert, ConversionError};
use tally_core::parse_leading_float;

/// Which of the two linked fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Source,
    Target,
}

/// The single field written by a sync operation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SyncUpdate {
    pub field: Field,
    /// New text of the field; empty when the field was cleared
    pub text: String,
}

/// State of a source/target field pair
///
/// Editing one field rewrites only the other one; the write never feeds
/// back into another recomputation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BidirectionalSync {
    source_text: String,
    target_text: String,
    source_unit: String,
    target_unit: String,
}

impl BidirectionalSync {
    pub fn new(source_unit: &str, target_unit: &str) -> Self {
        BidirectionalSync {
            source_text: String::new(),
            target_text: String::new(),
            source_unit: source_unit.to_string(),
            target_unit: target_unit.to_string(),
        }
    }

    pub fn source_text(&self) -> &str {
        &self.source_text
    }

    pub fn target_text(&self) -> &str {
        &self.target_text
    }

    pub fn source_unit(&self) -> &str {
        &self.source_unit
    }

    pub fn target_unit(&self) -> &str {
        &self.target_unit
    }

    /// The user typed into the source field
    pub fn edit_source(&mut self, engine: &dyn Convert, text: &str) -> Result<SyncUpdate, ConversionError> {
        self.source_text = text.to_string();
        self.recompute_target(engine)
    }

    /// The user typed into the target field; the source is recomputed
    pub fn edit_target(&mut self, engine: &dyn Convert, text: &str) -> Result<SyncUpdate, ConversionError> {
        self.target_text = text.to_string();
        let converted = render(engine, &self.target_text, &self.target_unit, &self.source_unit)?;
        self.source_text = converted.clone();
        Ok(SyncUpdate { field: Field::Source, text: converted })
    }

    /// Change the source unit, then recompute from the source field
    pub fn set_source_unit(&mut self, engine: &dyn Convert, unit: &str) -> Result<SyncUpdate, ConversionError> {
        engine.display_decimals(unit)?;
        self.source_unit = unit.trim().to_string();
        self.recompute_target(engine)
    }

    /// Change the target unit, then recompute from the source field
    pub fn set_target_unit(&mut self, engine: &dyn Convert, unit: &str) -> Result<SyncUpdate, ConversionError> {
        engine.display_decimals(unit)?;
        self.target_unit = unit.trim().to_string();
        self.recompute_target(engine)
    }

    /// Set both units at once (used when applying a preset)
    pub fn set_units(&mut self, engine: &dyn Convert, source: &str, target: &str) -> Result<SyncUpdate, ConversionError> {
        engine.display_decimals(source)?;
        engine.display_decimals(target)?;
        self.source_unit = source.trim().to_string();
        self.target_unit = target.trim().to_string();
        self.recompute_target(engine)
    }

    /// Recompute the target from the current source text
    pub fn recompute_target(&mut self, engine: &dyn Convert) -> Result<SyncUpdate, ConversionError> {
        let converted = render(engine, &self.source_text, &self.source_unit, &self.target_unit)?;
        self.target_text = converted.clone();
        Ok(SyncUpdate { field: Field::Target, text: converted })
    }

    pub fn clear(&mut self) {
        self.source_text.clear();
        self.target_text.clear();
    }
}

fn render(engine: &dyn Convert, text: &str, from: &str, to: &str) -> Result<String, ConversionError> {
    match parse_leading_float(text) {
        Some(value) => Ok(engine.convert_display(value, from, to)?.unwrap_or_default()),
        None => {
            // Unknown units still fail even when there is nothing to convert
            engine.display_decimals(from)?;
            engine.display_decimals(to)?;
            Ok(String::new())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ConversionStrategy, Quantity};

    fn length() -> ConversionStrategy {
        ConversionStrategy::for_quantity(Quantity::Length)
    }

    #[test]
    fn test_edit_target_recomputes_source() {
        let engine = length();
        let mut sync = BidirectionalSync::new("mi", "km");
        let update = sync.edit_target(&engine, "100").unwrap();
        assert_eq!(update, SyncUpdate { field: Field::Source, text: "62.137119".into() });
        assert_eq!(sync.source_text(), "62.137119");
        assert_eq!(sync.target_text(), "100");
    }

    #[test]
    fn test_edit_source_writes_only_target() {
        let engine = length();
        let mut sync = BidirectionalSync::new("m", "km");
        let update = sync.edit_source(&engine, "1500").unwrap();
        assert_eq!(update.field, Field::Target);
        assert_eq!(update.text, "1.500000");
        assert_eq!(sync.source_text(), "1500");
    }

    #[test]
    fn test_unparseable_edit_clears_other_field() {
        let engine = length();
        let mut sync = BidirectionalSync::new("m", "km");
        sync.edit_source(&engine, "1500").unwrap();
        let update = sync.edit_source(&engine, "abc").unwrap();
        assert_eq!(update.text, "");
        assert_eq!(sync.target_text(), "");
    }

    #[test]
    fn test_leading_prefix_parse() {
        let engine = length();
        let mut sync = BidirectionalSync::new("km", "m");
        assert_eq!(sync.edit_source(&engine, "12abc").unwrap().text, "12000.000000");
    }

    #[test]
    fn test_unit_change_recomputes_from_source() {
        let engine = length();
        let mut sync = BidirectionalSync::new("m", "km");
        sync.edit_source(&engine, "1000").unwrap();
        let update = sync.set_target_unit(&engine, "cm").unwrap();
        assert_eq!(update, SyncUpdate { field: Field::Target, text: "100000.000000".into() });

        sync.edit_target(&engine, "5").unwrap();
        // Source unit change recomputes target from the (recomputed) source
        let update = sync.set_source_unit(&engine, "mm").unwrap();
        assert_eq!(update.field, Field::Target);
        assert_eq!(sync.source_unit(), "mm");
    }

    #[test]
    fn test_unknown_unit_leaves_state() {
        let engine = length();
        let mut sync = BidirectionalSync::new("m", "km");
        assert!(sync.set_target_unit(&engine, "parsec-ish").is_err());
        assert_eq!(sync.target_unit(), "km");
    }
}
