//! Tally - calculator and unit-converter toolkit
//!
//! `Tally` is the application context: it owns every calculator and
//! converter, the mode directory and one display surface per mode.
//! Commands arrive one line at a time, are parsed into a [`Command`] and
//! executed against the active mode; each produces a [`Response`].
//!
//! ```text
//! mode length
//! from 12
//! unit to mi
//! ```

mod ast;
mod config;
mod eval;
mod parser;
mod render;

pub use ast::{Command, UnitField};
pub use config::{ConfigError, TallyConfig, DEFAULT_MODE};
pub use parser::{parse, parse_line};
pub use render::{Renderer, Response};

use std::collections::{BTreeMap, HashMap};
use tally_calc::{
    Calculator, DateCalculator, ProgrammerCalculator, ResistorTable, ScientificCalculator,
};
use tally_core::TallyError;
use tally_plugin::{MemorySurface, Surface, Tool, ToolMeta, ToolRegistry};
use tally_units::{all_converters, Converter, Quantity, INFO_ELEMENT};
use tracing::{debug, info, warn};

/// Optional display elements a shell provides besides the required ones
fn optional_elements(meta: &ToolMeta) -> &'static [&'static str] {
    match meta.name {
        "standard" => &["memory-display", "history"],
        "scientific" => &["memory-display", "history", "angle-mode", "second-function"],
        "programmer" => &["radix", "word-size", "hex-display", "dec-display", "oct-display", "bin-display"],
        _ if meta.category == "converter" => &[INFO_ELEMENT],
        _ => &[],
    }
}

/// The surface a complete shell offers for one mode
pub fn shell_surface(meta: &ToolMeta) -> MemorySurface {
    MemorySurface::with_elements(meta.elements.iter().chain(optional_elements(meta)).copied())
}

/// Application context
pub struct Tally {
    registry: ToolRegistry,
    active: Option<&'static str>,
    surfaces: HashMap<&'static str, MemorySurface>,
    standard: Calculator,
    scientific: ScientificCalculator,
    programmer: ProgrammerCalculator,
    date: DateCalculator,
    resistor: ResistorTable,
    converters: BTreeMap<Quantity, Converter>,
    renderer: Renderer,
}

impl Tally {
    pub fn new() -> Self {
        Self::with_config(TallyConfig::default())
    }

    pub fn with_config(config: TallyConfig) -> Self {
        let mut tally = Self::unbound(&config);
        if let Err(e) = tally.switch_mode(&config.mode) {
            warn!(mode = %config.mode, error = %e, "startup mode unavailable, using {}", DEFAULT_MODE);
            if let Err(e) = tally.switch_mode(DEFAULT_MODE) {
                warn!(error = %e, "default mode failed to bind");
            }
        }
        tally
    }

    /// Every tool constructed, none bound, no mode active
    fn unbound(config: &TallyConfig) -> Self {
        let standard = Calculator::new();
        let scientific = ScientificCalculator::with_angle_mode(config.angle);
        let programmer = ProgrammerCalculator::new(config.radix, config.word_size);
        let date = DateCalculator::new();
        let resistor = ResistorTable::new();
        let mut converters: BTreeMap<Quantity, Converter> =
            all_converters().into_iter().map(|c| (c.quantity(), c)).collect();

        if let Some(currency) = converters.get_mut(&Quantity::Currency) {
            for (code, rate) in &config.rates {
                if let Err(e) = currency.set_rate(code, *rate) {
                    warn!(code = %code, rate, error = %e, "ignoring configured exchange rate");
                }
            }
        }

        let mut registry = ToolRegistry::new()
            .with_tool(standard.meta())
            .with_tool(scientific.meta())
            .with_tool(programmer.meta())
            .with_tool(date.meta())
            .with_tool(resistor.meta());
        for converter in converters.values() {
            registry = registry.with_tool(converter.meta());
        }
        debug!(tools = registry.len(), "tool registry built");

        Tally {
            registry,
            active: None,
            surfaces: HashMap::new(),
            standard,
            scientific,
            programmer,
            date,
            resistor,
            converters,
            renderer: Renderer::new(),
        }
    }

    /// Release every tool and surface
    pub fn dispose(self) {
        info!(
            bound = self.surfaces.len(),
            active = self.active.unwrap_or("none"),
            "tally context disposed"
        );
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Name of the mode currently shown
    pub fn active_mode(&self) -> Option<&'static str> {
        self.active
    }

    /// Provide the display surface for a mode instead of the complete default one
    ///
    /// Takes effect the next time the mode is entered before it binds.
    pub fn attach_surface(&mut self, mode: &str, surface: MemorySurface) -> Result<(), TallyError> {
        let name = self.registry.resolve(mode)?.name;
        self.surfaces.insert(name, surface);
        Ok(())
    }

    pub fn surface(&self, mode: &str) -> Option<&MemorySurface> {
        let name = self.registry.get(mode).map(|m| m.name)?;
        self.surfaces.get(name)
    }

    /// Navigate to a mode, binding its tool on first visit
    ///
    /// The mode becomes active even when binding fails; its tool then
    /// stays unusable and the missing element is reported.
    pub fn switch_mode(&mut self, name: &str) -> Result<&'static str, TallyError> {
        let meta = self.registry.resolve(name)?.clone();
        let mut surface = self
            .surfaces
            .remove(meta.name)
            .unwrap_or_else(|| shell_surface(&meta));

        let tool = self
            .tool_mut(meta.name)
            .ok_or_else(|| TallyError::internal(format!("no tool behind mode '{}'", meta.name)))?;
        let bound = tool.init(&surface);
        if bound {
            tool.update_display(&mut surface);
        }

        self.surfaces.insert(meta.name, surface);
        self.active = Some(meta.name);
        info!(mode = meta.name, bound, "mode switched");

        if bound {
            Ok(meta.name)
        } else {
            let missing = meta
                .elements
                .iter()
                .find(|id| !self.surfaces.get(meta.name).is_some_and(|s| s.has_element(id)))
                .copied()
                .unwrap_or_default();
            Err(TallyError::missing_element(meta.name, missing))
        }
    }

    pub fn tool(&self, mode: &str) -> Option<&dyn Tool> {
        match mode {
            "standard" => Some(&self.standard as &dyn Tool),
            "scientific" => Some(&self.scientific as &dyn Tool),
            "programmer" => Some(&self.programmer as &dyn Tool),
            "date" => Some(&self.date as &dyn Tool),
            "resistor" => Some(&self.resistor as &dyn Tool),
            other => Quantity::from_name(other)
                .and_then(|q| self.converters.get(&q))
                .map(|c| c as &dyn Tool),
        }
    }

    fn tool_mut(&mut self, mode: &str) -> Option<&mut dyn Tool> {
        match mode {
            "standard" => Some(&mut self.standard as &mut dyn Tool),
            "scientific" => Some(&mut self.scientific as &mut dyn Tool),
            "programmer" => Some(&mut self.programmer as &mut dyn Tool),
            "date" => Some(&mut self.date as &mut dyn Tool),
            "resistor" => Some(&mut self.resistor as &mut dyn Tool),
            other => Quantity::from_name(other)
                .and_then(|q| self.converters.get_mut(&q))
                .map(|c| c as &mut dyn Tool),
        }
    }

    /// Push the active tool's state into its surface
    pub fn refresh_display(&mut self) {
        let Some(mode) = self.active else {
            return;
        };
        let Some(mut surface) = self.surfaces.remove(mode) else {
            return;
        };
        if let Some(tool) = self.tool(mode) {
            tool.update_display(&mut surface);
        }
        self.surfaces.insert(mode, surface);
    }

    /// Run one command and describe the outcome
    pub fn execute(&mut self, command: &Command) -> Response {
        let outcome = eval::execute(self, command);
        if let Err(e) = &outcome {
            debug!(command = command.name(), code = %e.code, "command failed");
        }
        if !command.is_query() {
            self.refresh_display();
        }
        let surface = self.active.and_then(|m| self.surfaces.get(m));
        self.renderer.render(self.active, surface, outcome)
    }

    /// Parse and run one input line; `None` for blank lines and comments
    pub fn run_line(&mut self, line: &str) -> Option<Response> {
        match parse_line(line) {
            Ok(Some(command)) => Some(self.execute(&command)),
            Ok(None) => None,
            Err(e) => {
                let surface = self.active.and_then(|m| self.surfaces.get(m));
                Some(self.renderer.render(self.active, surface, Err(e)))
            }
        }
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    pub fn calculator(&self) -> &Calculator {
        &self.standard
    }

    pub fn scientific(&self) -> &ScientificCalculator {
        &self.scientific
    }

    pub fn programmer(&self) -> &ProgrammerCalculator {
        &self.programmer
    }

    pub fn date(&self) -> &DateCalculator {
        &self.date
    }

    pub fn resistor(&self) -> &ResistorTable {
        &self.resistor
    }

    pub fn converter(&self, quantity: Quantity) -> Option<&Converter> {
        self.converters.get(&quantity)
    }
}

impl Default for Tally {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_calc::{AngleMode, Radix, WordSize};
    use tally_core::codes;

    fn run(tally: &mut Tally, script: &str) -> Response {
        let mut last = None;
        for line in script.lines() {
            if let Some(response) = tally.run_line(line) {
                assert!(response.ok, "'{}' failed: {:?}", line, response.error);
                last = Some(response);
            }
        }
        last.unwrap()
    }

    #[test]
    fn test_starts_in_standard_mode() {
        let tally = Tally::new();
        assert_eq!(tally.active_mode(), Some("standard"));
        assert!(tally.calculator().is_initialized());
        assert!(!tally.scientific().is_initialized());
        assert_eq!(tally.registry().len(), 5 + Quantity::ALL.len());
    }

    #[test]
    fn test_standard_session() {
        let mut tally = Tally::new();
        let response = run(&mut tally, "2\n+\n3\n*");
        assert_eq!(response.element("current-operand"), Some(""));
        assert_eq!(response.element("previous-operand"), Some("5 ×"));

        let response = run(&mut tally, "4\n=");
        assert_eq!(response.element("current-operand"), Some("20"));
        assert_eq!(response.element("previous-operand"), Some(""));
    }

    #[test]
    fn test_division_by_zero_shows_error() {
        let mut tally = Tally::new();
        let response = run(&mut tally, "5\n/\n0\n=");
        assert_eq!(response.element("current-operand"), Some("Error"));
    }

    #[test]
    fn test_lazy_init_on_navigation() {
        let mut tally = Tally::new();
        assert_eq!(tally.switch_mode("length").unwrap(), "length-converter");
        assert!(tally.tool("length-converter").unwrap().is_initialized());
        // Second visit is a no-op bind
        assert_eq!(tally.switch_mode("length-converter").unwrap(), "length-converter");
    }

    #[test]
    fn test_converter_session() {
        let mut tally = Tally::new();
        let response = run(&mut tally, "mode length\nunit from mi\nunit to km\nto 100");
        assert_eq!(response.element("from-input"), Some("62.137119"));
        assert_eq!(response.element("to-input"), Some("100"));
        assert_eq!(response.data["field"], "source");
    }

    #[test]
    fn test_converter_fields_are_scoped_per_mode() {
        let mut tally = Tally::new();
        run(&mut tally, "mode length\nfrom 1");
        let response = run(&mut tally, "mode temperature\nfrom 100");
        assert_eq!(response.element("to-input"), Some("212.000"));
        assert_eq!(tally.surface("length-converter").unwrap().text("from-input"), Some("1"));
    }

    #[test]
    fn test_missing_element_leaves_tool_unbound() {
        let mut tally = Tally::new();
        tally
            .attach_surface("date", MemorySurface::with_elements(["from-date", "to-date"]))
            .unwrap();
        let err = tally.switch_mode("date").unwrap_err();
        assert_eq!(err.code, codes::MISSING_ELEMENT);
        assert_eq!(tally.active_mode(), Some("date"));

        let response = tally.run_line("from 2024-01-01").unwrap();
        assert_eq!(response.error.unwrap().code, codes::NOT_INITIALIZED);
    }

    #[test]
    fn test_unknown_mode() {
        let mut tally = Tally::new();
        let response = tally.run_line("mode scientifc").unwrap();
        let err = response.error.unwrap();
        assert_eq!(err.code, codes::UNKNOWN_MODE);
        assert!(err.suggestion.unwrap().contains("scientific"));
        assert_eq!(tally.active_mode(), Some("standard"));
    }

    #[test]
    fn test_config_applies() {
        let config = TallyConfig {
            mode: "programmer".to_string(),
            word_size: WordSize::Byte,
            radix: Radix::Dec,
            angle: AngleMode::Radians,
            rates: vec![("USD".to_string(), 0.2)],
        };
        let tally = Tally::with_config(config);
        assert_eq!(tally.active_mode(), Some("programmer"));
        assert_eq!(tally.programmer().word_size(), WordSize::Byte);
        assert_eq!(tally.programmer().radix(), Radix::Dec);
        assert_eq!(tally.scientific().angle_mode(), AngleMode::Radians);
        let currency = tally.converter(Quantity::Currency).unwrap();
        assert_eq!(currency.rate_display(), Some("1 CNY = 0.2000 USD".to_string()));
    }

    #[test]
    fn test_bad_startup_mode_falls_back() {
        let config = TallyConfig { mode: "abacus".to_string(), ..TallyConfig::default() };
        let tally = Tally::with_config(config);
        assert_eq!(tally.active_mode(), Some(DEFAULT_MODE));
        tally.dispose();
    }
}
