//! Scientific calculator

use serde::Serialize;
use crate::functions::{AngleMode, MathFn};
use crate::standard::{Calculator, KeypadFn, MemoryOp, Operator, CALCULATOR_ELEMENTS};
use crate::CalcError;
use tally_plugin::{Lifecycle, Surface, Tool, ToolMeta};
use tracing::debug;

static SCIENTIFIC_META: ToolMeta = ToolMeta {
    name: "scientific",
    description: "Scientific calculator with trig, logarithms, powers and factorials",
    category: "calculator",
    elements: CALCULATOR_ELEMENTS,
};

/// Constants on the scientific keypad
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Constant {
    Pi,
    E,
}

impl Constant {
    pub fn value(&self) -> f64 {
        match self {
            Constant::Pi => std::f64::consts::PI,
            Constant::E => std::f64::consts::E,
        }
    }

    pub fn from_name(name: &str) -> Option<Constant> {
        match name.trim() {
            "π" | "pi" | "PI" => Some(Constant::Pi),
            "e" | "E" => Some(Constant::E),
            _ => None,
        }
    }
}

/// The standard state machine plus function keys, a 2nd toggle and an
/// angle mode
#[derive(Debug, Clone, Default)]
pub struct ScientificCalculator {
    core: Calculator,
    second: bool,
    angle: AngleMode,
    lifecycle: Lifecycle,
}

impl ScientificCalculator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_angle_mode(angle: AngleMode) -> Self {
        ScientificCalculator { angle, ..Self::default() }
    }

    /// The underlying running-total calculator
    pub fn core(&self) -> &Calculator {
        &self.core
    }

    pub fn current(&self) -> &str {
        self.core.current()
    }

    pub fn error(&self) -> Option<&CalcError> {
        self.core.error()
    }

    pub fn angle_mode(&self) -> AngleMode {
        self.angle
    }

    pub fn set_angle_mode(&mut self, angle: AngleMode) {
        self.angle = angle;
    }

    pub fn toggle_angle_mode(&mut self) {
        self.angle = self.angle.toggled();
        debug!(mode = self.angle.label(), "angle mode");
    }

    pub fn is_second(&self) -> bool {
        self.second
    }

    /// The 2nd key: swap every function key to its alternate
    pub fn toggle_second(&mut self) {
        self.second = !self.second;
    }

    pub fn append_number(&mut self, token: &str) {
        self.core.append_number(token);
    }

    pub fn choose_operation(&mut self, op: Operator) {
        self.core.choose_operation(op);
    }

    /// The xʸ key
    pub fn exponent(&mut self) {
        self.core.choose_operation(Operator::Power);
    }

    pub fn compute(&mut self) {
        self.core.compute();
    }

    pub fn clear(&mut self) {
        self.core.clear();
    }

    pub fn execute_function(&mut self, func: KeypadFn) {
        self.core.execute_function(func);
    }

    pub fn memory_op(&mut self, op: MemoryOp) {
        self.core.memory_op(op);
    }

    pub fn handle_key(&mut self, name: &str) -> bool {
        self.core.handle_key(name)
    }

    /// A function key as labelled, honouring the 2nd toggle
    pub fn press_function(&mut self, f: MathFn) {
        let f = if self.second { f.second() } else { f };
        self.apply_function(f);
    }

    /// Apply exactly this function to the operand
    pub fn apply_function(&mut self, f: MathFn) {
        self.core.apply_math(f, self.angle);
    }

    pub fn insert_constant(&mut self, c: Constant) {
        self.core.set_operand(c.value());
    }

    /// The label a function key currently shows
    pub fn key_label(&self, f: MathFn) -> &'static str {
        if self.second { f.second().label() } else { f.label() }
    }
}

impl Tool for ScientificCalculator {
    fn meta(&self) -> ToolMeta {
        SCIENTIFIC_META.clone()
    }

    fn is_initialized(&self) -> bool {
        self.lifecycle.is_initialized()
    }

    fn init(&mut self, surface: &dyn Surface) -> bool {
        self.lifecycle.bind(&SCIENTIFIC_META, surface)
    }

    fn update_display(&self, surface: &mut dyn Surface) {
        if !self.is_initialized() {
            return;
        }
        self.core.render_into(surface);
        surface.set_text("angle-mode", self.angle.label());
        surface.set_text("second-function", if self.second { "2nd" } else { "" });
    }
}
