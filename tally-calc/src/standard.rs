//! Standard calculator: running-total state machine with memory and history

use std::collections::VecDeque;
use serde::{Serialize, Deserialize};
use crate::functions::{power, AngleMode, MathFn};
use crate::CalcError;
use tally_core::{format_result, parse_leading_float};
use tally_plugin::{Lifecycle, Surface, Tool, ToolMeta};
use tracing::debug;

/// Text shown in the operand display after a failed operation
pub const ERROR_TEXT: &str = "Error";

/// Number of history lines kept (most recent first)
pub const HISTORY_LIMIT: usize = 50;

pub const CALCULATOR_ELEMENTS: &[&str] = &["current-operand", "previous-operand"];

/// Binary operators of the decimal calculators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Power,
}

impl Operator {
    pub fn symbol(&self) -> &'static str {
        match self {
            Operator::Add => "+",
            Operator::Subtract => "-",
            Operator::Multiply => "×",
            Operator::Divide => "÷",
            Operator::Power => "^",
        }
    }

    /// Parse a keypad or keyboard token (`*` and `x` mean ×, `/` means ÷)
    pub fn from_token(token: &str) -> Option<Operator> {
        match token.trim() {
            "+" => Some(Operator::Add),
            "-" | "−" => Some(Operator::Subtract),
            "*" | "x" | "×" => Some(Operator::Multiply),
            "/" | "÷" => Some(Operator::Divide),
            "^" | "**" | "xʸ" | "x^y" => Some(Operator::Power),
            _ => None,
        }
    }

    pub fn apply(&self, a: f64, b: f64) -> Result<f64, CalcError> {
        match self {
            Operator::Add => Ok(a + b),
            Operator::Subtract => Ok(a - b),
            Operator::Multiply => Ok(a * b),
            Operator::Divide => {
                if b == 0.0 {
                    Err(CalcError::DivisionByZero)
                } else {
                    Ok(a / b)
                }
            }
            Operator::Power => power(a, b),
        }
    }
}

/// Functions on the standard keypad besides digits and operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeypadFn {
    Backspace,
    ClearEntry,
    Clear,
    Percent,
    Negate,
    Reciprocal,
    Square,
    SquareRoot,
}

impl KeypadFn {
    pub fn from_label(label: &str) -> Option<KeypadFn> {
        match label.trim() {
            "⌫" | "back" | "backspace" => Some(KeypadFn::Backspace),
            "CE" | "ce" => Some(KeypadFn::ClearEntry),
            "C" | "c" | "clear" => Some(KeypadFn::Clear),
            "%" => Some(KeypadFn::Percent),
            "±" | "+/-" | "neg" | "negate" => Some(KeypadFn::Negate),
            "1/x" | "recip" => Some(KeypadFn::Reciprocal),
            "x²" | "x^2" | "sqr" => Some(KeypadFn::Square),
            "√" | "sqrt" => Some(KeypadFn::SquareRoot),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            KeypadFn::Backspace => "⌫",
            KeypadFn::ClearEntry => "CE",
            KeypadFn::Clear => "C",
            KeypadFn::Percent => "%",
            KeypadFn::Negate => "±",
            KeypadFn::Reciprocal => "1/x",
            KeypadFn::Square => "x²",
            KeypadFn::SquareRoot => "√",
        }
    }
}

/// Memory keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemoryOp {
    Clear,
    Recall,
    Add,
    Subtract,
    Store,
}

impl MemoryOp {
    pub fn from_label(label: &str) -> Option<MemoryOp> {
        match label.trim().to_uppercase().as_str() {
            "MC" => Some(MemoryOp::Clear),
            "MR" => Some(MemoryOp::Recall),
            "M+" => Some(MemoryOp::Add),
            "M-" | "M−" => Some(MemoryOp::Subtract),
            "MS" => Some(MemoryOp::Store),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MemoryOp::Clear => "MC",
            MemoryOp::Recall => "MR",
            MemoryOp::Add => "M+",
            MemoryOp::Subtract => "M-",
            MemoryOp::Store => "MS",
        }
    }
}

/// A physical key as delivered by the shell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Digit(char),
    Point,
    Operator(Operator),
    Equals,
    Backspace,
    Escape,
    Percent,
}

impl Key {
    /// Map a key name (`"7"`, `"*"`, `"Enter"`, `"Escape"`...) to a key
    pub fn from_name(name: &str) -> Option<Key> {
        match name {
            "." => Some(Key::Point),
            "=" | "Enter" => Some(Key::Equals),
            "Backspace" => Some(Key::Backspace),
            "Escape" => Some(Key::Escape),
            "%" => Some(Key::Percent),
            "+" | "-" | "*" | "/" | "x" | "×" | "÷" => Operator::from_token(name).map(Key::Operator),
            _ => {
                let mut chars = name.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) if c.is_ascii_digit() => Some(Key::Digit(c)),
                    _ => None,
                }
            }
        }
    }
}

/// Where the state machine currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Phase {
    Idle,
    AccumulatingFirstOperand,
    OperatorChosen,
    AccumulatingSecondOperand,
    Error,
}

/// Observable calculator state
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalculatorState {
    pub current: String,
    pub previous: String,
    pub pending: Option<Operator>,
    pub memory: f64,
    pub awaiting_fresh_input: bool,
    pub memory_visible: bool,
}

impl Default for CalculatorState {
    fn default() -> Self {
        CalculatorState {
            current: "0".to_string(),
            previous: String::new(),
            pending: None,
            memory: 0.0,
            awaiting_fresh_input: false,
            memory_visible: false,
        }
    }
}

static STANDARD_META: ToolMeta = ToolMeta {
    name: "standard",
    description: "Standard calculator with memory and history",
    category: "calculator",
    elements: CALCULATOR_ELEMENTS,
};

/// Standard calculator
///
/// Binary operations chain left to right: choosing an operator while one
/// is pending computes the pending one first. Any failure puts "Error" in
/// the operand display and drops the pending operator; the next digit
/// starts a fresh entry.
#[derive(Debug, Clone, Default)]
pub struct Calculator {
    state: CalculatorState,
    error: Option<CalcError>,
    history: VecDeque<String>,
    lifecycle: Lifecycle,
}

impl Calculator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &CalculatorState {
        &self.state
    }

    pub fn current(&self) -> &str {
        &self.state.current
    }

    pub fn memory(&self) -> f64 {
        self.state.memory
    }

    /// Why the calculator is showing "Error", if it is
    pub fn error(&self) -> Option<&CalcError> {
        self.error.as_ref()
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    pub fn phase(&self) -> Phase {
        if self.is_error() {
            return Phase::Error;
        }
        match self.state.pending {
            Some(_) if self.state.current.is_empty() => Phase::OperatorChosen,
            Some(_) => Phase::AccumulatingSecondOperand,
            None if self.state.awaiting_fresh_input => Phase::Idle,
            None if self.state.current == "0" => Phase::Idle,
            None => Phase::AccumulatingFirstOperand,
        }
    }

    /// Most recent entry first
    pub fn history(&self) -> impl Iterator<Item = &str> {
        self.history.iter().map(|s| s.as_str())
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    /// Text of the previous-operand line ("12 +")
    pub fn previous_line(&self) -> String {
        match self.state.pending {
            Some(op) => format!("{} {}", self.state.previous, op.symbol()),
            None => String::new(),
        }
    }

    /// Append digits and at most one decimal point
    pub fn append_number(&mut self, token: &str) {
        for c in token.chars() {
            self.append_char(c);
        }
    }

    fn append_char(&mut self, c: char) {
        if !(c.is_ascii_digit() || c == '.') {
            return;
        }
        if self.error.take().is_some() || self.state.awaiting_fresh_input {
            self.state.current.clear();
            self.state.awaiting_fresh_input = false;
        }

        let current = &mut self.state.current;
        if c == '.' {
            if current.contains('.') {
                return;
            }
            if current.is_empty() {
                current.push('0');
            }
            current.push('.');
        } else if current == "0" {
            *current = c.to_string();
        } else {
            current.push(c);
        }
    }

    /// Choose a binary operator, computing any pending one first
    pub fn choose_operation(&mut self, op: Operator) {
        if self.is_error() || self.state.current.is_empty() {
            return;
        }
        if !self.state.previous.is_empty() {
            self.compute();
            if self.is_error() {
                return;
            }
        }
        self.state.pending = Some(op);
        self.state.previous = std::mem::take(&mut self.state.current);
        self.state.awaiting_fresh_input = false;
    }

    /// Evaluate the pending operation
    pub fn compute(&mut self) {
        if self.is_error() {
            return;
        }
        let Some(op) = self.state.pending else {
            return;
        };
        let Some(prev) = parse_leading_float(&self.state.previous) else {
            return;
        };
        let current = if self.state.current.is_empty() {
            // x^y needs both operands typed; the others treat a blank as 0
            if op == Operator::Power {
                self.fail(CalcError::InvalidOperand("missing exponent".into()));
                return;
            }
            Some(0.0)
        } else {
            parse_leading_float(&self.state.current)
        };
        let Some(current) = current else {
            self.fail(CalcError::InvalidOperand(self.state.current.clone()));
            return;
        };

        match op.apply(prev, current).and_then(render) {
            Ok(text) => {
                self.record(format!(
                    "{} {} {} = {}",
                    render_lossy(prev),
                    op.symbol(),
                    render_lossy(current),
                    text
                ));
                debug!(op = op.symbol(), prev, current, result = %text, "computed");
                self.state.current = text;
                self.state.previous.clear();
                self.state.pending = None;
                self.state.awaiting_fresh_input = true;
            }
            Err(e) => self.fail(e),
        }
    }

    pub fn execute_function(&mut self, func: KeypadFn) {
        match func {
            KeypadFn::Backspace => {
                if self.error.take().is_some() || self.state.awaiting_fresh_input {
                    self.state.current = "0".to_string();
                    self.state.awaiting_fresh_input = false;
                    return;
                }
                self.state.current.pop();
                if self.state.current.is_empty() || self.state.current == "-" {
                    self.state.current = "0".to_string();
                }
            }
            KeypadFn::ClearEntry => {
                self.error = None;
                self.state.current = "0".to_string();
                self.state.awaiting_fresh_input = false;
            }
            KeypadFn::Clear => self.clear(),
            KeypadFn::Percent => {
                let base = parse_leading_float(&self.state.previous);
                self.apply_unary("%", |n| Ok(match base {
                    Some(base) => base * n / 100.0,
                    None => n / 100.0,
                }));
            }
            KeypadFn::Negate => self.apply_unary("±", |n| Ok(if n == 0.0 { n } else { -n })),
            KeypadFn::Reciprocal => self.apply_math(MathFn::Reciprocal, AngleMode::Degrees),
            KeypadFn::Square => self.apply_math(MathFn::Square, AngleMode::Degrees),
            KeypadFn::SquareRoot => self.apply_math(MathFn::Sqrt, AngleMode::Degrees),
        }
    }

    pub(crate) fn apply_math(&mut self, f: MathFn, angle: AngleMode) {
        self.apply_unary(f.label(), |n| f.eval(n, angle));
    }

    /// Replace the operand with `f(operand)`; no-op on an empty or failed operand
    pub(crate) fn apply_unary(&mut self, label: &str, f: impl FnOnce(f64) -> Result<f64, CalcError>) {
        if self.is_error() {
            return;
        }
        let Some(n) = parse_leading_float(&self.state.current) else {
            return;
        };
        match f(n).and_then(render) {
            Ok(text) => {
                self.record(format!("{}({}) = {}", label, render_lossy(n), text));
                self.state.current = text;
                self.state.awaiting_fresh_input = true;
            }
            Err(e) => self.fail(e),
        }
    }

    /// Put a constant into the operand (π, e)
    pub(crate) fn set_operand(&mut self, value: f64) {
        if let Ok(text) = render(value) {
            self.error = None;
            self.state.current = text;
            self.state.awaiting_fresh_input = true;
        }
    }

    pub fn memory_op(&mut self, op: MemoryOp) {
        let current = if self.is_error() { None } else { parse_leading_float(&self.state.current) };
        match op {
            MemoryOp::Clear => {
                self.state.memory = 0.0;
                self.state.memory_visible = false;
            }
            MemoryOp::Recall => {
                self.set_operand(self.state.memory);
                return;
            }
            MemoryOp::Add | MemoryOp::Subtract | MemoryOp::Store => {
                let Some(n) = current else {
                    return;
                };
                self.state.memory = match op {
                    MemoryOp::Add => self.state.memory + n,
                    MemoryOp::Subtract => self.state.memory - n,
                    _ => n,
                };
                self.state.memory_visible = true;
                self.state.awaiting_fresh_input = true;
            }
        }
        let shown = current.map(render_lossy).unwrap_or_default();
        self.record(format!("{}: {}", op.label(), shown));
    }

    /// Reset operands and operator; memory and history survive
    pub fn clear(&mut self) {
        self.error = None;
        self.state.current = "0".to_string();
        self.state.previous.clear();
        self.state.pending = None;
        self.state.awaiting_fresh_input = false;
    }

    /// Handle a keyboard key; returns false for keys the calculator ignores
    pub fn handle_key(&mut self, name: &str) -> bool {
        let Some(key) = Key::from_name(name) else {
            return false;
        };
        match key {
            Key::Digit(c) => self.append_char(c),
            Key::Point => self.append_char('.'),
            Key::Operator(op) => self.choose_operation(op),
            Key::Equals => self.compute(),
            Key::Backspace => self.execute_function(KeypadFn::Backspace),
            Key::Escape => self.clear(),
            Key::Percent => self.execute_function(KeypadFn::Percent),
        }
        true
    }

    fn fail(&mut self, err: CalcError) {
        debug!(error = %err, "calculator error");
        self.state.current = ERROR_TEXT.to_string();
        self.state.previous.clear();
        self.state.pending = None;
        self.state.awaiting_fresh_input = false;
        self.error = Some(err);
    }

    fn record(&mut self, entry: String) {
        self.history.push_front(entry);
        self.history.truncate(HISTORY_LIMIT);
    }

    /// Write the operand lines, memory indicator and history
    pub(crate) fn render_into(&self, surface: &mut dyn Surface) {
        surface.set_text("current-operand", &self.state.current);
        surface.set_text("previous-operand", &self.previous_line());
        surface.set_text("memory-display", if self.state.memory_visible { "M" } else { "" });
        surface.set_text("history", &self.history.iter().map(|s| s.as_str()).collect::<Vec<_>>().join("\n"));
    }
}

impl Tool for Calculator {
    fn meta(&self) -> ToolMeta {
        STANDARD_META.clone()
    }

    fn is_initialized(&self) -> bool {
        self.lifecycle.is_initialized()
    }

    fn init(&mut self, surface: &dyn Surface) -> bool {
        self.lifecycle.bind(&STANDARD_META, surface)
    }

    fn update_display(&self, surface: &mut dyn Surface) {
        if self.is_initialized() {
            self.render_into(surface);
        }
    }
}

/// Display text for a result, or an error when it is not finite
fn render(value: f64) -> Result<String, CalcError> {
    format_result(value).ok_or(CalcError::OutOfRange)
}

fn render_lossy(value: f64) -> String {
    format_result(value).unwrap_or_else(|| ERROR_TEXT.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_plugin::MemorySurface;

    fn press(calc: &mut Calculator, keys: &[&str]) {
        for key in keys {
            assert!(calc.handle_key(key), "unmapped key {}", key);
        }
    }

    #[test]
    fn test_chained_operations() {
        let mut calc = Calculator::new();
        press(&mut calc, &["2", "+", "3", "*"]);
        assert_eq!(calc.previous_line(), "5 ×");
        assert_eq!(calc.phase(), Phase::OperatorChosen);
        press(&mut calc, &["4", "Enter"]);
        assert_eq!(calc.current(), "20");
    }

    #[test]
    fn test_divide_by_zero() {
        let mut calc = Calculator::new();
        press(&mut calc, &["5", "/", "0", "="]);
        assert_eq!(calc.current(), ERROR_TEXT);
        assert_eq!(calc.error(), Some(&CalcError::DivisionByZero));
        assert_eq!(calc.state().pending, None);

        // Operators are ignored while in error
        calc.choose_operation(Operator::Add);
        assert_eq!(calc.state().pending, None);

        // A digit starts fresh
        press(&mut calc, &["7"]);
        assert_eq!(calc.current(), "7");
        assert!(!calc.is_error());
    }

    #[test]
    fn test_result_formatting() {
        let mut calc = Calculator::new();
        press(&mut calc, &["1", "/", "3", "="]);
        assert_eq!(calc.current(), "0.33333333");
        press(&mut calc, &["0", ".", "5", "+", "0", ".", "5", "="]);
        assert_eq!(calc.current(), "1");
    }

    #[test]
    fn test_decimal_point_rules() {
        let mut calc = Calculator::new();
        calc.append_number("1.2.3");
        assert_eq!(calc.current(), "1.23");
        calc.choose_operation(Operator::Add);
        calc.append_number(".");
        assert_eq!(calc.current(), "0.");
    }

    #[test]
    fn test_fresh_operand_after_compute() {
        let mut calc = Calculator::new();
        press(&mut calc, &["2", "+", "2", "="]);
        assert_eq!(calc.phase(), Phase::Idle);
        press(&mut calc, &["9"]);
        assert_eq!(calc.current(), "9");
    }

    #[test]
    fn test_operator_ignored_on_empty_operand() {
        let mut calc = Calculator::new();
        press(&mut calc, &["8", "+", "-"]);
        assert_eq!(calc.state().pending, Some(Operator::Add));
        assert_eq!(calc.previous_line(), "8 +");
    }

    #[test]
    fn test_keypad_functions() {
        let mut calc = Calculator::new();
        calc.append_number("9");
        calc.execute_function(KeypadFn::SquareRoot);
        assert_eq!(calc.current(), "3");
        calc.execute_function(KeypadFn::Negate);
        assert_eq!(calc.current(), "-3");
        calc.execute_function(KeypadFn::Square);
        assert_eq!(calc.current(), "9");
        calc.execute_function(KeypadFn::Reciprocal);
        assert_eq!(calc.current(), "0.11111111");

        calc.clear();
        calc.execute_function(KeypadFn::Reciprocal);
        assert_eq!(calc.current(), ERROR_TEXT);

        calc.execute_function(KeypadFn::ClearEntry);
        calc.append_number("4");
        calc.execute_function(KeypadFn::Negate);
        calc.execute_function(KeypadFn::SquareRoot);
        assert!(matches!(calc.error(), Some(CalcError::Domain { .. })));
    }

    #[test]
    fn test_percent_of_previous_operand() {
        let mut calc = Calculator::new();
        press(&mut calc, &["2", "0", "0", "+", "1", "0", "%"]);
        assert_eq!(calc.current(), "20");
        press(&mut calc, &["="]);
        assert_eq!(calc.current(), "220");
    }

    #[test]
    fn test_backspace() {
        let mut calc = Calculator::new();
        calc.append_number("123");
        press(&mut calc, &["Backspace", "Backspace", "Backspace"]);
        assert_eq!(calc.current(), "0");
    }

    #[test]
    fn test_memory() {
        let mut calc = Calculator::new();
        calc.append_number("5");
        calc.memory_op(MemoryOp::Store);
        calc.append_number("3");
        calc.memory_op(MemoryOp::Add);
        assert_eq!(calc.memory(), 8.0);
        assert!(calc.state().memory_visible);
        calc.memory_op(MemoryOp::Subtract);
        assert_eq!(calc.memory(), 5.0);
        calc.clear();
        calc.memory_op(MemoryOp::Recall);
        assert_eq!(calc.current(), "5");
        calc.memory_op(MemoryOp::Clear);
        assert_eq!(calc.memory(), 0.0);
        assert!(!calc.state().memory_visible);
    }

    #[test]
    fn test_history_is_bounded_and_newest_first() {
        let mut calc = Calculator::new();
        for i in 0..(HISTORY_LIMIT + 5) {
            calc.clear();
            calc.append_number(&i.to_string());
            calc.choose_operation(Operator::Add);
            calc.append_number("1");
            calc.compute();
        }
        assert_eq!(calc.history().count(), HISTORY_LIMIT);
        assert_eq!(calc.history().next(), Some("54 + 1 = 55"));
    }

    #[test]
    fn test_unmapped_keys() {
        let mut calc = Calculator::new();
        assert!(!calc.handle_key("F5"));
        assert!(!calc.handle_key("12"));
    }

    #[test]
    fn test_display_requires_init() {
        let mut calc = Calculator::new();
        let mut surface = MemorySurface::with_elements(["current-operand", "previous-operand", "memory-display"]);
        calc.append_number("42");
        calc.update_display(&mut surface);
        assert_eq!(surface.text("current-operand"), Some(""));

        assert!(calc.init(&surface));
        calc.choose_operation(Operator::Multiply);
        calc.update_display(&mut surface);
        assert_eq!(surface.text("current-operand"), Some(""));
        assert_eq!(surface.text("previous-operand"), Some("42 ×"));
    }
}
