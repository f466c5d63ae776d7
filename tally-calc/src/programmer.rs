//! Programmer calculator: integer arithmetic and bit operations in a
//! selectable radix and word size

use std::fmt;
use dashu_int::UBig;
use serde::{Serialize, Deserialize};
use crate::standard::{CALCULATOR_ELEMENTS, ERROR_TEXT};
use crate::CalcError;
use tally_plugin::{Lifecycle, Surface, Tool, ToolMeta};
use tracing::debug;

static PROGRAMMER_META: ToolMeta = ToolMeta {
    name: "programmer",
    description: "Programmer calculator with HEX/DEC/OCT/BIN views and bitwise operations",
    category: "calculator",
    elements: CALCULATOR_ELEMENTS,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Radix {
    Bin,
    Oct,
    Dec,
    #[default]
    Hex,
}

impl Radix {
    pub const ALL: [Radix; 4] = [Radix::Hex, Radix::Dec, Radix::Oct, Radix::Bin];

    pub fn value(&self) -> u32 {
        match self {
            Radix::Bin => 2,
            Radix::Oct => 8,
            Radix::Dec => 10,
            Radix::Hex => 16,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Radix::Bin => "BIN",
            Radix::Oct => "OCT",
            Radix::Dec => "DEC",
            Radix::Hex => "HEX",
        }
    }

    /// Accepts "HEX"/"DEC"/"OCT"/"BIN" or the numeric base
    pub fn parse(s: &str) -> Result<Radix, CalcError> {
        match s.trim().to_uppercase().as_str() {
            "BIN" | "2" => Ok(Radix::Bin),
            "OCT" | "8" => Ok(Radix::Oct),
            "DEC" | "10" => Ok(Radix::Dec),
            "HEX" | "16" => Ok(Radix::Hex),
            _ => Err(CalcError::InvalidRadix(s.trim().to_string())),
        }
    }

    pub fn render(&self, value: &UBig) -> String {
        match self {
            Radix::Bin => format!("{:b}", value),
            Radix::Oct => format!("{:o}", value),
            Radix::Dec => format!("{}", value),
            Radix::Hex => format!("{:X}", value),
        }
    }

    pub fn parse_digits(&self, digits: &str) -> Result<UBig, CalcError> {
        UBig::from_str_radix(digits, self.value())
            .map_err(|_| CalcError::InvalidOperand(digits.to_string()))
    }
}

impl fmt::Display for Radix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum WordSize {
    Byte,
    Word,
    #[default]
    Dword,
    Qword,
}

impl WordSize {
    pub fn bits(&self) -> u32 {
        match self {
            WordSize::Byte => 8,
            WordSize::Word => 16,
            WordSize::Dword => 32,
            WordSize::Qword => 64,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            WordSize::Byte => "BYTE",
            WordSize::Word => "WORD",
            WordSize::Dword => "DWORD",
            WordSize::Qword => "QWORD",
        }
    }

    /// Accepts "BYTE"/"WORD"/"DWORD"/"QWORD" or the bit count
    pub fn parse(s: &str) -> Result<WordSize, CalcError> {
        match s.trim().to_uppercase().as_str() {
            "BYTE" | "8" => Ok(WordSize::Byte),
            "WORD" | "16" => Ok(WordSize::Word),
            "DWORD" | "32" => Ok(WordSize::Dword),
            "QWORD" | "64" => Ok(WordSize::Qword),
            _ => Err(CalcError::InvalidWordSize(s.trim().to_string())),
        }
    }

    /// `2^bits`
    fn modulus(&self) -> UBig {
        UBig::ONE << self.bits() as usize
    }

    /// `2^bits - 1`
    pub fn mask(&self) -> UBig {
        self.modulus() - UBig::ONE
    }
}

/// Two-operand operations of the programmer keypad
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProgrammerOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    And,
    Or,
    Xor,
    Lsh,
    Rsh,
}

impl ProgrammerOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            ProgrammerOp::Add => "+",
            ProgrammerOp::Subtract => "-",
            ProgrammerOp::Multiply => "×",
            ProgrammerOp::Divide => "÷",
            ProgrammerOp::And => "AND",
            ProgrammerOp::Or => "OR",
            ProgrammerOp::Xor => "XOR",
            ProgrammerOp::Lsh => "LSH",
            ProgrammerOp::Rsh => "RSH",
        }
    }

    /// Parse a key label; `& | ^ << >>` are accepted as aliases
    pub fn from_token(token: &str) -> Option<ProgrammerOp> {
        match token.trim().to_uppercase().as_str() {
            "+" => Some(ProgrammerOp::Add),
            "-" | "−" => Some(ProgrammerOp::Subtract),
            "*" | "×" | "X" => Some(ProgrammerOp::Multiply),
            "/" | "÷" => Some(ProgrammerOp::Divide),
            "AND" | "&" => Some(ProgrammerOp::And),
            "OR" | "|" => Some(ProgrammerOp::Or),
            "XOR" | "^" => Some(ProgrammerOp::Xor),
            "LSH" | "<<" => Some(ProgrammerOp::Lsh),
            "RSH" | ">>" => Some(ProgrammerOp::Rsh),
            _ => None,
        }
    }

    /// Apply to operands already masked to the word size
    pub fn apply(&self, a: &UBig, b: &UBig, word: WordSize) -> Result<UBig, CalcError> {
        let mask = word.mask();
        let result = match self {
            ProgrammerOp::Add => a + b,
            ProgrammerOp::Subtract => {
                if a >= b {
                    a - b
                } else {
                    word.modulus() - (b - a)
                }
            }
            ProgrammerOp::Multiply => a * b,
            ProgrammerOp::Divide => {
                if *b == UBig::ZERO {
                    return Err(CalcError::DivisionByZero);
                }
                a / b
            }
            ProgrammerOp::And => a & b,
            ProgrammerOp::Or => a | b,
            ProgrammerOp::Xor => a ^ b,
            ProgrammerOp::Lsh => a << shift_amount(b, word)?,
            ProgrammerOp::Rsh => a >> shift_amount(b, word)?,
        };
        Ok(result & mask)
    }
}

/// A shift amount in `[0, bits)`
fn shift_amount(amount: &UBig, word: WordSize) -> Result<usize, CalcError> {
    match usize::try_from(amount) {
        Ok(s) if s < word.bits() as usize => Ok(s),
        _ => Err(CalcError::InvalidShift { amount: amount.to_string(), bits: word.bits() }),
    }
}

/// `((v << s) | (v >> (w - s))) & mask`, for `s` in `[0, w)`
pub fn rotate_left(value: &UBig, amount: u32, word: WordSize) -> Result<UBig, CalcError> {
    let s = shift_amount(&UBig::from(amount), word)?;
    let v = value & word.mask();
    Ok(((&v << s) | (&v >> (word.bits() as usize - s))) & word.mask())
}

pub fn rotate_right(value: &UBig, amount: u32, word: WordSize) -> Result<UBig, CalcError> {
    let s = shift_amount(&UBig::from(amount), word)?;
    let v = value & word.mask();
    Ok(((&v >> s) | (&v << (word.bits() as usize - s))) & word.mask())
}

pub fn bitwise_not(value: &UBig, word: WordSize) -> UBig {
    (value & word.mask()) ^ word.mask()
}

/// The current value in all four radices
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RadixViews {
    pub hex: String,
    pub dec: String,
    pub oct: String,
    pub bin: String,
}

impl RadixViews {
    pub fn of(value: &UBig) -> Self {
        RadixViews {
            hex: Radix::Hex.render(value),
            dec: Radix::Dec.render(value),
            oct: Radix::Oct.render(value),
            bin: Radix::Bin.render(value),
        }
    }
}

/// Programmer calculator state
///
/// `digits` always holds a valid numeral in `radix` (or is empty while an
/// operator waits for its second operand, or shows "Error").
#[derive(Debug, Clone)]
pub struct ProgrammerCalculator {
    digits: String,
    radix: Radix,
    word_size: WordSize,
    pending: Option<ProgrammerOp>,
    previous_digits: String,
    awaiting_fresh_input: bool,
    error: Option<CalcError>,
    lifecycle: Lifecycle,
}

impl Default for ProgrammerCalculator {
    fn default() -> Self {
        Self::new(Radix::default(), WordSize::default())
    }
}

impl ProgrammerCalculator {
    pub fn new(radix: Radix, word_size: WordSize) -> Self {
        ProgrammerCalculator {
            digits: "0".to_string(),
            radix,
            word_size,
            pending: None,
            previous_digits: String::new(),
            awaiting_fresh_input: false,
            error: None,
            lifecycle: Lifecycle::new(),
        }
    }

    pub fn digits(&self) -> &str {
        &self.digits
    }

    pub fn radix(&self) -> Radix {
        self.radix
    }

    pub fn word_size(&self) -> WordSize {
        self.word_size
    }

    pub fn pending(&self) -> Option<ProgrammerOp> {
        self.pending
    }

    pub fn error(&self) -> Option<&CalcError> {
        self.error.as_ref()
    }

    pub fn previous_line(&self) -> String {
        match self.pending {
            Some(op) => format!("{} {}", self.previous_digits, op.symbol()),
            None => String::new(),
        }
    }

    /// Current operand as an integer (`None` while blank or in error)
    pub fn value(&self) -> Option<UBig> {
        if self.error.is_some() || self.digits.is_empty() {
            return None;
        }
        self.radix.parse_digits(&self.digits).ok()
    }

    /// HEX/DEC/OCT/BIN renderings of the operand; a blank operand reads as 0
    pub fn radix_views(&self) -> Option<RadixViews> {
        if self.error.is_some() {
            return None;
        }
        Some(RadixViews::of(&self.value().unwrap_or(UBig::ZERO)))
    }

    /// Append one digit; digits invalid in the current radix are ignored
    pub fn append_digit(&mut self, d: char) {
        if d.to_digit(self.radix.value()).is_none() {
            return;
        }
        if self.error.take().is_some() || self.awaiting_fresh_input {
            self.digits.clear();
            self.awaiting_fresh_input = false;
        }
        let d = d.to_ascii_uppercase();
        if self.digits == "0" {
            self.digits = d.to_string();
        } else {
            self.digits.push(d);
        }
    }

    pub fn append_digits(&mut self, token: &str) {
        for d in token.chars() {
            self.append_digit(d);
        }
    }

    /// Re-render the operands in another radix; the integer is unchanged
    pub fn change_radix(&mut self, radix: Radix) {
        if self.error.is_none() {
            self.digits = self.rerender(&self.digits, radix);
            self.previous_digits = self.rerender(&self.previous_digits, radix);
        }
        self.radix = radix;
    }

    fn rerender(&self, digits: &str, radix: Radix) -> String {
        if digits.is_empty() {
            return String::new();
        }
        match self.radix.parse_digits(digits) {
            Ok(v) => radix.render(&v),
            Err(_) => digits.to_string(),
        }
    }

    /// Takes effect for subsequent operations only
    pub fn set_word_size(&mut self, word_size: WordSize) {
        self.word_size = word_size;
    }

    pub fn choose_operation(&mut self, op: ProgrammerOp) {
        if self.error.is_some() || self.digits.is_empty() {
            return;
        }
        if !self.previous_digits.is_empty() {
            self.compute();
            if self.error.is_some() {
                return;
            }
        }
        self.pending = Some(op);
        self.previous_digits = std::mem::take(&mut self.digits);
        self.awaiting_fresh_input = false;
    }

    pub fn compute(&mut self) {
        if self.error.is_some() || self.previous_digits.is_empty() {
            return;
        }
        let Some(op) = self.pending else {
            return;
        };
        let digits = if self.digits.is_empty() { "0" } else { self.digits.as_str() };
        let result = self.operand(&self.previous_digits).and_then(|a| {
            let b = self.operand(digits)?;
            op.apply(&a, &b, self.word_size)
        });
        match result {
            Ok(v) => {
                self.digits = self.radix.render(&v);
                debug!(op = op.symbol(), result = %self.digits, radix = %self.radix, "computed");
                self.previous_digits.clear();
                self.pending = None;
                self.awaiting_fresh_input = true;
            }
            Err(e) => self.fail(e),
        }
    }

    /// Parse and mask an operand to the word size
    fn operand(&self, digits: &str) -> Result<UBig, CalcError> {
        Ok(self.radix.parse_digits(digits)? & self.word_size.mask())
    }

    pub fn not(&mut self) {
        let word = self.word_size;
        self.apply_unary(|v| Ok(bitwise_not(v, word)));
    }

    /// ROL key: rotate by one bit
    pub fn rol(&mut self) {
        self.rotate_left(1);
    }

    /// ROR key: rotate by one bit
    pub fn ror(&mut self) {
        self.rotate_right(1);
    }

    pub fn rotate_left(&mut self, amount: u32) {
        let word = self.word_size;
        self.apply_unary(|v| rotate_left(v, amount, word));
    }

    pub fn rotate_right(&mut self, amount: u32) {
        let word = self.word_size;
        self.apply_unary(|v| rotate_right(v, amount, word));
    }

    fn apply_unary(&mut self, f: impl FnOnce(&UBig) -> Result<UBig, CalcError>) {
        if self.error.is_some() || self.digits.is_empty() {
            return;
        }
        match self.operand(&self.digits).and_then(|v| f(&v)) {
            Ok(v) => {
                self.digits = self.radix.render(&v);
                self.awaiting_fresh_input = true;
            }
            Err(e) => self.fail(e),
        }
    }

    pub fn backspace(&mut self) {
        if self.error.take().is_some() || self.awaiting_fresh_input {
            self.digits = "0".to_string();
            self.awaiting_fresh_input = false;
            return;
        }
        self.digits.pop();
        if self.digits.is_empty() {
            self.digits = "0".to_string();
        }
    }

    /// CE: reset the operand only
    pub fn clear_entry(&mut self) {
        self.error = None;
        self.digits = "0".to_string();
        self.awaiting_fresh_input = false;
    }

    /// C: reset operands and operator; radix and word size are kept
    pub fn clear(&mut self) {
        self.clear_entry();
        self.previous_digits.clear();
        self.pending = None;
    }

    fn fail(&mut self, err: CalcError) {
        debug!(error = %err, "programmer error");
        self.digits = ERROR_TEXT.to_string();
        self.previous_digits.clear();
        self.pending = None;
        self.awaiting_fresh_input = false;
        self.error = Some(err);
    }
}

impl Tool for ProgrammerCalculator {
    fn meta(&self) -> ToolMeta {
        PROGRAMMER_META.clone()
    }

    fn is_initialized(&self) -> bool {
        self.lifecycle.is_initialized()
    }

    fn init(&mut self, surface: &dyn Surface) -> bool {
        self.lifecycle.bind(&PROGRAMMER_META, surface)
    }

    fn update_display(&self, surface: &mut dyn Surface) {
        if !self.is_initialized() {
            return;
        }
        surface.set_text("current-operand", &self.digits);
        surface.set_text("previous-operand", &self.previous_line());
        surface.set_text("radix", self.radix.label());
        surface.set_text("word-size", self.word_size.label());
        let views = self.radix_views().unwrap_or_else(|| RadixViews {
            hex: ERROR_TEXT.to_string(),
            dec: ERROR_TEXT.to_string(),
            oct: ERROR_TEXT.to_string(),
            bin: ERROR_TEXT.to_string(),
        });
        surface.set_text("hex-display", &format!("HEX {}", views.hex));
        surface.set_text("dec-display", &format!("DEC {}", views.dec));
        surface.set_text("oct-display", &format!("OCT {}", views.oct));
        surface.set_text("bin-display", &format!("BIN {}", views.bin));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_plugin::MemorySurface;

    fn calc(radix: Radix, word: WordSize, digits: &str) -> ProgrammerCalculator {
        let mut c = ProgrammerCalculator::new(radix, word);
        c.append_digits(digits);
        c
    }

    #[test]
    fn test_not_byte() {
        let mut c = calc(Radix::Hex, WordSize::Byte, "0F");
        c.not();
        assert_eq!(c.digits(), "F0");

        let mut zero = calc(Radix::Hex, WordSize::Byte, "0");
        zero.not();
        assert_eq!(zero.digits(), "FF");
    }

    #[test]
    fn test_rotate_byte() {
        let mut c = calc(Radix::Bin, WordSize::Byte, "10000001");
        c.rol();
        assert_eq!(c.digits(), "11");

        let mut c = calc(Radix::Bin, WordSize::Byte, "11");
        c.ror();
        assert_eq!(c.digits(), "10000001");

        let mut c = calc(Radix::Hex, WordSize::Byte, "1");
        c.rotate_left(7);
        assert_eq!(c.digits(), "80");
        c.rotate_right(0);
        assert_eq!(c.digits(), "80");
    }

    #[test]
    fn test_rotate_out_of_range() {
        let mut c = calc(Radix::Hex, WordSize::Byte, "1");
        c.rotate_left(9);
        assert_eq!(c.digits(), ERROR_TEXT);
        assert!(matches!(c.error(), Some(CalcError::InvalidShift { bits: 8, .. })));

        let mut c = calc(Radix::Hex, WordSize::Word, "1");
        c.rotate_right(16);
        assert_eq!(c.digits(), ERROR_TEXT);

        assert!(rotate_left(&UBig::ONE, 8, WordSize::Byte).is_err());
        assert_eq!(rotate_right(&UBig::ONE, 1, WordSize::Byte).unwrap(), UBig::from(0x80u32));
    }

    #[test]
    fn test_shift_out_of_range() {
        let mut c = calc(Radix::Dec, WordSize::Byte, "1");
        c.choose_operation(ProgrammerOp::Lsh);
        c.append_digits("8");
        c.compute();
        assert_eq!(c.digits(), ERROR_TEXT);
        assert!(matches!(c.error(), Some(CalcError::InvalidShift { bits: 8, .. })));
        assert_eq!(c.pending(), None);
    }

    #[test]
    fn test_shift_masks_to_word() {
        let mut c = calc(Radix::Hex, WordSize::Byte, "81");
        c.choose_operation(ProgrammerOp::from_token("<<").unwrap());
        c.append_digits("1");
        c.compute();
        assert_eq!(c.digits(), "2");
    }

    #[test]
    fn test_bitwise_aliases() {
        let mut c = calc(Radix::Hex, WordSize::Dword, "F0");
        c.choose_operation(ProgrammerOp::from_token("&").unwrap());
        c.append_digits("3C");
        c.choose_operation(ProgrammerOp::from_token("|").unwrap());
        assert_eq!(c.previous_line(), "30 OR");
        c.append_digits("1");
        c.choose_operation(ProgrammerOp::from_token("^").unwrap());
        c.append_digits("FF");
        c.compute();
        assert_eq!(c.digits(), "CE");
    }

    #[test]
    fn test_arithmetic_wraps() {
        let mut c = calc(Radix::Dec, WordSize::Byte, "3");
        c.choose_operation(ProgrammerOp::Subtract);
        c.append_digits("5");
        c.compute();
        assert_eq!(c.digits(), "254");

        let mut c = calc(Radix::Dec, WordSize::Byte, "200");
        c.choose_operation(ProgrammerOp::Add);
        c.append_digits("100");
        c.compute();
        assert_eq!(c.digits(), "44");

        let mut c = calc(Radix::Dec, WordSize::Dword, "7");
        c.choose_operation(ProgrammerOp::Divide);
        c.append_digits("2");
        c.compute();
        assert_eq!(c.digits(), "3");

        let mut c = calc(Radix::Dec, WordSize::Dword, "7");
        c.choose_operation(ProgrammerOp::Divide);
        c.append_digits("0");
        c.compute();
        assert_eq!(c.error(), Some(&CalcError::DivisionByZero));
    }

    #[test]
    fn test_digits_validated_per_radix() {
        let mut c = calc(Radix::Bin, WordSize::Byte, "1021");
        assert_eq!(c.digits(), "101");
        c.change_radix(Radix::Hex);
        c.append_digits("ag");
        assert_eq!(c.digits(), "5A");
    }

    #[test]
    fn test_change_radix_keeps_value() {
        let mut c = calc(Radix::Hex, WordSize::Dword, "FF");
        c.choose_operation(ProgrammerOp::Add);
        c.append_digits("1");
        c.change_radix(Radix::Dec);
        assert_eq!(c.digits(), "1");
        assert_eq!(c.previous_line(), "255 +");
        c.compute();
        assert_eq!(c.digits(), "256");
        c.change_radix(Radix::Bin);
        assert_eq!(c.digits(), "100000000");
    }

    #[test]
    fn test_word_size_applies_to_later_operations() {
        let mut c = calc(Radix::Hex, WordSize::Word, "1234");
        c.set_word_size(WordSize::Byte);
        assert_eq!(c.digits(), "1234");
        c.not();
        assert_eq!(c.digits(), "CB");
    }

    #[test]
    fn test_radix_views_and_display() {
        let mut c = calc(Radix::Hex, WordSize::Dword, "FF");
        let views = c.radix_views().unwrap();
        assert_eq!(views, RadixViews {
            hex: "FF".into(),
            dec: "255".into(),
            oct: "377".into(),
            bin: "11111111".into(),
        });

        let mut surface = MemorySurface::with_elements(["current-operand", "previous-operand", "bin-display"]);
        assert!(c.init(&surface));
        c.update_display(&mut surface);
        assert_eq!(surface.text("bin-display"), Some("BIN 11111111"));

        c.clear_entry();
        assert_eq!(c.digits(), "0");
    }

    #[test]
    fn test_parse_radix_and_word_size() {
        assert_eq!(Radix::parse("hex").unwrap(), Radix::Hex);
        assert_eq!(Radix::parse("2").unwrap(), Radix::Bin);
        assert!(Radix::parse("3").is_err());
        assert_eq!(WordSize::parse("QWORD").unwrap(), WordSize::Qword);
        assert_eq!(WordSize::parse("16").unwrap().bits(), 16);
        assert!(WordSize::parse("12").is_err());
    }
}
