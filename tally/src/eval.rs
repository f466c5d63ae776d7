//! Command evaluator
//!
//! Routes a parsed command to the active tool. Calculator keys never fail
//! here: a domain error shows up as "Error" in the operand display, as it
//! would on the keypad. Converter, date and navigation commands report
//! failures through `TallyError`.

use crate::ast::{Command, UnitField};
use crate::Tally;
use serde_json::{json, Value as JsonValue};
use std::collections::HashMap;
use tally_calc::{
    AngleMode, CalcError, Constant, KeypadFn, MathFn, MemoryOp, Operator, ProgrammerOp, Radix,
    ResistorSeries, WordSize,
};
use tally_core::{codes, TallyError};
use tally_units::{Converter, Quantity, StaticRateSource, LINEAR_DECIMALS};

/// The tool behind the active mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Active {
    Standard,
    Scientific,
    Programmer,
    Date,
    Resistor,
    Converter(Quantity),
}

impl Active {
    fn of(mode: &str) -> Option<Active> {
        match mode {
            "standard" => Some(Active::Standard),
            "scientific" => Some(Active::Scientific),
            "programmer" => Some(Active::Programmer),
            "date" => Some(Active::Date),
            "resistor" => Some(Active::Resistor),
            other => Quantity::from_name(other).map(Active::Converter),
        }
    }
}

/// One line of `help` output
struct CommandHelp {
    syntax: &'static str,
    description: &'static str,
}

const COMMANDS: &[CommandHelp] = &[
    CommandHelp { syntax: "mode <name>", description: "Switch mode (standard, scientific, programmer, date, resistor, <quantity>)" },
    CommandHelp { syntax: "list [category]", description: "List modes" },
    CommandHelp { syntax: "help [mode|function]", description: "Show help" },
    CommandHelp { syntax: "show", description: "Display and state of the active mode" },
    CommandHelp { syntax: "<digits> | digit <digits>", description: "Enter digits (programmer digits use 'digit')" },
    CommandHelp { syntax: "<op> | op <op>", description: "Choose an operator (+ - * / ^, and/or/xor/lsh/rsh)" },
    CommandHelp { syntax: "=", description: "Compute" },
    CommandHelp { syntax: "clear | ce | backspace", description: "Clear all, clear entry, delete last digit" },
    CommandHelp { syntax: "fn <name>", description: "Keypad function (%, ±, 1/x, x², √, sin, log, n!...)" },
    CommandHelp { syntax: "mem <MC|MR|M+|M-|MS>", description: "Memory keys" },
    CommandHelp { syntax: "key <name>", description: "Keyboard key (digits, + - * /, Enter, Backspace, Escape, %)" },
    CommandHelp { syntax: "history", description: "Calculation history, most recent first" },
    CommandHelp { syntax: "2nd | angle [deg|rad] | const <pi|e> | pow", description: "Scientific keys" },
    CommandHelp { syntax: "radix <hex|dec|oct|bin> | word <8|16|32|64>", description: "Programmer radix and word size" },
    CommandHelp { syntax: "not | rol [n] | ror [n] | rotate <left|right> [n]", description: "Programmer bit operations" },
    CommandHelp { syntax: "from <text> | to <text>", description: "Edit a converter field, or set a date pair" },
    CommandHelp { syntax: "unit <from|to> <symbol> | units [quantity]", description: "Select or list units" },
    CommandHelp { syntax: "batch <from> <to> <value>...", description: "Convert several values" },
    CommandHelp { syntax: "custom <symbol> <scale> [decimals]", description: "Add a unit (scale in pivot units)" },
    CommandHelp { syntax: "preset save <name> <from> <to> | preset apply <name> | presets", description: "Saved unit pairs" },
    CommandHelp { syntax: "rate <code> <rate> | refresh CODE=rate...", description: "Exchange rates per CNY" },
    CommandHelp { syntax: "base <date> | days <n> | add | sub", description: "Date offset" },
    CommandHelp { syntax: "series <E6|E12|E24|E48|E96>", description: "Resistor series" },
];

pub(crate) fn execute(tally: &mut Tally, command: &Command) -> Result<JsonValue, TallyError> {
    match command {
        Command::Mode { name } => {
            let mode = tally.switch_mode(name)?;
            Ok(json!({ "mode": mode }))
        }
        Command::List { category } => Ok(json!(tally.registry.list(category.as_deref()))),
        Command::Help { topic } => help(tally, topic.as_deref()),
        Command::Show => show(tally),
        Command::Units { quantity: Some(name) } => {
            let quantity = Quantity::from_name(name).ok_or_else(|| TallyError::unknown_mode(name))?;
            Ok(json!(converter(tally, quantity)?.units()))
        }
        Command::Rate { code, rate } => {
            let currency = converter_mut(tally, Quantity::Currency)?;
            currency.set_rate(code, *rate)?;
            let target = currency.fields().target_unit().to_string();
            currency.set_target_unit(&target)?;
            Ok(json!({ "rate": currency.rate_display() }))
        }
        Command::Refresh { rates } => {
            if rates.is_empty() {
                return Err(TallyError::parse_error("refresh needs at least one CODE=rate pair"));
            }
            let source = StaticRateSource::new(rates.iter().cloned().collect::<HashMap<_, _>>());
            let currency = converter_mut(tally, Quantity::Currency)?;
            let refreshed = currency.refresh_rates(&source)?;
            Ok(json!({ "refreshed": refreshed, "rate": currency.rate_display() }))
        }
        _ => {
            let active = active(tally)?;
            match active {
                Active::Standard => standard(tally, command),
                Active::Scientific => scientific(tally, command),
                Active::Programmer => programmer(tally, command),
                Active::Date => date(tally, command),
                Active::Resistor => resistor(tally, command),
                Active::Converter(q) => convert(tally, q, command),
            }
        }
    }
}

/// The active mode, if its tool is bound
fn active(tally: &Tally) -> Result<Active, TallyError> {
    let mode = tally.active.ok_or_else(|| {
        TallyError::new(codes::UNKNOWN_MODE, "No mode selected")
            .with_suggestion("Use 'mode <name>' first")
    })?;
    let bound = tally.tool(mode).is_some_and(|t| t.is_initialized());
    if !bound {
        return Err(TallyError::not_initialized(mode));
    }
    Active::of(mode).ok_or_else(|| TallyError::internal(format!("no tool behind mode '{}'", mode)))
}

fn not_here(command: &Command, mode: &str) -> TallyError {
    TallyError::new(
        codes::UNKNOWN_COMMAND,
        format!("'{}' is not available in {} mode", command.name(), mode),
    )
    .in_tool(mode)
    .with_suggestion(format!("Use 'help {}' for its commands", mode))
}

fn calc_error(err: CalcError, mode: &str) -> TallyError {
    TallyError::from(err).in_tool(mode)
}

fn standard(tally: &mut Tally, command: &Command) -> Result<JsonValue, TallyError> {
    let calc = &mut tally.standard;
    match command {
        Command::Digits { token } => calc.append_number(token),
        Command::Operator { token } => match Operator::from_token(token) {
            Some(Operator::Power) | None => {
                return Err(calc_error(CalcError::UnknownOperator(token.clone()), "standard"))
            }
            Some(op) => calc.choose_operation(op),
        },
        Command::Equals => calc.compute(),
        Command::Clear => calc.clear(),
        Command::ClearEntry => calc.execute_function(KeypadFn::ClearEntry),
        Command::Backspace => calc.execute_function(KeypadFn::Backspace),
        Command::Function { name } => {
            let func = KeypadFn::from_label(name)
                .ok_or_else(|| calc_error(CalcError::UnknownFunction(name.clone()), "standard"))?;
            calc.execute_function(func);
        }
        Command::Memory { label } => calc.memory_op(memory_key(label)?),
        Command::Key { name } => return Ok(json!({ "handled": calc.handle_key(name) })),
        Command::History => return Ok(json!(calc.history().collect::<Vec<_>>())),
        _ => return Err(not_here(command, "standard")),
    }
    Ok(JsonValue::Null)
}

fn scientific(tally: &mut Tally, command: &Command) -> Result<JsonValue, TallyError> {
    let calc = &mut tally.scientific;
    match command {
        Command::Digits { token } => calc.append_number(token),
        Command::Operator { token } => {
            let op = Operator::from_token(token)
                .ok_or_else(|| calc_error(CalcError::UnknownOperator(token.clone()), "scientific"))?;
            calc.choose_operation(op);
        }
        Command::Power => calc.exponent(),
        Command::Equals => calc.compute(),
        Command::Clear => calc.clear(),
        Command::ClearEntry => calc.execute_function(KeypadFn::ClearEntry),
        Command::Backspace => calc.execute_function(KeypadFn::Backspace),
        Command::Function { name } => match MathFn::from_name(name) {
            Ok(f) => calc.press_function(f),
            Err(err) => match KeypadFn::from_label(name) {
                Some(func) => calc.execute_function(func),
                None => return Err(calc_error(err, "scientific")),
            },
        },
        Command::Memory { label } => calc.memory_op(memory_key(label)?),
        Command::Key { name } => return Ok(json!({ "handled": calc.handle_key(name) })),
        Command::History => return Ok(json!(calc.core().history().collect::<Vec<_>>())),
        Command::Second => {
            calc.toggle_second();
            return Ok(json!({ "second": calc.is_second() }));
        }
        Command::Angle { mode: None } => calc.toggle_angle_mode(),
        Command::Angle { mode: Some(text) } => {
            let angle = AngleMode::parse(text)
                .ok_or_else(|| TallyError::parse_error(format!("'{}' is not deg or rad", text)))?;
            calc.set_angle_mode(angle);
        }
        Command::Constant { name } => {
            let constant = Constant::from_name(name)
                .ok_or_else(|| TallyError::parse_error(format!("unknown constant '{}'", name)))?;
            calc.insert_constant(constant);
        }
        _ => return Err(not_here(command, "scientific")),
    }
    Ok(JsonValue::Null)
}

fn programmer(tally: &mut Tally, command: &Command) -> Result<JsonValue, TallyError> {
    let calc = &mut tally.programmer;
    match command {
        Command::Digits { token } => calc.append_digits(token),
        Command::Operator { token } => {
            let op = ProgrammerOp::from_token(token)
                .ok_or_else(|| calc_error(CalcError::UnknownOperator(token.clone()), "programmer"))?;
            calc.choose_operation(op);
        }
        Command::Equals => calc.compute(),
        Command::Clear => calc.clear(),
        Command::ClearEntry => calc.clear_entry(),
        Command::Backspace => calc.backspace(),
        Command::Radix { radix } => {
            let radix = Radix::parse(radix).map_err(|e| calc_error(e, "programmer"))?;
            calc.change_radix(radix);
        }
        Command::WordSize { size } => {
            let word = WordSize::parse(size).map_err(|e| calc_error(e, "programmer"))?;
            calc.set_word_size(word);
        }
        Command::Not => calc.not(),
        Command::RotateLeft { amount: None } => calc.rol(),
        Command::RotateLeft { amount: Some(n) } => calc.rotate_left(*n),
        Command::RotateRight { amount: None } => calc.ror(),
        Command::RotateRight { amount: Some(n) } => calc.rotate_right(*n),
        _ => return Err(not_here(command, "programmer")),
    }
    Ok(JsonValue::Null)
}

fn date(tally: &mut Tally, command: &Command) -> Result<JsonValue, TallyError> {
    let calc = &mut tally.date;
    let in_date = |e: CalcError| calc_error(e, "date");
    match command {
        Command::From { text } => calc.set_from(text).map_err(in_date)?,
        Command::To { text } => calc.set_to(text).map_err(in_date)?,
        Command::Base { text } => calc.set_base(text).map_err(in_date)?,
        Command::Days { text } => calc.set_days(text),
        Command::AddDays => calc.add(),
        Command::SubtractDays => calc.subtract(),
        Command::Clear => {
            for field in [DateField::From, DateField::To, DateField::Base] {
                field.clear(calc).map_err(in_date)?;
            }
            calc.set_days("");
        }
        _ => return Err(not_here(command, "date")),
    }
    Ok(json!(calc.summary()))
}

#[derive(Clone, Copy)]
enum DateField {
    From,
    To,
    Base,
}

impl DateField {
    fn clear(self, calc: &mut tally_calc::DateCalculator) -> Result<(), CalcError> {
        match self {
            DateField::From => calc.set_from(""),
            DateField::To => calc.set_to(""),
            DateField::Base => calc.set_base(""),
        }
    }
}

fn resistor(tally: &mut Tally, command: &Command) -> Result<JsonValue, TallyError> {
    match command {
        Command::Series { name } => {
            let series = ResistorSeries::parse(name).map_err(|e| calc_error(e, "resistor"))?;
            tally.resistor.select(series);
            Ok(json!({ "series": series, "rows": tally.resistor.rows() }))
        }
        _ => Err(not_here(command, "resistor")),
    }
}

fn convert(tally: &mut Tally, quantity: Quantity, command: &Command) -> Result<JsonValue, TallyError> {
    let mode = quantity.mode_name();
    let conv = converter_mut(tally, quantity)?;
    let in_mode = |e: tally_units::ConversionError| TallyError::from(e).in_tool(mode);
    let update = match command {
        Command::From { text } => conv.edit_source(text).map_err(in_mode)?,
        Command::To { text } => conv.edit_target(text).map_err(in_mode)?,
        Command::Unit { field: UnitField::From, symbol } => conv.set_source_unit(symbol).map_err(in_mode)?,
        Command::Unit { field: UnitField::To, symbol } => conv.set_target_unit(symbol).map_err(in_mode)?,
        Command::PresetApply { name } => conv.apply_preset(name).map_err(in_mode)?,
        Command::Clear => {
            conv.clear();
            return Ok(JsonValue::Null);
        }
        Command::Units { quantity: None } => return Ok(json!(conv.units())),
        Command::Batch { from, to, values } => {
            return Ok(json!(conv.batch_convert(values, from, to).map_err(in_mode)?));
        }
        Command::CustomUnit { symbol, scale, decimals } => {
            conv.add_custom_unit(symbol, *scale, decimals.unwrap_or(LINEAR_DECIMALS))
                .map_err(in_mode)?;
            return Ok(json!(conv.units()));
        }
        Command::PresetSave { name, from, to } => {
            conv.save_preset(name, from, to).map_err(in_mode)?;
            return Ok(json!(conv.presets()));
        }
        Command::Presets => return Ok(json!(conv.presets())),
        _ => return Err(not_here(command, mode)),
    };
    Ok(json!(update))
}

fn converter(tally: &Tally, quantity: Quantity) -> Result<&Converter, TallyError> {
    tally
        .converters
        .get(&quantity)
        .ok_or_else(|| TallyError::internal(format!("no converter for {}", quantity)))
}

fn converter_mut(tally: &mut Tally, quantity: Quantity) -> Result<&mut Converter, TallyError> {
    tally
        .converters
        .get_mut(&quantity)
        .ok_or_else(|| TallyError::internal(format!("no converter for {}", quantity)))
}

fn memory_key(label: &str) -> Result<MemoryOp, TallyError> {
    MemoryOp::from_label(label)
        .ok_or_else(|| TallyError::parse_error(format!("'{}' is not a memory key (MC, MR, M+, M-, MS)", label)))
}

fn help(tally: &Tally, topic: Option<&str>) -> Result<JsonValue, TallyError> {
    let Some(topic) = topic else {
        let commands: Vec<JsonValue> = COMMANDS
            .iter()
            .map(|c| json!({ "syntax": c.syntax, "description": c.description }))
            .collect();
        return Ok(json!({ "commands": commands, "modes": tally.registry.by_category() }));
    };

    if let Ok(f) = MathFn::from_name(topic) {
        return Ok(json!(f.meta()));
    }

    let meta = tally.registry.resolve(topic)?;
    let detail = match Active::of(meta.name) {
        Some(Active::Scientific) => {
            json!(MathFn::ALL.iter().map(|f| f.meta()).collect::<Vec<_>>())
        }
        Some(Active::Converter(q)) => json!(converter(tally, q)?.units()),
        Some(Active::Resistor) => json!(ResistorSeries::ALL),
        Some(Active::Programmer) => json!(Radix::ALL),
        _ => JsonValue::Null,
    };
    Ok(json!({ "mode": meta, "detail": detail }))
}

fn show(tally: &Tally) -> Result<JsonValue, TallyError> {
    let active = active(tally)?;
    let state = match active {
        Active::Standard => {
            let calc = &tally.standard;
            json!({
                "state": calc.state(),
                "phase": calc.phase(),
                "error": calc.error().map(|e| e.to_string()),
            })
        }
        Active::Scientific => {
            let calc = &tally.scientific;
            json!({
                "state": calc.core().state(),
                "phase": calc.core().phase(),
                "error": calc.error().map(|e| e.to_string()),
                "angle": calc.angle_mode(),
                "second": calc.is_second(),
            })
        }
        Active::Programmer => {
            let calc = &tally.programmer;
            json!({
                "digits": calc.digits(),
                "radix": calc.radix(),
                "word_size": calc.word_size(),
                "pending": calc.pending(),
                "views": calc.radix_views(),
                "error": calc.error().map(|e| e.to_string()),
            })
        }
        Active::Date => json!(tally.date.summary()),
        Active::Resistor => json!({ "series": tally.resistor.series(), "rows": tally.resistor.rows() }),
        Active::Converter(q) => {
            let conv = converter(tally, q)?;
            json!({
                "quantity": q,
                "fields": conv.fields(),
                "rate": conv.rate_display(),
            })
        }
    };
    Ok(state)
}

#[cfg(test)]
mod tests {
    use crate::{Response, Tally};
    use tally_core::codes;

    fn run(tally: &mut Tally, line: &str) -> Response {
        tally.run_line(line).unwrap()
    }

    fn run_ok(tally: &mut Tally, script: &str) -> Response {
        let mut last = None;
        for line in script.lines() {
            let response = run(tally, line);
            assert!(response.ok, "'{}' failed: {:?}", line, response.error);
            last = Some(response);
        }
        last.unwrap()
    }

    #[test]
    fn test_scientific_second_and_angle() {
        let mut tally = Tally::new();
        let r = run_ok(&mut tally, "mode scientific\n30\nfn sin");
        assert_eq!(r.element("current-operand"), Some("0.5"));
        assert_eq!(r.element("angle-mode"), Some("DEG"));

        let r = run_ok(&mut tally, "2nd\nfn sin");
        assert_eq!(r.element("current-operand"), Some("30"));
        assert_eq!(r.element("second-function"), Some("2nd"));

        let r = run_ok(&mut tally, "angle rad");
        assert_eq!(r.element("angle-mode"), Some("RAD"));
    }

    #[test]
    fn test_scientific_power_and_keypad_fallback() {
        let mut tally = Tally::new();
        let r = run_ok(&mut tally, "mode scientific\n2\npow\n10\n=");
        assert_eq!(r.element("current-operand"), Some("1024"));
        let r = run_ok(&mut tally, "fn ±");
        assert_eq!(r.element("current-operand"), Some("-1024"));
    }

    #[test]
    fn test_standard_rejects_power() {
        let mut tally = Tally::new();
        run_ok(&mut tally, "2");
        let r = run(&mut tally, "^");
        assert!(!r.ok);
        let r = run(&mut tally, "2nd");
        assert_eq!(r.error.unwrap().code, codes::UNKNOWN_COMMAND);
    }

    #[test]
    fn test_memory_and_history() {
        let mut tally = Tally::new();
        run_ok(&mut tally, "7\nms\nclear\nmr");
        assert_eq!(tally.calculator().current(), "7");
        let r = run_ok(&mut tally, "+\n1\n=\nhistory");
        assert_eq!(r.data[0], "7 + 1 = 8");
    }

    #[test]
    fn test_programmer_session() {
        let mut tally = Tally::new();
        let r = run_ok(&mut tally, "mode programmer\nword 8\ndigit 0F\nnot");
        assert_eq!(r.element("current-operand"), Some("F0"));
        assert_eq!(r.element("bin-display"), Some("BIN 11110000"));

        let r = run_ok(&mut tally, "clear\nradix bin\ndigit 10000001\nrol");
        assert_eq!(r.element("current-operand"), Some("11"));
        assert_eq!(r.element("hex-display"), Some("HEX 3"));

        let r = run_ok(&mut tally, "clear\nradix dec\ndigit 200\n+\ndigit 100\n=");
        assert_eq!(r.element("current-operand"), Some("44"));
    }

    #[test]
    fn test_programmer_rotate_amount_checked() {
        let mut tally = Tally::new();
        let r = run_ok(&mut tally, "mode programmer\nword 8\ndigit 1\nrotate left 7");
        assert_eq!(r.element("current-operand"), Some("80"));

        let r = run_ok(&mut tally, "clear\ndigit 1\nrol 9");
        assert_eq!(r.element("current-operand"), Some("Error"));
        assert!(tally.programmer().error().is_some());
    }

    #[test]
    fn test_currency_rates() {
        let mut tally = Tally::new();
        let r = run_ok(&mut tally, "mode currency\nfrom 100");
        assert_eq!(r.element("to-input"), Some("14.0000"));

        let r = run_ok(&mut tally, "rate USD 0.2");
        assert_eq!(r.element("to-input"), Some("20.0000"));
        assert_eq!(r.element("conversion-info"), Some("1 CNY = 0.2000 USD"));

        let r = run_ok(&mut tally, "refresh USD=0.1 EUR=0.09");
        assert_eq!(r.data["refreshed"], true);
        assert_eq!(r.element("to-input"), Some("10.0000"));

        // A bad table is rejected and the old one kept
        let r = run_ok(&mut tally, "refresh USD=-1");
        assert_eq!(r.data["refreshed"], false);
        assert_eq!(r.element("to-input"), Some("10.0000"));
    }

    #[test]
    fn test_converter_errors_keep_fields() {
        let mut tally = Tally::new();
        run_ok(&mut tally, "mode length\nfrom 1000");
        let r = run(&mut tally, "unit to parsec");
        assert_eq!(r.error.as_ref().unwrap().code, codes::UNKNOWN_UNIT);
        assert_eq!(r.element("to-input"), Some("1.000000"));
        assert_eq!(r.element("to-select"), Some("km"));

        let r = run_ok(&mut tally, "from abc");
        assert_eq!(r.element("to-input"), Some(""));
    }

    #[test]
    fn test_custom_units_and_presets() {
        let mut tally = Tally::new();
        run_ok(&mut tally, "mode length\ncustom league 4828.032 2");
        let r = run_ok(&mut tally, "preset save trek league km\npreset apply trek\nfrom 1");
        assert_eq!(r.element("to-input"), Some("4.828032"));

        let r = run(&mut tally, "custom m 2");
        assert_eq!(r.error.unwrap().code, codes::INVALID_UNIT);
        let r = run(&mut tally, "preset apply nowhere");
        assert_eq!(r.error.unwrap().code, codes::UNKNOWN_PRESET);
    }

    #[test]
    fn test_custom_unit_precision_bounded() {
        let mut tally = Tally::new();
        run_ok(&mut tally, "mode length");
        let r = run(&mut tally, "custom zz 2 4000000000");
        assert!(!r.ok);
        assert_eq!(r.error.as_ref().unwrap().code, codes::INVALID_UNIT);

        let r = run(&mut tally, "unit to zz");
        assert_eq!(r.error.as_ref().unwrap().code, codes::UNKNOWN_UNIT);

        let r = run_ok(&mut tally, "custom zz 2 15\nunit to zz\nfrom 1");
        assert_eq!(r.element("to-input"), Some("0.500000000000000"));
    }

    #[test]
    fn test_batch_and_units() {
        let mut tally = Tally::new();
        let r = run_ok(&mut tally, "mode data\nbatch GB MB 1 0.5");
        assert_eq!(r.data[0], "1024.000000");
        assert_eq!(r.data[1], "512.000000");

        let r = run_ok(&mut tally, "units temperature");
        assert_eq!(r.data.as_array().unwrap().len(), 5);
    }

    #[test]
    fn test_date_session() {
        let mut tally = Tally::new();
        let r = run_ok(&mut tally, "mode date\nfrom 2024-01-01\nto 2024-12-31");
        assert_eq!(r.element("date-difference"), Some("365 days"));

        let r = run_ok(&mut tally, "base 2024-02-28\ndays 2\nadd");
        assert_eq!(r.element("date-calculation"), Some("2024-03-01"));
        let r = run_ok(&mut tally, "sub");
        assert_eq!(r.element("date-calculation"), Some("2024-02-26"));

        let r = run(&mut tally, "from 2023-02-29");
        assert!(!r.ok);
        assert_eq!(r.element("from-date"), Some("2024-01-01"));

        let r = run_ok(&mut tally, "clear");
        assert_eq!(r.element("date-difference"), Some(""));
    }

    #[test]
    fn test_resistor_series() {
        let mut tally = Tally::new();
        let r = run_ok(&mut tally, "mode resistor\nseries E12");
        assert_eq!(r.element("resistor-series"), Some("E12"));
        assert_eq!(r.data["rows"].as_array().unwrap().len(), 24);
        assert!(!run(&mut tally, "series E7").ok);
    }

    #[test]
    fn test_help_and_list() {
        let mut tally = Tally::new();
        let r = run_ok(&mut tally, "help");
        assert!(r.data["commands"].as_array().unwrap().len() > 10);
        let r = run_ok(&mut tally, "help sin");
        assert_eq!(r.data["name"], "sin");
        let r = run_ok(&mut tally, "list converter");
        assert_eq!(r.data.as_array().unwrap().len(), 14);
    }

    #[test]
    fn test_show_reports_phase() {
        let mut tally = Tally::new();
        let r = run_ok(&mut tally, "2\n+\nshow");
        assert_eq!(r.data["phase"], "OperatorChosen");
        assert_eq!(r.data["state"]["previous"], "2");
    }
}
