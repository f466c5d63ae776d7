//! Command line parser

use crate::ast::{Command, UnitField};
use tally_core::TallyError;

/// Bare tokens read as an operator key
const OPERATOR_TOKENS: &[&str] = &[
    "+", "-", "−", "*", "×", "/", "÷", "^", "**", "&", "|", "<<", ">>",
];

/// Parse a script, one command per line
///
/// Blank lines and lines starting with `#` are skipped. Stops at the
/// first bad line, reporting its line number.
pub fn parse(input: &str) -> Result<Vec<Command>, TallyError> {
    let mut commands = Vec::new();
    for (index, line) in input.lines().enumerate() {
        match parse_line(line) {
            Ok(Some(cmd)) => commands.push(cmd),
            Ok(None) => {}
            Err(e) => {
                let message = format!("line {}: {}", index + 1, e.message);
                return Err(TallyError { message, ..e });
            }
        }
    }
    Ok(commands)
}

/// Parse one line; `Ok(None)` for blank lines and comments
pub fn parse_line(line: &str) -> Result<Option<Command>, TallyError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let tokens: Vec<&str> = line.split_whitespace().collect();
    let head = tokens[0];
    let args = &tokens[1..];
    // Free text after the keyword, spaces preserved ("from 1 000" stays one value)
    let rest = line[head.len()..].trim();

    if args.is_empty() && is_number_token(head) {
        return Ok(Some(Command::Digits { token: head.to_string() }));
    }
    if args.is_empty() && OPERATOR_TOKENS.contains(&head) {
        return Ok(Some(Command::Operator { token: head.to_string() }));
    }

    let cmd = match head.to_lowercase().as_str() {
        "mode" | "goto" => Command::Mode { name: required(head, args, "mode name")?.to_string() },
        "list" => Command::List { category: args.first().map(|s| s.to_string()) },
        "help" => Command::Help { topic: args.first().map(|s| s.to_string()) },
        "show" | "state" | "display" => Command::Show,

        "digit" | "digits" | "num" => Command::Digits { token: required(head, args, "digits")?.to_string() },
        "op" => Command::Operator { token: required(head, args, "operator")?.to_string() },
        "=" | "equals" | "enter" => Command::Equals,
        "c" | "clear" => Command::Clear,
        "ce" => Command::ClearEntry,
        "back" | "backspace" | "⌫" => Command::Backspace,
        "fn" | "func" => Command::Function { name: required(head, args, "function name")?.to_string() },
        "mem" | "memory" => Command::Memory { label: required(head, args, "memory key")?.to_string() },
        "mc" | "mr" | "m+" | "m-" | "m−" | "ms" if args.is_empty() => Command::Memory { label: head.to_string() },
        "key" => Command::Key { name: required(head, args, "key name")?.to_string() },
        "history" => Command::History,

        "2nd" | "second" => Command::Second,
        "angle" => Command::Angle { mode: args.first().map(|s| s.to_string()) },
        "const" | "constant" => Command::Constant { name: required(head, args, "constant")?.to_string() },
        "pow" | "xʸ" | "x^y" => Command::Power,

        "radix" | "base-n" => Command::Radix { radix: required(head, args, "radix")?.to_string() },
        "word" | "word-size" => Command::WordSize { size: required(head, args, "word size")?.to_string() },
        "not" => Command::Not,
        "rol" => Command::RotateLeft { amount: optional_amount(args)? },
        "ror" => Command::RotateRight { amount: optional_amount(args)? },
        "rotate" => parse_rotate(args)?,
        "and" | "or" | "xor" | "lsh" | "rsh" if args.is_empty() => Command::Operator { token: head.to_string() },

        "from" => Command::From { text: rest.to_string() },
        "to" => Command::To { text: rest.to_string() },
        "unit" => parse_unit(args)?,
        "units" => Command::Units { quantity: args.first().map(|s| s.to_string()) },
        "batch" => parse_batch(args)?,
        "custom" => parse_custom(args)?,
        "preset" => parse_preset(args)?,
        "presets" => Command::Presets,
        "rate" => parse_rate(args)?,
        "refresh" => Command::Refresh {
            rates: args.iter().map(|pair| parse_rate_pair(pair)).collect::<Result<_, _>>()?,
        },

        "base" => Command::Base { text: rest.to_string() },
        "days" => Command::Days { text: rest.to_string() },
        "add" => Command::AddDays,
        "sub" | "subtract" => Command::SubtractDays,

        "series" => Command::Series { name: required(head, args, "series")?.to_string() },

        _ => return Err(TallyError::unknown_command(head)),
    };

    Ok(Some(cmd))
}

/// Digits with an optional decimal point (programmer digits go through `digit`)
fn is_number_token(token: &str) -> bool {
    token.chars().all(|c| c.is_ascii_digit() || c == '.')
        && token.chars().any(|c| c.is_ascii_digit())
}

fn required<'a>(command: &str, args: &[&'a str], what: &str) -> Result<&'a str, TallyError> {
    args.first()
        .copied()
        .ok_or_else(|| TallyError::parse_error(format!("'{}' needs a {}", command, what)))
}

fn parse_number(text: &str) -> Result<f64, TallyError> {
    text.parse::<f64>()
        .map_err(|_| TallyError::parse_error(format!("'{}' is not a number", text)))
}

fn optional_amount(args: &[&str]) -> Result<Option<u32>, TallyError> {
    match args.first() {
        None => Ok(None),
        Some(text) => text
            .parse::<u32>()
            .map(Some)
            .map_err(|_| TallyError::parse_error(format!("'{}' is not a rotate amount", text))),
    }
}

fn parse_rotate(args: &[&str]) -> Result<Command, TallyError> {
    let direction = required("rotate", args, "direction (left or right)")?;
    let amount = optional_amount(&args[1..])?;
    match direction.to_lowercase().as_str() {
        "left" | "l" => Ok(Command::RotateLeft { amount }),
        "right" | "r" => Ok(Command::RotateRight { amount }),
        other => Err(TallyError::parse_error(format!("unknown rotate direction '{}'", other))),
    }
}

fn parse_unit(args: &[&str]) -> Result<Command, TallyError> {
    if args.len() < 2 {
        return Err(TallyError::parse_error("usage: unit <from|to> <symbol>"));
    }
    let field = match args[0].to_lowercase().as_str() {
        "from" | "source" => UnitField::From,
        "to" | "target" => UnitField::To,
        other => return Err(TallyError::parse_error(format!("unknown unit field '{}'", other))),
    };
    // Symbols may contain spaces ("% w/w")
    Ok(Command::Unit { field, symbol: args[1..].join(" ") })
}

fn parse_batch(args: &[&str]) -> Result<Command, TallyError> {
    if args.len() < 3 {
        return Err(TallyError::parse_error("usage: batch <from> <to> <value>..."));
    }
    let values = args[2..].iter().map(|v| parse_number(v)).collect::<Result<Vec<_>, _>>()?;
    Ok(Command::Batch {
        from: args[0].to_string(),
        to: args[1].to_string(),
        values,
    })
}

fn parse_custom(args: &[&str]) -> Result<Command, TallyError> {
    if !(2..=3).contains(&args.len()) {
        return Err(TallyError::parse_error("usage: custom <symbol> <scale> [decimals]"));
    }
    let decimals = match args.get(2) {
        Some(text) => Some(
            text.parse::<u32>()
                .map_err(|_| TallyError::parse_error(format!("'{}' is not a decimal count", text)))?,
        ),
        None => None,
    };
    Ok(Command::CustomUnit {
        symbol: args[0].to_string(),
        scale: parse_number(args[1])?,
        decimals,
    })
}

fn parse_preset(args: &[&str]) -> Result<Command, TallyError> {
    match args {
        ["save", name, from, to] => Ok(Command::PresetSave {
            name: name.to_string(),
            from: from.to_string(),
            to: to.to_string(),
        }),
        ["apply", name] | ["load", name] => Ok(Command::PresetApply { name: name.to_string() }),
        [] | ["list"] => Ok(Command::Presets),
        _ => Err(TallyError::parse_error("usage: preset save <name> <from> <to> | preset apply <name>")),
    }
}

fn parse_rate(args: &[&str]) -> Result<Command, TallyError> {
    match args {
        [pair] if pair.contains('=') => {
            let (code, rate) = parse_rate_pair(pair)?;
            Ok(Command::Rate { code, rate })
        }
        [code, rate] => Ok(Command::Rate { code: code.to_string(), rate: parse_number(rate)? }),
        _ => Err(TallyError::parse_error("usage: rate <code> <rate>")),
    }
}

/// `USD=0.14`
pub(crate) fn parse_rate_pair(pair: &str) -> Result<(String, f64), TallyError> {
    let (code, rate) = pair
        .split_once('=')
        .ok_or_else(|| TallyError::parse_error(format!("expected CODE=rate, got '{}'", pair)))?;
    let code = code.trim();
    if code.is_empty() {
        return Err(TallyError::parse_error(format!("missing currency code in '{}'", pair)));
    }
    Ok((code.to_uppercase(), parse_number(rate.trim())?))
}
