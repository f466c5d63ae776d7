//! Unary math functions used by the scientific and standard keypads

use std::f64::consts::PI;
use serde::{Serialize, Deserialize};
use crate::CalcError;

/// Largest n for which n! is finite in f64
pub const MAX_FACTORIAL: f64 = 170.0;

/// Whether trig functions take and return degrees or radians
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AngleMode {
    #[default]
    Degrees,
    Radians,
}

impl AngleMode {
    pub fn label(&self) -> &'static str {
        match self {
            AngleMode::Degrees => "DEG",
            AngleMode::Radians => "RAD",
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            AngleMode::Degrees => AngleMode::Radians,
            AngleMode::Radians => AngleMode::Degrees,
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "deg" | "degree" | "degrees" => Some(AngleMode::Degrees),
            "rad" | "radian" | "radians" => Some(AngleMode::Radians),
            _ => None,
        }
    }

    fn to_radians(&self, x: f64) -> f64 {
        match self {
            AngleMode::Degrees => x * PI / 180.0,
            AngleMode::Radians => x,
        }
    }

    fn from_radians(&self, x: f64) -> f64 {
        match self {
            AngleMode::Degrees => x * 180.0 / PI,
            AngleMode::Radians => x,
        }
    }
}

/// Metadata for a keypad function
#[derive(Debug, Clone, Serialize)]
pub struct FunctionMeta {
    pub name: &'static str,
    pub description: &'static str,
    pub usage: &'static str,
    pub category: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MathFn {
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Sinh,
    Cosh,
    Tanh,
    Asinh,
    Acosh,
    Atanh,
    Square,
    Sqrt,
    Exp10,
    Log,
    Ln,
    Exp,
    Reciprocal,
    Abs,
    Factorial,
}

impl MathFn {
    pub const ALL: [MathFn; 21] = [
        MathFn::Sin,
        MathFn::Cos,
        MathFn::Tan,
        MathFn::Asin,
        MathFn::Acos,
        MathFn::Atan,
        MathFn::Sinh,
        MathFn::Cosh,
        MathFn::Tanh,
        MathFn::Asinh,
        MathFn::Acosh,
        MathFn::Atanh,
        MathFn::Square,
        MathFn::Sqrt,
        MathFn::Exp10,
        MathFn::Log,
        MathFn::Ln,
        MathFn::Exp,
        MathFn::Reciprocal,
        MathFn::Abs,
        MathFn::Factorial,
    ];

    /// Keypad label, also used in history lines
    pub fn label(&self) -> &'static str {
        self.meta().name
    }

    pub fn meta(&self) -> FunctionMeta {
        let (name, description, usage, category) = match self {
            MathFn::Sin => ("sin", "Sine", "sin x", "trig"),
            MathFn::Cos => ("cos", "Cosine", "cos x", "trig"),
            MathFn::Tan => ("tan", "Tangent", "tan x", "trig"),
            MathFn::Asin => ("sin⁻¹", "Inverse sine, |x| <= 1", "sin⁻¹ x", "trig"),
            MathFn::Acos => ("cos⁻¹", "Inverse cosine, |x| <= 1", "cos⁻¹ x", "trig"),
            MathFn::Atan => ("tan⁻¹", "Inverse tangent", "tan⁻¹ x", "trig"),
            MathFn::Sinh => ("sinh", "Hyperbolic sine", "sinh x", "hyperbolic"),
            MathFn::Cosh => ("cosh", "Hyperbolic cosine", "cosh x", "hyperbolic"),
            MathFn::Tanh => ("tanh", "Hyperbolic tangent", "tanh x", "hyperbolic"),
            MathFn::Asinh => ("sinh⁻¹", "Inverse hyperbolic sine", "sinh⁻¹ x", "hyperbolic"),
            MathFn::Acosh => ("cosh⁻¹", "Inverse hyperbolic cosine, x >= 1", "cosh⁻¹ x", "hyperbolic"),
            MathFn::Atanh => ("tanh⁻¹", "Inverse hyperbolic tangent, |x| < 1", "tanh⁻¹ x", "hyperbolic"),
            MathFn::Square => ("x²", "Square", "x²", "power"),
            MathFn::Sqrt => ("√", "Square root, x >= 0", "√x", "power"),
            MathFn::Exp10 => ("10ˣ", "Power of ten", "10ˣ", "power"),
            MathFn::Log => ("log", "Base-10 logarithm, x > 0", "log x", "log"),
            MathFn::Ln => ("ln", "Natural logarithm, x > 0", "ln x", "log"),
            MathFn::Exp => ("eˣ", "Exponential", "eˣ", "power"),
            MathFn::Reciprocal => ("1/x", "Reciprocal, x != 0", "1/x", "basic"),
            MathFn::Abs => ("|x|", "Absolute value", "|x|", "basic"),
            MathFn::Factorial => ("n!", "Factorial of an integer 0..=170", "n!", "basic"),
        };
        FunctionMeta { name, description, usage, category }
    }

    /// Parse a keypad label or its ASCII spelling
    pub fn from_name(name: &str) -> Result<Self, CalcError> {
        let f = match name.trim().to_lowercase().as_str() {
            "sin" => MathFn::Sin,
            "cos" => MathFn::Cos,
            "tan" => MathFn::Tan,
            "asin" | "sin⁻¹" | "arcsin" => MathFn::Asin,
            "acos" | "cos⁻¹" | "arccos" => MathFn::Acos,
            "atan" | "tan⁻¹" | "arctan" => MathFn::Atan,
            "sinh" => MathFn::Sinh,
            "cosh" => MathFn::Cosh,
            "tanh" => MathFn::Tanh,
            "asinh" | "sinh⁻¹" => MathFn::Asinh,
            "acosh" | "cosh⁻¹" => MathFn::Acosh,
            "atanh" | "tanh⁻¹" => MathFn::Atanh,
            "x²" | "x^2" | "sqr" | "square" => MathFn::Square,
            "√" | "sqrt" => MathFn::Sqrt,
            "10ˣ" | "10^x" | "exp10" => MathFn::Exp10,
            "log" => MathFn::Log,
            "ln" => MathFn::Ln,
            "eˣ" | "e^x" | "exp" => MathFn::Exp,
            "1/x" | "recip" | "inv" => MathFn::Reciprocal,
            "|x|" | "abs" => MathFn::Abs,
            "n!" | "fact" | "factorial" => MathFn::Factorial,
            _ => return Err(CalcError::UnknownFunction(name.trim().to_string())),
        };
        Ok(f)
    }

    /// The function shown on the same key while 2nd is active
    pub fn second(&self) -> Self {
        match self {
            MathFn::Sin => MathFn::Asin,
            MathFn::Asin => MathFn::Sin,
            MathFn::Cos => MathFn::Acos,
            MathFn::Acos => MathFn::Cos,
            MathFn::Tan => MathFn::Atan,
            MathFn::Atan => MathFn::Tan,
            MathFn::Sinh => MathFn::Asinh,
            MathFn::Asinh => MathFn::Sinh,
            MathFn::Cosh => MathFn::Acosh,
            MathFn::Acosh => MathFn::Cosh,
            MathFn::Tanh => MathFn::Atanh,
            MathFn::Atanh => MathFn::Tanh,
            MathFn::Square => MathFn::Sqrt,
            MathFn::Sqrt => MathFn::Square,
            MathFn::Log => MathFn::Exp10,
            MathFn::Exp10 => MathFn::Log,
            MathFn::Ln => MathFn::Exp,
            MathFn::Exp => MathFn::Ln,
            other => *other,
        }
    }

    /// Evaluate, rejecting inputs outside the function's domain
    pub fn eval(&self, x: f64, angle: AngleMode) -> Result<f64, CalcError> {
        let name = self.meta().name;
        let result = match self {
            MathFn::Sin => angle.to_radians(x).sin(),
            MathFn::Cos => angle.to_radians(x).cos(),
            MathFn::Tan => {
                let r = angle.to_radians(x);
                if r.cos().abs() < 1e-15 {
                    return Err(CalcError::domain(name, "undefined at odd multiples of 90°"));
                }
                r.tan()
            }
            MathFn::Asin => {
                if !(-1.0..=1.0).contains(&x) {
                    return Err(CalcError::domain(name, "input must lie in [-1, 1]"));
                }
                angle.from_radians(x.asin())
            }
            MathFn::Acos => {
                if !(-1.0..=1.0).contains(&x) {
                    return Err(CalcError::domain(name, "input must lie in [-1, 1]"));
                }
                angle.from_radians(x.acos())
            }
            MathFn::Atan => angle.from_radians(x.atan()),
            MathFn::Sinh => x.sinh(),
            MathFn::Cosh => x.cosh(),
            MathFn::Tanh => x.tanh(),
            MathFn::Asinh => x.asinh(),
            MathFn::Acosh => {
                if x < 1.0 {
                    return Err(CalcError::domain(name, "input must be >= 1"));
                }
                x.acosh()
            }
            MathFn::Atanh => {
                if x <= -1.0 || x >= 1.0 {
                    return Err(CalcError::domain(name, "input must lie in (-1, 1)"));
                }
                x.atanh()
            }
            MathFn::Square => x * x,
            MathFn::Sqrt => {
                if x < 0.0 {
                    return Err(CalcError::domain(name, "negative input"));
                }
                x.sqrt()
            }
            MathFn::Exp10 => 10f64.powf(x),
            MathFn::Log => {
                if x <= 0.0 {
                    return Err(CalcError::domain(name, "input must be positive"));
                }
                x.log10()
            }
            MathFn::Ln => {
                if x <= 0.0 {
                    return Err(CalcError::domain(name, "input must be positive"));
                }
                x.ln()
            }
            MathFn::Exp => x.exp(),
            MathFn::Reciprocal => {
                if x == 0.0 {
                    return Err(CalcError::DivisionByZero);
                }
                1.0 / x
            }
            MathFn::Abs => x.abs(),
            MathFn::Factorial => factorial(x)?,
        };

        if result.is_finite() {
            Ok(result)
        } else {
            Err(CalcError::OutOfRange)
        }
    }
}

/// n! for integers 0..=170
pub fn factorial(n: f64) -> Result<f64, CalcError> {
    if n < 0.0 || n.fract() != 0.0 {
        return Err(CalcError::domain("n!", "only defined for non-negative integers"));
    }
    if n > MAX_FACTORIAL {
        return Err(CalcError::OutOfRange);
    }
    // n <= 170, so the cast is exact
    Ok((2..=n as u32).fold(1.0, |acc, i| acc * i as f64))
}

/// `base ^ exponent`; zero to a non-positive power is undefined
pub fn power(base: f64, exponent: f64) -> Result<f64, CalcError> {
    if base == 0.0 && exponent <= 0.0 {
        return Err(CalcError::domain("xʸ", "zero to a non-positive power"));
    }
    let result = base.powf(exponent);
    if result.is_nan() {
        Err(CalcError::domain("xʸ", "result is not a real number"))
    } else if result.is_infinite() {
        Err(CalcError::OutOfRange)
    } else {
        Ok(result)
    }
}
