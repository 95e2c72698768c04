//! Runtime values

use serde::Serialize;
use std::fmt;

/// A runtime value. Every variable holds one of these.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Scalar {
    Number(f64),
    Str(String),
    Bool(bool),
}

impl Scalar {
    /// Numeric coercion applied to every arithmetic and comparison operand.
    ///
    /// Strings are trimmed; the empty string is 0 and anything that is not a
    /// numeral is NaN.
    pub fn to_number(&self) -> f64 {
        match self {
            Scalar::Number(n) => *n,
            Scalar::Bool(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            Scalar::Str(s) => {
                let s = s.trim();
                if s.is_empty() {
                    0.0
                } else {
                    s.parse().unwrap_or(f64::NAN)
                }
            }
        }
    }

    /// Falsy values are `0`, the empty string and `false`
    pub fn is_truthy(&self) -> bool {
        match self {
            Scalar::Number(n) => *n != 0.0,
            Scalar::Str(s) => !s.is_empty(),
            Scalar::Bool(b) => *b,
        }
    }

    /// Process exit code for a value returned at the top level
    pub fn to_exit_code(&self) -> i32 {
        let n = self.to_number();
        if n.is_nan() {
            0
        } else {
            // `as` saturates out-of-range floats
            n.trunc() as i32
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Scalar::Number(_) => "number",
            Scalar::Str(_) => "string",
            Scalar::Bool(_) => "boolean",
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Number(n) => fmt_number(*n, f),
            Scalar::Str(s) => f.write_str(s),
            Scalar::Bool(b) => write!(f, "{}", b),
        }
    }
}

fn fmt_number(n: f64, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if n.is_nan() {
        f.write_str("NaN")
    } else if n.is_infinite() {
        f.write_str(if n > 0.0 { "Infinity" } else { "-Infinity" })
    } else if n == 0.0 {
        f.write_str("0")
    } else if n.fract() == 0.0 && n.abs() < 1e21 {
        write!(f, "{:.0}", n)
    } else if n.abs() >= 1e21 {
        write!(f, "{:e}", n)
    } else {
        write!(f, "{}", n)
    }
}

impl From<f64> for Scalar {
    fn from(n: f64) -> Self {
        Scalar::Number(n)
    }
}

impl From<bool> for Scalar {
    fn from(b: bool) -> Self {
        Scalar::Bool(b)
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::Str(s.to_string())
    }
}

impl From<String> for Scalar {
    fn from(s: String) -> Self {
        Scalar::Str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_coercion() {
        assert_eq!(Scalar::from(3.5).to_number(), 3.5);
        assert_eq!(Scalar::from(true).to_number(), 1.0);
        assert_eq!(Scalar::from(false).to_number(), 0.0);
        assert_eq!(Scalar::from(" 42 ").to_number(), 42.0);
        assert_eq!(Scalar::from("").to_number(), 0.0);
        assert!(Scalar::from("abc").to_number().is_nan());
    }

    #[test]
    fn test_truthiness() {
        assert!(!Scalar::from(0.0).is_truthy());
        assert!(!Scalar::from("").is_truthy());
        assert!(!Scalar::from(false).is_truthy());
        assert!(Scalar::from(-1.0).is_truthy());
        assert!(Scalar::from(f64::NAN).is_truthy());
        assert!(Scalar::from("0").is_truthy());
        assert!(Scalar::from(true).is_truthy());
    }

    #[test]
    fn test_display() {
        assert_eq!(Scalar::from(14.0).to_string(), "14");
        assert_eq!(Scalar::from(-3.0).to_string(), "-3");
        assert_eq!(Scalar::from(-0.0).to_string(), "0");
        assert_eq!(Scalar::from(2.5).to_string(), "2.5");
        assert_eq!(Scalar::from(f64::NAN).to_string(), "NaN");
        assert_eq!(Scalar::from(f64::INFINITY).to_string(), "Infinity");
        assert_eq!(Scalar::from(f64::NEG_INFINITY).to_string(), "-Infinity");
        assert_eq!(Scalar::from(true).to_string(), "true");
        assert_eq!(Scalar::from("raw text").to_string(), "raw text");
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(Scalar::from(7.0).to_exit_code(), 7);
        assert_eq!(Scalar::from(7.9).to_exit_code(), 7);
        assert_eq!(Scalar::from(-2.5).to_exit_code(), -2);
        assert_eq!(Scalar::from("oops").to_exit_code(), 0);
        assert_eq!(Scalar::from("12").to_exit_code(), 12);
        assert_eq!(Scalar::from(true).to_exit_code(), 1);
        assert_eq!(Scalar::from(1e12).to_exit_code(), i32::MAX);
    }
}
