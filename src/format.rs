//! Presentation of solved values for hosts that need text, money or integer
//! outputs alongside the raw `f64`.

use crate::builtins::{round_to, truncate_to_i32};
use crate::error::EquationError;
use serde::Serialize;

/// Render with at least one and at most six fractional digits
/// (`3` → `"3.0"`, `1/3` → `"0.333333"`, `2.50` → `"2.5"`).
pub fn render_decimal(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let mut text = format!("{:.6}", value);
    while text.ends_with('0') && !text.ends_with(".0") {
        text.pop();
    }
    // "-0.0" after rounding away the digits reads as plain zero
    if text == "-0.0" {
        text.remove(0);
    }
    text
}

/// Every output a host may bind from one solved value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormattedResult {
    /// Fixed-point text, see [`render_decimal`].
    pub text: String,
    /// Rounded to two decimals, half to even.
    pub money: f64,
    pub truncated: i32,
    /// Nearest integer, half to even.
    pub rounded: i32,
    pub float: f64,
}

impl FormattedResult {
    pub fn new(value: f64) -> Result<Self, EquationError> {
        Ok(Self {
            text: render_decimal(value),
            money: round_to(value, 2, "money output")?,
            truncated: truncate_to_i32("truncated output", value)?,
            rounded: truncate_to_i32("rounded output", value.round_ties_even())?,
            float: value,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decimal_rendering() {
        assert_eq!(render_decimal(3.0), "3.0");
        assert_eq!(render_decimal(2.5), "2.5");
        assert_eq!(render_decimal(-15.0), "-15.0");
        assert_eq!(render_decimal(1.0 / 3.0), "0.333333");
        assert_eq!(render_decimal(2.0 / 3.0), "0.666667");
        assert_eq!(render_decimal(1234567.125), "1234567.125");
        assert_eq!(render_decimal(-0.0000001), "0.0");
        assert_eq!(render_decimal(f64::INFINITY), "inf");
    }

    #[test]
    fn formatted_outputs() {
        let out = FormattedResult::new(12.5).unwrap();
        assert_eq!(out.text, "12.5");
        assert_eq!(out.money, 12.5);
        assert_eq!(out.truncated, 12);
        assert_eq!(out.rounded, 12);

        let out = FormattedResult::new(-7.125).unwrap();
        assert_eq!(out.money, -7.12);
        assert_eq!(out.truncated, -7);
        assert_eq!(out.rounded, -7);

        assert!(matches!(FormattedResult::new(1e12), Err(EquationError::OutOfRange { .. })));
    }

    #[test]
    fn serializes_for_json_output() {
        let out = FormattedResult::new(13.5).unwrap();
        let json = serde_json::to_value(&out).unwrap();
        assert_eq!(json["text"], "13.5");
        assert_eq!(json["rounded"], 14);
    }
}
