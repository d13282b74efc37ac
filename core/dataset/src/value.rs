//! FILENAME: core/dataset/src/value.rs
//! PURPOSE: Defines the value held by a single field of a row.
//! CONTEXT: Every source (workbook, delimited file, cache entry) is decoded into
//! `CellValue`s. `Empty` is the one true "missing" marker; numeric zero and the
//! empty string are real values and are never used to stand in for absence.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// The decoded content of one field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CellValue {
    Empty,
    Number(f64),
    Text(String),
    Boolean(bool),
    Date(NaiveDate),
}

impl Default for CellValue {
    fn default() -> Self {
        CellValue::Empty
    }
}

impl CellValue {
    pub fn text(s: impl Into<String>) -> Self {
        CellValue::Text(s.into())
    }

    /// True for `Empty` and for a NaN number.
    pub fn is_missing(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Number(n) => n.is_nan(),
            _ => false,
        }
    }

    /// Returns the string form used for membership tests and display.
    /// Whole numbers print without a decimal part, so a day stored as `5.0`
    /// matches the option value `"5"`.
    pub fn display_value(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Number(n) => format_number(*n),
            CellValue::Text(s) => s.clone(),
            CellValue::Boolean(b) => {
                if *b {
                    "TRUE".to_string()
                } else {
                    "FALSE".to_string()
                }
            }
            CellValue::Date(d) => d.format("%Y-%m-%d").to_string(),
        }
    }

    /// Numeric view of the value. Text is parsed after trimming.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) if !n.is_nan() => Some(*n),
            CellValue::Text(s) => s.trim().parse::<f64>().ok().filter(|n| !n.is_nan()),
            CellValue::Boolean(b) => Some(if *b { 1.0 } else { 0.0 }),
            _ => None,
        }
    }

    /// Contribution of this value to a metric sum; missing or non-numeric is zero.
    pub fn sum_contribution(&self) -> f64 {
        match self {
            CellValue::Boolean(_) => 0.0,
            other => other.as_number().unwrap_or(0.0),
        }
    }

    /// Interprets the value as a day-of-month / week number. Only exact
    /// integral values qualify.
    pub fn as_whole_number(&self) -> Option<i64> {
        match self {
            CellValue::Boolean(_) => None,
            other => other
                .as_number()
                .filter(|n| n.is_finite() && n.fract() == 0.0)
                .map(|n| n as i64),
        }
    }
}

fn format_number(n: f64) -> String {
    if n.is_nan() {
        return String::new();
    }
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<NaiveDate> for CellValue {
    fn from(d: NaiveDate) -> Self {
        CellValue::Date(d)
    }
}
