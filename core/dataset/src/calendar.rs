//! FILENAME: core/dataset/src/calendar.rs
//! PURPOSE: Month/year arithmetic, month labels and lenient date parsing.

use crate::value::CellValue;
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Full English name for a 1-based month number.
pub fn month_name(month: u32) -> Option<&'static str> {
    if (1..=12).contains(&month) {
        Some(MONTH_NAMES[(month - 1) as usize])
    } else {
        None
    }
}

/// Month number for a full or three-letter English month name (case-insensitive).
pub fn month_number(name: &str) -> Option<u32> {
    let name = name.trim();
    MONTH_NAMES
        .iter()
        .position(|m| {
            m.eq_ignore_ascii_case(name) || (name.len() == 3 && m[..3].eq_ignore_ascii_case(name))
        })
        .map(|i| i as u32 + 1)
}

// ============================================================================
// MONTH-YEAR
// ============================================================================

/// A calendar month. Orders chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MonthYear {
    pub year: i32,
    pub month: u32,
}

impl MonthYear {
    pub fn new(month: u32, year: i32) -> Option<Self> {
        if (1..=12).contains(&month) {
            Some(MonthYear { year, month })
        } else {
            None
        }
    }

    pub fn of(date: NaiveDate) -> Self {
        MonthYear {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Parses `"May 2025"`, `"May-2025"` or `"May_2025"`.
    pub fn parse(label: &str) -> Option<Self> {
        let mut parts = label
            .split(|c: char| c.is_whitespace() || c == '-' || c == '_')
            .filter(|p| !p.is_empty());
        let month = month_number(parts.next()?)?;
        let year = parts.next()?.parse::<i32>().ok()?;
        if parts.next().is_some() {
            return None;
        }
        MonthYear::new(month, year)
    }

    /// The previous calendar month; January rolls back to December of the prior year.
    pub fn previous_month(&self) -> Self {
        if self.month == 1 {
            MonthYear {
                year: self.year - 1,
                month: 12,
            }
        } else {
            MonthYear {
                year: self.year,
                month: self.month - 1,
            }
        }
    }

    /// The same calendar month one year earlier.
    pub fn previous_year(&self) -> Self {
        MonthYear {
            year: self.year - 1,
            month: self.month,
        }
    }

    pub fn month_name(&self) -> &'static str {
        MONTH_NAMES[(self.month - 1) as usize]
    }

    /// `"May 2025"`, the label used for month selection.
    pub fn label(&self) -> String {
        format!("{} {}", self.month_name(), self.year)
    }

    /// `"May-2025"`, the name of the period folder.
    pub fn folder_name(&self) -> String {
        format!("{}-{}", self.month_name(), self.year)
    }

    /// `"May 25"`, the compact period name.
    pub fn short_label(&self) -> String {
        format!("{} {:02}", self.month_name(), self.year.rem_euclid(100))
    }

    pub fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }

    /// Weekday of the 1st, Monday = 0 .. Sunday = 6.
    pub fn first_weekday(&self) -> Option<u8> {
        self.first_day()
            .map(|d| d.weekday().num_days_from_monday() as u8)
    }

    pub fn days_in_month(&self) -> u32 {
        let next = if self.month == 12 {
            NaiveDate::from_ymd_opt(self.year + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(self.year, self.month + 1, 1)
        };
        match (self.first_day(), next) {
            (Some(first), Some(next)) => (next - first).num_days() as u32,
            _ => 31,
        }
    }
}

impl fmt::Display for MonthYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

pub const WEEKDAY_NAMES: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// Name of a weekday index, Monday = 0.
pub fn weekday_name(index: u8) -> Option<&'static str> {
    WEEKDAY_NAMES.get(index as usize).copied()
}

// ============================================================================
// DATE PARSING
// ============================================================================

const ISO_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%Y.%m.%d",
    "%d %B %Y",
    "%d %b %Y",
    "%d-%b-%Y",
    "%B %d, %Y",
    "%b %d, %Y",
];
const DAY_FIRST_FORMATS: &[&str] = &["%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y", "%d/%m/%y"];
const MONTH_FIRST_FORMATS: &[&str] = &["%m/%d/%Y", "%m-%d-%Y", "%m/%d/%y"];
const TIME_SUFFIXES: &[&str] = &[
    " %H:%M:%S%.f",
    " %H:%M:%S",
    " %H:%M",
    "T%H:%M:%S%.f",
    "T%H:%M:%S",
];

/// Converts an Excel serial day number to a date (1900 date system).
pub fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 1.0 || serial > 2_958_465.0 {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    epoch.checked_add_signed(Duration::days(serial.trunc() as i64))
}

/// Parses a cell into a calendar date. Unparseable values yield `None`.
///
/// With `day_first`, ambiguous numeric forms such as `03/04/2025` read as
/// 3 April; otherwise as March 4. ISO forms are unambiguous either way.
pub fn parse_date(value: &CellValue, day_first: bool) -> Option<NaiveDate> {
    match value {
        CellValue::Date(d) => Some(*d),
        CellValue::Number(n) => excel_serial_to_date(*n),
        CellValue::Text(s) => parse_date_str(s, day_first),
        _ => None,
    }
}

fn parse_date_str(s: &str, day_first: bool) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    let (primary, secondary) = if day_first {
        (DAY_FIRST_FORMATS, MONTH_FIRST_FORMATS)
    } else {
        (MONTH_FIRST_FORMATS, DAY_FIRST_FORMATS)
    };

    for formats in [ISO_FORMATS, primary, secondary] {
        for fmt in formats {
            if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
                return Some(d);
            }
            for suffix in TIME_SUFFIXES {
                let full = format!("{}{}", fmt, suffix);
                if let Ok(dt) = NaiveDateTime::parse_from_str(s, &full) {
                    return Some(dt.date());
                }
            }
        }
    }
    None
}
