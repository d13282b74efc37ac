//! FILENAME: core/dataset/src/week.rs
//! PURPOSE: Week-of-month assignment.
//! CONTEXT: Week 1 runs from day 1 up to the end of the first calendar week,
//! so its length depends on the weekday the month starts on
//! (`7 - first_weekday` days, a single day when the 1st is a Sunday).
//! Every later week is a fixed 7-day block; the last one is cut at month end.
//! Week numbers are a derived column, recomputed whenever `first_weekday` changes.

use crate::log_warn;
use crate::table::Table;
use crate::value::CellValue;
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WeekError {
    #[error("day {0} is outside 1..=31")]
    DayOutOfRange(i64),

    #[error("first weekday {0} is outside 0..=6 (Monday=0 .. Sunday=6)")]
    InvalidFirstWeekday(u8),

    #[error("month length {0} is outside 1..=31")]
    InvalidMonthLength(u32),
}

fn check_first_weekday(first_weekday: u8) -> Result<(), WeekError> {
    if first_weekday > 6 {
        return Err(WeekError::InvalidFirstWeekday(first_weekday));
    }
    Ok(())
}

/// Number of days in week 1.
fn first_week_length(first_weekday: u8) -> u32 {
    7 - first_weekday as u32
}

/// Week number (1-based) of `day` in a month whose 1st falls on `first_weekday`.
pub fn week_of(day: i64, first_weekday: u8) -> Result<u32, WeekError> {
    check_first_weekday(first_weekday)?;
    if !(1..=31).contains(&day) {
        return Err(WeekError::DayOutOfRange(day));
    }

    let day = day as u32;
    let first_len = first_week_length(first_weekday);
    if day <= first_len {
        return Ok(1);
    }
    Ok(2 + (day - first_len - 1) / 7)
}

/// Enumerates `week -> (start_day, end_day)` for a month of `days_in_month` days.
pub fn date_ranges_for(
    first_weekday: u8,
    days_in_month: u32,
) -> Result<BTreeMap<u32, (u32, u32)>, WeekError> {
    check_first_weekday(first_weekday)?;
    if !(1..=31).contains(&days_in_month) {
        return Err(WeekError::InvalidMonthLength(days_in_month));
    }

    let mut ranges = BTreeMap::new();
    let first_end = first_week_length(first_weekday).min(days_in_month);
    ranges.insert(1, (1, first_end));

    let mut week = 2;
    let mut start = first_end + 1;
    while start <= days_in_month {
        let end = (start + 6).min(days_in_month);
        ranges.insert(week, (start, end));
        start = end + 1;
        week += 1;
    }
    Ok(ranges)
}

/// `"Week 2 (2-8)"`, or `"Week 1 (1)"` for a single-day week.
pub fn week_label(week: u32, range: (u32, u32)) -> String {
    let (start, end) = range;
    if start == end {
        format!("Week {} ({})", week, start)
    } else {
        format!("Week {} ({}-{})", week, start, end)
    }
}

/// Returns a copy of `table` with `week_column` computed from `day_column`.
///
/// Rows whose day is missing or outside 1..=31 get an empty week. When the
/// table has no `day_column` it is returned unchanged.
pub fn with_week_column(
    table: &Table,
    day_column: &str,
    week_column: &str,
    first_weekday: u8,
) -> Result<Table, WeekError> {
    check_first_weekday(first_weekday)?;

    let Some(day_idx) = table.column_index(day_column) else {
        log_warn!("WEEK", "no '{}' column, week column not derived", day_column);
        return Ok(table.clone());
    };

    let mut skipped = 0usize;
    let derived = table.with_column(week_column, |row| {
        let day = row.get(day_idx);
        if day.is_missing() {
            return CellValue::Empty;
        }
        match day.as_whole_number().map(|d| week_of(d, first_weekday)) {
            Some(Ok(week)) => CellValue::Number(week as f64),
            _ => {
                skipped += 1;
                CellValue::Empty
            }
        }
    });

    if skipped > 0 {
        log_warn!("WEEK", "{} rows had an invalid '{}' value", skipped, day_column);
    }
    Ok(derived)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn day_one_is_always_week_one() {
        for fw in 0..=6 {
            assert_eq!(week_of(1, fw), Ok(1));
        }
    }

    #[test]
    fn week_is_non_decreasing() {
        for fw in 0..=6 {
            let mut prev = 0;
            for day in 1..=31 {
                let week = week_of(day, fw).unwrap();
                assert!(week >= prev);
                assert!(week - prev <= 1);
                prev = week;
            }
        }
    }

    #[test]
    fn monday_start_uses_full_first_week() {
        assert_eq!(week_of(7, 0), Ok(1));
        assert_eq!(week_of(8, 0), Ok(2));
        assert_eq!(week_of(31, 0), Ok(5));
    }

    #[test]
    fn sunday_start_has_single_day_first_week() {
        assert_eq!(week_of(1, 6), Ok(1));
        assert_eq!(week_of(2, 6), Ok(2));
        assert_eq!(week_of(8, 6), Ok(2));
        assert_eq!(week_of(9, 6), Ok(3));
    }

    #[test]
    fn out_of_range_is_an_error() {
        assert_eq!(week_of(0, 2), Err(WeekError::DayOutOfRange(0)));
        assert_eq!(week_of(32, 2), Err(WeekError::DayOutOfRange(32)));
        assert_eq!(week_of(5, 7), Err(WeekError::InvalidFirstWeekday(7)));
    }

    #[test]
    fn ranges_for_sunday_start_thirty_days() {
        let ranges = date_ranges_for(6, 30).unwrap();
        assert_eq!(ranges.get(&1), Some(&(1, 1)));
        assert_eq!(ranges.get(&2), Some(&(2, 8)));
        assert_eq!(ranges.get(&3), Some(&(9, 15)));
        assert_eq!(ranges.get(&4), Some(&(16, 22)));
        assert_eq!(ranges.get(&5), Some(&(23, 29)));
        assert_eq!(ranges.get(&6), Some(&(30, 30)));
        assert_eq!(ranges.len(), 6);
    }

    #[test]
    fn ranges_agree_with_week_of() {
        for fw in 0..=6 {
            for len in [28, 29, 30, 31] {
                for (week, (start, end)) in date_ranges_for(fw, len).unwrap() {
                    for day in start..=end {
                        assert_eq!(week_of(day as i64, fw), Ok(week));
                    }
                }
            }
        }
    }

    #[test]
    fn labels() {
        assert_eq!(week_label(1, (1, 1)), "Week 1 (1)");
        assert_eq!(week_label(2, (2, 8)), "Week 2 (2-8)");
    }

    #[test]
    fn derived_column_is_recomputed_per_weekday() {
        let mut table = Table::new(vec!["Day".into()]);
        table.push_row(vec![CellValue::Number(1.0)]);
        table.push_row(vec![CellValue::Number(2.0)]);
        table.push_row(vec![CellValue::text("x")]);
        table.push_row(vec![CellValue::Empty]);

        let monday = with_week_column(&table, "Day", "Week", 0).unwrap();
        assert_eq!(monday.value(1, "Week"), &CellValue::Number(1.0));
        assert_eq!(monday.value(2, "Week"), &CellValue::Empty);
        assert_eq!(monday.value(3, "Week"), &CellValue::Empty);

        let sunday = with_week_column(&monday, "Day", "Week", 6).unwrap();
        assert_eq!(sunday.columns().len(), 2);
        assert_eq!(sunday.value(0, "Week"), &CellValue::Number(1.0));
        assert_eq!(sunday.value(1, "Week"), &CellValue::Number(2.0));

        // The source table never gains the derived column.
        assert!(!table.has_column("Week"));
    }
}
