//! FILENAME: core/comparison-engine/src/options.rs
//! PURPOSE: Cross-filtered option lists for the filter controls.
//! CONTEXT: A dimension's options are every value the table holds for it.
//! An option is available when it survives every *other* active filter
//! (leave-one-out), so a user can always widen their own selection.

use crate::definition::{Dimension, FilterSpec};
use crate::filter::FilterEngine;
use dataset::calendar::{month_number, MonthYear};
use dataset::{date_ranges_for, is_missing_sentinel, log_debug, week_label, Table};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterOption {
    pub value: String,
    pub label: String,
    pub available: bool,
}

impl FilterOption {
    /// Label prefixed with a check mark (available) or a cross (unavailable).
    pub fn marked_label(&self) -> String {
        let mark = if self.available { '\u{2713}' } else { '\u{2717}' };
        format!("{} {}", mark, self.label)
    }
}

/// Calendar facts needed to label week options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekContext {
    pub first_weekday: u8,
    pub days_in_month: u32,
}

impl WeekContext {
    pub fn for_month(month: MonthYear) -> Option<Self> {
        Some(WeekContext {
            first_weekday: month.first_weekday()?,
            days_in_month: month.days_in_month(),
        })
    }
}

fn option_label(dimension: Dimension, value: &str, ranges: &BTreeMap<u32, (u32, u32)>) -> String {
    match dimension {
        Dimension::Day => format!("Day {}", value),
        Dimension::Week => {
            let range = value.parse::<u32>().ok().and_then(|w| ranges.get(&w).map(|r| (w, *r)));
            match range {
                Some((week, range)) => week_label(week, range),
                None => format!("Week {}", value),
            }
        }
        _ => value.to_string(),
    }
}

/// Natural order: numeric for day and week, lexical otherwise.
fn sort_values(dimension: Dimension, values: BTreeSet<String>) -> Vec<String> {
    let mut values: Vec<String> = values.into_iter().collect();
    if dimension.is_numeric() {
        values.sort_by(|a, b| {
            let a_num = a.parse::<f64>().unwrap_or(f64::MAX);
            let b_num = b.parse::<f64>().unwrap_or(f64::MAX);
            a_num
                .partial_cmp(&b_num)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.cmp(b))
        });
    }
    values
}

fn usable(value: &str) -> bool {
    !value.is_empty() && !is_missing_sentinel(value)
}

/// Options for one dimension: available values first, then unavailable ones,
/// each group in natural order. Empty when the table lacks the column.
pub fn options_for(
    engine: &FilterEngine,
    table: &Table,
    dimension: Dimension,
    spec: &FilterSpec,
    week: Option<WeekContext>,
) -> Vec<FilterOption> {
    let column = engine.columns().column(dimension);
    if !table.has_column(column) {
        return Vec::new();
    }

    let all: BTreeSet<String> = table
        .all()
        .distinct_values(column)
        .into_iter()
        .filter(|v| usable(v))
        .collect();
    let reachable = engine
        .filter_table(table, &spec.without(dimension))
        .distinct_values(column);

    let ranges = match (dimension, week) {
        (Dimension::Week, Some(ctx)) => {
            date_ranges_for(ctx.first_weekday, ctx.days_in_month).unwrap_or_default()
        }
        _ => BTreeMap::new(),
    };

    let (available, unavailable): (BTreeSet<String>, BTreeSet<String>) =
        all.into_iter().partition(|v| reachable.contains(v));

    log_debug!(
        "OPTIONS",
        "{}: {} available, {} unavailable",
        dimension.display_name(),
        available.len(),
        unavailable.len()
    );

    let make = |value: String, is_available: bool| FilterOption {
        label: option_label(dimension, &value, &ranges),
        value,
        available: is_available,
    };
    sort_values(dimension, available)
        .into_iter()
        .map(|v| make(v, true))
        .chain(sort_values(dimension, unavailable).into_iter().map(|v| make(v, false)))
        .collect()
}

/// Options for every dimension whose column exists in `table`.
pub fn all_options(
    engine: &FilterEngine,
    table: &Table,
    spec: &FilterSpec,
    week: Option<WeekContext>,
) -> BTreeMap<Dimension, Vec<FilterOption>> {
    Dimension::ALL
        .iter()
        .filter(|d| table.has_column(engine.columns().column(**d)))
        .map(|&d| (d, options_for(engine, table, d, spec, week)))
        .collect()
}

/// Distinct `"<Month> <Year>"` labels present in the table, oldest first.
/// Rows whose month or year cannot be read are ignored.
pub fn available_months(table: &Table, month_column: &str, year_column: &str) -> Vec<String> {
    let (Some(month_idx), Some(year_idx)) =
        (table.column_index(month_column), table.column_index(year_column))
    else {
        return Vec::new();
    };

    let months: BTreeSet<MonthYear> = table
        .rows()
        .iter()
        .filter_map(|row| {
            let month = month_number(&row.get(month_idx).display_value())?;
            let year = row.get(year_idx).as_whole_number()?;
            MonthYear::new(month, i32::try_from(year).ok()?)
        })
        .collect();
    months.into_iter().map(|m| m.label()).collect()
}
