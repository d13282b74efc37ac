//! FILENAME: core/comparison-engine/src/filter.rs
//! PURPOSE: Resolves a `FilterSpec` against a table and applies it to row views.
//! CONTEXT: Resolution happens once per filter pass. `Selection::AllKnown` is
//! expanded to the values present in the table at that moment and from then on
//! behaves exactly like an explicit list. Day and week are matched numerically;
//! every other dimension by exact, case-sensitive string form.
//!
//! Precedence:
//! - Period-scoped day selections suppress the shared day and week filters for
//!   both periods.
//! - A shared day filter suppresses a shared week filter.

use crate::definition::{Dimension, DimensionColumns, FilterSpec, Selection};
use dataset::{log_debug, log_warn, CellValue, RowSet, Table};
use serde::Serialize;
use std::collections::BTreeSet;

const DAY_RANGE: std::ops::RangeInclusive<i64> = 1..=31;

// ============================================================================
// RESOLVED FILTERS
// ============================================================================

/// The concrete value set of one active filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedFilter {
    Numeric(BTreeSet<i64>),
    Text(BTreeSet<String>),
}

impl ResolvedFilter {
    pub fn matches(&self, value: &CellValue) -> bool {
        if value.is_missing() {
            return false;
        }
        match self {
            ResolvedFilter::Numeric(set) => value
                .as_whole_number()
                .map_or(false, |n| set.contains(&n)),
            ResolvedFilter::Text(set) => set.contains(&value.display_value()),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ResolvedFilter::Numeric(set) => set.len(),
            ResolvedFilter::Text(set) => set.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Values in sorted order, as strings.
    pub fn values(&self) -> Vec<String> {
        match self {
            ResolvedFilter::Numeric(set) => set.iter().map(|n| n.to_string()).collect(),
            ResolvedFilter::Text(set) => set.iter().cloned().collect(),
        }
    }
}

/// One active filter, as reported back to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveFilter {
    pub dimension: Dimension,
    /// `Some(i)` for a period-scoped day filter on period `i`.
    pub period: Option<usize>,
    pub values: Vec<String>,
}

impl ActiveFilter {
    pub fn describe(&self) -> String {
        match self.period {
            Some(p) => format!("Period {} days: {}", p + 1, self.values.join(", ")),
            None => format!("{}: {}", self.dimension.display_name(), self.values.join(", ")),
        }
    }
}

#[derive(Debug, Clone)]
struct Step {
    dimension: Dimension,
    column: String,
    filter: ResolvedFilter,
}

/// A `FilterSpec` resolved against one table. Cheap to apply repeatedly.
#[derive(Debug, Clone, Default)]
pub struct ResolvedFilters {
    steps: Vec<Step>,
    day_column: String,
    period_days: [Option<ResolvedFilter>; 2],
    suppressed: Vec<Dimension>,
}

impl ResolvedFilters {
    /// Shared dimensions that will actually be applied, in application order.
    pub fn active_dimensions(&self) -> Vec<Dimension> {
        self.steps.iter().map(|s| s.dimension).collect()
    }

    /// Shared dimensions dropped by the day/week precedence rules.
    pub fn suppressed(&self) -> &[Dimension] {
        &self.suppressed
    }

    pub fn filter(&self, dimension: Dimension) -> Option<&ResolvedFilter> {
        self.steps
            .iter()
            .find(|s| s.dimension == dimension)
            .map(|s| &s.filter)
    }

    pub fn period_days(&self, period: usize) -> Option<&ResolvedFilter> {
        self.period_days.get(period).and_then(Option::as_ref)
    }

    pub fn has_period_days(&self) -> bool {
        self.period_days.iter().any(Option::is_some)
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty() && !self.has_period_days()
    }

    /// Every active filter: shared ones first, then period-scoped day filters.
    pub fn active_filters(&self) -> Vec<ActiveFilter> {
        let mut out: Vec<ActiveFilter> = self
            .steps
            .iter()
            .map(|s| ActiveFilter {
                dimension: s.dimension,
                period: None,
                values: s.filter.values(),
            })
            .collect();
        for (i, days) in self.period_days.iter().enumerate() {
            if let Some(days) = days {
                out.push(ActiveFilter {
                    dimension: Dimension::Day,
                    period: Some(i),
                    values: days.values(),
                });
            }
        }
        out
    }
}

// ============================================================================
// FILTER ENGINE
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct FilterEngine {
    columns: DimensionColumns,
}

impl FilterEngine {
    pub fn new(columns: DimensionColumns) -> Self {
        FilterEngine { columns }
    }

    pub fn columns(&self) -> &DimensionColumns {
        &self.columns
    }

    /// Resolves `spec` against `table`: expands `AllKnown`, parses numeric
    /// dimensions (invalid entries are logged and skipped) and applies the
    /// day/week precedence rules. Filters on columns the table lacks are skipped.
    pub fn resolve(&self, table: &Table, spec: &FilterSpec) -> ResolvedFilters {
        let mut steps = Vec::new();
        for dimension in Dimension::ALL {
            let Some(selection) = spec.selection(dimension) else {
                continue;
            };
            let column = self.columns.column(dimension);
            if !table.has_column(column) {
                log_warn!(
                    "FILTER",
                    "{} filter skipped: no '{}' column",
                    dimension.display_name(),
                    column
                );
                continue;
            }
            if let Some(filter) = resolve_selection(table, dimension, column, selection) {
                steps.push(Step {
                    dimension,
                    column: column.to_string(),
                    filter,
                });
            }
        }

        let day_column = self.columns.column(Dimension::Day).to_string();
        let mut period_days: [Option<ResolvedFilter>; 2] = [None, None];
        for (i, selection) in spec.period_days.iter().enumerate() {
            let Some(selection) = selection else {
                continue;
            };
            if !table.has_column(&day_column) {
                log_warn!(
                    "FILTER",
                    "period {} day filter skipped: no '{}' column",
                    i + 1,
                    day_column
                );
                continue;
            }
            period_days[i] = resolve_selection(table, Dimension::Day, &day_column, selection);
        }

        let mut suppressed = Vec::new();
        let has_period_days = period_days.iter().any(Option::is_some);
        let has_day = steps.iter().any(|s| s.dimension == Dimension::Day);
        let has_week = steps.iter().any(|s| s.dimension == Dimension::Week);
        if has_period_days {
            if has_day {
                suppressed.push(Dimension::Day);
            }
            if has_week {
                suppressed.push(Dimension::Week);
            }
        } else if has_day && has_week {
            suppressed.push(Dimension::Week);
        }
        if !suppressed.is_empty() {
            log_debug!("FILTER", "suppressed shared filters: {:?}", suppressed);
            steps.retain(|s| !suppressed.contains(&s.dimension));
        }

        ResolvedFilters {
            steps,
            day_column,
            period_days,
            suppressed,
        }
    }

    /// Applies resolved filters to `rows`. `period` selects which
    /// period-scoped day filter, if any, also applies.
    pub fn apply<'a>(
        &self,
        rows: &RowSet<'a>,
        filters: &ResolvedFilters,
        period: Option<usize>,
    ) -> RowSet<'a> {
        let table = rows.table();
        let mut current = rows.clone();

        if let Some(days) = period.and_then(|p| filters.period_days(p)) {
            if let Some(col) = table.column_index(&filters.day_column) {
                current = current.filter(|row| days.matches(row.get(col)));
            }
        }

        for step in &filters.steps {
            let Some(col) = table.column_index(&step.column) else {
                continue;
            };
            current = current.filter(|row| step.filter.matches(row.get(col)));
        }
        current
    }

    /// Resolves and applies `spec` to the whole table in one call.
    pub fn filter_table<'a>(&self, table: &'a Table, spec: &FilterSpec) -> RowSet<'a> {
        let resolved = self.resolve(table, spec);
        self.apply(&table.all(), &resolved, None)
    }
}

fn resolve_selection(
    table: &Table,
    dimension: Dimension,
    column: &str,
    selection: &Selection,
) -> Option<ResolvedFilter> {
    let raw: BTreeSet<String> = match selection {
        Selection::AllKnown => table.all().distinct_values(column),
        Selection::Explicit(values) => values.clone(),
    };

    let filter = if dimension.is_numeric() {
        let mut parsed = BTreeSet::new();
        for value in &raw {
            match parse_whole(value, dimension) {
                Some(n) => {
                    parsed.insert(n);
                }
                None => log_warn!(
                    "FILTER",
                    "ignoring invalid {} value '{}'",
                    dimension.display_name(),
                    value
                ),
            }
        }
        ResolvedFilter::Numeric(parsed)
    } else {
        ResolvedFilter::Text(raw)
    };

    if filter.is_empty() {
        log_warn!(
            "FILTER",
            "{} filter has no usable values and is inactive",
            dimension.display_name()
        );
        return None;
    }
    Some(filter)
}

fn parse_whole(value: &str, dimension: Dimension) -> Option<i64> {
    let n = value.trim().parse::<f64>().ok()?;
    if !n.is_finite() || n.fract() != 0.0 {
        return None;
    }
    let n = n as i64;
    match dimension {
        Dimension::Day if !DAY_RANGE.contains(&n) => None,
        _ if n < 1 => None,
        _ => Some(n),
    }
}
