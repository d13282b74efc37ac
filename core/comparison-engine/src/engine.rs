//! FILENAME: core/comparison-engine/src/engine.rs
//! Comparison Engine - Month-against-month comparison over the unified dataset.
//!
//! A period is a view: the rows whose month and year columns spell the
//! requested label (e.g. "May 2025"). Both periods share one resolved
//! `FilterSpec`; period `i` additionally gets its own day selection. When both
//! periods end up empty the result is a `NoDataReport`, which is a different
//! shape from a successful comparison with no rows.

use crate::aggregate::{compare, Comparison, RowOrder};
use crate::definition::FilterSpec;
use crate::filter::FilterEngine;
use crate::report::NoDataReport;
use dataset::{log_info, RowSet, Table};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Columns that identify a row's calendar month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MonthColumns {
    pub month: String,
    pub year: String,
}

impl Default for MonthColumns {
    fn default() -> Self {
        MonthColumns {
            month: "Month".to_string(),
            year: "Year".to_string(),
        }
    }
}

/// Rows of `table` whose `"<Month> <Year>"` equals `label`.
pub fn month_rows<'a>(table: &'a Table, label: &str, columns: &MonthColumns) -> RowSet<'a> {
    let (Some(month_idx), Some(year_idx)) = (
        table.column_index(&columns.month),
        table.column_index(&columns.year),
    ) else {
        return RowSet::empty(table);
    };

    table.all().filter(|row| {
        let month = row.get(month_idx);
        let year = row.get(year_idx);
        !month.is_missing()
            && !year.is_missing()
            && format!("{} {}", month.display_value(), year.display_value()) == label
    })
}

// ============================================================================
// VIEWS AND OUTCOMES
// ============================================================================

/// One comparison table to produce: grouping column, metrics and ordering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupView {
    pub group_key: String,
    pub metrics: Vec<String>,
    pub order: RowOrder,
    pub limit: Option<usize>,
}

impl GroupView {
    pub fn natural(group_key: impl Into<String>, metrics: &[String]) -> Self {
        GroupView {
            group_key: group_key.into(),
            metrics: metrics.to_vec(),
            order: RowOrder::Natural,
            limit: None,
        }
    }

    /// Rows ordered by `metric` change, descending, keeping the first `limit`.
    pub fn top_movers(
        group_key: impl Into<String>,
        metrics: &[String],
        metric: impl Into<String>,
        limit: usize,
    ) -> Self {
        GroupView {
            group_key: group_key.into(),
            metrics: metrics.to_vec(),
            order: RowOrder::ChangeDescending(metric.into()),
            limit: Some(limit),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthComparison {
    pub months: [String; 2],
    pub row_counts: [usize; 2],
    pub tables: Vec<Comparison>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", tag = "status")]
pub enum ComparisonOutcome {
    Compared(MonthComparison),
    NoData(NoDataReport),
}

// ============================================================================
// COMPARISON ENGINE
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct ComparisonEngine {
    filters: FilterEngine,
    months: MonthColumns,
}

impl ComparisonEngine {
    pub fn new(filters: FilterEngine, months: MonthColumns) -> Self {
        ComparisonEngine { filters, months }
    }

    pub fn filters(&self) -> &FilterEngine {
        &self.filters
    }

    pub fn month_columns(&self) -> &MonthColumns {
        &self.months
    }

    /// Filters both months with `spec` and produces one comparison per view.
    pub fn compare_months(
        &self,
        table: &Table,
        months: [&str; 2],
        spec: &FilterSpec,
        views: &[GroupView],
    ) -> ComparisonOutcome {
        let resolved = self.filters.resolve(table, spec);
        let base = [
            month_rows(table, months[0], &self.months),
            month_rows(table, months[1], &self.months),
        ];
        let rows = [
            self.filters.apply(&base[0], &resolved, Some(0)),
            self.filters.apply(&base[1], &resolved, Some(1)),
        ];

        log_info!(
            "COMPARE",
            "{} vs {}: {} / {} rows before filters, {} / {} after",
            months[0],
            months[1],
            base[0].len(),
            base[1].len(),
            rows[0].len(),
            rows[1].len()
        );

        if rows[0].is_empty() && rows[1].is_empty() {
            let day_column = self.filters.columns().day.clone();
            let first_month = &base[0];
            return ComparisonOutcome::NoData(NoDataReport::build(
                months,
                resolved.active_filters(),
                || {
                    let days: BTreeSet<u32> = first_month
                        .table()
                        .column_index(&day_column)
                        .map(|idx| {
                            first_month
                                .rows()
                                .filter_map(|r| r.get(idx).as_whole_number())
                                .filter(|d| (1..=31).contains(d))
                                .map(|d| d as u32)
                                .collect()
                        })
                        .unwrap_or_default();
                    days.into_iter().collect()
                },
            ));
        }

        let tables = views
            .iter()
            .map(|view| {
                compare(
                    &rows[0],
                    &rows[1],
                    &view.group_key,
                    &view.metrics,
                    months[0],
                    months[1],
                )
                .ordered(&view.order, view.limit)
            })
            .collect();

        ComparisonOutcome::Compared(MonthComparison {
            months: [months[0].to_string(), months[1].to_string()],
            row_counts: [rows[0].len(), rows[1].len()],
            tables,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::Dimension;
    use crate::report::Suggestion;

    fn dataset() -> Table {
        let mut t = Table::new(vec![
            "Month".into(),
            "Year".into(),
            "Day".into(),
            "Category".into(),
            "Revenue".into(),
        ]);
        let rows: [(&str, f64, f64, &str, f64); 4] = [
            ("May", 2025.0, 1.0, "Shoes", 100.0),
            ("May", 2025.0, 20.0, "Shoes", 40.0),
            ("June", 2025.0, 3.0, "Shoes", 150.0),
            ("June", 2025.0, 4.0, "Bags", 200.0),
        ];
        for (m, y, d, c, r) in rows {
            t.push_row(vec![m.into(), y.into(), d.into(), c.into(), r.into()]);
        }
        t
    }

    fn views() -> Vec<GroupView> {
        vec![GroupView::natural("Category", &["Revenue".to_string()])]
    }

    #[test]
    fn month_rows_match_label() {
        let t = dataset();
        assert_eq!(month_rows(&t, "May 2025", &MonthColumns::default()).len(), 2);
        assert_eq!(month_rows(&t, "July 2025", &MonthColumns::default()).len(), 0);
    }

    #[test]
    fn same_month_with_period_days_splits_the_month() {
        let t = dataset();
        let spec = FilterSpec::new()
            .with_period_days(0, ["1"])
            .with_period_days(1, ["20"]);
        let outcome = ComparisonEngine::default().compare_months(
            &t,
            ["May 2025", "May 2025"],
            &spec,
            &views(),
        );
        let ComparisonOutcome::Compared(result) = outcome else {
            panic!("expected a comparison");
        };
        let shoes = result.tables[0].row("Shoes").unwrap();
        assert_eq!(shoes.values[0].period1, 100.0);
        assert_eq!(shoes.values[0].period2, 40.0);
        assert_eq!(shoes.values[0].change, -60.0);
        assert_eq!(result.tables[0].column_ids[0], "Period1");
    }

    #[test]
    fn both_periods_empty_is_no_data() {
        let t = dataset();
        let spec = FilterSpec::new().with_period_days(0, ["30"]).with_period_days(1, ["31"]);
        let outcome = ComparisonEngine::default().compare_months(
            &t,
            ["May 2025", "May 2025"],
            &spec,
            &views(),
        );
        match outcome {
            ComparisonOutcome::NoData(report) => assert_eq!(
                report.suggestion,
                Suggestion::SelectExistingDays {
                    month: "May 2025".into(),
                    available: vec![1, 20]
                }
            ),
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[test]
    fn one_empty_period_still_compares_with_zeros() {
        let t = dataset();
        let spec = FilterSpec::new().with_raw(Dimension::Category, ["Bags"]);
        let outcome = ComparisonEngine::default().compare_months(
            &t,
            ["May 2025", "June 2025"],
            &spec,
            &views(),
        );
        let ComparisonOutcome::Compared(result) = outcome else {
            panic!("expected a comparison");
        };
        assert_eq!(result.row_counts, [0, 1]);
        let bags = result.tables[0].row("Bags").unwrap();
        assert_eq!(bags.values[0].period1, 0.0);
        assert_eq!(bags.values[0].period2, 200.0);
        assert_eq!(bags.values[0].change, 0.0);
    }
}
