//! FILENAME: core/comparison-engine/src/aggregate.rs
//! Comparison Aggregator - Groups filtered rows and outer-joins periods.
//!
//! Algorithm:
//! 1. Drop rows whose group key is missing (or the literal missing sentinel)
//! 2. Sum every metric per group key (missing metric values count as zero)
//! 3. Outer-join the periods on the key, filling absent groups with exactly 0
//! 4. Compute the percentage change per metric under the zero-baseline policy
//!
//! Join order: keys of the first period in sorted order, then keys seen only
//! in later periods, each batch sorted.

use dataset::{is_missing_sentinel, log_debug, log_warn, CellValue, RowSet};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;
use smallvec::SmallVec;
use std::cmp::Ordering;

/// Per-group metric sums, one slot per requested metric.
pub type MetricSums = SmallVec<[f64; 8]>;

/// Percentage change from `a` to `b`.
///
/// Returns 0 when either side is NaN or the baseline `a` is zero; a group that
/// is new in the second period therefore reports 0%, never infinity.
pub fn pct_change(a: f64, b: f64) -> f64 {
    if a.is_nan() || b.is_nan() || a == 0.0 {
        return 0.0;
    }
    (b - a) / a * 100.0
}

// ============================================================================
// GROUPING
// ============================================================================

/// Result of summing metrics per group key for one period.
#[derive(Debug, Clone, Default)]
pub struct GroupedSums {
    metrics: Vec<String>,
    keys: Vec<String>,
    sums: FxHashMap<String, MetricSums>,
}

impl GroupedSums {
    pub fn metrics(&self) -> &[String] {
        &self.metrics
    }

    /// Group keys in sorted order.
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn get(&self, key: &str) -> Option<&[f64]> {
        self.sums.get(key).map(|s| s.as_slice())
    }

    /// Sum of `metric` for `key`; 0 when either is unknown.
    pub fn value(&self, key: &str, metric: usize) -> f64 {
        self.get(key)
            .and_then(|s| s.get(metric).copied())
            .unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Groups ordered by `metric` descending; ties keep key order.
    pub fn ranked(&self, metric: usize) -> Vec<(&str, &[f64])> {
        let mut out: Vec<(&str, &[f64])> = self
            .keys
            .iter()
            .filter_map(|k| self.sums.get(k).map(|s| (k.as_str(), s.as_slice())))
            .collect();
        out.sort_by(|a, b| descending(a.1.get(metric), b.1.get(metric)));
        out
    }
}

fn descending(a: Option<&f64>, b: Option<&f64>) -> Ordering {
    let a = a.copied().unwrap_or(0.0);
    let b = b.copied().unwrap_or(0.0);
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}

fn is_group_key(value: &CellValue) -> bool {
    match value {
        CellValue::Text(s) => !is_missing_sentinel(s),
        other => !other.is_missing(),
    }
}

/// Sums `metrics` over `rows` grouped by the string form of `group_key`.
/// A metric column absent from the table contributes zero.
pub fn group_sum(rows: &RowSet, group_key: &str, metrics: &[String]) -> GroupedSums {
    let table = rows.table();
    let mut grouped = GroupedSums {
        metrics: metrics.to_vec(),
        ..GroupedSums::default()
    };

    let Some(key_idx) = table.column_index(group_key) else {
        if !rows.is_empty() {
            log_warn!("COMPARE", "no '{}' column to group by", group_key);
        }
        return grouped;
    };

    let metric_idx: Vec<Option<usize>> = metrics.iter().map(|m| table.column_index(m)).collect();
    for (metric, idx) in metrics.iter().zip(&metric_idx) {
        if idx.is_none() && !rows.is_empty() {
            log_warn!("COMPARE", "metric column '{}' not found, summed as 0", metric);
        }
    }

    let mut dropped = 0usize;
    for row in rows.rows() {
        let key = row.get(key_idx);
        if !is_group_key(key) {
            dropped += 1;
            continue;
        }
        let sums = grouped
            .sums
            .entry(key.display_value())
            .or_insert_with(|| SmallVec::from_elem(0.0, metrics.len()));
        for (slot, idx) in sums.iter_mut().zip(&metric_idx) {
            if let Some(idx) = idx {
                *slot += row.get(*idx).sum_contribution();
            }
        }
    }

    let mut keys: Vec<String> = grouped.sums.keys().cloned().collect();
    keys.sort();
    grouped.keys = keys;

    log_debug!(
        "COMPARE",
        "grouped {} rows by '{}' into {} groups ({} without key)",
        rows.len(),
        group_key,
        grouped.keys.len(),
        dropped
    );
    grouped
}

/// Outer-join key order across several grouped periods.
fn join_keys<'g>(groups: impl IntoIterator<Item = &'g GroupedSums>) -> Vec<String> {
    let mut seen: FxHashSet<&str> = FxHashSet::default();
    let mut order = Vec::new();
    for grouped in groups {
        // `keys` is already sorted, so each batch of new keys stays sorted.
        for key in &grouped.keys {
            if seen.insert(key.as_str()) {
                order.push(key.clone());
            }
        }
    }
    order
}

// ============================================================================
// TWO-PERIOD COMPARISON
// ============================================================================

/// One metric of one comparison row.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricComparison {
    pub metric: String,
    pub period1: f64,
    pub period2: f64,
    pub change: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonRow {
    pub key: String,
    pub values: Vec<MetricComparison>,
}

impl ComparisonRow {
    pub fn metric(&self, name: &str) -> Option<&MetricComparison> {
        self.values.iter().find(|m| m.metric == name)
    }
}

/// How comparison rows are ordered.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RowOrder {
    /// Outer-join key order.
    #[default]
    Natural,
    /// "Top movers": change of the named metric, descending.
    ChangeDescending(String),
}

/// Side-by-side comparison of two periods.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Comparison {
    pub group_key: String,
    pub metrics: Vec<String>,
    /// Display labels of the two periods.
    pub labels: [String; 2],
    /// Column-id prefixes of the two periods; distinct even for a same-month comparison.
    pub column_ids: [String; 2],
    pub rows: Vec<ComparisonRow>,
}

impl Comparison {
    /// Flat column names: the group key, then per metric
    /// `<id1>_<metric>`, `<id2>_<metric>`, `Change_<metric>`.
    pub fn column_names(&self) -> Vec<String> {
        let mut names = Vec::with_capacity(1 + self.metrics.len() * 3);
        names.push(self.group_key.clone());
        for metric in &self.metrics {
            names.push(format!("{}_{}", self.column_ids[0], metric));
            names.push(format!("{}_{}", self.column_ids[1], metric));
            names.push(format!("Change_{}", metric));
        }
        names
    }

    pub fn row(&self, key: &str) -> Option<&ComparisonRow> {
        self.rows.iter().find(|r| r.key == key)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Reorders rows and keeps at most `limit` of them. Sorting is stable.
    pub fn ordered(mut self, order: &RowOrder, limit: Option<usize>) -> Self {
        if let RowOrder::ChangeDescending(metric) = order {
            match self.metrics.iter().position(|m| m == metric) {
                Some(idx) => self.rows.sort_by(|a, b| {
                    descending(
                        a.values.get(idx).map(|m| &m.change),
                        b.values.get(idx).map(|m| &m.change),
                    )
                }),
                None => log_warn!("COMPARE", "cannot order by unknown metric '{}'", metric),
            }
        }
        if let Some(limit) = limit {
            self.rows.truncate(limit);
        }
        self
    }
}

/// Labels and column ids for two periods. Identical labels (a month compared
/// with itself) become "Period 1"/"Period 2" with ids "Period1"/"Period2".
pub fn period_labels(label_a: &str, label_b: &str) -> ([String; 2], [String; 2]) {
    if label_a == label_b {
        (
            ["Period 1".to_string(), "Period 2".to_string()],
            ["Period1".to_string(), "Period2".to_string()],
        )
    } else {
        (
            [label_a.to_string(), label_b.to_string()],
            [label_a.to_string(), label_b.to_string()],
        )
    }
}

/// Groups both periods by `group_key`, outer-joins them and computes changes.
pub fn compare(
    rows_a: &RowSet,
    rows_b: &RowSet,
    group_key: &str,
    metrics: &[String],
    label_a: &str,
    label_b: &str,
) -> Comparison {
    let grouped_a = group_sum(rows_a, group_key, metrics);
    let grouped_b = group_sum(rows_b, group_key, metrics);

    let rows: Vec<ComparisonRow> = join_keys([&grouped_a, &grouped_b])
        .into_iter()
        .map(|key| {
            let values = metrics
                .iter()
                .enumerate()
                .map(|(i, metric)| {
                    let period1 = grouped_a.value(&key, i);
                    let period2 = grouped_b.value(&key, i);
                    MetricComparison {
                        metric: metric.clone(),
                        period1,
                        period2,
                        change: pct_change(period1, period2),
                    }
                })
                .collect();
            ComparisonRow { key, values }
        })
        .collect();

    let (labels, column_ids) = period_labels(label_a, label_b);
    log_debug!(
        "COMPARE",
        "'{}' comparison {} vs {}: {} rows",
        group_key,
        labels[0],
        labels[1],
        rows.len()
    );

    Comparison {
        group_key: group_key.to_string(),
        metrics: metrics.to_vec(),
        labels,
        column_ids,
        rows,
    }
}

// ============================================================================
// N-PERIOD COMPARISON
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiPeriodRow {
    pub key: String,
    /// `values[period][metric]`, zero-filled.
    pub values: Vec<MetricSums>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiPeriodComparison {
    pub group_key: String,
    pub metrics: Vec<String>,
    pub labels: Vec<String>,
    pub rows: Vec<MultiPeriodRow>,
}

impl MultiPeriodComparison {
    pub fn row(&self, key: &str) -> Option<&MultiPeriodRow> {
        self.rows.iter().find(|r| r.key == key)
    }
}

/// Outer-joins any number of labelled periods on `group_key`.
pub fn compare_many(
    periods: &[(String, RowSet)],
    group_key: &str,
    metrics: &[String],
) -> MultiPeriodComparison {
    let grouped: Vec<GroupedSums> = periods
        .iter()
        .map(|(_, rows)| group_sum(rows, group_key, metrics))
        .collect();

    let rows = join_keys(&grouped)
        .into_iter()
        .map(|key| {
            let values = grouped
                .iter()
                .map(|g| (0..metrics.len()).map(|i| g.value(&key, i)).collect::<MetricSums>())
                .collect();
            MultiPeriodRow { key, values }
        })
        .collect();

    MultiPeriodComparison {
        group_key: group_key.to_string(),
        metrics: metrics.to_vec(),
        labels: periods.iter().map(|(label, _)| label.clone()).collect(),
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dataset::Table;

    fn metrics() -> Vec<String> {
        vec!["Revenue".to_string()]
    }

    fn period(rows: &[(&str, f64)]) -> Table {
        let mut t = Table::new(vec!["Category".into(), "Revenue".into()]);
        for (cat, rev) in rows {
            t.push_row(vec![CellValue::text(*cat), CellValue::Number(*rev)]);
        }
        t
    }

    #[test]
    fn zero_baseline_and_nan_give_zero_change() {
        assert_eq!(pct_change(0.0, 200.0), 0.0);
        assert_eq!(pct_change(f64::NAN, 5.0), 0.0);
        assert_eq!(pct_change(5.0, f64::NAN), 0.0);
        assert_eq!(pct_change(100.0, 150.0), 50.0);
        assert_eq!(pct_change(200.0, 50.0), -75.0);
    }

    #[test]
    fn missing_keys_are_dropped_and_metrics_summed() {
        let mut t = period(&[("Shoes", 60.0), ("Shoes", 40.0), ("nan", 5.0)]);
        t.push_row(vec![CellValue::Empty, CellValue::Number(7.0)]);
        t.push_row(vec![CellValue::text("Bags"), CellValue::Empty]);
        let grouped = group_sum(&t.all(), "Category", &metrics());
        assert_eq!(grouped.keys(), &["Bags", "Shoes"]);
        assert_eq!(grouped.value("Shoes", 0), 100.0);
        assert_eq!(grouped.value("Bags", 0), 0.0);
    }

    #[test]
    fn outer_join_orders_a_keys_then_b_only_keys() {
        let a = period(&[("Shoes", 1.0), ("Hats", 1.0)]);
        let b = period(&[("Bags", 1.0), ("Shoes", 1.0), ("Belts", 1.0)]);
        let cmp = compare(&a.all(), &b.all(), "Category", &metrics(), "May 2025", "June 2025");
        let keys: Vec<&str> = cmp.rows.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec!["Hats", "Shoes", "Bags", "Belts"]);
    }

    #[test]
    fn same_label_periods_are_disambiguated() {
        let a = period(&[("Shoes", 1.0)]);
        let cmp = compare(&a.all(), &a.all(), "Category", &metrics(), "May 2025", "May 2025");
        assert_eq!(cmp.labels, ["Period 1".to_string(), "Period 2".to_string()]);
        assert_eq!(
            cmp.column_names(),
            vec!["Category", "Period1_Revenue", "Period2_Revenue", "Change_Revenue"]
        );
    }

    #[test]
    fn change_descending_with_limit() {
        let a = period(&[("A", 100.0), ("B", 100.0), ("C", 100.0)]);
        let b = period(&[("A", 110.0), ("B", 300.0), ("C", 50.0)]);
        let cmp = compare(&a.all(), &b.all(), "Category", &metrics(), "x", "y")
            .ordered(&RowOrder::ChangeDescending("Revenue".into()), Some(2));
        let keys: Vec<&str> = cmp.rows.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec!["B", "A"]);
    }

    #[test]
    fn ranked_orders_by_metric_descending() {
        let t = period(&[("A", 5.0), ("B", 50.0), ("C", 20.0)]);
        let grouped = group_sum(&t.all(), "Category", &metrics());
        let ranked: Vec<&str> = grouped.ranked(0).into_iter().map(|(k, _)| k).collect();
        assert_eq!(ranked, vec!["B", "C", "A"]);
    }

    #[test]
    fn compare_many_zero_fills_every_period() {
        let p1 = period(&[("Shoes", 10.0)]);
        let p2 = period(&[("Bags", 20.0)]);
        let p3 = period(&[("Shoes", 30.0), ("Hats", 5.0)]);
        let multi = compare_many(
            &[
                ("p1".to_string(), p1.all()),
                ("p2".to_string(), p2.all()),
                ("p3".to_string(), p3.all()),
            ],
            "Category",
            &metrics(),
        );
        let keys: Vec<&str> = multi.rows.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec!["Shoes", "Bags", "Hats"]);
        let bags = multi.row("Bags").unwrap();
        assert_eq!(bags.values[0].as_slice(), &[0.0]);
        assert_eq!(bags.values[1].as_slice(), &[20.0]);
        assert_eq!(bags.values[2].as_slice(), &[0.0]);
    }
}
