//! FILENAME: core/comparison-engine/src/summary.rs
//! PURPOSE: Headline metrics, month-over-month / year-over-year changes and
//! leaderboards for the multi-period product dashboard.
//! CONTEXT: Period order everywhere is last month, last year, latest. A change
//! against a baseline that is zero or negative is not meaningful: revenue and
//! quantity report 0 in that case, distinct products and average order value
//! report `None`, and leaderboard entries report `None` ("new").

use crate::aggregate::group_sum;
use dataset::{log_debug, RowSet};
use serde::{Deserialize, Serialize};

/// Source columns for the product dashboard metrics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SummaryColumns {
    pub revenue: String,
    pub quantity: String,
    pub product: String,
    pub brand: String,
}

impl Default for SummaryColumns {
    fn default() -> Self {
        SummaryColumns {
            revenue: "Amount Invoiced W.O. VAT".to_string(),
            quantity: "QtyOrdered".to_string(),
            product: "ProductDesc".to_string(),
            brand: "Brand".to_string(),
        }
    }
}

impl SummaryColumns {
    fn metrics(&self) -> Vec<String> {
        vec![self.revenue.clone(), self.quantity.clone()]
    }
}

// ============================================================================
// PERIOD SUMMARY
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodSummary {
    pub label: String,
    pub total_revenue: f64,
    pub total_quantity: f64,
    pub unique_products: usize,
    pub avg_order_value: f64,
}

pub fn summarize(label: &str, rows: &RowSet, columns: &SummaryColumns) -> PeriodSummary {
    let table = rows.table();
    let total = |column: &str| -> f64 {
        table
            .column_index(column)
            .map(|idx| rows.rows().map(|r| r.get(idx).sum_contribution()).sum())
            .unwrap_or(0.0)
    };

    let total_revenue = total(&columns.revenue);
    let total_quantity = total(&columns.quantity);
    let unique_products = rows.distinct_values(&columns.product).len();
    let avg_order_value = if total_quantity > 0.0 {
        total_revenue / total_quantity
    } else {
        0.0
    };

    log_debug!(
        "COMPARE",
        "{}: revenue {:.2}, quantity {}, {} products",
        label,
        total_revenue,
        total_quantity,
        unique_products
    );

    PeriodSummary {
        label: label.to_string(),
        total_revenue,
        total_quantity,
        unique_products,
        avg_order_value,
    }
}

/// Change from `base` to `current` in percent; `None` unless `base > 0`.
pub fn baseline_change(base: f64, current: f64) -> Option<f64> {
    if base > 0.0 {
        Some((current - base) / base * 100.0)
    } else {
        None
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricChanges {
    pub revenue: f64,
    pub quantity: f64,
    pub unique_products: Option<f64>,
    pub avg_order_value: Option<f64>,
}

impl MetricChanges {
    fn between(base: &PeriodSummary, current: &PeriodSummary) -> Self {
        MetricChanges {
            revenue: baseline_change(base.total_revenue, current.total_revenue).unwrap_or(0.0),
            quantity: baseline_change(base.total_quantity, current.total_quantity).unwrap_or(0.0),
            unique_products: baseline_change(
                base.unique_products as f64,
                current.unique_products as f64,
            ),
            avg_order_value: baseline_change(base.avg_order_value, current.avg_order_value),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryComparison {
    pub last_month: PeriodSummary,
    pub last_year: PeriodSummary,
    pub current: PeriodSummary,
    pub month_over_month: MetricChanges,
    pub year_over_year: MetricChanges,
}

pub fn compare_summaries(
    last_month: PeriodSummary,
    last_year: PeriodSummary,
    current: PeriodSummary,
) -> SummaryComparison {
    let month_over_month = MetricChanges::between(&last_month, &current);
    let year_over_year = MetricChanges::between(&last_year, &current);
    SummaryComparison {
        last_month,
        last_year,
        current,
        month_over_month,
        year_over_year,
    }
}

// ============================================================================
// LEADERBOARDS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodFigures {
    pub revenue: f64,
    pub quantity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopPerformer {
    /// 1-based.
    pub rank: usize,
    pub key: String,
    pub latest: PeriodFigures,
    /// Figures in each baseline period, in the order the baselines were given.
    pub baselines: Vec<PeriodFigures>,
    /// Revenue change against each baseline; `None` marks a new entry.
    pub changes: Vec<Option<f64>>,
}

/// Top `n` groups of the latest period by revenue, with their figures in each
/// baseline period (0 when absent there).
pub fn top_performers(
    latest: &RowSet,
    baselines: &[RowSet],
    group_key: &str,
    columns: &SummaryColumns,
    n: usize,
) -> Vec<TopPerformer> {
    let metrics = columns.metrics();
    let latest_groups = group_sum(latest, group_key, &metrics);
    let baseline_groups: Vec<_> = baselines
        .iter()
        .map(|rows| group_sum(rows, group_key, &metrics))
        .collect();

    latest_groups
        .ranked(0)
        .into_iter()
        .take(n)
        .enumerate()
        .map(|(i, (key, sums))| {
            let latest = PeriodFigures {
                revenue: sums.first().copied().unwrap_or(0.0),
                quantity: sums.get(1).copied().unwrap_or(0.0),
            };
            let baselines: Vec<PeriodFigures> = baseline_groups
                .iter()
                .map(|g| PeriodFigures {
                    revenue: g.value(key, 0),
                    quantity: g.value(key, 1),
                })
                .collect();
            let changes = baselines
                .iter()
                .map(|b| baseline_change(b.revenue, latest.revenue))
                .collect();
            TopPerformer {
                rank: i + 1,
                key: key.to_string(),
                latest,
                baselines,
                changes,
            }
        })
        .collect()
}

/// One row of a per-period product table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductTotal {
    pub key: String,
    pub revenue: f64,
    pub quantity: f64,
}

/// Revenue and quantity per group, highest revenue first. Revenue is rounded
/// to 2 decimals, quantity to a whole number.
pub fn product_totals(
    rows: &RowSet,
    group_key: &str,
    columns: &SummaryColumns,
) -> Vec<ProductTotal> {
    let grouped = group_sum(rows, group_key, &columns.metrics());
    grouped
        .ranked(0)
        .into_iter()
        .map(|(key, sums)| ProductTotal {
            key: key.to_string(),
            revenue: (sums.first().copied().unwrap_or(0.0) * 100.0).round() / 100.0,
            quantity: sums.get(1).copied().unwrap_or(0.0).round(),
        })
        .collect()
}
