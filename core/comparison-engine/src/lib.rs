//! FILENAME: core/comparison-engine/src/lib.rs
//! Period comparison subsystem.
//!
//! Filters the unified sales table by user selections, groups the surviving
//! rows per period and joins the periods side by side. It depends on
//! `dataset` only for the table model and logging macros.
//!
//! Layers:
//! - `definition`: Serializable filter selections (what the user picked)
//! - `filter`: Selection resolution and row filtering
//! - `aggregate`: Grouping, outer joins and percentage change
//! - `summary`: Headline metrics and leaderboards for the product dashboard
//! - `report`: "No data" results and change formatting
//! - `engine`: Month-against-month comparison
//! - `options`: Cross-filtered option lists

pub mod definition;
pub mod filter;
pub mod aggregate;
pub mod summary;
pub mod report;
pub mod engine;
pub mod options;

pub use definition::*;
pub use filter::{ActiveFilter, FilterEngine, ResolvedFilter, ResolvedFilters};
pub use aggregate::{
    compare, compare_many, group_sum, pct_change, period_labels, Comparison, ComparisonRow,
    GroupedSums, MetricComparison, MetricSums, MultiPeriodComparison, MultiPeriodRow, RowOrder,
};
pub use summary::{
    baseline_change, compare_summaries, product_totals, summarize, top_performers, MetricChanges,
    PeriodFigures, PeriodSummary, ProductTotal, SummaryColumns, SummaryComparison, TopPerformer,
};
pub use report::{
    format_optional_percentage, format_percentage, ChangeDirection, NoDataReport, Suggestion,
};
pub use engine::{
    month_rows, ComparisonEngine, ComparisonOutcome, GroupView, MonthColumns, MonthComparison,
};
pub use options::{all_options, available_months, options_for, FilterOption, WeekContext};
