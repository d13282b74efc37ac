//! FILENAME: app/src/api_types.rs
// PURPOSE: Request and response types exchanged with the presentation layer.
// CONTEXT: All structs use camelCase serialization.

use comparison_engine::{
    Dimension, FilterSpec, ProductTotal, SummaryComparison, TopPerformer,
};
use persistence::PeriodRole;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Which dashboard a request is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DashboardKind {
    /// Month-against-month comparison over the combined dataset.
    Monthly,
    /// Last month / last year / latest over the period invoice files.
    Product,
}

/// Raw filter control values. `"SELECT_ALL"` and empty lists behave as in
/// `Selection::from_raw`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterSelections {
    pub filters: BTreeMap<Dimension, Vec<String>>,
    pub period1_days: Vec<String>,
    pub period2_days: Vec<String>,
}

impl FilterSelections {
    pub fn to_spec(&self) -> FilterSpec {
        let spec = self
            .filters
            .iter()
            .fold(FilterSpec::new(), |spec, (dimension, values)| spec.with_raw(*dimension, values));
        spec.with_period_days(0, &self.period1_days)
            .with_period_days(1, &self.period2_days)
    }
}

/// A loaded period of the product dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodInfo {
    pub role: PeriodRole,
    /// `"May 25"`
    pub name: String,
    pub source: String,
    pub row_count: usize,
}

/// Result of `load_dashboard`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub row_count: usize,
    pub columns: Vec<String>,
    pub months: Vec<String>,
    /// Set when no dataset could be loaded from the source folder.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub empty_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_month: Option<String>,
    pub periods: Vec<PeriodInfo>,
    pub first_weekday: u8,
    pub first_weekday_name: String,
}

/// One period's product table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodProducts {
    pub name: String,
    pub products: Vec<ProductTotal>,
}

/// Result of `get_product_performance`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPerformance {
    pub summary: SummaryComparison,
    /// Period names of the leaderboard baselines, in `TopPerformer::baselines` order.
    pub baseline_names: Vec<String>,
    pub top_products: Vec<TopPerformer>,
    pub top_brands: Vec<TopPerformer>,
    pub period_products: Vec<PeriodProducts>,
}
