//! FILENAME: app/src/config.rs
// PURPOSE: Dashboard configuration: source folders, column mappings and defaults.
// CONTEXT: Loaded once from JSON and passed into every component explicitly.
// Every field has a default, so a config file only lists what it overrides.

use comparison_engine::{DimensionColumns, MonthColumns, SummaryColumns};
use persistence::{AssemblerConfig, PeriodPreparation, DEFAULT_EXCLUDED_CATEGORIES};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DashboardConfig {
    /// Folder of workbooks / CSV files for the month comparison dashboard.
    pub source_folder: PathBuf,
    /// Root of the cache store (`individual_files/` plus the combined entry).
    pub cache_folder: PathBuf,
    /// Folder holding one `<Month>-<Year>` subfolder per period.
    pub period_base_folder: PathBuf,
    pub period_keyword: String,
    pub period_extension: String,
    /// Anchor month of the product dashboard, e.g. `"June-2025"`.
    pub latest_month: Option<String>,

    pub category_column: String,
    pub excluded_categories: Vec<String>,
    pub date_column: String,
    pub day_first: bool,

    pub metrics: Vec<String>,
    /// Metric whose change ranks the item table.
    pub ranking_metric: String,
    pub item_limit: usize,

    pub dimension_columns: DimensionColumns,
    pub month_columns: MonthColumns,
    pub product_columns: DimensionColumns,
    pub summary_columns: SummaryColumns,
    pub period_preparation: PeriodPreparation,

    /// Monday = 0 .. Sunday = 6. Replaced by the anchor month's weekday once
    /// periods are loaded.
    pub first_weekday: u8,
    pub top_n: usize,

    pub log_file: Option<PathBuf>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        DashboardConfig {
            source_folder: PathBuf::from("data"),
            cache_folder: PathBuf::from("cache"),
            period_base_folder: PathBuf::from("periods"),
            period_keyword: "invoice".to_string(),
            period_extension: "xlsx".to_string(),
            latest_month: None,
            category_column: "Category".to_string(),
            excluded_categories: DEFAULT_EXCLUDED_CATEGORIES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            date_column: "Date".to_string(),
            day_first: false,
            metrics: [
                "Items viewed",
                "Items added to cart",
                "Items purchased",
                "Item revenue",
                "Sessions",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            ranking_metric: "Item revenue".to_string(),
            item_limit: 50,
            dimension_columns: DimensionColumns::default(),
            month_columns: MonthColumns::default(),
            product_columns: DimensionColumns {
                day: "InvoiceDay".to_string(),
                category: "Category Name (L3)".to_string(),
                item: "ItemName".to_string(),
                ..DimensionColumns::default()
            },
            summary_columns: SummaryColumns::default(),
            period_preparation: PeriodPreparation::default(),
            first_weekday: 0,
            top_n: 10,
            log_file: None,
        }
    }
}

impl DashboardConfig {
    /// Reads a JSON config file. Missing fields take their defaults.
    pub fn load(path: &Path) -> Result<Self, String> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config {}: {}", path.display(), e))?;
        let config: DashboardConfig = serde_json::from_str(&text)
            .map_err(|e| format!("Invalid config {}: {}", path.display(), e))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.first_weekday > 6 {
            return Err(format!(
                "firstWeekday must be 0 (Monday) .. 6 (Sunday), got {}",
                self.first_weekday
            ));
        }
        if self.metrics.is_empty() {
            return Err("metrics must list at least one column".to_string());
        }
        if self.period_keyword.trim().is_empty() {
            return Err("periodKeyword must not be empty".to_string());
        }
        Ok(())
    }

    pub fn assembler_config(&self) -> AssemblerConfig {
        AssemblerConfig {
            category_column: self.category_column.clone(),
            excluded_categories: self.excluded_categories.clone(),
            date_column: self.date_column.clone(),
            day_column: self.dimension_columns.day.clone(),
            month_column: self.month_columns.month.clone(),
            year_column: self.month_columns.year.clone(),
            day_first: self.day_first,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config: DashboardConfig =
            serde_json::from_str(r#"{"sourceFolder": "/srv/sales", "topN": 5}"#).unwrap();
        assert_eq!(config.source_folder, PathBuf::from("/srv/sales"));
        assert_eq!(config.top_n, 5);
        assert_eq!(config.period_keyword, "invoice");
        assert_eq!(config.excluded_categories.len(), 8);
        assert_eq!(config.product_columns.day, "InvoiceDay");
        assert_eq!(config.product_columns.brand, "Brand");
    }

    #[test]
    fn invalid_weekday_is_rejected() {
        let config = DashboardConfig {
            first_weekday: 7,
            ..DashboardConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dashboard.json");
        std::fs::write(&path, r#"{"metrics": ["Sessions"], "firstWeekday": 6}"#).unwrap();
        let config = DashboardConfig::load(&path).unwrap();
        assert_eq!(config.metrics, vec!["Sessions".to_string()]);
        assert_eq!(config.first_weekday, 6);

        assert!(DashboardConfig::load(&dir.path().join("missing.json")).is_err());
    }
}
