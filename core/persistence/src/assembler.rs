//! FILENAME: core/persistence/src/assembler.rs
//! PURPOSE: Combines per-file tables into the single working dataset.
//! CONTEXT: Sources do not share one schema. The combined schema is the union
//! of all columns in encounter order; a row from a file lacking a column gets
//! `Empty` there, never zero or an empty string.

use crate::cache::TableCache;
use chrono::Datelike;
use dataset::calendar::MonthYear;
use dataset::{log_info, log_warn, parse_date, CellValue, Row, Table};
use std::collections::{HashMap, HashSet};

/// Category codes dropped from the combined dataset by default.
pub const DEFAULT_EXCLUDED_CATEGORIES: &[&str] =
    &["JSP", "Remove", "FOC-R", "EMI", "(blank)", "PRO", "WRT", "Others"];

/// Column names and rules used while assembling.
#[derive(Debug, Clone)]
pub struct AssemblerConfig {
    pub category_column: String,
    pub excluded_categories: Vec<String>,
    pub date_column: String,
    pub day_column: String,
    pub month_column: String,
    pub year_column: String,
    /// Read ambiguous dates such as `03/04/2025` as day-first.
    pub day_first: bool,
}

impl Default for AssemblerConfig {
    fn default() -> Self {
        AssemblerConfig {
            category_column: "Category".to_string(),
            excluded_categories: DEFAULT_EXCLUDED_CATEGORIES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            date_column: "Date".to_string(),
            day_column: "Day".to_string(),
            month_column: "Month".to_string(),
            year_column: "Year".to_string(),
            day_first: false,
        }
    }
}

/// Concatenates tables in order under the union of their schemas.
pub fn concat(tables: &[Table]) -> Table {
    let mut columns: Vec<String> = Vec::new();
    let mut positions: HashMap<&str, usize> = HashMap::new();
    for table in tables {
        for column in table.columns() {
            if !positions.contains_key(column.as_str()) {
                positions.insert(column.as_str(), columns.len());
                columns.push(column.clone());
            }
        }
    }

    let mut combined = Table::new(columns.clone());
    for table in tables {
        let mapping: Vec<usize> = table
            .columns()
            .iter()
            .map(|c| positions[c.as_str()])
            .collect();
        for row in table.rows() {
            let mut values = vec![CellValue::Empty; columns.len()];
            for (src, &dst) in mapping.iter().enumerate() {
                values[dst] = row.get(src).clone();
            }
            combined.push_row(values);
        }
    }
    combined
}

// ============================================================================
// DATASET ASSEMBLER
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct DatasetAssembler {
    config: AssemblerConfig,
}

impl DatasetAssembler {
    pub fn new(config: AssemblerConfig) -> Self {
        DatasetAssembler { config }
    }

    pub fn config(&self) -> &AssemblerConfig {
        &self.config
    }

    /// Concatenates, drops excluded categories and derives calendar columns.
    pub fn assemble(&self, tables: &[Table]) -> Table {
        let combined = concat(tables);
        log_info!(
            "ASSEMBLE",
            "combined {} tables: {} rows, {} columns",
            tables.len(),
            combined.row_count(),
            combined.columns().len()
        );
        let filtered = self.exclude_categories(combined);
        self.derive_calendar_columns(filtered)
    }

    /// Assembles and persists the result as the combined cache entry.
    /// A failed write is logged; the assembled table is returned regardless.
    pub fn assemble_and_store(&self, tables: &[Table], cache: &TableCache) -> Table {
        let table = self.assemble(tables);
        if let Err(e) = cache.store_combined(&table) {
            log_warn!("ASSEMBLE", "failed to persist combined dataset: {}", e);
        }
        table
    }

    fn exclude_categories(&self, table: Table) -> Table {
        let Some(col) = table.column_index(&self.config.category_column) else {
            return table;
        };
        let excluded: HashSet<&str> = self
            .config
            .excluded_categories
            .iter()
            .map(String::as_str)
            .collect();

        let before = table.row_count();
        let kept = table
            .all()
            .filter(|row| match row.get(col) {
                CellValue::Text(s) => !excluded.contains(s.as_str()),
                _ => true,
            })
            .to_table();

        log_info!(
            "ASSEMBLE",
            "removed {} rows with excluded categories",
            before - kept.row_count()
        );
        kept
    }

    /// Parses the date column in place (unparseable values become `Empty`) and
    /// adds day, month-name and year columns unless all three already exist.
    fn derive_calendar_columns(&self, table: Table) -> Table {
        let cfg = &self.config;
        let Some(date_idx) = table.column_index(&cfg.date_column) else {
            return table;
        };

        let mut unparsed = 0usize;
        let table = table.with_column(&cfg.date_column, |row| {
            let raw = row.get(date_idx);
            match parse_date(raw, cfg.day_first) {
                Some(d) => CellValue::Date(d),
                None => {
                    if !raw.is_missing() {
                        unparsed += 1;
                    }
                    CellValue::Empty
                }
            }
        });
        if unparsed > 0 {
            log_warn!(
                "ASSEMBLE",
                "{} '{}' values could not be parsed and were cleared",
                unparsed,
                cfg.date_column
            );
        }

        let already_derived = [&cfg.day_column, &cfg.month_column, &cfg.year_column]
            .iter()
            .all(|c| table.has_column(c));
        if already_derived {
            return table;
        }

        let date_of = |row: &Row| match row.get(date_idx) {
            CellValue::Date(d) => Some(*d),
            _ => None,
        };
        let table = table.with_column(&cfg.day_column, |row| {
            date_of(row)
                .map(|d| CellValue::Number(d.day() as f64))
                .unwrap_or_default()
        });
        let table = table.with_column(&cfg.month_column, |row| {
            date_of(row)
                .map(|d| CellValue::text(MonthYear::of(d).month_name()))
                .unwrap_or_default()
        });
        let table = table.with_column(&cfg.year_column, |row| {
            date_of(row)
                .map(|d| CellValue::Number(d.year() as f64))
                .unwrap_or_default()
        });

        log_info!("ASSEMBLE", "derived calendar columns from '{}'", cfg.date_column);
        table
    }
}
