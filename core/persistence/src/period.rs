//! FILENAME: core/persistence/src/period.rs
//! PURPOSE: Resolves the latest / last-month / last-year periods to source files
//! and prepares each period's table for the multi-period dashboard.
//! CONTEXT: Period files live in `<base>/<MonthName>-<Year>/`. A period whose
//! folder or file is missing is left out of the result; callers handle
//! fewer than three periods.

use crate::loader::{SheetSelection, TableLoader};
use dataset::calendar::MonthYear;
use dataset::{log_info, log_warn, parse_date, CellValue, Table};
use chrono::Datelike;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

// ============================================================================
// PERIOD ARITHMETIC
// ============================================================================

/// Role of a period relative to the anchor month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PeriodRole {
    LastMonth,
    LastYear,
    Latest,
}

impl PeriodRole {
    /// Presentation order: last month, last year, latest.
    pub const ORDER: [PeriodRole; 3] = [
        PeriodRole::LastMonth,
        PeriodRole::LastYear,
        PeriodRole::Latest,
    ];
}

/// The three months compared by the multi-period dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodTriple {
    pub latest: MonthYear,
    pub last_month: MonthYear,
    pub last_year: MonthYear,
}

impl PeriodTriple {
    pub fn get(&self, role: PeriodRole) -> MonthYear {
        match role {
            PeriodRole::LastMonth => self.last_month,
            PeriodRole::LastYear => self.last_year,
            PeriodRole::Latest => self.latest,
        }
    }
}

/// Computes the period triple for an anchor month.
pub fn resolve(anchor: MonthYear) -> PeriodTriple {
    PeriodTriple {
        latest: anchor,
        last_month: anchor.previous_month(),
        last_year: anchor.previous_year(),
    }
}

/// First file in `folder` (by name) whose name contains `keyword`
/// (case-insensitive) and whose extension is `extension` (case-insensitive).
pub fn find_source(folder: &Path, keyword: &str, extension: &str) -> Option<PathBuf> {
    let read_dir = fs::read_dir(folder).ok()?;
    let keyword = keyword.to_lowercase();
    let extension = extension.trim_start_matches('.').to_ascii_lowercase();

    let mut names: Vec<(String, PathBuf)> = read_dir
        .flatten()
        .map(|e| e.path())
        .filter(|p| p.is_file())
        .filter_map(|p| {
            let name = p.file_name()?.to_string_lossy().into_owned();
            Some((name, p))
        })
        .collect();
    names.sort_by(|a, b| a.0.cmp(&b.0));

    names.into_iter().map(|(_, p)| p).find(|p| {
        let name = p
            .file_name()
            .map(|n| n.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        let ext_ok = p
            .extension()
            .map_or(false, |e| e.to_string_lossy().to_ascii_lowercase() == extension);
        ext_ok && name.contains(&keyword)
    })
}

// ============================================================================
// PERIOD RESOLVER
// ============================================================================

/// A period whose source file was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPeriod {
    pub role: PeriodRole,
    pub month: MonthYear,
    pub source: PathBuf,
}

impl ResolvedPeriod {
    /// Compact display name, e.g. `"May 25"`.
    pub fn display_name(&self) -> String {
        self.month.short_label()
    }
}

#[derive(Debug, Clone)]
pub struct PeriodResolver {
    base_folder: PathBuf,
    keyword: String,
    extension: String,
}

impl PeriodResolver {
    pub fn new(
        base_folder: impl Into<PathBuf>,
        keyword: impl Into<String>,
        extension: impl Into<String>,
    ) -> Self {
        PeriodResolver {
            base_folder: base_folder.into(),
            keyword: keyword.into(),
            extension: extension.into(),
        }
    }

    pub fn folder_for(&self, month: MonthYear) -> PathBuf {
        self.base_folder.join(month.folder_name())
    }

    /// Resolves every period of the anchor's triple that has a source file,
    /// in presentation order.
    pub fn resolve(&self, anchor: MonthYear) -> Vec<ResolvedPeriod> {
        let triple = resolve(anchor);
        let mut out = Vec::new();
        for role in PeriodRole::ORDER {
            let month = triple.get(role);
            let folder = self.folder_for(month);
            match find_source(&folder, &self.keyword, &self.extension) {
                Some(source) => {
                    log_info!("PERIOD", "{:?} {} -> {}", role, month, source.display());
                    out.push(ResolvedPeriod { role, month, source });
                }
                None => log_warn!(
                    "PERIOD",
                    "{:?} {}: no '{}' file in {}",
                    role,
                    month,
                    self.keyword,
                    folder.display()
                ),
            }
        }
        out
    }
}

// ============================================================================
// PERIOD PREPARATION
// ============================================================================

/// Row exclusions and derived columns applied to each period table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PeriodPreparation {
    /// Rows whose `exclude_column` value is listed in `excluded_values` are dropped.
    pub exclude_column: String,
    pub excluded_values: Vec<String>,
    /// Day-of-month is derived from this date column into `day_column`.
    pub date_column: String,
    pub day_column: String,
    pub day_first: bool,
    /// Exact-match value rewrites applied to `alias_column`.
    pub alias_column: String,
    pub aliases: Vec<(String, String)>,
}

impl Default for PeriodPreparation {
    fn default() -> Self {
        PeriodPreparation {
            exclude_column: "idg".to_string(),
            excluded_values: vec!["FOC".into(), "Remove".into(), "WRT".into()],
            date_column: "InvoiceDate".to_string(),
            day_column: "InvoiceDay".to_string(),
            day_first: true,
            alias_column: "TYPE".to_string(),
            aliases: vec![
                ("CC".into(), "Jumbo.ae".into()),
                ("jumbo.ae".into(), "Jumbo.ae".into()),
            ],
        }
    }
}

impl PeriodPreparation {
    pub fn prepare(&self, table: &Table) -> Table {
        let mut table = match table.column_index(&self.exclude_column) {
            Some(col) => {
                let excluded: HashSet<&str> =
                    self.excluded_values.iter().map(String::as_str).collect();
                table
                    .all()
                    .filter(|row| match row.get(col) {
                        CellValue::Text(s) => !excluded.contains(s.as_str()),
                        _ => true,
                    })
                    .to_table()
            }
            None => table.clone(),
        };

        if let Some(date_idx) = table.column_index(&self.date_column) {
            let day_first = self.day_first;
            table = table.with_column(&self.day_column, |row| {
                parse_date(row.get(date_idx), day_first)
                    .map(|d| CellValue::Number(d.day() as f64))
                    .unwrap_or_default()
            });
        }

        if let Some(alias_idx) = table.column_index(&self.alias_column) {
            table = table.with_column(&self.alias_column, |row| {
                let value = row.get(alias_idx);
                if let CellValue::Text(s) = value {
                    for (from, to) in &self.aliases {
                        if s == from {
                            return CellValue::Text(to.clone());
                        }
                    }
                }
                value.clone()
            });
        }

        table
    }
}

/// A resolved period and its prepared rows.
#[derive(Debug, Clone)]
pub struct PeriodTable {
    pub period: ResolvedPeriod,
    pub table: Table,
}

/// Loads and prepares every resolved period. Period files keep their data on
/// the first sheet. A file that fails to load is logged and left out.
pub fn load_periods(
    resolver: &PeriodResolver,
    anchor: MonthYear,
    preparation: &PeriodPreparation,
) -> Vec<PeriodTable> {
    let loader = TableLoader::new(SheetSelection::First);
    resolver
        .resolve(anchor)
        .into_iter()
        .filter_map(|period| match loader.load(&period.source) {
            Ok(raw) => {
                let table = preparation.prepare(&raw);
                log_info!(
                    "PERIOD",
                    "{}: {} rows ({} before preparation)",
                    period.display_name(),
                    table.row_count(),
                    raw.row_count()
                );
                Some(PeriodTable { period, table })
            }
            Err(e) => {
                log_warn!("PERIOD", "failed to load {}: {}", period.source.display(), e);
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn triple_for_january_rolls_back_a_year() {
        let triple = resolve(MonthYear::new(1, 2025).unwrap());
        assert_eq!(triple.last_month, MonthYear::new(12, 2024).unwrap());
        assert_eq!(triple.last_year, MonthYear::new(1, 2024).unwrap());
        assert_eq!(triple.latest, MonthYear::new(1, 2025).unwrap());
    }

    #[test]
    fn find_source_matches_keyword_case_insensitively() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("notes.xlsx"), b"").unwrap();
        fs::write(dir.path().join("June25_INVOICE.csv"), b"").unwrap();
        fs::write(dir.path().join("June25_Invoice.xlsx"), b"").unwrap();

        let found = find_source(dir.path(), "invoice", "xlsx").unwrap();
        assert_eq!(found.file_name().unwrap(), "June25_Invoice.xlsx");
        assert_eq!(find_source(dir.path(), "report", "xlsx"), None);
        assert_eq!(find_source(&dir.path().join("missing"), "invoice", "xlsx"), None);
    }

    #[test]
    fn resolver_skips_periods_without_files() {
        let dir = TempDir::new().unwrap();
        for folder in ["May-2025", "June-2025"] {
            fs::create_dir_all(dir.path().join(folder)).unwrap();
        }
        fs::write(dir.path().join("May-2025").join("may invoice.xlsx"), b"").unwrap();
        fs::write(dir.path().join("June-2025").join("june invoice.xlsx"), b"").unwrap();

        let resolver = PeriodResolver::new(dir.path(), "invoice", "xlsx");
        let periods = resolver.resolve(MonthYear::new(6, 2025).unwrap());
        let roles: Vec<PeriodRole> = periods.iter().map(|p| p.role).collect();
        assert_eq!(roles, vec![PeriodRole::LastMonth, PeriodRole::Latest]);
        assert_eq!(periods[0].display_name(), "May 25");
    }

    #[test]
    fn preparation_excludes_rows_derives_day_and_rewrites_aliases() {
        let mut raw = Table::new(vec!["idg".into(), "InvoiceDate".into(), "TYPE".into()]);
        raw.push_row(vec!["FOC".into(), "03/04/2025".into(), "Store".into()]);
        raw.push_row(vec!["Retail".into(), "03/04/2025".into(), "CC".into()]);
        raw.push_row(vec!["Retail".into(), "bad".into(), "jumbo.ae".into()]);
        raw.push_row(vec!["Retail".into(), "15/04/2025".into(), "Store".into()]);

        let prepared = PeriodPreparation::default().prepare(&raw);
        assert_eq!(prepared.row_count(), 3);
        assert_eq!(prepared.value(0, "InvoiceDay"), &CellValue::Number(3.0));
        assert_eq!(prepared.value(0, "TYPE"), &CellValue::text("Jumbo.ae"));
        assert_eq!(prepared.value(1, "InvoiceDay"), &CellValue::Empty);
        assert_eq!(prepared.value(1, "TYPE"), &CellValue::text("Jumbo.ae"));
        assert_eq!(prepared.value(2, "InvoiceDay"), &CellValue::Number(15.0));
        assert_eq!(prepared.value(2, "TYPE"), &CellValue::text("Store"));
    }
}
