//! FILENAME: core/persistence/src/loader.rs
//! PURPOSE: Reads one source file (workbook or delimited text) into a normalized `Table`.
//! CONTEXT: Workbooks from the upstream provider keep their data on the sheet
//! with the longest name; that convention is preserved exactly (first sheet wins
//! ties). The first row is always the header.

use crate::PersistenceError;
use calamine::{open_workbook_auto, Data, Reader};
use dataset::calendar::{excel_serial_to_date, parse_date};
use dataset::{log_debug, log_info, log_warn, normalize, CellValue, Table};
use std::path::Path;

/// Extensions opened through the workbook reader.
pub const WORKBOOK_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xlsb", "xls", "ods"];

/// Extensions parsed as comma-delimited text.
pub const DELIMITED_EXTENSIONS: &[&str] = &["csv"];

/// Which sheet of a workbook holds the data.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SheetSelection {
    /// The sheet with the longest name; the first such sheet on ties.
    #[default]
    Longest,
    /// The first sheet in file order.
    First,
    /// A sheet by exact name.
    Named(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Workbook,
    Delimited,
}

/// Classifies a path by extension (case-insensitive).
pub fn source_kind(path: &Path) -> Option<SourceKind> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    if WORKBOOK_EXTENSIONS.contains(&ext.as_str()) {
        Some(SourceKind::Workbook)
    } else if DELIMITED_EXTENSIONS.contains(&ext.as_str()) {
        Some(SourceKind::Delimited)
    } else {
        None
    }
}

/// Picks a sheet name according to `selection`. Returns `None` when the
/// workbook has no sheets or the named sheet does not exist.
pub fn select_sheet(names: &[String], selection: &SheetSelection) -> Option<String> {
    match selection {
        SheetSelection::Longest => {
            let mut best: Option<&String> = None;
            for name in names {
                // Strictly longer only, so the earliest sheet keeps a tie.
                if best.map_or(true, |b| name.chars().count() > b.chars().count()) {
                    best = Some(name);
                }
            }
            best.cloned()
        }
        SheetSelection::First => names.first().cloned(),
        SheetSelection::Named(wanted) => names.iter().find(|n| *n == wanted).cloned(),
    }
}

// ============================================================================
// TABLE LOADER
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct TableLoader {
    selection: SheetSelection,
}

impl TableLoader {
    pub fn new(selection: SheetSelection) -> Self {
        TableLoader { selection }
    }

    pub fn selection(&self) -> &SheetSelection {
        &self.selection
    }

    /// Loads and normalizes `path`. Unsupported extensions and workbooks
    /// without a usable sheet yield `PersistenceError::MissingData`.
    pub fn load(&self, path: &Path) -> Result<Table, PersistenceError> {
        let table = match source_kind(path) {
            Some(SourceKind::Workbook) => self.load_workbook(path)?,
            Some(SourceKind::Delimited) => load_delimited(path)?,
            None => {
                return Err(PersistenceError::MissingData(format!(
                    "unsupported file type: {}",
                    path.display()
                )))
            }
        };

        let table = normalize(table);
        log_debug!(
            "LOADER",
            "{}: {} rows, columns {:?}",
            file_label(path),
            table.row_count(),
            table.columns()
        );
        Ok(table)
    }

    fn load_workbook(&self, path: &Path) -> Result<Table, PersistenceError> {
        let mut workbook = open_workbook_auto(path)?;
        let sheet_names = workbook.sheet_names().to_vec();

        let Some(sheet_name) = select_sheet(&sheet_names, &self.selection) else {
            return Err(PersistenceError::MissingData(format!(
                "no matching sheet in {} (sheets: {:?})",
                file_label(path),
                sheet_names
            )));
        };

        log_info!("LOADER", "reading {} sheet '{}'", file_label(path), sheet_name);
        let range = workbook.worksheet_range(&sheet_name)?;

        let mut rows = range.rows();
        let Some(header) = rows.next() else {
            return Ok(Table::default());
        };

        let columns = header
            .iter()
            .enumerate()
            .map(|(i, cell)| header_name(i, &data_to_value(cell)))
            .collect();
        let mut table = Table::new(columns);

        for row in rows {
            let values: Vec<CellValue> = row.iter().map(data_to_value).collect();
            if values.iter().all(CellValue::is_missing) {
                continue;
            }
            table.push_row(values);
        }

        Ok(table)
    }
}

// ============================================================================
// CELL DECODING
// ============================================================================

fn data_to_value(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Float(f) => CellValue::Number(*f),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Bool(b) => CellValue::Boolean(*b),
        Data::Error(_) => CellValue::Empty,
        Data::DateTime(dt) => excel_serial_to_date(dt.as_f64())
            .map(CellValue::Date)
            .unwrap_or(CellValue::Number(dt.as_f64())),
        Data::DateTimeIso(s) => parse_date(&CellValue::Text(s.clone()), false)
            .map(CellValue::Date)
            .unwrap_or_else(|| CellValue::Text(s.clone())),
        Data::DurationIso(s) => CellValue::Text(s.clone()),
    }
}

/// Types one delimited field: blank is missing, finite numbers are numeric.
fn field_to_value(field: &str) -> CellValue {
    if field.is_empty() {
        return CellValue::Empty;
    }
    match field.parse::<f64>() {
        Ok(n) if n.is_finite() => CellValue::Number(n),
        _ => CellValue::Text(field.to_string()),
    }
}

fn header_name(index: usize, value: &CellValue) -> String {
    let name = value.display_value();
    if name.trim().is_empty() {
        format!("Unnamed: {}", index)
    } else {
        name
    }
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn load_delimited(path: &Path) -> Result<Table, PersistenceError> {
    log_info!("LOADER", "reading delimited file {}", file_label(path));

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)?;

    let columns = reader
        .headers()?
        .iter()
        .enumerate()
        .map(|(i, h)| header_name(i, &CellValue::text(h)))
        .collect();
    let mut table = Table::new(columns);

    let mut skipped = 0usize;
    for (line, record) in reader.records().enumerate() {
        match record {
            Ok(record) => {
                let values: Vec<CellValue> = record.iter().map(field_to_value).collect();
                if values.iter().all(CellValue::is_missing) {
                    continue;
                }
                table.push_row(values);
            }
            Err(e) => {
                skipped += 1;
                log_warn!("LOADER", "{} record {}: {}", file_label(path), line + 1, e);
            }
        }
    }

    if skipped > 0 {
        log_warn!("LOADER", "{}: skipped {} unreadable records", file_label(path), skipped);
    }
    Ok(table)
}
