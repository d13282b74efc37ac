//! FILENAME: core/dataset/src/normalize.rs
//! PURPOSE: Schema normalization applied after every load and every cache read.
//! CONTEXT: Source spreadsheets disagree on stray whitespace in headers and text
//! cells. Column identity is the trimmed name, so joins and filters see one
//! consistent schema regardless of which file a row came from.

use crate::log_warn;
use crate::table::{Row, Table};
use crate::value::CellValue;
use std::collections::HashMap;

/// String that upstream exports write for a missing value.
pub const MISSING_SENTINEL: &str = "nan";

/// True when a string is the missing-value sentinel (case-insensitive, trimmed).
pub fn is_missing_sentinel(s: &str) -> bool {
    s.trim().eq_ignore_ascii_case(MISSING_SENTINEL)
}

/// Normalizes column names and cell values.
///
/// - Column names are trimmed. When two columns trim to the same name the
///   merged column keeps the position of the first one and takes its values
///   from the last one (last-wins).
/// - Text cells are trimmed; a cell equal to the missing sentinel becomes `Empty`.
/// - NaN numbers become `Empty`.
///
/// The operation is idempotent.
pub fn normalize(table: Table) -> Table {
    let (raw_columns, rows) = table.into_parts();

    let mut columns: Vec<String> = Vec::with_capacity(raw_columns.len());
    let mut position: HashMap<String, usize> = HashMap::new();
    // For each output column, the source column its values are read from.
    let mut source: Vec<usize> = Vec::with_capacity(raw_columns.len());

    for (src_idx, raw) in raw_columns.iter().enumerate() {
        let name = raw.trim().to_string();
        match position.get(&name) {
            Some(&out_idx) => {
                log_warn!(
                    "NORMALIZE",
                    "column '{}' collides with an earlier column after trimming; keeping values from position {}",
                    name,
                    src_idx
                );
                source[out_idx] = src_idx;
            }
            None => {
                position.insert(name.clone(), columns.len());
                columns.push(name);
                source.push(src_idx);
            }
        }
    }

    let rows = rows
        .into_iter()
        .map(|row| {
            let values = source
                .iter()
                .map(|&src| normalize_cell(row.get(src)))
                .collect();
            Row::new(values)
        })
        .collect();

    Table::from_parts(columns, rows)
}

fn normalize_cell(value: &CellValue) -> CellValue {
    match value {
        CellValue::Text(s) => {
            let trimmed = s.trim();
            if trimmed.eq_ignore_ascii_case(MISSING_SENTINEL) {
                CellValue::Empty
            } else {
                CellValue::Text(trimmed.to_string())
            }
        }
        CellValue::Number(n) if n.is_nan() => CellValue::Empty,
        other => other.clone(),
    }
}
