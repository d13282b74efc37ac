//! FILENAME: core/dataset/src/table.rs
//! PURPOSE: Tables of immutable rows and borrowed views over them.
//! CONTEXT: Rows are never edited in place. Filtering produces a `RowSet`
//! (the parent table plus a list of row indices); derived columns produce a
//! new `Table`. A period is a `RowSet`, not a copy.

use crate::value::CellValue;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

static EMPTY: CellValue = CellValue::Empty;

// ============================================================================
// ROW
// ============================================================================

/// One observation. Values are positional and aligned with the owning
/// table's column list.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Row {
    values: Vec<CellValue>,
}

impl Row {
    pub fn new(values: Vec<CellValue>) -> Self {
        Row { values }
    }

    /// Value at a column position; positions past the end read as `Empty`.
    pub fn get(&self, col: usize) -> &CellValue {
        self.values.get(col).unwrap_or(&EMPTY)
    }

    pub fn values(&self) -> &[CellValue] {
        &self.values
    }

    pub fn into_values(self) -> Vec<CellValue> {
        self.values
    }
}

// ============================================================================
// TABLE
// ============================================================================

/// An ordered collection of rows sharing one column schema.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Table {
            columns,
            rows: Vec::new(),
        }
    }

    /// Builds a table, padding short rows with `Empty` and cutting long ones
    /// so every row matches the column count.
    pub fn from_parts(columns: Vec<String>, rows: Vec<Row>) -> Self {
        let mut table = Table::new(columns);
        for row in rows {
            table.push_row(row.into_values());
        }
        table
    }

    pub fn push_row(&mut self, mut values: Vec<CellValue>) {
        values.resize(self.columns.len(), CellValue::Empty);
        self.rows.push(Row::new(values));
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Value of a named column in a given row; unknown columns read as `Empty`.
    pub fn value(&self, row: usize, column: &str) -> &CellValue {
        match (self.rows.get(row), self.column_index(column)) {
            (Some(r), Some(c)) => r.get(c),
            _ => &EMPTY,
        }
    }

    /// Returns a new table with `column` set from `compute`. An existing column
    /// of that name is replaced in place; otherwise it is appended.
    pub fn with_column<F>(&self, column: &str, mut compute: F) -> Table
    where
        F: FnMut(&Row) -> CellValue,
    {
        let mut columns = self.columns.clone();
        let target = match self.column_index(column) {
            Some(idx) => idx,
            None => {
                columns.push(column.to_string());
                columns.len() - 1
            }
        };

        let rows = self
            .rows
            .iter()
            .map(|row| {
                let mut values = row.values().to_vec();
                values.resize(columns.len(), CellValue::Empty);
                values[target] = compute(row);
                Row::new(values)
            })
            .collect();

        Table { columns, rows }
    }

    /// A view over every row.
    pub fn all(&self) -> RowSet<'_> {
        RowSet::all(self)
    }

    pub fn into_parts(self) -> (Vec<String>, Vec<Row>) {
        (self.columns, self.rows)
    }
}

// ============================================================================
// ROW SET (borrowed view)
// ============================================================================

/// A subset of a table's rows, kept in table order.
#[derive(Debug, Clone)]
pub struct RowSet<'a> {
    table: &'a Table,
    indices: Vec<usize>,
}

impl<'a> RowSet<'a> {
    pub fn all(table: &'a Table) -> Self {
        RowSet {
            table,
            indices: (0..table.row_count()).collect(),
        }
    }

    pub fn empty(table: &'a Table) -> Self {
        RowSet {
            table,
            indices: Vec::new(),
        }
    }

    /// Indices must be valid for `table`; out-of-range entries are dropped.
    pub fn from_indices(table: &'a Table, mut indices: Vec<usize>) -> Self {
        indices.retain(|&i| i < table.row_count());
        RowSet { table, indices }
    }

    pub fn table(&self) -> &'a Table {
        self.table
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn rows(&self) -> impl Iterator<Item = &'a Row> + '_ {
        let table = self.table;
        self.indices.iter().map(move |&i| &table.rows[i])
    }

    /// Keeps the rows for which `keep` returns true.
    pub fn filter<F>(&self, mut keep: F) -> RowSet<'a>
    where
        F: FnMut(&Row) -> bool,
    {
        let table = self.table;
        let indices = self
            .indices
            .iter()
            .copied()
            .filter(|&i| keep(&table.rows[i]))
            .collect();
        RowSet { table, indices }
    }

    /// Distinct non-missing string forms of a column within this view.
    pub fn distinct_values(&self, column: &str) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        if let Some(col) = self.table.column_index(column) {
            for row in self.rows() {
                let value = row.get(col);
                if !value.is_missing() {
                    out.insert(value.display_value());
                }
            }
        }
        out
    }

    /// Copies the viewed rows into a standalone table.
    pub fn to_table(&self) -> Table {
        Table {
            columns: self.table.columns.clone(),
            rows: self.rows().cloned().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        let mut table = Table::new(vec!["Category".into(), "Revenue".into()]);
        table.push_row(vec![CellValue::text("Shoes"), CellValue::Number(100.0)]);
        table.push_row(vec![CellValue::text("Bags")]);
        table.push_row(vec![CellValue::text("Shoes"), CellValue::Number(50.0)]);
        table
    }

    #[test]
    fn short_rows_are_padded_with_empty() {
        let table = sample();
        assert_eq!(table.rows()[1].values().len(), 2);
        assert_eq!(table.value(1, "Revenue"), &CellValue::Empty);
        assert_eq!(table.value(0, "Missing"), &CellValue::Empty);
    }

    #[test]
    fn row_set_filter_keeps_table_order() {
        let table = sample();
        let shoes = table
            .all()
            .filter(|row| row.get(0) == &CellValue::text("Shoes"));
        assert_eq!(shoes.indices(), &[0, 2]);
        assert_eq!(shoes.to_table().row_count(), 2);
    }

    #[test]
    fn with_column_appends_or_replaces() {
        let table = sample();
        let flagged = table.with_column("Flag", |_| CellValue::Boolean(true));
        assert_eq!(flagged.columns().len(), 3);
        assert_eq!(flagged.value(2, "Flag"), &CellValue::Boolean(true));

        let replaced = flagged.with_column("Flag", |_| CellValue::Boolean(false));
        assert_eq!(replaced.columns().len(), 3);
        assert_eq!(replaced.value(0, "Flag"), &CellValue::Boolean(false));
        // The source table is untouched.
        assert_eq!(table.columns().len(), 2);
    }

    #[test]
    fn distinct_values_skip_missing() {
        let table = sample();
        let values = table.all().distinct_values("Revenue");
        assert_eq!(values.into_iter().collect::<Vec<_>>(), vec!["100", "50"]);
    }
}
