//! FILENAME: core/comparison-engine/tests/common/mod.rs
//! Builders for small in-memory sales tables.

#![allow(dead_code)]

use dataset::{CellValue, Table};

pub const COLUMNS: [&str; 8] = [
    "Month", "Year", "Day", "Brand", "Category", "Item name", "Item revenue", "Sessions",
];

/// One sales row; `None` leaves the cell empty.
#[derive(Debug, Clone, Copy)]
pub struct Sale<'a> {
    pub month: &'a str,
    pub year: f64,
    pub day: Option<f64>,
    pub brand: Option<&'a str>,
    pub category: Option<&'a str>,
    pub item: &'a str,
    pub revenue: f64,
    pub sessions: f64,
}

impl<'a> Sale<'a> {
    pub fn new(month: &'a str, category: &'a str, revenue: f64) -> Self {
        Sale {
            month,
            year: 2025.0,
            day: Some(1.0),
            brand: Some("Acme"),
            category: Some(category),
            item: "Widget",
            revenue,
            sessions: 1.0,
        }
    }

    pub fn day(mut self, day: f64) -> Self {
        self.day = Some(day);
        self
    }

    pub fn brand(mut self, brand: &'a str) -> Self {
        self.brand = Some(brand);
        self
    }

    pub fn item(mut self, item: &'a str) -> Self {
        self.item = item;
        self
    }

    pub fn sessions(mut self, sessions: f64) -> Self {
        self.sessions = sessions;
        self
    }
}

fn opt_text(value: Option<&str>) -> CellValue {
    value.map(CellValue::text).unwrap_or(CellValue::Empty)
}

pub fn sales_table(sales: &[Sale]) -> Table {
    let mut table = Table::new(COLUMNS.iter().map(|c| c.to_string()).collect());
    for s in sales {
        table.push_row(vec![
            CellValue::text(s.month),
            CellValue::Number(s.year),
            s.day.map(CellValue::Number).unwrap_or(CellValue::Empty),
            opt_text(s.brand),
            opt_text(s.category),
            CellValue::text(s.item),
            CellValue::Number(s.revenue),
            CellValue::Number(s.sessions),
        ]);
    }
    table
}

pub fn metrics() -> Vec<String> {
    vec!["Item revenue".to_string(), "Sessions".to_string()]
}
