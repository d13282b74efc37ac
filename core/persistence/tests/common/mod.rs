//! FILENAME: core/persistence/tests/common/mod.rs
//! Fixtures for persistence integration tests: real workbooks written with
//! rust_xlsxwriter, CSV files, and explicit modification times.

#![allow(dead_code)]

use rust_xlsxwriter::Workbook;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

/// A fixture cell.
#[derive(Debug, Clone, Copy)]
pub enum Fx<'a> {
    S(&'a str),
    N(f64),
    Blank,
}

/// Writes a workbook with the given sheets (name, rows) to `path`.
pub fn write_xlsx(path: &Path, sheets: &[(&str, Vec<Vec<Fx>>)]) {
    let mut workbook = Workbook::new();
    for (name, rows) in sheets {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(*name).unwrap();
        for (r, row) in rows.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                match cell {
                    Fx::S(s) => {
                        worksheet.write_string(r as u32, c as u16, *s).unwrap();
                    }
                    Fx::N(n) => {
                        worksheet.write_number(r as u32, c as u16, *n).unwrap();
                    }
                    Fx::Blank => {}
                }
            }
        }
    }
    workbook.save(path).unwrap();
}

pub fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

/// Sets a file's modification time.
pub fn set_mtime(path: &Path, time: SystemTime) {
    let file = OpenOptions::new().write(true).open(path).unwrap();
    file.set_modified(time).unwrap();
}

/// A fixed reference instant for mtime tests.
pub fn base_time() -> SystemTime {
    SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000)
}

pub fn secs(n: u64) -> Duration {
    Duration::from_secs(n)
}

pub const SALES_CSV: &str = "\
 Category ,Brand,Item name,Item revenue,Date
Shoes, Acme ,Runner,100,2025-05-01
Bags,Zenith,Tote,200,2025-05-02
JSP,Acme,Promo,5,2025-05-02
Shoes,nan,Walker,50,2025-06-10
";
