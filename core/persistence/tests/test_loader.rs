//! FILENAME: core/persistence/tests/test_loader.rs
//! Integration tests for reading workbooks and delimited files.

mod common;

use common::{write_file, write_xlsx, Fx, SALES_CSV};
use dataset::CellValue;
use persistence::{PersistenceError, SheetSelection, TableLoader};
use tempfile::TempDir;

#[test]
fn test_workbook_reads_longest_named_sheet() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("report.xlsx");
    write_xlsx(
        &path,
        &[
            ("Info", vec![vec![Fx::S("Ignore")], vec![Fx::S("me")]]),
            (
                "Item views detail",
                vec![
                    vec![Fx::S(" Category "), Fx::S("Item revenue"), Fx::Blank],
                    vec![Fx::S("Shoes "), Fx::N(120.0), Fx::S("x")],
                    vec![Fx::Blank, Fx::Blank, Fx::Blank],
                    vec![Fx::S("nan"), Fx::N(5.0), Fx::Blank],
                ],
            ),
            ("Short", vec![vec![Fx::S("Other")]]),
        ],
    );

    let table = TableLoader::default().load(&path).unwrap();
    assert_eq!(table.columns(), &["Category", "Item revenue", "Unnamed: 2"]);
    assert_eq!(table.row_count(), 2);
    assert_eq!(table.value(0, "Category"), &CellValue::text("Shoes"));
    assert_eq!(table.value(0, "Item revenue"), &CellValue::Number(120.0));
    assert_eq!(table.value(1, "Category"), &CellValue::Empty);
}

#[test]
fn test_first_sheet_selection() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("invoice.xlsx");
    write_xlsx(
        &path,
        &[
            ("Sheet1", vec![vec![Fx::S("Brand")], vec![Fx::S("Acme")]]),
            ("A much longer name", vec![vec![Fx::S("Other")], vec![Fx::S("x")]]),
        ],
    );

    let table = TableLoader::new(SheetSelection::First).load(&path).unwrap();
    assert_eq!(table.columns(), &["Brand"]);
    assert_eq!(table.value(0, "Brand"), &CellValue::text("Acme"));
}

#[test]
fn test_csv_is_parsed_and_normalized() {
    let dir = TempDir::new().unwrap();
    let path = write_file(dir.path(), "sales.csv", SALES_CSV);

    let table = TableLoader::default().load(&path).unwrap();
    assert_eq!(
        table.columns(),
        &["Category", "Brand", "Item name", "Item revenue", "Date"]
    );
    assert_eq!(table.row_count(), 4);
    assert_eq!(table.value(0, "Brand"), &CellValue::text("Acme"));
    assert_eq!(table.value(1, "Item revenue"), &CellValue::Number(200.0));
    assert_eq!(table.value(3, "Brand"), &CellValue::Empty);
}

#[test]
fn test_unsupported_extension_is_missing_data() {
    let dir = TempDir::new().unwrap();
    let path = write_file(dir.path(), "notes.txt", "hello");

    let err = TableLoader::default().load(&path).unwrap_err();
    assert!(matches!(err, PersistenceError::MissingData(_)));
}
