//! FILENAME: core/dataset/src/lib.rs
//! Dataset Module
//!
//! Shared data model for the sales comparison pipeline: cell values, tables of
//! immutable rows, borrowed row views, schema normalization, and the calendar
//! and week arithmetic that derived columns are built from.
//!
//! Layers:
//! - `value`: A single cell (`CellValue`)
//! - `table`: Rows, tables and `RowSet` views
//! - `normalize`: Column/cell cleanup applied after every load
//! - `calendar`: Month names, `MonthYear`, date parsing
//! - `week`: Week-of-month assignment

pub mod calendar;
pub mod logging;
pub mod normalize;
pub mod table;
pub mod value;
pub mod week;

pub use calendar::{month_name, month_number, parse_date, MonthYear, MONTH_NAMES};
pub use normalize::{is_missing_sentinel, normalize, MISSING_SENTINEL};
pub use table::{Row, RowSet, Table};
pub use value::CellValue;
pub use week::{date_ranges_for, week_label, week_of, with_week_column, WeekError};

#[doc(hidden)]
pub use log;
