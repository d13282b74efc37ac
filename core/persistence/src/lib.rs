//! FILENAME: core/persistence/src/lib.rs
//! Persistence Module
//!
//! Turns folders of sales spreadsheets into one working `Table`:
//! - `loader`: workbook / delimited file reading with sheet selection
//! - `cache`: per-file cache entries with mtime staleness and orphan sweep
//! - `assembler`: union-schema concatenation, category exclusion, calendar columns
//! - `period`: latest / last-month / last-year source resolution
//! - `ingest`: folder-level orchestration

mod error;

pub mod assembler;
pub mod cache;
pub mod ingest;
pub mod loader;
pub mod period;

pub use assembler::{concat, AssemblerConfig, DatasetAssembler, DEFAULT_EXCLUDED_CATEGORIES};
pub use cache::{read_entry, write_entry, TableCache};
pub use error::PersistenceError;
pub use ingest::{ingest_folder, list_source_files, EmptyReason, Ingested};
pub use loader::{select_sheet, source_kind, SheetSelection, SourceKind, TableLoader};
pub use period::{
    find_source, load_periods, resolve, PeriodPreparation, PeriodResolver, PeriodRole,
    PeriodTable, PeriodTriple, ResolvedPeriod,
};
