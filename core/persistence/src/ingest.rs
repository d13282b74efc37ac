//! FILENAME: core/persistence/src/ingest.rs
//! PURPOSE: Folder-level ingestion: list sources, load each through the cache,
//! sweep orphaned entries, assemble and persist the combined dataset.
//! CONTEXT: Per-file failures are logged and skipped. Only a missing folder or
//! a folder without usable files surfaces, as an explicit empty state.

use crate::assembler::DatasetAssembler;
use crate::cache::TableCache;
use crate::loader::source_kind;
use dataset::{log_error, log_info, log_warn, Table};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Why ingestion produced no dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmptyReason {
    NoSourceFolder(PathBuf),
    NoSourceFiles(PathBuf),
    NoRowsLoaded,
}

impl std::fmt::Display for EmptyReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EmptyReason::NoSourceFolder(p) => write!(f, "source folder not found: {}", p.display()),
            EmptyReason::NoSourceFiles(p) => {
                write!(f, "no workbook or CSV files in {}", p.display())
            }
            EmptyReason::NoRowsLoaded => write!(f, "no rows could be loaded from the source files"),
        }
    }
}

#[derive(Debug, Clone)]
pub enum Ingested {
    Loaded(Table),
    Empty(EmptyReason),
}

impl Ingested {
    pub fn table(&self) -> Option<&Table> {
        match self {
            Ingested::Loaded(t) => Some(t),
            Ingested::Empty(_) => None,
        }
    }
}

/// Supported source files directly inside `folder`, sorted by file name.
/// Office lock files (`~$...`) are ignored.
pub fn list_source_files(folder: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = fs::read_dir(folder)?
        .flatten()
        .map(|e| e.path())
        .filter(|p| p.is_file() && source_kind(p).is_some())
        .filter(|p| {
            !p.file_name()
                .map_or(false, |n| n.to_string_lossy().starts_with("~$"))
        })
        .collect();
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

pub fn ingest_folder(folder: &Path, cache: &TableCache, assembler: &DatasetAssembler) -> Ingested {
    if !folder.is_dir() {
        log_error!("INGEST", "source folder not found: {}", folder.display());
        return Ingested::Empty(EmptyReason::NoSourceFolder(folder.to_path_buf()));
    }

    let files = match list_source_files(folder) {
        Ok(files) => files,
        Err(e) => {
            log_error!("INGEST", "cannot list {}: {}", folder.display(), e);
            return Ingested::Empty(EmptyReason::NoSourceFolder(folder.to_path_buf()));
        }
    };
    if files.is_empty() {
        log_warn!("INGEST", "no source files in {}", folder.display());
        return Ingested::Empty(EmptyReason::NoSourceFiles(folder.to_path_buf()));
    }

    let start = Instant::now();
    let mut tables = Vec::with_capacity(files.len());
    for file in &files {
        match cache.get_or_load(file) {
            Ok(table) => {
                // Header-only files still contribute their columns to the union.
                if table.is_empty() {
                    log_warn!("INGEST", "{} has no rows", file.display());
                }
                tables.push(table);
            }
            Err(e) => log_warn!("INGEST", "skipping {}: {}", file.display(), e),
        }
    }
    log_info!(
        "INGEST",
        "processed {} files in {:.2}s",
        files.len(),
        start.elapsed().as_secs_f64()
    );

    let removed = cache.sweep_orphans(&files);
    if removed > 0 {
        log_info!("INGEST", "swept {} orphaned cache entries", removed);
    }

    if tables.iter().all(Table::is_empty) {
        return Ingested::Empty(EmptyReason::NoRowsLoaded);
    }
    Ingested::Loaded(assembler.assemble_and_store(&tables, cache))
}
