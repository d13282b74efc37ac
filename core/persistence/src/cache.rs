//! FILENAME: core/persistence/src/cache.rs
//! PURPOSE: Per-source-file table cache with modification-time staleness.
//! CONTEXT: Each entry is a small ZIP archive holding `meta.json` and
//! `table.json`, stored under `<root>/individual_files/<stem>.tblz`. An entry is
//! valid only while its own mtime is strictly newer than the source file's.
//! Unreadable entries are treated as misses. One writer per cache folder.

use crate::loader::TableLoader;
use crate::PersistenceError;
use dataset::{log_debug, log_info, log_warn, normalize, Table};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Sub-folder holding one entry per source file.
pub const INDIVIDUAL_DIR: &str = "individual_files";

/// File stem of the combined dataset entry.
pub const COMBINED_STEM: &str = "combined_data";

/// Extension used for cache entries.
pub const ENTRY_EXTENSION: &str = "tblz";

const META_FILE: &str = "meta.json";
const TABLE_FILE: &str = "table.json";
const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct EntryMeta {
    version: u32,
    source: String,
    rows: usize,
}

// ============================================================================
// ENTRY ENCODING
// ============================================================================

/// Writes `table` as a cache entry at `path`, replacing any existing entry.
pub fn write_entry(path: &Path, source: &str, table: &Table) -> Result<(), PersistenceError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let tmp_path = path.with_extension(format!("{}.tmp", ENTRY_EXTENSION));
    {
        let file = File::create(&tmp_path)?;
        let mut zip = ZipWriter::new(BufWriter::new(file));
        let options = FileOptions::<()>::default().compression_method(CompressionMethod::Deflated);

        let meta = EntryMeta {
            version: FORMAT_VERSION,
            source: source.to_string(),
            rows: table.row_count(),
        };
        zip.start_file(META_FILE, options)?;
        zip.write_all(&serde_json::to_vec(&meta)?)?;

        zip.start_file(TABLE_FILE, options)?;
        serde_json::to_writer(&mut zip, table)?;

        let mut writer = zip.finish()?;
        writer.flush()?;
    }
    fs::rename(&tmp_path, path)?;
    Ok(())
}

/// Reads a cache entry written by `write_entry`.
pub fn read_entry(path: &Path) -> Result<Table, PersistenceError> {
    let file = File::open(path)?;
    let mut archive = ZipArchive::new(BufReader::new(file))?;

    let meta: EntryMeta = {
        let mut contents = String::new();
        archive.by_name(META_FILE)?.read_to_string(&mut contents)?;
        serde_json::from_str(&contents)?
    };
    if meta.version != FORMAT_VERSION {
        return Err(PersistenceError::InvalidCacheEntry(format!(
            "{}: format version {} (expected {})",
            path.display(),
            meta.version,
            FORMAT_VERSION
        )));
    }

    let table: Table = {
        let entry = archive.by_name(TABLE_FILE)?;
        serde_json::from_reader(BufReader::new(entry))?
    };
    if table.row_count() != meta.rows {
        return Err(PersistenceError::InvalidCacheEntry(format!(
            "{}: {} rows stored, {} expected",
            path.display(),
            table.row_count(),
            meta.rows
        )));
    }
    Ok(table)
}

fn modified(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|m| m.modified()).ok()
}

fn file_stem(path: &Path) -> Option<String> {
    path.file_stem().map(|s| s.to_string_lossy().into_owned())
}

// ============================================================================
// TABLE CACHE
// ============================================================================

#[derive(Debug, Clone)]
pub struct TableCache {
    root: PathBuf,
    loader: TableLoader,
}

impl TableCache {
    pub fn new(root: impl Into<PathBuf>, loader: TableLoader) -> Self {
        TableCache {
            root: root.into(),
            loader,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn loader(&self) -> &TableLoader {
        &self.loader
    }

    /// Entry path for a source file, keyed by its base name without extension.
    /// Sources differing only in extension share an entry.
    pub fn entry_path(&self, source: &Path) -> PathBuf {
        let stem = file_stem(source).unwrap_or_default();
        self.root
            .join(INDIVIDUAL_DIR)
            .join(format!("{}.{}", stem, ENTRY_EXTENSION))
    }

    pub fn combined_path(&self) -> PathBuf {
        self.root.join(format!("{}.{}", COMBINED_STEM, ENTRY_EXTENSION))
    }

    /// True iff an entry exists and its mtime is strictly newer than the source's.
    pub fn is_valid(&self, source: &Path) -> bool {
        match (modified(&self.entry_path(source)), modified(source)) {
            (Some(entry), Some(src)) => entry > src,
            _ => false,
        }
    }

    /// Returns the cached table for `source`, reloading and re-caching it when
    /// the entry is missing, stale or unreadable. Cached tables are normalized
    /// again on the way out.
    pub fn get_or_load(&self, source: &Path) -> Result<Table, PersistenceError> {
        let entry = self.entry_path(source);
        let name = source.display().to_string();

        if self.is_valid(source) {
            match read_entry(&entry) {
                Ok(table) => {
                    log_debug!("CACHE", "hit {}", name);
                    return Ok(normalize(table));
                }
                Err(e) => {
                    log_warn!("CACHE", "unreadable entry for {}, reloading: {}", name, e);
                }
            }
        }

        let table = self.loader.load(source)?;
        match write_entry(&entry, &name, &table) {
            Ok(()) => log_info!("CACHE", "cached {} ({} rows)", name, table.row_count()),
            Err(e) => log_warn!("CACHE", "failed to cache {}: {}", name, e),
        }
        Ok(table)
    }

    /// Removes entries whose key matches none of `known_sources`.
    /// Returns the number of entries removed.
    pub fn sweep_orphans(&self, known_sources: &[PathBuf]) -> usize {
        let dir = self.root.join(INDIVIDUAL_DIR);
        let Ok(read_dir) = fs::read_dir(&dir) else {
            return 0;
        };

        let known: HashSet<String> = known_sources.iter().filter_map(|p| file_stem(p)).collect();
        let mut removed = 0;

        for entry in read_dir.flatten() {
            let path = entry.path();
            let is_entry = path
                .extension()
                .map_or(false, |e| e == ENTRY_EXTENSION);
            if !is_entry {
                continue;
            }
            let Some(stem) = file_stem(&path) else {
                continue;
            };
            if known.contains(&stem) {
                continue;
            }
            match fs::remove_file(&path) {
                Ok(()) => {
                    removed += 1;
                    log_info!("CACHE", "removed orphaned entry {}", path.display());
                }
                Err(e) => log_warn!("CACHE", "failed to remove {}: {}", path.display(), e),
            }
        }
        removed
    }

    /// Persists the combined dataset.
    pub fn store_combined(&self, table: &Table) -> Result<(), PersistenceError> {
        write_entry(&self.combined_path(), COMBINED_STEM, table)
    }

    /// Reads the combined dataset, if a readable one exists.
    pub fn load_combined(&self) -> Option<Table> {
        let path = self.combined_path();
        if !path.exists() {
            return None;
        }
        match read_entry(&path) {
            Ok(table) => Some(normalize(table)),
            Err(e) => {
                log_warn!("CACHE", "combined entry unreadable: {}", e);
                None
            }
        }
    }
}
