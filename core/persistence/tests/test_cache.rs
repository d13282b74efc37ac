//! FILENAME: core/persistence/tests/test_cache.rs
//! Integration tests for cache staleness, corruption recovery and orphan sweep.

mod common;

use common::{base_time, secs, set_mtime, write_file, SALES_CSV};
use dataset::CellValue;
use persistence::{write_entry, TableCache, TableLoader};
use std::fs;
use tempfile::TempDir;

fn setup() -> (TempDir, TableCache) {
    let dir = TempDir::new().unwrap();
    let cache = TableCache::new(dir.path().join("cache"), TableLoader::default());
    (dir, cache)
}

/// Replaces the cache entry with a marker table so a cache hit is observable.
fn plant_marker(cache: &TableCache, source: &std::path::Path) {
    let mut marker = dataset::Table::new(vec!["Marker".into()]);
    marker.push_row(vec![CellValue::text(" cached ")]);
    write_entry(&cache.entry_path(source), "marker", &marker).unwrap();
}

#[test]
fn test_first_load_creates_entry() {
    let (dir, cache) = setup();
    let source = write_file(dir.path(), "sales.csv", SALES_CSV);

    let table = cache.get_or_load(&source).unwrap();
    assert_eq!(table.row_count(), 4);
    assert!(cache.entry_path(&source).exists());
}

#[test]
fn test_newer_entry_is_used_and_renormalized() {
    let (dir, cache) = setup();
    let source = write_file(dir.path(), "sales.csv", SALES_CSV);
    plant_marker(&cache, &source);

    set_mtime(&source, base_time());
    set_mtime(&cache.entry_path(&source), base_time() + secs(10));

    let table = cache.get_or_load(&source).unwrap();
    assert_eq!(table.columns(), &["Marker"]);
    assert_eq!(table.value(0, "Marker"), &CellValue::text("cached"));
}

#[test]
fn test_newer_source_reloads() {
    let (dir, cache) = setup();
    let source = write_file(dir.path(), "sales.csv", SALES_CSV);
    plant_marker(&cache, &source);

    set_mtime(&cache.entry_path(&source), base_time());
    set_mtime(&source, base_time() + secs(10));

    let table = cache.get_or_load(&source).unwrap();
    assert!(table.has_column("Category"));
    assert!(!table.has_column("Marker"));

    // The stale entry was regenerated from source.
    let entry = persistence::read_entry(&cache.entry_path(&source)).unwrap();
    assert!(entry.has_column("Category"));
}

#[test]
fn test_equal_mtimes_reload() {
    let (dir, cache) = setup();
    let source = write_file(dir.path(), "sales.csv", SALES_CSV);
    plant_marker(&cache, &source);

    set_mtime(&source, base_time());
    set_mtime(&cache.entry_path(&source), base_time());

    assert!(!cache.is_valid(&source));
    let table = cache.get_or_load(&source).unwrap();
    assert!(table.has_column("Category"));
}

#[test]
fn test_corrupt_entry_falls_back_to_source() {
    let (dir, cache) = setup();
    let source = write_file(dir.path(), "sales.csv", SALES_CSV);
    let entry = cache.entry_path(&source);
    fs::create_dir_all(entry.parent().unwrap()).unwrap();
    fs::write(&entry, b"definitely not an archive").unwrap();

    set_mtime(&source, base_time());
    set_mtime(&entry, base_time() + secs(10));

    let table = cache.get_or_load(&source).unwrap();
    assert_eq!(table.row_count(), 4);
    // The entry was rewritten with a readable archive.
    assert!(persistence::read_entry(&entry).is_ok());
}

#[test]
fn test_sweep_removes_only_orphans() {
    let (dir, cache) = setup();
    let keep = write_file(dir.path(), "keep.csv", SALES_CSV);
    let gone = write_file(dir.path(), "gone.csv", SALES_CSV);
    cache.get_or_load(&keep).unwrap();
    cache.get_or_load(&gone).unwrap();
    fs::remove_file(&gone).unwrap();

    let removed = cache.sweep_orphans(&[keep.clone()]);
    assert_eq!(removed, 1);
    assert!(cache.entry_path(&keep).exists());
    assert!(!cache.entry_path(&gone).exists());
}

#[test]
fn test_sweep_without_cache_folder_is_noop() {
    let (_dir, cache) = setup();
    assert_eq!(cache.sweep_orphans(&[]), 0);
}
