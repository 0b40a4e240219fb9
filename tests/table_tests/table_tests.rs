//! Tests for Table
//!
//! These tests verify:
//! - Basic put/get/len operations
//! - In-memory mode
//! - Close semantics
//! - Key validation
//! - Concurrent access patterns

use std::collections::BTreeSet;
use std::ffi::OsString;
use std::path::Path;
use std::sync::Arc;
use std::thread;

use logtable::{Config, Table, TableError};
use tempfile::TempDir;

use crate::init_tracing;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_temp_table() -> (TempDir, Table) {
    init_tracing();
    let temp_dir = TempDir::new().unwrap();
    let table = Table::open(temp_dir.path().join("table.log"), 50).unwrap();
    (temp_dir, table)
}

fn get(table: &Table, key: &[u8]) -> Option<Vec<u8>> {
    table.get(key).map(|v| v.to_vec())
}

fn dir_entries(dir: &Path) -> BTreeSet<OsString> {
    std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .collect()
}

// =============================================================================
// Basic Operations Tests
// =============================================================================

#[test]
fn test_table_open_creates_log() {
    let temp_dir = TempDir::new().unwrap();
    let log_path = temp_dir.path().join("table.log");

    let table = Table::open(&log_path, 0).unwrap();

    assert!(log_path.exists());
    assert!(table.is_persistent());
    assert!(table.is_open());
    assert_eq!(table.path(), Some(log_path.as_path()));
    assert!(table.is_empty());
}

#[test]
fn test_table_put_get() {
    let (_temp, table) = setup_temp_table();

    table.put(b"a", b"val").unwrap();

    assert_eq!(get(&table, b"a"), Some(b"val".to_vec()));
}

#[test]
fn test_table_get_nonexistent_key() {
    let (_temp, table) = setup_temp_table();

    assert_eq!(table.get(b"nonexistent"), None);
    assert!(!table.contains_key(b"nonexistent"));
}

#[test]
fn test_table_put_overwrite() {
    let (_temp, table) = setup_temp_table();

    table.put(b"a", b"val").unwrap();
    table.put(b"a", b"val2").unwrap();

    assert_eq!(get(&table, b"a"), Some(b"val2".to_vec()));
    assert_eq!(table.len(), 1);
}

#[test]
fn test_table_len_counts_distinct_keys() {
    let (_temp, table) = setup_temp_table();

    for round in 0..3 {
        for i in 0..10 {
            table
                .put(format!("key{}", i).as_bytes(), format!("v{}", round).as_bytes())
                .unwrap();
        }
    }

    assert_eq!(table.len(), 10);
}

#[test]
fn test_table_empty_value() {
    let (_temp, table) = setup_temp_table();

    table.put(b"key", b"").unwrap();

    assert_eq!(get(&table, b"key"), Some(Vec::new()));
}

#[test]
fn test_table_binary_data() {
    let (_temp, table) = setup_temp_table();

    let key = b"\x00\x01\x02\xFF\xFE";
    let value = b"\xFF\x00\x1f\x7f\x00";

    table.put(key, value).unwrap();
    assert_eq!(get(&table, key), Some(value.to_vec()));
}

#[test]
fn test_table_large_value() {
    let (_temp, table) = setup_temp_table();

    let large_value = vec![0xAB; 100_000];
    table.put(b"large_key", &large_value).unwrap();

    assert_eq!(get(&table, b"large_key"), Some(large_value));
}

// =============================================================================
// Key Validation Tests
// =============================================================================

#[test]
fn test_table_rejects_invalid_keys() {
    let (_temp, table) = setup_temp_table();

    let keys: [&[u8]; 3] = [b"", b"a\x1fb", b"\x7fkey"];
    for key in keys {
        let err = table.put(key, b"value").unwrap_err();
        assert!(matches!(err, TableError::InvalidKey(_)));
    }

    assert!(table.is_empty());
    assert_eq!(table.log_len(), 0);
}

// =============================================================================
// In-Memory Mode Tests
// =============================================================================

#[test]
fn test_in_memory_put_get() {
    let table = Table::open("", 50).unwrap();

    table.put(b"a", b"val").unwrap();
    table.put(b"a", b"val2").unwrap();
    table.put(b"b", b"other").unwrap();

    assert!(!table.is_persistent());
    assert_eq!(table.path(), None);
    assert_eq!(get(&table, b"a"), Some(b"val2".to_vec()));
    assert_eq!(table.len(), 2);
    assert!(table.recovery_stats().is_none());
}

#[test]
fn test_in_memory_close_is_noop() {
    let table = Table::in_memory(0);

    table.put(b"a", b"val").unwrap();
    table.close().unwrap();
    table.close().unwrap();

    // Still writable after close
    table.put(b"b", b"val").unwrap();
    assert_eq!(table.len(), 2);
    assert!(table.is_open());
}

#[test]
fn test_in_memory_touches_no_files() {
    let cwd = std::env::current_dir().unwrap();
    let before = dir_entries(&cwd);

    let table = Table::open("", 8).unwrap();
    table.put(b"a", b"val").unwrap();
    table.put(b"a", b"val2").unwrap();
    table.close().unwrap();

    // An empty path must not resolve to a log or swap file anywhere
    assert!(!Path::new(".swp").exists());
    assert!(!cwd.join(".swp").exists());
    assert_eq!(dir_entries(&cwd), before);
    assert_eq!(table.log_len(), 0);
}

#[test]
fn test_in_memory_config_touches_no_files() {
    let config = Config::builder().in_memory().initial_capacity(8).build();
    assert!(!config.is_persistent());

    let table = Table::open_with_config(config).unwrap();
    table.put(b"a", b"val").unwrap();
    table.close().unwrap();

    assert_eq!(table.path(), None);
    assert_eq!(table.log_len(), 0);
}

// =============================================================================
// Close Tests
// =============================================================================

#[test]
fn test_put_after_close_fails() {
    let (_temp, table) = setup_temp_table();
    table.put(b"a", b"val").unwrap();

    table.close().unwrap();

    let err = table.put(b"b", b"val").unwrap_err();
    assert!(err.is_not_open());
    assert!(!table.is_open());
}

#[test]
fn test_overwrite_after_close_fails_without_change() {
    let (_temp, table) = setup_temp_table();
    table.put(b"a", b"val").unwrap();
    table.close().unwrap();

    assert!(table.put(b"a", b"new").unwrap_err().is_not_open());
    assert_eq!(get(&table, b"a"), Some(b"val".to_vec()));
}

#[test]
fn test_reads_after_close() {
    let (_temp, table) = setup_temp_table();
    table.put(b"a", b"1").unwrap();
    table.put(b"b", b"2").unwrap();

    table.close().unwrap();

    assert_eq!(get(&table, b"a"), Some(b"1".to_vec()));
    assert_eq!(table.len(), 2);
}

#[test]
fn test_double_close_fails() {
    let (_temp, table) = setup_temp_table();

    table.close().unwrap();

    assert!(table.close().unwrap_err().is_not_open());
}

// =============================================================================
// Concurrent Access Tests
// =============================================================================

#[test]
fn test_table_concurrent_reads() {
    let (_temp, table) = setup_temp_table();
    let table = Arc::new(table);

    for i in 0..100 {
        table
            .put(format!("key{}", i).as_bytes(), format!("value{}", i).as_bytes())
            .unwrap();
    }

    let mut handles = vec![];
    for _ in 0..4 {
        let table_clone = Arc::clone(&table);
        handles.push(thread::spawn(move || {
            for i in 0..100 {
                let key = format!("key{}", i);
                let expected = format!("value{}", i);
                assert_eq!(get(&table_clone, key.as_bytes()), Some(expected.into_bytes()));
            }
        }));
    }

    for handle in handles {
        handle.join().unwrap();
    }
}

#[test]
fn test_table_concurrent_writes() {
    let (_temp, table) = setup_temp_table();
    let table = Arc::new(table);

    let mut handles = vec![];
    for t in 0..4 {
        let table_clone = Arc::clone(&table);
        handles.push(thread::spawn(move || {
            for i in 0..25 {
                let key = format!("thread{}_key{}", t, i);
                let value = format!("thread{}_value{}", t, i);
                table_clone.put(key.as_bytes(), value.as_bytes()).unwrap();
            }
        }));
    }

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(table.len(), 100);
    for t in 0..4 {
        for i in 0..25 {
            let key = format!("thread{}_key{}", t, i);
            let expected = format!("thread{}_value{}", t, i);
            assert_eq!(get(&table, key.as_bytes()), Some(expected.into_bytes()));
        }
    }
}

#[test]
fn test_concurrent_overwrites_same_key() {
    let (_temp, table) = setup_temp_table();
    let table = Arc::new(table);

    let mut handles = vec![];
    for t in 0..4 {
        let table_clone = Arc::clone(&table);
        handles.push(thread::spawn(move || {
            for i in 0..20 {
                table_clone
                    .put(b"shared", format!("{}-{}", t, i).as_bytes())
                    .unwrap();
            }
        }));
    }

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(table.len(), 1);
    let path = table.path().unwrap().to_path_buf();
    let last = get(&table, b"shared").unwrap();
    table.close().unwrap();

    // Exactly one live record survives, and it matches what readers saw
    let reopened = Table::open(&path, 0).unwrap();
    assert_eq!(get(&reopened, b"shared"), Some(last));
    let stats = reopened.recovery_stats().unwrap();
    assert_eq!(stats.records_kept, 1);
    assert_eq!(stats.tombstones_dropped, 79);
}
