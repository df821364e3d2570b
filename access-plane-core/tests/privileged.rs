// access-plane-core/tests/privileged.rs
// ============================================================================
// Module: Privileged Checker Tests
// Description: Bootstrap file parsing and cache lifecycle.
// Purpose: Pin comment/blank handling, the missing-file case, and reload.
// Dependencies: access-plane-core, tempfile
// ============================================================================
//! ## Overview
//! Validates the bootstrap-file cache: parsing rules, the
//! missing-file-is-empty behavior, load-once caching, and explicit reload.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Test-only panic-based assertions are permitted."
)]

use std::fs;
use std::io::Write;

use access_plane_core::core::identifiers::AccountId;
use access_plane_core::runtime::privileged::PrivilegedChecker;

// ============================================================================
// SECTION: Parsing
// ============================================================================

/// Comments, blank lines, and surrounding whitespace are ignored.
#[test]
fn bootstrap_file_parsing() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(file, "# privileged accounts").unwrap();
    writeln!(file).unwrap();
    writeln!(file, "111122223333").unwrap();
    writeln!(file, "  444455556666  ").unwrap();
    writeln!(file, "# trailing comment").unwrap();
    file.flush().unwrap();

    let checker = PrivilegedChecker::new(file.path());
    assert!(checker.is_bootstrap_privileged(&AccountId::new("111122223333")));
    assert!(checker.is_bootstrap_privileged(&AccountId::new("444455556666")));
    assert!(!checker.is_bootstrap_privileged(&AccountId::new("999999999999")));
    assert_eq!(checker.bootstrap_accounts(), vec!["111122223333", "444455556666"]);
}

/// A missing file is not an error and yields the empty set.
#[test]
fn missing_file_is_empty_set() {
    let dir = tempfile::tempdir().expect("temp dir");
    let checker = PrivilegedChecker::new(dir.path().join("does-not-exist.txt"));
    assert!(!checker.is_bootstrap_privileged(&AccountId::new("111122223333")));
    assert!(checker.bootstrap_accounts().is_empty());
}

// ============================================================================
// SECTION: Cache Lifecycle
// ============================================================================

/// The file is read once; later edits are invisible until reload.
#[test]
fn cache_is_loaded_once_and_reloadable() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("privileged-accounts.txt");
    fs::write(&path, "111122223333\n").unwrap();

    let checker = PrivilegedChecker::new(&path);
    assert!(checker.is_bootstrap_privileged(&AccountId::new("111122223333")));

    fs::write(&path, "999999999999\n").unwrap();
    assert!(checker.is_bootstrap_privileged(&AccountId::new("111122223333")));
    assert!(!checker.is_bootstrap_privileged(&AccountId::new("999999999999")));

    let count = checker.reload().expect("reload succeeds");
    assert_eq!(count, 1);
    assert!(!checker.is_bootstrap_privileged(&AccountId::new("111122223333")));
    assert!(checker.is_bootstrap_privileged(&AccountId::new("999999999999")));
}
