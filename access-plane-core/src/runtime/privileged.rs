// access-plane-core/src/runtime/privileged.rs
// ============================================================================
// Module: Access Plane Privileged Accounts
// Description: Bootstrap-file backed privileged account cache.
// Purpose: Answer the in-process half of the privileged check without I/O
//          after the first load.
// Dependencies: std, tracing
// ============================================================================

//! ## Overview
//! The bootstrap file lists privileged account ids, one per line; blank lines
//! and `#` comments are skipped. The file is read once on first use and the
//! parsed set is cached for the process lifetime. A missing file is not an
//! error and yields the empty set. `reload` replaces the cache for tests and
//! configuration pushes.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::Path;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::core::identifiers::AccountId;

// ============================================================================
// SECTION: Privileged Checker
// ============================================================================

/// Read-mostly cache of bootstrap-privileged account ids.
#[derive(Debug)]
pub struct PrivilegedChecker {
    /// Path of the bootstrap file.
    bootstrap_path: PathBuf,
    /// Parsed account set; `None` until first use.
    cache: RwLock<Option<HashSet<String>>>,
}

impl PrivilegedChecker {
    /// Creates a checker over the given bootstrap file path.
    #[must_use]
    pub fn new(bootstrap_path: impl Into<PathBuf>) -> Self {
        Self {
            bootstrap_path: bootstrap_path.into(),
            cache: RwLock::new(None),
        }
    }

    /// Returns true when the account id appears in the bootstrap file.
    ///
    /// The first call loads and caches the file; a load failure is logged and
    /// cached as the empty set so the decision path never blocks on repeated
    /// I/O errors.
    #[must_use]
    pub fn is_bootstrap_privileged(&self, account_id: &AccountId) -> bool {
        if let Ok(guard) = self.cache.read() {
            if let Some(accounts) = guard.as_ref() {
                return accounts.contains(account_id.as_str());
            }
        }

        let Ok(mut guard) = self.cache.write() else {
            return false;
        };
        if guard.is_none() {
            let accounts = match load_bootstrap_file(&self.bootstrap_path) {
                Ok(accounts) => {
                    tracing::info!(
                        path = %self.bootstrap_path.display(),
                        count = accounts.len(),
                        "loaded privileged accounts bootstrap file"
                    );
                    accounts
                }
                Err(err) => {
                    tracing::warn!(
                        path = %self.bootstrap_path.display(),
                        error = %err,
                        "failed to load privileged accounts bootstrap file"
                    );
                    HashSet::new()
                }
            };
            *guard = Some(accounts);
        }
        guard.as_ref().is_some_and(|accounts| accounts.contains(account_id.as_str()))
    }

    /// Forces a re-read of the bootstrap file, replacing the cache.
    ///
    /// # Errors
    ///
    /// Returns an [`io::Error`] when the file exists but cannot be read.
    pub fn reload(&self) -> io::Result<usize> {
        let accounts = load_bootstrap_file(&self.bootstrap_path)?;
        let count = accounts.len();
        if let Ok(mut guard) = self.cache.write() {
            *guard = Some(accounts);
        }
        Ok(count)
    }

    /// Returns the cached bootstrap accounts, loading the file on first use.
    /// Intended for diagnostics.
    #[must_use]
    pub fn bootstrap_accounts(&self) -> Vec<String> {
        // Touch the cache so diagnostics see the same view the checks do.
        let _ = self.is_bootstrap_privileged(&AccountId::new(""));
        match self.cache.read() {
            Ok(guard) => guard
                .as_ref()
                .map(|accounts| {
                    let mut list: Vec<String> = accounts.iter().cloned().collect();
                    list.sort();
                    list
                })
                .unwrap_or_default(),
            Err(_) => Vec::new(),
        }
    }
}

// ============================================================================
// SECTION: File Parsing
// ============================================================================

/// Parses the bootstrap file; a missing file yields the empty set.
fn load_bootstrap_file(path: &Path) -> io::Result<HashSet<String>> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            tracing::info!(
                path = %path.display(),
                "privileged accounts bootstrap file not found, using empty set"
            );
            return Ok(HashSet::new());
        }
        Err(err) => return Err(err),
    };

    let mut accounts = HashSet::new();
    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        accounts.insert(line.to_string());
    }
    Ok(accounts)
}
