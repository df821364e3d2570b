// access-plane-config/src/config.rs
// ============================================================================
// Module: Access Plane Configuration
// Description: Configuration loading and validation.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: access-plane-core, serde, toml, url
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file whose path comes from the
//! `ACCESS_PLANE_CONFIG` environment variable or the default filename in the
//! working directory. A missing file yields the defaults; a present file must
//! parse and validate completely. Setting `evaluator_endpoint` selects the
//! local HTTP evaluator adapter instead of the hosted one.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use access_plane_core::runtime::engine::AuthorizerConfig;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;
use url::Url;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "access-plane.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "ACCESS_PLANE_CONFIG";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: u64 = 1024 * 1024;
/// Maximum length of a store table name.
pub(crate) const MAX_TABLE_NAME_LENGTH: usize = 255;
/// Minimum allowed backend call timeout in milliseconds.
pub(crate) const MIN_CALL_TIMEOUT_MS: u64 = 100;
/// Maximum allowed backend call timeout in milliseconds.
pub(crate) const MAX_CALL_TIMEOUT_MS: u64 = 60_000;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config file {path}: {reason}")]
    Io {
        /// Offending path.
        path: PathBuf,
        /// Underlying reason.
        reason: String,
    },
    /// The config file exceeds the size limit.
    #[error("config file {path} exceeds {limit} bytes")]
    TooLarge {
        /// Offending path.
        path: PathBuf,
        /// Size limit in bytes.
        limit: u64,
    },
    /// The config file failed to parse.
    #[error("failed to parse config file {path}: {reason}")]
    Parse {
        /// Offending path.
        path: PathBuf,
        /// Parser message.
        reason: String,
    },
    /// A configuration value is invalid.
    #[error("invalid config value for {field}: {reason}")]
    Invalid {
        /// Offending field.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
}

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// Process-wide configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Cloud region for the hosted evaluator and the durable store.
    #[serde(default = "default_region")]
    pub region: String,
    /// Path of the privileged-accounts bootstrap file.
    #[serde(default = "default_privileged_accounts_file")]
    pub privileged_accounts_file: PathBuf,
    /// When false the pipeline returns `Allow` unconditionally.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Local HTTP evaluator endpoint; when set the local adapter is used.
    #[serde(default)]
    pub evaluator_endpoint: Option<String>,
    /// Durable store table names, one per entity.
    #[serde(default)]
    pub tables: TableNames,
    /// Backend call deadlines.
    #[serde(default)]
    pub timeouts: Timeouts,
}

/// Store table names, one per entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TableNames {
    /// Account rows.
    #[serde(default = "default_accounts_table")]
    pub accounts: String,
    /// Admin membership rows.
    #[serde(default = "default_admins_table")]
    pub admins: String,
    /// Group rows.
    #[serde(default = "default_groups_table")]
    pub groups: String,
    /// Group membership rows.
    #[serde(default = "default_members_table")]
    pub members: String,
    /// Policy template rows.
    #[serde(default = "default_policies_table")]
    pub policies: String,
    /// Attachment rows.
    #[serde(default = "default_attachments_table")]
    pub attachments: String,
}

/// Backend call deadlines in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Timeouts {
    /// Deadline for durable store calls.
    #[serde(default = "default_store_timeout_ms")]
    pub store_ms: u64,
    /// Deadline for evaluator calls.
    #[serde(default = "default_evaluator_timeout_ms")]
    pub evaluator_ms: u64,
}

// ============================================================================
// SECTION: Defaults
// ============================================================================

fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_privileged_accounts_file() -> PathBuf {
    PathBuf::from("/etc/access-plane/privileged-accounts.txt")
}

const fn default_enabled() -> bool {
    true
}

fn default_accounts_table() -> String {
    "access-plane-accounts".to_string()
}

fn default_admins_table() -> String {
    "access-plane-admins".to_string()
}

fn default_groups_table() -> String {
    "access-plane-groups".to_string()
}

fn default_members_table() -> String {
    "access-plane-group-members".to_string()
}

fn default_policies_table() -> String {
    "access-plane-policies".to_string()
}

fn default_attachments_table() -> String {
    "access-plane-attachments".to_string()
}

const fn default_store_timeout_ms() -> u64 {
    2_000
}

const fn default_evaluator_timeout_ms() -> u64 {
    5_000
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            region: default_region(),
            privileged_accounts_file: default_privileged_accounts_file(),
            enabled: default_enabled(),
            evaluator_endpoint: None,
            tables: TableNames::default(),
            timeouts: Timeouts::default(),
        }
    }
}

impl Default for TableNames {
    fn default() -> Self {
        Self {
            accounts: default_accounts_table(),
            admins: default_admins_table(),
            groups: default_groups_table(),
            members: default_members_table(),
            policies: default_policies_table(),
            attachments: default_attachments_table(),
        }
    }
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            store_ms: default_store_timeout_ms(),
            evaluator_ms: default_evaluator_timeout_ms(),
        }
    }
}

// ============================================================================
// SECTION: Loading
// ============================================================================

impl AppConfig {
    /// Loads configuration from the environment-selected path, falling back
    /// to defaults when no file exists.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a present file cannot be read, parsed, or
    /// validated.
    pub fn load() -> Result<Self, ConfigError> {
        let path = env::var_os(CONFIG_ENV_VAR)
            .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_NAME), PathBuf::from);
        if !path.exists() {
            let config = Self::default();
            config.validate()?;
            return Ok(config);
        }
        Self::load_from_path(&path)
    }

    /// Loads and validates configuration from an explicit path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file cannot be read, parsed, or
    /// validated.
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let metadata = fs::metadata(path).map_err(|err| ConfigError::Io {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })?;
        if metadata.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::TooLarge {
                path: path.to_path_buf(),
                limit: MAX_CONFIG_FILE_SIZE,
            });
        }

        let contents = fs::read_to_string(path).map_err(|err| ConfigError::Io {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })?;
        let config: Self = toml::from_str(&contents).map_err(|err| ConfigError::Parse {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Validates configuration invariants.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] on the first violated invariant.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.region.is_empty() {
            return Err(ConfigError::Invalid {
                field: "region",
                reason: "must not be empty".to_string(),
            });
        }
        if self.privileged_accounts_file.as_os_str().is_empty() {
            return Err(ConfigError::Invalid {
                field: "privileged_accounts_file",
                reason: "must not be empty".to_string(),
            });
        }

        if let Some(endpoint) = &self.evaluator_endpoint {
            let url = Url::parse(endpoint).map_err(|err| ConfigError::Invalid {
                field: "evaluator_endpoint",
                reason: err.to_string(),
            })?;
            if url.scheme() != "http" && url.scheme() != "https" {
                return Err(ConfigError::Invalid {
                    field: "evaluator_endpoint",
                    reason: format!("unsupported scheme: {}", url.scheme()),
                });
            }
        }

        validate_table_name("tables.accounts", &self.tables.accounts)?;
        validate_table_name("tables.admins", &self.tables.admins)?;
        validate_table_name("tables.groups", &self.tables.groups)?;
        validate_table_name("tables.members", &self.tables.members)?;
        validate_table_name("tables.policies", &self.tables.policies)?;
        validate_table_name("tables.attachments", &self.tables.attachments)?;

        validate_timeout("timeouts.store_ms", self.timeouts.store_ms)?;
        validate_timeout("timeouts.evaluator_ms", self.timeouts.evaluator_ms)?;

        Ok(())
    }

    /// Projects the engine-facing configuration.
    #[must_use]
    pub fn authorizer_config(&self) -> AuthorizerConfig {
        AuthorizerConfig {
            enabled: self.enabled,
        }
    }
}

// ============================================================================
// SECTION: Field Validation
// ============================================================================

/// Validates a store table name.
fn validate_table_name(field: &'static str, name: &str) -> Result<(), ConfigError> {
    if name.is_empty() {
        return Err(ConfigError::Invalid {
            field,
            reason: "must not be empty".to_string(),
        });
    }
    if name.len() > MAX_TABLE_NAME_LENGTH {
        return Err(ConfigError::Invalid {
            field,
            reason: format!("exceeds {MAX_TABLE_NAME_LENGTH} characters"),
        });
    }
    if !name.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-')) {
        return Err(ConfigError::Invalid {
            field,
            reason: "contains characters outside [A-Za-z0-9._-]".to_string(),
        });
    }
    Ok(())
}

/// Validates a backend call timeout.
fn validate_timeout(field: &'static str, value: u64) -> Result<(), ConfigError> {
    if !(MIN_CALL_TIMEOUT_MS..=MAX_CALL_TIMEOUT_MS).contains(&value) {
        return Err(ConfigError::Invalid {
            field,
            reason: format!(
                "must be between {MIN_CALL_TIMEOUT_MS} and {MAX_CALL_TIMEOUT_MS} milliseconds"
            ),
        });
    }
    Ok(())
}
