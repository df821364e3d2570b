// access-plane-core/src/core/validation.rs
// ============================================================================
// Module: Access Plane Policy Validation
// Description: Structural and semantic validation of v0 policy documents.
// Purpose: Reject invalid documents with structured field paths, collecting
//          every error before returning.
// Dependencies: crate::core::policy, crate::translate
// ============================================================================

//! ## Overview
//! Validation walks the whole document and collects every issue instead of
//! stopping at the first. Condition values are checked by running the
//! translator's own condition lowering, so a document that validates is
//! guaranteed to translate.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashSet;
use std::fmt;

use crate::core::policy::DOCUMENT_VERSION;
use crate::core::policy::Effect;
use crate::core::policy::PolicyDocument;
use crate::core::policy::Statement;
use crate::translate::conditions::is_supported_operator;
use crate::translate::conditions::lower_condition;

// ============================================================================
// SECTION: Condition Key Families
// ============================================================================

/// Condition keys recognized exactly.
const EXACT_CONDITION_KEYS: &[&str] =
    &["rosa:TagKeys", "aws:PrincipalArn", "aws:PrincipalAccount", "rosa:principalArn"];

/// Condition key prefixes recognized with a non-empty tag suffix.
const PREFIX_CONDITION_KEYS: &[&str] = &["rosa:ResourceTag/", "rosa:RequestTag/"];

/// Namespaces admitted for plain namespaced scalar keys.
const SCALAR_KEY_NAMESPACES: &[&str] = &["aws", "rosa"];

// ============================================================================
// SECTION: Validation Results
// ============================================================================

/// A single validation issue with a structured field path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    /// Path of the offending field, e.g. `statements[2].conditions.StringLike`.
    pub field: String,
    /// Human-readable message.
    pub message: String,
}

impl ValidationIssue {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// The collected outcome of validating one document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    /// All issues found, in document order.
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    /// Returns true when no issues were found.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }

    /// Converts the report into a result, consuming the issues.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] when any issue was collected.
    pub fn into_result(self) -> Result<(), ValidationError> {
        if self.issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError {
                issues: self.issues,
            })
        }
    }

    fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.issues.push(ValidationIssue::new(field, message));
    }
}

/// Validation failure carrying every collected issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// All issues found, in document order.
    pub issues: Vec<ValidationIssue>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "policy validation failed: ")?;
        for (index, issue) in self.issues.iter().enumerate() {
            if index > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{issue}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

// ============================================================================
// SECTION: Document Validation
// ============================================================================

/// Validates a v0 policy document, collecting all issues.
#[must_use]
pub fn validate_document(document: &PolicyDocument) -> ValidationReport {
    let mut report = ValidationReport::default();

    if document.version != DOCUMENT_VERSION && !document.version.is_empty() {
        report.push(
            "version",
            format!("unsupported version: {} (expected v0 or empty)", document.version),
        );
    }

    if document.statements.is_empty() {
        report.push("statements", "at least one statement is required");
    }

    let mut seen_sids = HashSet::new();
    for (index, statement) in document.statements.iter().enumerate() {
        validate_statement(statement, index, &mut seen_sids, &mut report);
    }

    report
}

/// Validates a single statement.
fn validate_statement(
    statement: &Statement,
    index: usize,
    seen_sids: &mut HashSet<String>,
    report: &mut ValidationReport,
) {
    let prefix = format!("statements[{index}]");

    if let Some(sid) = &statement.sid {
        if !seen_sids.insert(sid.clone()) {
            report.push(format!("{prefix}.sid"), format!("duplicate sid: {sid}"));
        }
    }

    if statement.effect == Effect::Other {
        report.push(format!("{prefix}.effect"), "invalid effect (must be Allow or Deny)");
    }

    if statement.actions.is_empty() {
        report.push(format!("{prefix}.actions"), "at least one action is required");
    }
    for (position, action) in statement.actions.iter().enumerate() {
        if !is_valid_action(action) {
            report.push(
                format!("{prefix}.actions[{position}]"),
                format!("invalid action format: {action}"),
            );
        }
    }

    if statement.resources.is_empty() {
        report.push(format!("{prefix}.resources"), "at least one resource is required");
    }
    for (position, resource) in statement.resources.iter().enumerate() {
        if !is_valid_resource(resource) {
            report.push(
                format!("{prefix}.resources[{position}]"),
                format!("invalid resource format: {resource}"),
            );
        }
    }

    for (operator, entries) in &statement.conditions {
        if !is_supported_operator(operator) {
            report.push(
                format!("{prefix}.conditions"),
                format!("unsupported condition operator: {operator}"),
            );
            continue;
        }

        for (key, value) in entries {
            if !is_recognized_condition_key(key) {
                report.push(
                    format!("{prefix}.conditions.{operator}"),
                    format!("unsupported condition key: {key}"),
                );
                continue;
            }

            // The translator is the authority on value shapes; a value it
            // cannot lower is a validation error here.
            if let Err(err) = lower_condition(operator, key, value) {
                report.push(format!("{prefix}.conditions.{operator}"), err.to_string());
            }
        }
    }
}

// ============================================================================
// SECTION: Pattern Checks
// ============================================================================

/// Checks the `*` / `rosa:Name` / `rosa:Name*` action shapes.
fn is_valid_action(action: &str) -> bool {
    if action == "*" {
        return true;
    }
    let Some(local) = action.strip_prefix("rosa:") else {
        return false;
    };
    !local.is_empty() && local.chars().all(|c| c.is_ascii_alphabetic() || c == '*')
}

/// Checks the `*` / `arn:aws:<svc>:<region|*>:<account|*>:<type>/<tail>`
/// resource shapes. The tail may carry `*` and `?` wildcards.
fn is_valid_resource(resource: &str) -> bool {
    if resource == "*" {
        return true;
    }

    let mut parts = resource.splitn(6, ':');
    let (Some(scheme), Some(partition), Some(service), Some(region), Some(account), Some(path)) = (
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
    ) else {
        return false;
    };

    if scheme != "arn" || partition != "aws" {
        return false;
    }
    if service.is_empty() || !service.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-') {
        return false;
    }
    let region_ok = region == "*"
        || (!region.is_empty()
            && region.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'));
    if !region_ok {
        return false;
    }
    if !account.chars().all(|c| c.is_ascii_digit() || c == '*') {
        return false;
    }

    let Some((resource_type, tail)) = path.split_once('/') else {
        return false;
    };
    if resource_type.is_empty()
        || !resource_type.chars().all(|c| c.is_ascii_lowercase() || c == '-')
    {
        return false;
    }
    !tail.is_empty()
}

/// Checks whether a condition key belongs to a recognized family.
fn is_recognized_condition_key(key: &str) -> bool {
    if EXACT_CONDITION_KEYS.contains(&key) {
        return true;
    }
    if PREFIX_CONDITION_KEYS
        .iter()
        .any(|prefix| key.len() > prefix.len() && key.starts_with(prefix))
    {
        return true;
    }
    // Any remaining key must be a plain namespaced scalar in a known
    // namespace, e.g. `aws:SourceIp`.
    match key.split_once(':') {
        Some((namespace, name)) => {
            SCALAR_KEY_NAMESPACES.contains(&namespace)
                && !name.is_empty()
                && name.chars().all(|c| c.is_ascii_alphanumeric())
        }
        None => false,
    }
}
