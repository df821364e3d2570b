// access-plane-core/src/translate/mod.rs
// ============================================================================
// Module: Access Plane Policy Translator
// Description: Compiles v0 policy statements into target-language rules.
// Purpose: Pure, deterministic statement-to-rule translation.
// Dependencies: crate::core::{actions, policy, schema}, thiserror
// ============================================================================

//! ## Overview
//! The translator is a pure function from a v0 document and a principal
//! binding to an ordered list of rule texts, one rule per statement. It
//! performs no I/O and never consults the store. Output is byte-reproducible:
//! statements render in input order, action lists and disjunctions keep
//! insertion order, and condition conjunctions follow the document's
//! lexicographic `(operator, key)` map order.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod conditions;

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::core::actions::covers_catalog;
use crate::core::actions::expand_patterns;
use crate::core::policy::Effect;
use crate::core::policy::PolicyDocument;
use crate::core::policy::Statement;
use crate::core::policy::TargetType;
use crate::core::schema::ACTION_ENTITY;
use crate::core::schema::GROUP_ENTITY;
use crate::core::schema::PRINCIPAL_ENTITY;
use crate::core::schema::RESOURCE_ENTITY;
use crate::translate::conditions::lower_condition;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Translation failure. With a validated document every variant except
/// internal misuse is unreachable; the engine still treats any of these as a
/// server-side fault rather than a caller error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TranslateError {
    /// The condition operator is not implemented.
    #[error("unsupported condition operator: {operator}")]
    UnsupportedOperator {
        /// Operator as written in the document.
        operator: String,
    },
    /// The condition value does not fit the operator.
    #[error("condition {operator} on {key} expects {expected}")]
    TypeMismatch {
        /// Operator as written in the document.
        operator: String,
        /// Condition key.
        key: String,
        /// Shape the operator requires.
        expected: &'static str,
    },
    /// A numeric condition value could not be parsed as an integer.
    #[error("invalid numeric value for {key}: {value}")]
    BadNumeric {
        /// Condition key.
        key: String,
        /// Offending value.
        value: String,
    },
    /// A date condition value could not be parsed.
    #[error("invalid date value for {key}: {value}")]
    BadDate {
        /// Condition key.
        key: String,
        /// Offending value.
        value: String,
    },
    /// A statement carried no actions.
    #[error("statements[{index}] has no actions")]
    EmptyActions {
        /// Statement index.
        index: usize,
    },
}

// ============================================================================
// SECTION: Principal Binding
// ============================================================================

/// The principal a compiled policy binds to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrincipalBinding {
    /// Kind of principal.
    pub target_type: TargetType,
    /// ARN for users, group id for groups.
    pub target_id: String,
}

impl PrincipalBinding {
    /// Binding for a single user principal.
    #[must_use]
    pub fn user(arn: impl Into<String>) -> Self {
        Self {
            target_type: TargetType::User,
            target_id: arn.into(),
        }
    }

    /// Binding for a group principal.
    #[must_use]
    pub fn group(group_id: impl Into<String>) -> Self {
        Self {
            target_type: TargetType::Group,
            target_id: group_id.into(),
        }
    }
}

// ============================================================================
// SECTION: Document Translation
// ============================================================================

/// Translates a v0 document into one rule text per statement, in order.
///
/// # Errors
///
/// Returns [`TranslateError`] when a statement cannot be lowered; unreachable
/// for documents that passed validation.
pub fn translate_document(
    document: &PolicyDocument,
    binding: &PrincipalBinding,
) -> Result<Vec<String>, TranslateError> {
    let mut rules = Vec::with_capacity(document.statements.len());
    for (index, statement) in document.statements.iter().enumerate() {
        rules.push(translate_statement(statement, index, binding)?);
    }
    Ok(rules)
}

/// Translates a single statement into a complete rule terminated by `;`.
fn translate_statement(
    statement: &Statement,
    index: usize,
    binding: &PrincipalBinding,
) -> Result<String, TranslateError> {
    let effect_keyword = match statement.effect {
        Effect::Deny => "forbid",
        Effect::Allow | Effect::Other => "permit",
    };

    let principal_scope = match binding.target_type {
        TargetType::User => {
            format!("principal == {PRINCIPAL_ENTITY}::\"{}\"", binding.target_id)
        }
        TargetType::Group => {
            format!("principal in {GROUP_ENTITY}::\"{}\"", binding.target_id)
        }
    };

    let action_scope = build_action_scope(&statement.actions, index)?;
    let (resource_scope, resource_condition) = build_resource_clauses(&statement.resources);

    let mut when_clauses = Vec::new();
    if let Some(clause) = resource_condition {
        when_clauses.push(clause);
    }
    for (operator, entries) in &statement.conditions {
        for (key, value) in entries {
            when_clauses.push(lower_condition(operator, key, value)?);
        }
    }

    let mut rule = String::new();
    rule.push_str(effect_keyword);
    rule.push_str(" (\n  ");
    rule.push_str(&principal_scope);
    rule.push_str(",\n  ");
    rule.push_str(&action_scope);
    rule.push_str(",\n  ");
    rule.push_str(&resource_scope);
    rule.push_str("\n)");
    if !when_clauses.is_empty() {
        rule.push_str("\nwhen {\n  ");
        rule.push_str(&when_clauses.join(" && "));
        rule.push_str("\n}");
    }
    rule.push(';');
    Ok(rule)
}

// ============================================================================
// SECTION: Scope Builders
// ============================================================================

/// Builds the action scope from the statement's patterns.
fn build_action_scope(patterns: &[String], index: usize) -> Result<String, TranslateError> {
    if patterns.is_empty() {
        return Err(TranslateError::EmptyActions {
            index,
        });
    }

    let expanded = expand_patterns(patterns);
    if covers_catalog(&expanded) {
        return Ok("action".to_string());
    }
    if expanded.len() == 1 {
        return Ok(format!("action == {ACTION_ENTITY}::\"{}\"", expanded[0]));
    }
    let list = expanded
        .iter()
        .map(|action| format!("{ACTION_ENTITY}::\"{action}\""))
        .collect::<Vec<_>>()
        .join(", ");
    Ok(format!("action in [{list}]"))
}

/// Builds the resource scope and, when wildcards force it, the matching
/// `when` clause over `resource.arn`.
fn build_resource_clauses(resources: &[String]) -> (String, Option<String>) {
    if resources.is_empty() || resources.iter().all(|resource| resource == "*") {
        return ("resource".to_string(), None);
    }

    let mut exact = Vec::new();
    let mut patterns = Vec::new();
    for resource in resources {
        if resource.contains('*') || resource.contains('?') {
            patterns.push(resource.as_str());
        } else {
            exact.push(resource.as_str());
        }
    }

    if !patterns.is_empty() {
        let mut clauses: Vec<String> =
            exact.iter().map(|resource| format!("resource.arn == \"{resource}\"")).collect();
        clauses.extend(
            patterns
                .iter()
                .map(|pattern| format!("resource.arn like \"{}\"", pattern.replace('?', "*"))),
        );
        let clause = if clauses.len() == 1 {
            clauses.remove(0)
        } else {
            format!("({})", clauses.join(" || "))
        };
        return ("resource".to_string(), Some(clause));
    }

    if exact.len() == 1 {
        return (format!("resource == {RESOURCE_ENTITY}::\"{}\"", exact[0]), None);
    }
    let list = exact
        .iter()
        .map(|resource| format!("{RESOURCE_ENTITY}::\"{resource}\""))
        .collect::<Vec<_>>()
        .join(", ");
    (format!("resource in [{list}]"), None)
}
