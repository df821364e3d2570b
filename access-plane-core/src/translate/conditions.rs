// access-plane-core/src/translate/conditions.rs
// ============================================================================
// Module: Access Plane Condition Lowering
// Description: Lowers v0 condition operators into rule-language expressions.
// Purpose: Define the authoritative operator set and value-shape rules.
// Dependencies: crate::translate, serde_json, time
// ============================================================================

//! ## Overview
//! Each `(operator, key, value)` condition entry lowers to one boolean
//! expression in the target rule language. The semantics table is fixed:
//! equality arrays disjoin, negated arrays conjoin, `IfExists` wraps the base
//! clause in a missing-key escape, and `Null` maps to attribute presence.
//! The validator calls [`lower_condition`] directly, so the shapes accepted
//! here are exactly the shapes that validate.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Value;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::translate::TranslateError;

// ============================================================================
// SECTION: Operator Set
// ============================================================================

/// Suffix that makes any operator tolerate a missing key.
pub const IF_EXISTS_SUFFIX: &str = "IfExists";

/// Every implemented base operator.
pub const SUPPORTED_OPERATORS: &[&str] = &[
    "StringEquals",
    "StringNotEquals",
    "StringLike",
    "StringNotLike",
    "ArnEquals",
    "ArnNotEquals",
    "ArnLike",
    "ArnNotLike",
    "Bool",
    "NumericEquals",
    "NumericNotEquals",
    "NumericLessThan",
    "NumericLessThanEquals",
    "NumericGreaterThan",
    "NumericGreaterThanEquals",
    "DateEquals",
    "DateNotEquals",
    "DateLessThan",
    "DateLessThanEquals",
    "DateGreaterThan",
    "DateGreaterThanEquals",
    "IpAddress",
    "NotIpAddress",
    "BinaryEquals",
    "Null",
    "ForAllValues:StringEquals",
    "ForAnyValue:StringEquals",
    "ForAllValues:StringNotEquals",
    "ForAnyValue:StringNotEquals",
    "ForAllValues:StringLike",
    "ForAnyValue:StringLike",
];

/// Returns true when the operator (optionally `IfExists`-suffixed) is
/// implemented.
#[must_use]
pub fn is_supported_operator(operator: &str) -> bool {
    let base = operator.strip_suffix(IF_EXISTS_SUFFIX).unwrap_or(operator);
    SUPPORTED_OPERATORS.contains(&base)
}

// ============================================================================
// SECTION: Condition Lowering
// ============================================================================

/// Lowers one condition entry into a rule-language expression.
///
/// # Errors
///
/// Returns [`TranslateError`] when the operator is unknown or the value shape
/// does not fit the operator.
pub fn lower_condition(operator: &str, key: &str, value: &Value) -> Result<String, TranslateError> {
    if let Some(base) = operator.strip_suffix(IF_EXISTS_SUFFIX) {
        if !base.is_empty() {
            let mapped = map_condition_key(key);
            let inner = lower_base(base, key, value)?;
            return Ok(format!("(!has {mapped} || ({inner}))"));
        }
    }
    lower_base(operator, key, value)
}

/// Lowers a base (non-`IfExists`) operator.
fn lower_base(operator: &str, key: &str, value: &Value) -> Result<String, TranslateError> {
    match operator {
        "StringEquals" | "ArnEquals" | "BinaryEquals" => lower_equals(operator, key, value, false),
        "StringNotEquals" | "ArnNotEquals" => lower_equals(operator, key, value, true),
        "StringLike" | "ArnLike" => lower_like(operator, key, value, false),
        "StringNotLike" | "ArnNotLike" => lower_like(operator, key, value, true),
        "Bool" => lower_bool(operator, key, value),
        "NumericEquals" => lower_numeric(operator, key, value, "=="),
        "NumericNotEquals" => lower_numeric(operator, key, value, "!="),
        "NumericLessThan" => lower_numeric(operator, key, value, "<"),
        "NumericLessThanEquals" => lower_numeric(operator, key, value, "<="),
        "NumericGreaterThan" => lower_numeric(operator, key, value, ">"),
        "NumericGreaterThanEquals" => lower_numeric(operator, key, value, ">="),
        "DateEquals" => lower_date(operator, key, value, "=="),
        "DateNotEquals" => lower_date(operator, key, value, "!="),
        "DateLessThan" => lower_date(operator, key, value, "<"),
        "DateLessThanEquals" => lower_date(operator, key, value, "<="),
        "DateGreaterThan" => lower_date(operator, key, value, ">"),
        "DateGreaterThanEquals" => lower_date(operator, key, value, ">="),
        "IpAddress" => lower_ip(operator, key, value, false),
        "NotIpAddress" => lower_ip(operator, key, value, true),
        "Null" => lower_null(operator, key, value),
        "ForAllValues:StringEquals" => lower_set_equals(operator, key, value, SetForm::ContainsAll),
        "ForAnyValue:StringEquals" => lower_set_equals(operator, key, value, SetForm::ContainsAny),
        "ForAllValues:StringNotEquals" => {
            lower_set_equals(operator, key, value, SetForm::NotContainsAny)
        }
        "ForAnyValue:StringNotEquals" => {
            lower_set_equals(operator, key, value, SetForm::NotContainsAll)
        }
        "ForAllValues:StringLike" | "ForAnyValue:StringLike" => lower_set_like(operator, key, value),
        _ => Err(TranslateError::UnsupportedOperator {
            operator: operator.to_string(),
        }),
    }
}

// ============================================================================
// SECTION: Operator Families
// ============================================================================

/// Equality operators; arrays disjoin, negated arrays conjoin.
fn lower_equals(
    operator: &str,
    key: &str,
    value: &Value,
    negate: bool,
) -> Result<String, TranslateError> {
    let mapped = map_condition_key(key);
    match value {
        Value::Array(values) => {
            let texts = scalar_texts(operator, key, values)?;
            let clauses: Vec<String> = texts
                .iter()
                .map(|text| {
                    if negate {
                        format!("{mapped} != \"{text}\"")
                    } else {
                        format!("{mapped} == \"{text}\"")
                    }
                })
                .collect();
            if negate {
                Ok(clauses.join(" && "))
            } else {
                Ok(format!("({})", clauses.join(" || ")))
            }
        }
        _ => {
            let text = scalar_text(value).ok_or_else(|| type_mismatch(operator, key, "a scalar or array of scalars"))?;
            let op = if negate { "!=" } else { "==" };
            Ok(format!("{mapped} {op} \"{text}\""))
        }
    }
}

/// Pattern operators; `?` wildcards become `*`.
fn lower_like(
    operator: &str,
    key: &str,
    value: &Value,
    negate: bool,
) -> Result<String, TranslateError> {
    let mapped = map_condition_key(key);
    match value {
        Value::Array(values) => {
            let texts = scalar_texts(operator, key, values)?;
            let clauses: Vec<String> =
                texts.iter().map(|text| like_clause(&mapped, text, negate)).collect();
            if negate {
                Ok(clauses.join(" && "))
            } else {
                Ok(format!("({})", clauses.join(" || ")))
            }
        }
        _ => {
            let text = scalar_text(value).ok_or_else(|| type_mismatch(operator, key, "a scalar or array of scalars"))?;
            Ok(like_clause(&mapped, &text, negate))
        }
    }
}

/// Boolean operator; the string `"true"` is accepted.
fn lower_bool(operator: &str, key: &str, value: &Value) -> Result<String, TranslateError> {
    let mapped = map_condition_key(key);
    let flag = match value {
        Value::Bool(flag) => *flag,
        Value::String(text) => text == "true",
        _ => return Err(type_mismatch(operator, key, "a boolean or string")),
    };
    Ok(format!("{mapped} == {flag}"))
}

/// Numeric comparison; integers only, numeric strings parsed base-10.
fn lower_numeric(
    operator: &str,
    key: &str,
    value: &Value,
    op: &str,
) -> Result<String, TranslateError> {
    let mapped = map_condition_key(key);
    let number = match value {
        Value::Number(number) => number.as_i64().ok_or_else(|| TranslateError::BadNumeric {
            key: key.to_string(),
            value: number.to_string(),
        })?,
        Value::String(text) => text.parse::<i64>().map_err(|_| TranslateError::BadNumeric {
            key: key.to_string(),
            value: text.clone(),
        })?,
        _ => return Err(type_mismatch(operator, key, "an integer or numeric string")),
    };
    Ok(format!("{mapped} {op} {number}"))
}

/// Date comparison; values must parse as RFC 3339 timestamps.
fn lower_date(
    operator: &str,
    key: &str,
    value: &Value,
    op: &str,
) -> Result<String, TranslateError> {
    let mapped = map_condition_key(key);
    let Value::String(text) = value else {
        return Err(type_mismatch(operator, key, "an ISO-8601 date string"));
    };
    if OffsetDateTime::parse(text, &Rfc3339).is_err() {
        return Err(TranslateError::BadDate {
            key: key.to_string(),
            value: text.clone(),
        });
    }
    Ok(format!("datetime({mapped}) {op} datetime(\"{text}\")"))
}

/// IP range membership; arrays disjoin, negated arrays conjoin.
fn lower_ip(
    operator: &str,
    key: &str,
    value: &Value,
    negate: bool,
) -> Result<String, TranslateError> {
    let mapped = map_condition_key(key);
    match value {
        Value::String(text) => Ok(ip_clause(&mapped, text, negate)),
        Value::Array(values) => {
            if values.is_empty() {
                return Err(type_mismatch(operator, key, "a non-empty array"));
            }
            let mut clauses = Vec::with_capacity(values.len());
            for item in values {
                let Value::String(text) = item else {
                    return Err(type_mismatch(operator, key, "a string or array of strings"));
                };
                clauses.push(ip_clause(&mapped, text, negate));
            }
            if negate {
                Ok(clauses.join(" && "))
            } else {
                Ok(format!("({})", clauses.join(" || ")))
            }
        }
        _ => Err(type_mismatch(operator, key, "a string or array of strings")),
    }
}

/// Null operator: `true` requires the key to be absent, `false` present.
fn lower_null(operator: &str, key: &str, value: &Value) -> Result<String, TranslateError> {
    let mapped = map_condition_key(key);
    let absent = match value {
        Value::Bool(flag) => *flag,
        Value::String(text) => text == "true",
        _ => return Err(type_mismatch(operator, key, "a boolean or string")),
    };
    if absent {
        Ok(format!("!has {mapped}"))
    } else {
        Ok(format!("has {mapped}"))
    }
}

/// Set containment forms for the `ForAllValues`/`ForAnyValue` equality family.
#[derive(Clone, Copy)]
enum SetForm {
    ContainsAll,
    ContainsAny,
    NotContainsAny,
    NotContainsAll,
}

/// Multivalued equality; the value must be an array.
fn lower_set_equals(
    operator: &str,
    key: &str,
    value: &Value,
    form: SetForm,
) -> Result<String, TranslateError> {
    let mapped = map_condition_key(key);
    let Value::Array(values) = value else {
        return Err(type_mismatch(operator, key, "an array of scalars"));
    };
    let texts = scalar_texts(operator, key, values)?;
    let list =
        texts.iter().map(|text| format!("\"{text}\"")).collect::<Vec<_>>().join(", ");
    let clause = match form {
        SetForm::ContainsAll => format!("{mapped}.containsAll([{list}])"),
        SetForm::ContainsAny => format!("{mapped}.containsAny([{list}])"),
        SetForm::NotContainsAny => format!("!{mapped}.containsAny([{list}])"),
        SetForm::NotContainsAll => format!("!{mapped}.containsAll([{list}])"),
    };
    Ok(clause)
}

/// Multivalued pattern match; every pattern disjoins.
fn lower_set_like(operator: &str, key: &str, value: &Value) -> Result<String, TranslateError> {
    let mapped = map_condition_key(key);
    let patterns = match value {
        Value::String(text) => vec![text.clone()],
        Value::Array(values) => scalar_texts(operator, key, values)?,
        _ => return Err(type_mismatch(operator, key, "a string or array of scalars")),
    };
    let clauses: Vec<String> =
        patterns.iter().map(|pattern| like_clause(&mapped, pattern, false)).collect();
    if clauses.len() == 1 {
        Ok(clauses.into_iter().next().unwrap_or_default())
    } else {
        Ok(format!("({})", clauses.join(" || ")))
    }
}

// ============================================================================
// SECTION: Clause Builders
// ============================================================================

/// Builds a `like` clause, converting `?` wildcards to `*`.
fn like_clause(mapped: &str, pattern: &str, negate: bool) -> String {
    let converted = pattern.replace('?', "*");
    if negate {
        format!("!({mapped} like \"{converted}\")")
    } else {
        format!("{mapped} like \"{converted}\"")
    }
}

/// Builds an IP range membership clause.
fn ip_clause(mapped: &str, ip_or_cidr: &str, negate: bool) -> String {
    if negate {
        format!("!ip({mapped}).isInRange(ip(\"{ip_or_cidr}\"))")
    } else {
        format!("ip({mapped}).isInRange(ip(\"{ip_or_cidr}\"))")
    }
}

// ============================================================================
// SECTION: Key Mapping
// ============================================================================

/// Maps a v0 condition key to its rule-language attribute path.
#[must_use]
pub fn map_condition_key(key: &str) -> String {
    if let Some(tag) = key.strip_prefix("rosa:ResourceTag/") {
        return format!("resource.tags[\"{tag}\"]");
    }
    if let Some(tag) = key.strip_prefix("rosa:RequestTag/") {
        return format!("context.requestTags[\"{tag}\"]");
    }
    match key {
        "rosa:TagKeys" => "context.tagKeys".to_string(),
        "aws:PrincipalArn" | "rosa:principalArn" => "context.principalArn".to_string(),
        "aws:PrincipalAccount" => "context.principalAccount".to_string(),
        _ => format!("context.{}", sanitize_key(key)),
    }
}

/// Replaces characters outside `[A-Za-z0-9_]` with underscores.
fn sanitize_key(key: &str) -> String {
    key.chars().map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' }).collect()
}

// ============================================================================
// SECTION: Value Helpers
// ============================================================================

/// Renders a scalar JSON value as text; `None` for non-scalars.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

/// Renders a non-empty array of scalars as texts.
fn scalar_texts(
    operator: &str,
    key: &str,
    values: &[Value],
) -> Result<Vec<String>, TranslateError> {
    if values.is_empty() {
        return Err(type_mismatch(operator, key, "a non-empty array"));
    }
    values
        .iter()
        .map(|item| {
            scalar_text(item).ok_or_else(|| type_mismatch(operator, key, "an array of scalars"))
        })
        .collect()
}

fn type_mismatch(operator: &str, key: &str, expected: &'static str) -> TranslateError {
    TranslateError::TypeMismatch {
        operator: operator.to_string(),
        key: key.to_string(),
        expected,
    }
}
