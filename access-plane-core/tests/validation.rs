// access-plane-core/tests/validation.rs
// ============================================================================
// Module: Policy Validation Tests
// Description: Structural and semantic validation of v0 documents.
// Purpose: Pin the validation rules, field paths, and collect-all behavior.
// Dependencies: access-plane-core, serde_json
// ============================================================================
//! ## Overview
//! Validates document-level rules (version, statements, sids), statement
//! rules (effect, action and resource shapes), and condition rules
//! (operator set, key families, value shapes). Validation must collect every
//! issue instead of stopping at the first.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Test-only panic-based assertions are permitted."
)]

use access_plane_core::core::policy::Effect;
use access_plane_core::core::policy::PolicyDocument;
use access_plane_core::core::policy::Statement;
use access_plane_core::core::validation::validate_document;
use serde_json::Value;
use serde_json::json;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn statement(actions: &[&str], resources: &[&str]) -> Statement {
    Statement {
        sid: None,
        effect: Effect::Allow,
        actions: actions.iter().map(|a| (*a).to_string()).collect(),
        resources: resources.iter().map(|r| (*r).to_string()).collect(),
        conditions: Default::default(),
    }
}

fn document(statements: Vec<Statement>) -> PolicyDocument {
    PolicyDocument {
        version: "v0".to_string(),
        statements,
    }
}

fn with_condition(mut stmt: Statement, operator: &str, key: &str, value: Value) -> Statement {
    stmt.conditions.entry(operator.to_string()).or_default().insert(key.to_string(), value);
    stmt
}

fn fields(doc: &PolicyDocument) -> Vec<String> {
    validate_document(doc).issues.into_iter().map(|issue| issue.field).collect()
}

// ============================================================================
// SECTION: Document Rules
// ============================================================================

/// A well-formed document with a supported version validates cleanly.
#[test]
fn valid_document_passes() {
    let doc = document(vec![statement(&["rosa:ListClusters"], &["*"])]);
    assert!(validate_document(&doc).is_valid());
}

/// An empty version string is accepted.
#[test]
fn empty_version_is_accepted() {
    let mut doc = document(vec![statement(&["rosa:ListClusters"], &["*"])]);
    doc.version = String::new();
    assert!(validate_document(&doc).is_valid());
}

/// Any other version string is rejected.
#[test]
fn unsupported_version_is_rejected() {
    let mut doc = document(vec![statement(&["rosa:ListClusters"], &["*"])]);
    doc.version = "v1".to_string();
    assert_eq!(fields(&doc), vec!["version"]);
}

/// A document without statements is rejected.
#[test]
fn missing_statements_are_rejected() {
    let doc = document(Vec::new());
    assert_eq!(fields(&doc), vec!["statements"]);
}

/// Duplicate sids are rejected with the statement's path.
#[test]
fn duplicate_sids_are_rejected() {
    let mut first = statement(&["rosa:ListClusters"], &["*"]);
    first.sid = Some("ReadOnly".to_string());
    let mut second = statement(&["rosa:DescribeCluster"], &["*"]);
    second.sid = Some("ReadOnly".to_string());

    let doc = document(vec![first, second]);
    assert_eq!(fields(&doc), vec!["statements[1].sid"]);
}

// ============================================================================
// SECTION: Statement Rules
// ============================================================================

/// An unrecognized effect is rejected.
#[test]
fn invalid_effect_is_rejected() {
    let raw = json!({
        "version": "v0",
        "statements": [{
            "effect": "Audit",
            "actions": ["rosa:ListClusters"],
            "resources": ["*"]
        }]
    });
    let doc: PolicyDocument = serde_json::from_value(raw).expect("document parses");
    assert_eq!(fields(&doc), vec!["statements[0].effect"]);
}

/// Malformed actions are rejected with their element path.
#[test]
fn invalid_action_shapes_are_rejected() {
    let doc = document(vec![statement(&["iam:ListClusters", "rosa:List-Clusters", ""], &["*"])]);
    assert_eq!(
        fields(&doc),
        vec![
            "statements[0].actions[0]",
            "statements[0].actions[1]",
            "statements[0].actions[2]",
        ]
    );
}

/// Resources must be `*` or a well-formed ARN; wildcards are allowed in
/// region, account, and the resource tail.
#[test]
fn resource_shapes_are_checked() {
    let valid = document(vec![statement(
        &["rosa:ListClusters"],
        &[
            "*",
            "arn:aws:rosa:us-east-1:111122223333:cluster/prod-1",
            "arn:aws:rosa:*:111122223333:cluster/*",
            "arn:aws:rosa:us-east-1::cluster/team-?",
        ],
    )]);
    assert!(validate_document(&valid).is_valid());

    let invalid = document(vec![statement(
        &["rosa:ListClusters"],
        &["arn:gcp:rosa:us-east-1:1:cluster/x", "cluster/prod-1", "arn:aws:rosa:us-east-1:1:cluster"],
    )]);
    assert_eq!(
        fields(&invalid),
        vec![
            "statements[0].resources[0]",
            "statements[0].resources[1]",
            "statements[0].resources[2]",
        ]
    );
}

/// Empty action and resource lists are both rejected.
#[test]
fn empty_lists_are_rejected() {
    let doc = document(vec![statement(&[], &[])]);
    assert_eq!(fields(&doc), vec!["statements[0].actions", "statements[0].resources"]);
}

// ============================================================================
// SECTION: Condition Rules
// ============================================================================

/// Unknown operators are rejected; `StringEqualsIgnoreCase` is intentionally
/// unsupported.
#[test]
fn unsupported_operators_are_rejected() {
    let stmt = with_condition(
        statement(&["rosa:ListClusters"], &["*"]),
        "StringEqualsIgnoreCase",
        "rosa:ResourceTag/Environment",
        json!("dev"),
    );
    let doc = document(vec![stmt]);
    assert_eq!(fields(&doc), vec!["statements[0].conditions"]);
}

/// `IfExists` is permitted on any supported operator.
#[test]
fn if_exists_suffix_is_supported() {
    let stmt = with_condition(
        statement(&["rosa:ListClusters"], &["*"]),
        "StringEqualsIfExists",
        "rosa:ResourceTag/Environment",
        json!("dev"),
    );
    assert!(validate_document(&document(vec![stmt])).is_valid());
}

/// Unrecognized condition keys are rejected under the operator path.
#[test]
fn unrecognized_condition_keys_are_rejected() {
    let stmt = with_condition(
        statement(&["rosa:ListClusters"], &["*"]),
        "StringEquals",
        "gcp:ResourceTag/Environment",
        json!("dev"),
    );
    let doc = document(vec![stmt]);
    assert_eq!(fields(&doc), vec!["statements[0].conditions.StringEquals"]);
}

/// Recognized key families: tag prefixes, exact keys, and namespaced
/// scalars.
#[test]
fn recognized_condition_keys_pass() {
    let mut stmt = statement(&["rosa:TagResource"], &["*"]);
    stmt = with_condition(stmt, "StringEquals", "rosa:ResourceTag/Environment", json!("dev"));
    stmt = with_condition(stmt, "StringEquals", "rosa:RequestTag/Owner", json!("alice"));
    stmt = with_condition(stmt, "StringEquals", "aws:PrincipalArn", json!("arn:aws:iam::1:user/a"));
    stmt = with_condition(stmt, "StringEquals", "aws:SourceIp", json!("10.0.0.1"));
    stmt = with_condition(
        stmt,
        "ForAllValues:StringEquals",
        "rosa:TagKeys",
        json!(["Env", "Owner"]),
    );
    assert!(validate_document(&document(vec![stmt])).is_valid());
}

/// Value shapes are enforced per operator family.
#[test]
fn value_shapes_are_enforced() {
    let cases = vec![
        ("ForAllValues:StringEquals", json!("not-an-array")),
        ("NumericEquals", json!("not-a-number")),
        ("NumericEquals", json!(1.5)),
        ("DateLessThan", json!("yesterday")),
        ("Bool", json!(1)),
        ("Null", json!([true])),
        ("StringEquals", json!({"nested": "object"})),
        ("StringEquals", json!([])),
    ];
    for (operator, value) in cases {
        let stmt = with_condition(
            statement(&["rosa:ListClusters"], &["*"]),
            operator,
            "rosa:ResourceTag/Environment",
            value.clone(),
        );
        let report = validate_document(&document(vec![stmt]));
        assert!(!report.is_valid(), "expected rejection for {operator} with {value}");
        assert_eq!(report.issues[0].field, format!("statements[0].conditions.{operator}"));
    }
}

/// Every issue is collected in one pass.
#[test]
fn all_issues_are_collected() {
    let mut doc = document(vec![
        statement(&[], &["*"]),
        statement(&["bogus"], &["not-an-arn"]),
    ]);
    doc.version = "v9".to_string();

    let report = validate_document(&doc);
    assert_eq!(
        report.issues.iter().map(|issue| issue.field.as_str()).collect::<Vec<_>>(),
        vec![
            "version",
            "statements[0].actions",
            "statements[1].actions[0]",
            "statements[1].resources[0]",
        ]
    );
}
