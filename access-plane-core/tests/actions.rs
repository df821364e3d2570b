// access-plane-core/tests/actions.rs
// ============================================================================
// Module: Action Catalog Tests
// Description: Wildcard expansion behavior over the fixed action catalog.
// Purpose: Pin the expansion laws the translator relies on.
// Dependencies: access-plane-core
// ============================================================================
//! ## Overview
//! Validates catalog expansion: full wildcards, prefix wildcards, literal
//! residuals for typos, and order-preserving deduplication.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Test-only panic-based assertions are permitted."
)]

use access_plane_core::core::actions::ACTION_CATALOG;
use access_plane_core::core::actions::covers_catalog;
use access_plane_core::core::actions::expand_pattern;
use access_plane_core::core::actions::expand_patterns;
use access_plane_core::core::actions::is_catalog_action;
use access_plane_core::core::actions::strip_namespace;

// ============================================================================
// SECTION: Full Wildcards
// ============================================================================

/// `*` and `rosa:*` both expand to the whole catalog.
#[test]
fn full_wildcards_expand_to_catalog() {
    let bare = expand_pattern("*");
    let namespaced = expand_pattern("rosa:*");

    assert_eq!(bare.len(), ACTION_CATALOG.len());
    assert_eq!(bare, namespaced);
    assert!(covers_catalog(&bare));
}

// ============================================================================
// SECTION: Prefix Wildcards
// ============================================================================

/// A prefix wildcard selects exactly the catalog actions with that prefix.
#[test]
fn prefix_wildcard_selects_matching_actions() {
    let expanded = expand_pattern("rosa:Describe*");
    assert_eq!(expanded, vec!["DescribeCluster", "DescribeNodePool", "DescribeAccessEntry"]);
    assert!(expanded.iter().all(|action| is_catalog_action(action)));
}

/// A prefix wildcard with no catalog match keeps the literal residual so a
/// typo is visible in the rendered rule.
#[test]
fn prefix_wildcard_without_match_keeps_residual() {
    let expanded = expand_pattern("rosa:Describ3*");
    assert_eq!(expanded, vec!["Describ3*"]);
}

// ============================================================================
// SECTION: Plain Names
// ============================================================================

/// Plain names expand to themselves with the namespace prefix stripped.
#[test]
fn plain_name_strips_namespace() {
    assert_eq!(expand_pattern("rosa:ListClusters"), vec!["ListClusters"]);
    assert_eq!(expand_pattern("ListClusters"), vec!["ListClusters"]);
    assert_eq!(strip_namespace("rosa:TagResource"), "TagResource");
    assert_eq!(strip_namespace("TagResource"), "TagResource");
}

/// Matching is case-sensitive; a lowercase name is kept as a literal.
#[test]
fn expansion_is_case_sensitive() {
    assert_eq!(expand_pattern("rosa:listclusters"), vec!["listclusters"]);
    assert_eq!(expand_pattern("rosa:describe*"), vec!["describe*"]);
}

// ============================================================================
// SECTION: Deduplication
// ============================================================================

/// Overlapping patterns deduplicate while keeping first-occurrence order.
#[test]
fn overlapping_patterns_deduplicate_in_order() {
    let patterns = vec![
        "rosa:ListClusters".to_string(),
        "rosa:List*".to_string(),
        "rosa:ListClusters".to_string(),
    ];
    let expanded = expand_patterns(&patterns);

    assert_eq!(
        expanded,
        vec![
            "ListClusters",
            "ListNodePools",
            "ListAccessEntries",
            "ListTagsForResource",
            "ListAccessPolicies",
        ]
    );
}

/// Expansion output is always a subset of the catalog plus literal residuals.
#[test]
fn expansion_closure_over_catalog() {
    for pattern in ["*", "rosa:*", "rosa:Create*", "rosa:Nope*", "rosa:DeleteCluster"] {
        let expanded = expand_pattern(pattern);
        for action in &expanded {
            let residual = strip_namespace(pattern);
            assert!(
                is_catalog_action(action) || action == residual,
                "unexpected expansion {action} for {pattern}"
            );
        }
    }
}
