// access-plane-core/src/core/actions.rs
// ============================================================================
// Module: Access Plane Action Catalog
// Description: The fixed set of well-known cluster-management actions.
// Purpose: Provide the ground truth for action wildcard expansion.
// Dependencies: none
// ============================================================================

//! ## Overview
//! The action catalog enumerates every action the control plane understands.
//! Wildcard patterns in policy documents expand against this list, so changing
//! the catalog changes the meaning of existing policies and is an API change.
//! Matching is case-sensitive throughout.

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Namespace prefix carried by actions on the wire (`rosa:ListClusters`).
pub const ACTION_NAMESPACE_PREFIX: &str = "rosa:";

/// Ordered catalog of well-known action names.
pub const ACTION_CATALOG: &[&str] = &[
    "CreateCluster",
    "DeleteCluster",
    "DescribeCluster",
    "ListClusters",
    "UpdateCluster",
    "UpdateClusterConfig",
    "UpdateClusterVersion",
    "CreateNodePool",
    "DeleteNodePool",
    "DescribeNodePool",
    "ListNodePools",
    "UpdateNodePool",
    "ScaleNodePool",
    "CreateAccessEntry",
    "DeleteAccessEntry",
    "DescribeAccessEntry",
    "ListAccessEntries",
    "UpdateAccessEntry",
    "TagResource",
    "UntagResource",
    "ListTagsForResource",
    "ListAccessPolicies",
];

// ============================================================================
// SECTION: Expansion
// ============================================================================

/// Strips the action namespace prefix when present.
#[must_use]
pub fn strip_namespace(action: &str) -> &str {
    action.strip_prefix(ACTION_NAMESPACE_PREFIX).unwrap_or(action)
}

/// Returns true when the name is a catalog action.
#[must_use]
pub fn is_catalog_action(name: &str) -> bool {
    ACTION_CATALOG.contains(&name)
}

/// Expands a single action pattern against the catalog.
///
/// `*` and `rosa:*` expand to the whole catalog. A trailing-`*` prefix pattern
/// expands to every catalog action starting with that prefix; when nothing
/// matches, the literal residual (prefix stripped, `*` retained) is kept so
/// that a typo still surfaces in the rendered rule. A plain name expands to
/// itself with the namespace prefix stripped.
#[must_use]
pub fn expand_pattern(pattern: &str) -> Vec<String> {
    let local = strip_namespace(pattern);

    if local == "*" {
        return ACTION_CATALOG.iter().map(|action| (*action).to_string()).collect();
    }

    if let Some(prefix) = local.strip_suffix('*') {
        let matching: Vec<String> = ACTION_CATALOG
            .iter()
            .filter(|action| action.starts_with(prefix))
            .map(|action| (*action).to_string())
            .collect();
        if !matching.is_empty() {
            return matching;
        }
    }

    vec![local.to_string()]
}

/// Expands a list of patterns, deduplicating while preserving the order in
/// which actions first appear.
#[must_use]
pub fn expand_patterns(patterns: &[String]) -> Vec<String> {
    let mut expanded = Vec::new();
    for pattern in patterns {
        for action in expand_pattern(pattern) {
            if !expanded.contains(&action) {
                expanded.push(action);
            }
        }
    }
    expanded
}

/// Returns true when the expanded action set covers the entire catalog.
#[must_use]
pub fn covers_catalog(actions: &[String]) -> bool {
    actions.len() == ACTION_CATALOG.len()
        && ACTION_CATALOG.iter().all(|action| actions.iter().any(|a| a == action))
}
