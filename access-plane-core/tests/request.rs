// access-plane-core/tests/request.rs
// ============================================================================
// Module: Request Builder Tests
// Description: Evaluator query assembly from authorization requests.
// Purpose: Pin action normalization, context shape, and the entity graph.
// Dependencies: access-plane-core
// ============================================================================
//! ## Overview
//! Validates the pure request builder: namespace stripping, system context
//! keys, tag records and key sets, reserved-key collision handling, and the
//! group-parent entity graph.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Test-only panic-based assertions are permitted."
)]

use std::collections::BTreeMap;

use access_plane_core::core::identifiers::AccountId;
use access_plane_core::core::identifiers::GroupId;
use access_plane_core::core::identifiers::PolicyStoreId;
use access_plane_core::core::identifiers::PrincipalArn;
use access_plane_core::interfaces::AttributeValue;
use access_plane_core::runtime::request::AuthzRequest;
use access_plane_core::runtime::request::build_evaluator_request;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn request() -> AuthzRequest {
    AuthzRequest {
        account_id: AccountId::new("777788889999"),
        caller_arn: PrincipalArn::new("arn:aws:iam::777788889999:user/alice"),
        action: "rosa:ListClusters".to_string(),
        resource: "arn:aws:rosa:us-east-1:777788889999:cluster/prod-1".to_string(),
        resource_tags: BTreeMap::new(),
        request_tags: BTreeMap::new(),
        context: BTreeMap::new(),
    }
}

fn store_id() -> PolicyStoreId {
    PolicyStoreId::new("ps-1")
}

// ============================================================================
// SECTION: Principal, Action, Resource
// ============================================================================

/// The action id is normalized by stripping the namespace prefix.
#[test]
fn action_namespace_is_stripped() {
    let query = build_evaluator_request(&request(), &[], &store_id());
    assert_eq!(query.action.entity_type, "ROSA::Action");
    assert_eq!(query.action.entity_id, "ListClusters");
    assert_eq!(query.principal.uid(), "ROSA::Principal::\"arn:aws:iam::777788889999:user/alice\"");
    assert_eq!(query.policy_store_id, store_id());
}

/// An already-local action name passes through unchanged.
#[test]
fn local_action_name_passes_through() {
    let mut req = request();
    req.action = "DescribeCluster".to_string();
    let query = build_evaluator_request(&req, &[], &store_id());
    assert_eq!(query.action.entity_id, "DescribeCluster");
}

// ============================================================================
// SECTION: Context
// ============================================================================

/// System keys are always present; tag keys appear only with request tags.
#[test]
fn system_context_keys() {
    let query = build_evaluator_request(&request(), &[], &store_id());
    assert_eq!(
        query.context.get("principalArn"),
        Some(&AttributeValue::String("arn:aws:iam::777788889999:user/alice".to_string()))
    );
    assert_eq!(
        query.context.get("principalAccount"),
        Some(&AttributeValue::String("777788889999".to_string()))
    );
    assert!(!query.context.contains_key("requestTags"));
    assert!(!query.context.contains_key("tagKeys"));
}

/// Request tags produce both the record and the key set.
#[test]
fn request_tags_produce_record_and_key_set() {
    let mut req = request();
    req.request_tags.insert("Env".to_string(), "dev".to_string());
    req.request_tags.insert("Owner".to_string(), "alice".to_string());

    let query = build_evaluator_request(&req, &[], &store_id());
    let mut expected_record = BTreeMap::new();
    expected_record.insert("Env".to_string(), AttributeValue::String("dev".to_string()));
    expected_record.insert("Owner".to_string(), AttributeValue::String("alice".to_string()));
    assert_eq!(
        query.context.get("requestTags"),
        Some(&AttributeValue::Record(expected_record))
    );
    assert_eq!(
        query.context.get("tagKeys"),
        Some(&AttributeValue::Set(vec![
            AttributeValue::String("Env".to_string()),
            AttributeValue::String("Owner".to_string()),
        ]))
    );
}

/// Caller context merges in, but reserved keys cannot be overridden.
#[test]
fn caller_context_cannot_override_reserved_keys() {
    let mut req = request();
    req.context.insert("requestSource".to_string(), "console".to_string());
    req.context.insert("principalArn".to_string(), "arn:aws:iam::1:user/mallory".to_string());

    let query = build_evaluator_request(&req, &[], &store_id());
    assert_eq!(
        query.context.get("requestSource"),
        Some(&AttributeValue::String("console".to_string()))
    );
    assert_eq!(
        query.context.get("principalArn"),
        Some(&AttributeValue::String("arn:aws:iam::777788889999:user/alice".to_string()))
    );
}

// ============================================================================
// SECTION: Entity Graph
// ============================================================================

/// Without groups the graph carries only the resource entity.
#[test]
fn entity_graph_without_groups() {
    let mut req = request();
    req.resource_tags.insert("Environment".to_string(), "development".to_string());

    let query = build_evaluator_request(&req, &[], &store_id());
    assert_eq!(query.entities.len(), 1);

    let resource = &query.entities[0];
    assert_eq!(resource.entity.uid(), format!("ROSA::Resource::\"{}\"", req.resource));
    assert!(resource.parents.is_empty());
    assert_eq!(
        resource.attributes.get("arn"),
        Some(&AttributeValue::String(req.resource.clone()))
    );
    let mut expected_tags = BTreeMap::new();
    expected_tags
        .insert("Environment".to_string(), AttributeValue::String("development".to_string()));
    assert_eq!(resource.attributes.get("tags"), Some(&AttributeValue::Record(expected_tags)));
}

/// With groups the graph carries one entity per group and the principal with
/// its group parents.
#[test]
fn entity_graph_with_groups() {
    let groups = vec![GroupId::new("g-1"), GroupId::new("g-2")];
    let query = build_evaluator_request(&request(), &groups, &store_id());

    assert_eq!(query.entities.len(), 4);
    assert_eq!(query.entities[0].entity.uid(), "ROSA::Group::\"g-1\"");
    assert_eq!(query.entities[1].entity.uid(), "ROSA::Group::\"g-2\"");

    let principal = &query.entities[2];
    assert_eq!(principal.entity.uid(), query.principal.uid());
    assert_eq!(
        principal.parents.iter().map(|parent| parent.uid()).collect::<Vec<_>>(),
        vec!["ROSA::Group::\"g-1\"", "ROSA::Group::\"g-2\""]
    );

    let resource = &query.entities[3];
    assert_eq!(resource.entity.entity_type, "ROSA::Resource");
}
