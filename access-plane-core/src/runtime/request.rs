// access-plane-core/src/runtime/request.rs
// ============================================================================
// Module: Access Plane Request Builder
// Description: Assembles evaluator queries from authorization requests.
// Purpose: Produce the principal/action/resource triple, context attributes,
//          and the entity graph with group parents.
// Dependencies: crate::{core, interfaces}, tracing
// ============================================================================

//! ## Overview
//! The request builder is pure: given an authorization request, the caller's
//! group memberships, and the tenant's policy store id, it assembles the
//! evaluator query. Action names are normalized by stripping the namespace
//! prefix so they match the ids rendered into rules. Caller-supplied context
//! keys never override the system-reserved keys.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;

use crate::core::actions::strip_namespace;
use crate::core::identifiers::AccountId;
use crate::core::identifiers::GroupId;
use crate::core::identifiers::PolicyStoreId;
use crate::core::identifiers::PrincipalArn;
use crate::core::schema::ACTION_ENTITY;
use crate::core::schema::GROUP_ENTITY;
use crate::core::schema::PRINCIPAL_ENTITY;
use crate::core::schema::RESOURCE_ENTITY;
use crate::interfaces::AttributeValue;
use crate::interfaces::EntityDecl;
use crate::interfaces::EntityRef;
use crate::interfaces::EvaluatorRequest;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Context keys owned by the pipeline; caller-supplied values for these are
/// dropped.
pub const RESERVED_CONTEXT_KEYS: &[&str] =
    &["principalArn", "principalAccount", "requestTags", "tagKeys"];

// ============================================================================
// SECTION: Authorization Request
// ============================================================================

/// An authorization query as received from the edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthzRequest {
    /// Tenant account the query runs under.
    pub account_id: AccountId,
    /// Authenticated caller.
    pub caller_arn: PrincipalArn,
    /// Requested action, with or without the namespace prefix.
    pub action: String,
    /// Target resource ARN (or `*`).
    pub resource: String,
    /// Tags currently on the resource.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub resource_tags: BTreeMap<String, String>,
    /// Tags the request would apply.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub request_tags: BTreeMap<String, String>,
    /// Arbitrary caller-supplied string context.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub context: BTreeMap<String, String>,
}

// ============================================================================
// SECTION: Request Assembly
// ============================================================================

/// Builds the evaluator query for an authorization request.
#[must_use]
pub fn build_evaluator_request(
    request: &AuthzRequest,
    group_ids: &[GroupId],
    policy_store_id: &PolicyStoreId,
) -> EvaluatorRequest {
    let principal = EntityRef::new(PRINCIPAL_ENTITY, request.caller_arn.as_str());
    let action = EntityRef::new(ACTION_ENTITY, strip_namespace(&request.action));
    let resource = EntityRef::new(RESOURCE_ENTITY, request.resource.clone());

    let context = build_context(request);
    let entities = build_entity_graph(request, group_ids, &principal, &resource);

    EvaluatorRequest {
        policy_store_id: policy_store_id.clone(),
        principal,
        action,
        resource,
        context,
        entities,
    }
}

/// Builds the context record: system-reserved keys first, then caller
/// context with reserved collisions dropped.
fn build_context(request: &AuthzRequest) -> BTreeMap<String, AttributeValue> {
    let mut context = BTreeMap::new();
    context.insert(
        "principalArn".to_string(),
        AttributeValue::String(request.caller_arn.as_str().to_string()),
    );
    context.insert(
        "principalAccount".to_string(),
        AttributeValue::String(request.account_id.as_str().to_string()),
    );

    if !request.request_tags.is_empty() {
        let tags = request
            .request_tags
            .iter()
            .map(|(key, value)| (key.clone(), AttributeValue::String(value.clone())))
            .collect();
        context.insert("requestTags".to_string(), AttributeValue::Record(tags));

        let keys = request
            .request_tags
            .keys()
            .map(|key| AttributeValue::String(key.clone()))
            .collect();
        context.insert("tagKeys".to_string(), AttributeValue::Set(keys));
    }

    for (key, value) in &request.context {
        if RESERVED_CONTEXT_KEYS.contains(&key.as_str()) {
            tracing::warn!(key = %key, "dropping caller context key colliding with reserved key");
            continue;
        }
        context.insert(key.clone(), AttributeValue::String(value.clone()));
    }

    context
}

/// Builds the entity graph: one entity per group, the principal with its
/// group parents when any exist, and the resource with its `arn` and `tags`
/// attributes.
fn build_entity_graph(
    request: &AuthzRequest,
    group_ids: &[GroupId],
    principal: &EntityRef,
    resource: &EntityRef,
) -> Vec<EntityDecl> {
    let mut entities = Vec::with_capacity(group_ids.len() + 2);

    let group_refs: Vec<EntityRef> = group_ids
        .iter()
        .map(|group_id| EntityRef::new(GROUP_ENTITY, group_id.as_str()))
        .collect();
    for group in &group_refs {
        entities.push(EntityDecl {
            entity: group.clone(),
            attributes: BTreeMap::new(),
            parents: Vec::new(),
        });
    }

    if !group_refs.is_empty() {
        entities.push(EntityDecl {
            entity: principal.clone(),
            attributes: BTreeMap::new(),
            parents: group_refs,
        });
    }

    let mut resource_attrs = BTreeMap::new();
    resource_attrs.insert(
        "arn".to_string(),
        AttributeValue::String(request.resource.clone()),
    );
    let tags = request
        .resource_tags
        .iter()
        .map(|(key, value)| (key.clone(), AttributeValue::String(value.clone())))
        .collect();
    resource_attrs.insert("tags".to_string(), AttributeValue::Record(tags));
    entities.push(EntityDecl {
        entity: resource.clone(),
        attributes: resource_attrs,
        parents: Vec::new(),
    });

    entities
}
