// access-plane-core/src/core/schema.rs
// ============================================================================
// Module: Access Plane Evaluator Schema
// Description: Entity type names and the generated evaluator schema.
// Purpose: Keep rule text, request entities, and the schema in one namespace.
// Dependencies: crate::core::actions, serde_json
// ============================================================================

//! ## Overview
//! Compiled rules, authorization requests, and the per-tenant policy store
//! schema all reference the same entity namespace. The schema is generated
//! from the action catalog so the two can never drift: every catalog action
//! gets an entry applying principals to resources with the shared context
//! record.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Value;
use serde_json::json;

use crate::core::actions::ACTION_CATALOG;

// ============================================================================
// SECTION: Entity Namespace
// ============================================================================

/// Schema namespace for all entity types.
pub const NAMESPACE: &str = "ROSA";

/// Entity type for principals.
pub const PRINCIPAL_ENTITY: &str = "ROSA::Principal";

/// Entity type for groups.
pub const GROUP_ENTITY: &str = "ROSA::Group";

/// Entity type for actions.
pub const ACTION_ENTITY: &str = "ROSA::Action";

/// Entity type for resources.
pub const RESOURCE_ENTITY: &str = "ROSA::Resource";

// ============================================================================
// SECTION: Schema Generation
// ============================================================================

/// Builds the evaluator schema document for a tenant policy store.
#[must_use]
pub fn evaluator_schema() -> Value {
    let mut actions = serde_json::Map::new();
    for action in ACTION_CATALOG {
        actions.insert((*action).to_string(), action_entry());
    }

    let namespace = json!({
        "entityTypes": {
            "Principal": {
                "memberOfTypes": ["Group"]
            },
            "Group": {},
            "Resource": {
                "shape": {
                    "type": "Record",
                    "attributes": {
                        "arn": { "type": "String", "required": false },
                        "tags": {
                            "type": "Record",
                            "attributes": {},
                            "additionalAttributes": true,
                            "required": false
                        }
                    }
                }
            }
        },
        "actions": Value::Object(actions)
    });

    let mut root = serde_json::Map::new();
    root.insert(NAMESPACE.to_string(), namespace);
    Value::Object(root)
}

/// Serializes the evaluator schema to its JSON wire form.
#[must_use]
pub fn evaluator_schema_json() -> String {
    evaluator_schema().to_string()
}

/// Builds the per-action schema entry with the shared context shape.
fn action_entry() -> Value {
    json!({
        "appliesTo": {
            "principalTypes": ["Principal"],
            "resourceTypes": ["Resource"],
            "context": {
                "type": "Record",
                "attributes": {
                    "principalArn": { "type": "String", "required": false },
                    "principalAccount": { "type": "String", "required": false },
                    "requestTags": {
                        "type": "Record",
                        "attributes": {},
                        "additionalAttributes": true,
                        "required": false
                    },
                    "tagKeys": {
                        "type": "Set",
                        "element": { "type": "String" },
                        "required": false
                    }
                },
                "additionalAttributes": true
            }
        }
    })
}
