// access-plane-core/src/core/mod.rs
// ============================================================================
// Module: Access Plane Core Types
// Description: Identifiers, records, policy model, catalog, and schema.
// Purpose: Group the data-model modules shared across the crate.
// Dependencies: crate submodules
// ============================================================================

//! ## Overview
//! Core types are plain data: identifiers, the v0 policy model, store record
//! shapes, the action catalog, the evaluator schema, and timestamps. Logic
//! over these types lives in `validation`, `translate`, and `runtime`.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod actions;
pub mod identifiers;
pub mod policy;
pub mod records;
pub mod schema;
pub mod time;
pub mod validation;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use actions::ACTION_CATALOG;
pub use actions::ACTION_NAMESPACE_PREFIX;
pub use actions::expand_pattern;
pub use actions::expand_patterns;
pub use actions::strip_namespace;
pub use identifiers::AccountId;
pub use identifiers::AttachmentId;
pub use identifiers::EvaluatorPolicyId;
pub use identifiers::GroupId;
pub use identifiers::PolicyId;
pub use identifiers::PolicyStoreId;
pub use identifiers::PrincipalArn;
pub use policy::ConditionMap;
pub use policy::DOCUMENT_VERSION;
pub use policy::Effect;
pub use policy::PolicyDocument;
pub use policy::Statement;
pub use policy::TargetType;
pub use records::Account;
pub use records::Admin;
pub use records::Attachment;
pub use records::AttachmentFilter;
pub use records::Group;
pub use records::GroupMember;
pub use records::PolicyTemplate;
pub use schema::ACTION_ENTITY;
pub use schema::GROUP_ENTITY;
pub use schema::NAMESPACE;
pub use schema::PRINCIPAL_ENTITY;
pub use schema::RESOURCE_ENTITY;
pub use schema::evaluator_schema;
pub use schema::evaluator_schema_json;
pub use time::Timestamp;
pub use validation::ValidationError;
pub use validation::ValidationIssue;
pub use validation::ValidationReport;
pub use validation::validate_document;
