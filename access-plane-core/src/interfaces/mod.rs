// access-plane-core/src/interfaces/mod.rs
// ============================================================================
// Module: Access Plane Interfaces
// Description: Backend-agnostic interfaces for durable storage and evaluation.
// Purpose: Define the contract surfaces the decision pipeline consumes.
// Dependencies: crate::core, async-trait, serde, thiserror
// ============================================================================

//! ## Overview
//! Interfaces define how the core integrates with the durable store and the
//! policy evaluator without embedding backend details. Absent rows are
//! modeled as `Ok(None)` / empty collections, never as errors; every error a
//! backend returns is a transport-class failure. Implementations are expected
//! to be safe for concurrent use and to honor the caller's deadline at every
//! I/O boundary (futures are dropped on cancellation).

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::identifiers::AccountId;
use crate::core::identifiers::AttachmentId;
use crate::core::identifiers::EvaluatorPolicyId;
use crate::core::identifiers::GroupId;
use crate::core::identifiers::PolicyId;
use crate::core::identifiers::PolicyStoreId;
use crate::core::identifiers::PrincipalArn;
use crate::core::policy::TargetType;
use crate::core::records::Account;
use crate::core::records::Admin;
use crate::core::records::Attachment;
use crate::core::records::Group;
use crate::core::records::GroupMember;
use crate::core::records::PolicyTemplate;

// ============================================================================
// SECTION: Store Errors
// ============================================================================

/// Durable store errors. Missing rows are not errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store could not be reached or the call timed out.
    #[error("store transport error: {0}")]
    Transport(String),
    /// Stored data failed to round-trip.
    #[error("store data invalid: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Store Interfaces
// ============================================================================

/// Account rows.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Loads an account by id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on transport failure.
    async fn get_account(&self, id: &AccountId) -> Result<Option<Account>, StoreError>;

    /// Writes an account row.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on transport failure.
    async fn put_account(&self, record: &Account) -> Result<(), StoreError>;

    /// Deletes an account row.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on transport failure.
    async fn delete_account(&self, id: &AccountId) -> Result<(), StoreError>;

    /// Lists all account rows.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on transport failure.
    async fn list_accounts(&self) -> Result<Vec<Account>, StoreError>;

    /// Returns true when an account row exists.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on transport failure.
    async fn account_exists(&self, id: &AccountId) -> Result<bool, StoreError>;
}

/// Admin membership rows.
#[async_trait]
pub trait AdminStore: Send + Sync {
    /// Returns true when the principal is an admin of the account.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on transport failure.
    async fn is_admin(&self, account: &AccountId, arn: &PrincipalArn) -> Result<bool, StoreError>;

    /// Adds an admin row.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on transport failure.
    async fn add_admin(&self, record: &Admin) -> Result<(), StoreError>;

    /// Removes an admin row.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on transport failure.
    async fn remove_admin(
        &self,
        account: &AccountId,
        arn: &PrincipalArn,
    ) -> Result<(), StoreError>;

    /// Lists admin principals of the account.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on transport failure.
    async fn list_admin_arns(&self, account: &AccountId) -> Result<Vec<PrincipalArn>, StoreError>;
}

/// Group rows.
#[async_trait]
pub trait GroupStore: Send + Sync {
    /// Writes a group row.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on transport failure.
    async fn create_group(&self, record: &Group) -> Result<(), StoreError>;

    /// Loads a group by id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on transport failure.
    async fn get_group(
        &self,
        account: &AccountId,
        group_id: &GroupId,
    ) -> Result<Option<Group>, StoreError>;

    /// Deletes a group row.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on transport failure.
    async fn delete_group(&self, account: &AccountId, group_id: &GroupId)
    -> Result<(), StoreError>;

    /// Lists all groups of the account.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on transport failure.
    async fn list_groups(&self, account: &AccountId) -> Result<Vec<Group>, StoreError>;
}

/// Group membership rows with a reverse lookup by member.
#[async_trait]
pub trait MemberStore: Send + Sync {
    /// Adds a membership row.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on transport failure.
    async fn add_member(&self, record: &GroupMember) -> Result<(), StoreError>;

    /// Removes a membership row.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on transport failure.
    async fn remove_member(
        &self,
        account: &AccountId,
        group_id: &GroupId,
        member: &PrincipalArn,
    ) -> Result<(), StoreError>;

    /// Removes every membership row of a group.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on transport failure.
    async fn remove_group_members(
        &self,
        account: &AccountId,
        group_id: &GroupId,
    ) -> Result<(), StoreError>;

    /// Lists members of a group.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on transport failure.
    async fn list_group_members(
        &self,
        account: &AccountId,
        group_id: &GroupId,
    ) -> Result<Vec<PrincipalArn>, StoreError>;

    /// Lists the groups a principal belongs to. Consulted on every
    /// evaluator-backed authorization.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on transport failure.
    async fn groups_of(
        &self,
        account: &AccountId,
        member: &PrincipalArn,
    ) -> Result<Vec<GroupId>, StoreError>;
}

/// Policy template rows.
#[async_trait]
pub trait TemplateStore: Send + Sync {
    /// Writes a template row.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on transport failure.
    async fn create_template(&self, record: &PolicyTemplate) -> Result<(), StoreError>;

    /// Loads a template by id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on transport failure.
    async fn get_template(
        &self,
        account: &AccountId,
        policy_id: &PolicyId,
    ) -> Result<Option<PolicyTemplate>, StoreError>;

    /// Replaces a template row.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on transport failure.
    async fn update_template(&self, record: &PolicyTemplate) -> Result<(), StoreError>;

    /// Deletes a template row.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on transport failure.
    async fn delete_template(
        &self,
        account: &AccountId,
        policy_id: &PolicyId,
    ) -> Result<(), StoreError>;

    /// Lists all templates of the account.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on transport failure.
    async fn list_templates(&self, account: &AccountId)
    -> Result<Vec<PolicyTemplate>, StoreError>;
}

/// Attachment rows with secondary lookups by target and by template.
#[async_trait]
pub trait AttachmentStore: Send + Sync {
    /// Writes an attachment row.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on transport failure.
    async fn create_attachment(&self, record: &Attachment) -> Result<(), StoreError>;

    /// Loads an attachment by id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on transport failure.
    async fn get_attachment(
        &self,
        account: &AccountId,
        attachment_id: &AttachmentId,
    ) -> Result<Option<Attachment>, StoreError>;

    /// Deletes an attachment row.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on transport failure.
    async fn delete_attachment(
        &self,
        account: &AccountId,
        attachment_id: &AttachmentId,
    ) -> Result<(), StoreError>;

    /// Lists all attachments of the account.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on transport failure.
    async fn list_attachments(&self, account: &AccountId) -> Result<Vec<Attachment>, StoreError>;

    /// Lists attachments bound to one target.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on transport failure.
    async fn list_attachments_by_target(
        &self,
        account: &AccountId,
        target_type: TargetType,
        target_id: &str,
    ) -> Result<Vec<Attachment>, StoreError>;

    /// Lists attachments referencing one template.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on transport failure.
    async fn list_attachments_by_policy(
        &self,
        account: &AccountId,
        policy_id: &PolicyId,
    ) -> Result<Vec<Attachment>, StoreError>;
}

/// The full store surface the engine requires.
pub trait AuthzStore:
    AccountStore + AdminStore + GroupStore + MemberStore + TemplateStore + AttachmentStore
{
}

impl<T> AuthzStore for T where
    T: AccountStore + AdminStore + GroupStore + MemberStore + TemplateStore + AttachmentStore
{
}

// ============================================================================
// SECTION: Evaluator Request Model
// ============================================================================

/// Typed reference to an entity, rendered on the wire as `Type::"id"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRef {
    /// Entity type, e.g. `ROSA::Principal`.
    pub entity_type: String,
    /// Entity identifier.
    pub entity_id: String,
}

impl EntityRef {
    /// Creates a new entity reference.
    #[must_use]
    pub fn new(entity_type: impl Into<String>, entity_id: impl Into<String>) -> Self {
        Self {
            entity_type: entity_type.into(),
            entity_id: entity_id.into(),
        }
    }

    /// Renders the entity uid (`Type::"id"`).
    #[must_use]
    pub fn uid(&self) -> String {
        format!("{}::\"{}\"", self.entity_type, self.entity_id)
    }
}

/// Attribute value attached to entities or the request context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    /// String value.
    String(String),
    /// Integer value.
    Long(i64),
    /// Boolean value.
    Bool(bool),
    /// Set of values.
    Set(Vec<AttributeValue>),
    /// Record of named values.
    Record(BTreeMap<String, AttributeValue>),
}

impl AttributeValue {
    /// Converts the attribute value into plain JSON.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::String(value) => serde_json::Value::String(value.clone()),
            Self::Long(value) => serde_json::Value::Number((*value).into()),
            Self::Bool(value) => serde_json::Value::Bool(*value),
            Self::Set(values) => {
                serde_json::Value::Array(values.iter().map(Self::to_json).collect())
            }
            Self::Record(entries) => serde_json::Value::Object(
                entries.iter().map(|(key, value)| (key.clone(), value.to_json())).collect(),
            ),
        }
    }
}

/// An entity declaration in the request graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityDecl {
    /// The entity being declared.
    pub entity: EntityRef,
    /// Entity attributes.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, AttributeValue>,
    /// Parent entities (group membership edges).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parents: Vec<EntityRef>,
}

/// A fully assembled evaluator query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluatorRequest {
    /// Tenant policy store to evaluate against.
    pub policy_store_id: PolicyStoreId,
    /// Principal entity.
    pub principal: EntityRef,
    /// Action entity (local action name, namespace prefix stripped).
    pub action: EntityRef,
    /// Resource entity.
    pub resource: EntityRef,
    /// Request context attributes.
    pub context: BTreeMap<String, AttributeValue>,
    /// Entity graph supplied with the query.
    pub entities: Vec<EntityDecl>,
}

/// Evaluator verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EvaluatorDecision {
    /// Access granted.
    Allow,
    /// Access denied (any non-allow verdict).
    Deny,
}

// ============================================================================
// SECTION: Evaluator Interface
// ============================================================================

/// Policy evaluator errors.
#[derive(Debug, Error)]
pub enum EvaluatorError {
    /// The evaluator could not be reached or the call timed out.
    #[error("evaluator transport error: {0}")]
    Transport(String),
    /// The evaluator rejected the request.
    #[error("evaluator rejected request: {0}")]
    Rejected(String),
}

/// Backend-agnostic policy evaluator with policy lifecycle management.
///
/// The evaluator is authoritative for its decisions; the engine never
/// second-guesses a verdict.
#[async_trait]
pub trait PolicyEvaluator: Send + Sync {
    /// Creates a policy store for a tenant.
    ///
    /// # Errors
    ///
    /// Returns [`EvaluatorError`] when the call fails.
    async fn create_policy_store(&self, description: &str)
    -> Result<PolicyStoreId, EvaluatorError>;

    /// Installs the schema into a policy store.
    ///
    /// # Errors
    ///
    /// Returns [`EvaluatorError`] when the call fails.
    async fn put_schema(
        &self,
        policy_store_id: &PolicyStoreId,
        schema_json: &str,
    ) -> Result<(), EvaluatorError>;

    /// Registers a compiled policy.
    ///
    /// # Errors
    ///
    /// Returns [`EvaluatorError`] when the call fails.
    async fn create_policy(
        &self,
        policy_store_id: &PolicyStoreId,
        rule_text: &str,
        description: &str,
    ) -> Result<EvaluatorPolicyId, EvaluatorError>;

    /// Replaces the text of a registered policy.
    ///
    /// # Errors
    ///
    /// Returns [`EvaluatorError`] when the call fails.
    async fn update_policy(
        &self,
        policy_store_id: &PolicyStoreId,
        policy_id: &EvaluatorPolicyId,
        rule_text: &str,
    ) -> Result<(), EvaluatorError>;

    /// Removes a registered policy.
    ///
    /// # Errors
    ///
    /// Returns [`EvaluatorError`] when the call fails.
    async fn delete_policy(
        &self,
        policy_store_id: &PolicyStoreId,
        policy_id: &EvaluatorPolicyId,
    ) -> Result<(), EvaluatorError>;

    /// Deletes a policy store.
    ///
    /// # Errors
    ///
    /// Returns [`EvaluatorError`] when the call fails.
    async fn delete_policy_store(
        &self,
        policy_store_id: &PolicyStoreId,
    ) -> Result<(), EvaluatorError>;

    /// Answers an authorization query.
    ///
    /// # Errors
    ///
    /// Returns [`EvaluatorError`] when the call fails; a transport failure is
    /// never converted into a decision.
    async fn is_authorized(
        &self,
        request: &EvaluatorRequest,
    ) -> Result<EvaluatorDecision, EvaluatorError>;
}
