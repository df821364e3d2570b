// access-plane-core/src/core/records.rs
// ============================================================================
// Module: Access Plane Store Records
// Description: Durable record shapes for tenant authorization state.
// Purpose: Define the DTOs exchanged with store implementations.
// Dependencies: crate::core::{identifiers, policy, time}, serde
// ============================================================================

//! ## Overview
//! Records are the rows a store implementation persists. They serialize with
//! camelCase field names to match the wire format used by the durable store.
//! The store layer never interprets policy documents; document validation is
//! an engine responsibility and happens before a template row is written.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::AccountId;
use crate::core::identifiers::AttachmentId;
use crate::core::identifiers::EvaluatorPolicyId;
use crate::core::identifiers::GroupId;
use crate::core::identifiers::PolicyId;
use crate::core::identifiers::PolicyStoreId;
use crate::core::identifiers::PrincipalArn;
use crate::core::policy::PolicyDocument;
use crate::core::policy::TargetType;
use crate::core::time::Timestamp;

// ============================================================================
// SECTION: Accounts
// ============================================================================

/// A provisioned tenant account.
///
/// # Invariants
/// - Privileged accounts carry no policy store.
/// - Non-privileged accounts carry exactly one policy store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    /// Tenant account identifier.
    pub account_id: AccountId,
    /// Whether the account bypasses policy evaluation entirely.
    pub privileged: bool,
    /// Evaluator policy store for the account; absent when privileged.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy_store_id: Option<PolicyStoreId>,
    /// Creation time.
    pub created_at: Timestamp,
    /// Principal that enabled the account.
    pub created_by: String,
}

// ============================================================================
// SECTION: Admins
// ============================================================================

/// An admin membership row; presence grants evaluator bypass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Admin {
    /// Tenant account identifier.
    pub account_id: AccountId,
    /// Admin principal.
    pub principal_arn: PrincipalArn,
    /// Creation time.
    pub created_at: Timestamp,
    /// Principal that added the admin.
    pub created_by: String,
}

// ============================================================================
// SECTION: Groups
// ============================================================================

/// A principal group. The `name` is informational; policies reference the
/// allocated `group_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    /// Tenant account identifier.
    pub account_id: AccountId,
    /// Allocated group identifier.
    pub group_id: GroupId,
    /// Informational display name.
    pub name: String,
    /// Informational description.
    #[serde(default)]
    pub description: String,
    /// Creation time.
    pub created_at: Timestamp,
}

/// A group membership row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupMember {
    /// Tenant account identifier.
    pub account_id: AccountId,
    /// Group identifier.
    pub group_id: GroupId,
    /// Member principal.
    pub member_arn: PrincipalArn,
    /// Creation time.
    pub created_at: Timestamp,
}

// ============================================================================
// SECTION: Policy Templates
// ============================================================================

/// A stored policy template.
///
/// # Invariants
/// - `document` passed validation before the row was written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyTemplate {
    /// Tenant account identifier.
    pub account_id: AccountId,
    /// Allocated template identifier.
    pub policy_id: PolicyId,
    /// Informational display name.
    pub name: String,
    /// Informational description.
    #[serde(default)]
    pub description: String,
    /// The v0 policy document.
    pub document: PolicyDocument,
    /// Creation time.
    pub created_at: Timestamp,
}

// ============================================================================
// SECTION: Attachments
// ============================================================================

/// A policy attachment binding a template to a user or group.
///
/// # Invariants
/// - Each attachment corresponds 1:1 with a policy registered at the
///   evaluator under `evaluator_policy_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    /// Tenant account identifier.
    pub account_id: AccountId,
    /// Allocated attachment identifier.
    pub attachment_id: AttachmentId,
    /// Attached template.
    pub policy_id: PolicyId,
    /// Kind of principal the attachment binds to.
    pub target_type: TargetType,
    /// ARN for user targets, group id for group targets.
    pub target_id: String,
    /// Compiled policy registered at the evaluator.
    pub evaluator_policy_id: EvaluatorPolicyId,
    /// Creation time.
    pub created_at: Timestamp,
}

/// Filter for attachment listings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttachmentFilter {
    /// Restrict to attachments of one template.
    pub policy_id: Option<PolicyId>,
    /// Restrict to attachments of one target.
    pub target: Option<(TargetType, String)>,
}
