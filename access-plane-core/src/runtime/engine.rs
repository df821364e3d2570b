// access-plane-core/src/runtime/engine.rs
// ============================================================================
// Module: Access Plane Authorization Engine
// Description: Layered decision pipeline and policy lifecycle orchestration.
// Purpose: Compose privileged, provisioning, admin, and evaluator layers and
//          keep store rows and evaluator policies in lockstep.
// Dependencies: crate::{core, interfaces, runtime, translate}, tracing, uuid
// ============================================================================

//! ## Overview
//! The engine is the single canonical execution path for authorization
//! decisions and for the operations that manage accounts, admins, groups,
//! templates, and attachments. Decisions run in strict layer order with
//! short-circuit: bootstrap-privileged bypass (no I/O), provisioning gate,
//! account-flag privileged bypass, admin bypass, then evaluator query. A
//! transport failure at any layer propagates as an error; it is never folded
//! into a deny.
//!
//! The engine is request-scoped and stateless apart from the privileged
//! bootstrap cache; one instance serves concurrent requests.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::core::identifiers::AccountId;
use crate::core::identifiers::AttachmentId;
use crate::core::identifiers::GroupId;
use crate::core::identifiers::PolicyId;
use crate::core::identifiers::PrincipalArn;
use crate::core::policy::PolicyDocument;
use crate::core::policy::TargetType;
use crate::core::records::Account;
use crate::core::records::Admin;
use crate::core::records::Attachment;
use crate::core::records::AttachmentFilter;
use crate::core::records::Group;
use crate::core::records::GroupMember;
use crate::core::records::PolicyTemplate;
use crate::core::schema::evaluator_schema_json;
use crate::core::time::Timestamp;
use crate::core::validation::ValidationError;
use crate::core::validation::validate_document;
use crate::interfaces::AuthzStore;
use crate::interfaces::EvaluatorDecision;
use crate::interfaces::EvaluatorError;
use crate::interfaces::PolicyEvaluator;
use crate::interfaces::StoreError;
use crate::runtime::audit::DecisionAuditEvent;
use crate::runtime::audit::DecisionAuditSink;
use crate::runtime::privileged::PrivilegedChecker;
use crate::runtime::request::AuthzRequest;
use crate::runtime::request::build_evaluator_request;
use crate::translate::PrincipalBinding;
use crate::translate::TranslateError;
use crate::translate::translate_document;

// ============================================================================
// SECTION: Decisions
// ============================================================================

/// Authorization verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    /// Access granted.
    Allow,
    /// Access denied.
    Deny,
}

impl Decision {
    /// Returns a stable label for the verdict.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Allow => "allow",
            Self::Deny => "deny",
        }
    }
}

/// The layer that produced a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecisionSource {
    /// Privileged bypass (bootstrap file or account flag).
    Privileged,
    /// Admin membership bypass.
    Admin,
    /// Evaluator verdict.
    Evaluator,
    /// Authorization disabled; legacy passthrough.
    Passthrough,
}

impl DecisionSource {
    /// Returns a stable label for the source.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Privileged => "privileged",
            Self::Admin => "admin",
            Self::Evaluator => "evaluator",
            Self::Passthrough => "passthrough",
        }
    }
}

/// A decision together with the layer that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessDecision {
    /// The verdict.
    pub decision: Decision,
    /// The layer that decided.
    pub source: DecisionSource,
}

impl AccessDecision {
    /// Returns true when access was granted.
    #[must_use]
    pub const fn is_allow(&self) -> bool {
        matches!(self.decision, Decision::Allow)
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Engine error taxonomy.
#[derive(Debug, Error)]
pub enum AuthzError {
    /// The submitted document was rejected by the validator.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// A referenced record does not exist.
    #[error("{kind} not found: {id}")]
    NotFound {
        /// Record kind, e.g. `account` or `policy`.
        kind: &'static str,
        /// Record identifier.
        id: String,
    },
    /// The account has no row in the store (decision pipeline step 2).
    #[error("account not provisioned: {0}")]
    AccountNotProvisioned(AccountId),
    /// A store or evaluator call failed.
    #[error("transport failure: {0}")]
    Transport(String),
    /// A validated document failed translation.
    #[error("policy translation failed: {0}")]
    Translation(#[from] TranslateError),
    /// The operation conflicts with existing state.
    #[error("conflict: {0}")]
    Conflict(String),
}

impl From<StoreError> for AuthzError {
    fn from(err: StoreError) -> Self {
        Self::Transport(err.to_string())
    }
}

impl From<EvaluatorError> for AuthzError {
    fn from(err: EvaluatorError) -> Self {
        Self::Transport(err.to_string())
    }
}

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Engine configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizerConfig {
    /// When false every authorization returns `Allow` (legacy passthrough).
    pub enabled: bool,
}

impl Default for AuthorizerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
        }
    }
}

// ============================================================================
// SECTION: Authorizer
// ============================================================================

/// The authorization engine, generic over the store and evaluator backends.
pub struct Authorizer<S, E> {
    /// Engine configuration.
    config: AuthorizerConfig,
    /// Durable store backend.
    store: S,
    /// Policy evaluator backend.
    evaluator: E,
    /// Bootstrap privileged-account cache.
    privileged: PrivilegedChecker,
    /// Decision audit sink.
    audit: Arc<dyn DecisionAuditSink>,
    /// Schema installed into new policy stores.
    schema_json: String,
}

impl<S, E> Authorizer<S, E>
where
    S: AuthzStore,
    E: PolicyEvaluator,
{
    /// Creates a new engine over the given backends.
    #[must_use]
    pub fn new(
        config: AuthorizerConfig,
        store: S,
        evaluator: E,
        privileged: PrivilegedChecker,
        audit: Arc<dyn DecisionAuditSink>,
    ) -> Self {
        Self {
            config,
            store,
            evaluator,
            privileged,
            audit,
            schema_json: evaluator_schema_json(),
        }
    }

    /// Returns the bootstrap privileged-account checker.
    #[must_use]
    pub fn privileged_checker(&self) -> &PrivilegedChecker {
        &self.privileged
    }

    // ========================================================================
    // SECTION: Decision Pipeline
    // ========================================================================

    /// Answers an authorization query through the layered pipeline.
    ///
    /// # Errors
    ///
    /// Returns [`AuthzError::AccountNotProvisioned`] when the account has no
    /// row, and [`AuthzError::Transport`] when a backend call fails. A
    /// transport failure is never converted into a deny.
    pub async fn authorize(&self, request: &AuthzRequest) -> Result<AccessDecision, AuthzError> {
        if !self.config.enabled {
            return Ok(self.record(request, Decision::Allow, DecisionSource::Passthrough));
        }

        // Step 1 touches only the in-process bootstrap cache.
        if self.privileged.is_bootstrap_privileged(&request.account_id) {
            return Ok(self.record(request, Decision::Allow, DecisionSource::Privileged));
        }

        let account = self
            .store
            .get_account(&request.account_id)
            .await?
            .ok_or_else(|| AuthzError::AccountNotProvisioned(request.account_id.clone()))?;

        if account.privileged {
            return Ok(self.record(request, Decision::Allow, DecisionSource::Privileged));
        }

        if self.store.is_admin(&request.account_id, &request.caller_arn).await? {
            return Ok(self.record(request, Decision::Allow, DecisionSource::Admin));
        }

        let groups = self.store.groups_of(&request.account_id, &request.caller_arn).await?;
        let policy_store_id = account.policy_store_id.as_ref().ok_or_else(|| {
            AuthzError::Transport(format!("account {} has no policy store", request.account_id))
        })?;

        let query = build_evaluator_request(request, &groups, policy_store_id);
        let verdict = self.evaluator.is_authorized(&query).await?;
        let decision = match verdict {
            EvaluatorDecision::Allow => Decision::Allow,
            EvaluatorDecision::Deny => Decision::Deny,
        };
        Ok(self.record(request, decision, DecisionSource::Evaluator))
    }

    /// Records a decision with the audit sink and tracing, then returns it.
    fn record(
        &self,
        request: &AuthzRequest,
        decision: Decision,
        source: DecisionSource,
    ) -> AccessDecision {
        let event = DecisionAuditEvent {
            event: "authorization_decision",
            timestamp: Timestamp::now(),
            account_id: request.account_id.clone(),
            caller_arn: request.caller_arn.clone(),
            action: request.action.clone(),
            resource: request.resource.clone(),
            source,
            decision,
        };
        self.audit.record(&event);
        tracing::info!(
            account_id = %request.account_id,
            caller_arn = %request.caller_arn,
            action = %request.action,
            resource = %request.resource,
            source = source.as_str(),
            decision = decision.as_str(),
            "authorization decision"
        );
        AccessDecision {
            decision,
            source,
        }
    }

    // ========================================================================
    // SECTION: Privilege and Account Operations
    // ========================================================================

    /// Returns true when the account is privileged via the bootstrap file or
    /// its account row.
    ///
    /// # Errors
    ///
    /// Returns [`AuthzError::Transport`] when the store call fails.
    pub async fn is_privileged(&self, account_id: &AccountId) -> Result<bool, AuthzError> {
        if self.privileged.is_bootstrap_privileged(account_id) {
            return Ok(true);
        }
        Ok(self
            .store
            .get_account(account_id)
            .await?
            .is_some_and(|account| account.privileged))
    }

    /// Provisions an account. Non-privileged accounts get a policy store with
    /// the schema installed; the store is rolled back if schema installation
    /// or the row write fails.
    ///
    /// # Errors
    ///
    /// Returns [`AuthzError::Transport`] when a backend call fails.
    pub async fn enable_account(
        &self,
        account_id: &AccountId,
        created_by: &str,
        privileged: bool,
    ) -> Result<Account, AuthzError> {
        let mut account = Account {
            account_id: account_id.clone(),
            privileged,
            policy_store_id: None,
            created_at: Timestamp::now(),
            created_by: created_by.to_string(),
        };

        if !privileged {
            let description = format!("authorization policy store for account {account_id}");
            let policy_store_id = self.evaluator.create_policy_store(&description).await?;
            if let Err(err) = self.evaluator.put_schema(&policy_store_id, &self.schema_json).await
            {
                if let Err(cleanup) = self.evaluator.delete_policy_store(&policy_store_id).await {
                    tracing::warn!(
                        policy_store_id = %policy_store_id,
                        error = %cleanup,
                        "failed to roll back policy store after schema failure"
                    );
                }
                return Err(err.into());
            }
            account.policy_store_id = Some(policy_store_id);
        }

        if let Err(err) = self.store.put_account(&account).await {
            if let Some(policy_store_id) = &account.policy_store_id {
                if let Err(cleanup) = self.evaluator.delete_policy_store(policy_store_id).await {
                    tracing::warn!(
                        policy_store_id = %policy_store_id,
                        error = %cleanup,
                        "failed to roll back policy store after account write failure"
                    );
                }
            }
            return Err(err.into());
        }

        tracing::info!(account_id = %account_id, privileged, "account enabled");
        Ok(account)
    }

    /// Removes an account and, best-effort, its evaluator policy store.
    ///
    /// # Errors
    ///
    /// Returns [`AuthzError::NotFound`] when the account does not exist and
    /// [`AuthzError::Transport`] when the row delete fails.
    pub async fn disable_account(&self, account_id: &AccountId) -> Result<(), AuthzError> {
        let account =
            self.store.get_account(account_id).await?.ok_or_else(|| AuthzError::NotFound {
                kind: "account",
                id: account_id.to_string(),
            })?;

        if let Some(policy_store_id) = &account.policy_store_id {
            if let Err(err) = self.evaluator.delete_policy_store(policy_store_id).await {
                tracing::warn!(
                    policy_store_id = %policy_store_id,
                    error = %err,
                    "failed to delete policy store while disabling account"
                );
            }
        }

        self.store.delete_account(account_id).await?;
        tracing::info!(account_id = %account_id, "account disabled");
        Ok(())
    }

    /// Loads an account row.
    ///
    /// # Errors
    ///
    /// Returns [`AuthzError::Transport`] when the store call fails.
    pub async fn get_account(&self, account_id: &AccountId) -> Result<Option<Account>, AuthzError> {
        Ok(self.store.get_account(account_id).await?)
    }

    /// Lists every account row.
    ///
    /// # Errors
    ///
    /// Returns [`AuthzError::Transport`] when the store call fails.
    pub async fn list_accounts(&self) -> Result<Vec<Account>, AuthzError> {
        Ok(self.store.list_accounts().await?)
    }

    /// Returns true when the account is provisioned. Privileged accounts
    /// count as provisioned even without a row.
    ///
    /// # Errors
    ///
    /// Returns [`AuthzError::Transport`] when the store call fails.
    pub async fn is_account_provisioned(&self, account_id: &AccountId) -> Result<bool, AuthzError> {
        if self.is_privileged(account_id).await? {
            return Ok(true);
        }
        Ok(self.store.account_exists(account_id).await?)
    }

    // ========================================================================
    // SECTION: Admin Operations
    // ========================================================================

    /// Returns true when the principal is an admin of the account.
    ///
    /// # Errors
    ///
    /// Returns [`AuthzError::Transport`] when the store call fails.
    pub async fn is_admin(
        &self,
        account_id: &AccountId,
        principal: &PrincipalArn,
    ) -> Result<bool, AuthzError> {
        Ok(self.store.is_admin(account_id, principal).await?)
    }

    /// Grants admin bypass to a principal.
    ///
    /// # Errors
    ///
    /// Returns [`AuthzError::Transport`] when the store call fails.
    pub async fn add_admin(
        &self,
        account_id: &AccountId,
        principal: &PrincipalArn,
        created_by: &str,
    ) -> Result<(), AuthzError> {
        let record = Admin {
            account_id: account_id.clone(),
            principal_arn: principal.clone(),
            created_at: Timestamp::now(),
            created_by: created_by.to_string(),
        };
        Ok(self.store.add_admin(&record).await?)
    }

    /// Revokes admin bypass from a principal.
    ///
    /// # Errors
    ///
    /// Returns [`AuthzError::Transport`] when the store call fails.
    pub async fn remove_admin(
        &self,
        account_id: &AccountId,
        principal: &PrincipalArn,
    ) -> Result<(), AuthzError> {
        Ok(self.store.remove_admin(account_id, principal).await?)
    }

    /// Lists admin principals of the account.
    ///
    /// # Errors
    ///
    /// Returns [`AuthzError::Transport`] when the store call fails.
    pub async fn list_admins(
        &self,
        account_id: &AccountId,
    ) -> Result<Vec<PrincipalArn>, AuthzError> {
        Ok(self.store.list_admin_arns(account_id).await?)
    }

    // ========================================================================
    // SECTION: Group Operations
    // ========================================================================

    /// Creates a group with a freshly allocated id.
    ///
    /// # Errors
    ///
    /// Returns [`AuthzError::Transport`] when the store call fails.
    pub async fn create_group(
        &self,
        account_id: &AccountId,
        name: &str,
        description: &str,
    ) -> Result<Group, AuthzError> {
        let group = Group {
            account_id: account_id.clone(),
            group_id: GroupId::new(Uuid::new_v4().to_string()),
            name: name.to_string(),
            description: description.to_string(),
            created_at: Timestamp::now(),
        };
        self.store.create_group(&group).await?;
        Ok(group)
    }

    /// Loads a group.
    ///
    /// # Errors
    ///
    /// Returns [`AuthzError::Transport`] when the store call fails.
    pub async fn get_group(
        &self,
        account_id: &AccountId,
        group_id: &GroupId,
    ) -> Result<Option<Group>, AuthzError> {
        Ok(self.store.get_group(account_id, group_id).await?)
    }

    /// Deletes a group, removing its memberships first.
    ///
    /// # Errors
    ///
    /// Returns [`AuthzError::Transport`] when a store call fails.
    pub async fn delete_group(
        &self,
        account_id: &AccountId,
        group_id: &GroupId,
    ) -> Result<(), AuthzError> {
        self.store.remove_group_members(account_id, group_id).await?;
        Ok(self.store.delete_group(account_id, group_id).await?)
    }

    /// Lists every group of the account.
    ///
    /// # Errors
    ///
    /// Returns [`AuthzError::Transport`] when the store call fails.
    pub async fn list_groups(&self, account_id: &AccountId) -> Result<Vec<Group>, AuthzError> {
        Ok(self.store.list_groups(account_id).await?)
    }

    /// Adds a member to a group.
    ///
    /// # Errors
    ///
    /// Returns [`AuthzError::Transport`] when the store call fails.
    pub async fn add_group_member(
        &self,
        account_id: &AccountId,
        group_id: &GroupId,
        member: &PrincipalArn,
    ) -> Result<(), AuthzError> {
        let record = GroupMember {
            account_id: account_id.clone(),
            group_id: group_id.clone(),
            member_arn: member.clone(),
            created_at: Timestamp::now(),
        };
        Ok(self.store.add_member(&record).await?)
    }

    /// Removes a member from a group.
    ///
    /// # Errors
    ///
    /// Returns [`AuthzError::Transport`] when the store call fails.
    pub async fn remove_group_member(
        &self,
        account_id: &AccountId,
        group_id: &GroupId,
        member: &PrincipalArn,
    ) -> Result<(), AuthzError> {
        Ok(self.store.remove_member(account_id, group_id, member).await?)
    }

    /// Lists members of a group.
    ///
    /// # Errors
    ///
    /// Returns [`AuthzError::Transport`] when the store call fails.
    pub async fn list_group_members(
        &self,
        account_id: &AccountId,
        group_id: &GroupId,
    ) -> Result<Vec<PrincipalArn>, AuthzError> {
        Ok(self.store.list_group_members(account_id, group_id).await?)
    }

    /// Lists the groups a principal belongs to.
    ///
    /// # Errors
    ///
    /// Returns [`AuthzError::Transport`] when the store call fails.
    pub async fn user_groups(
        &self,
        account_id: &AccountId,
        member: &PrincipalArn,
    ) -> Result<Vec<GroupId>, AuthzError> {
        Ok(self.store.groups_of(account_id, member).await?)
    }

    // ========================================================================
    // SECTION: Template Operations
    // ========================================================================

    /// Creates a policy template after validating the document.
    ///
    /// # Errors
    ///
    /// Returns [`AuthzError::Validation`] when the document is rejected and
    /// [`AuthzError::Transport`] when the store call fails.
    pub async fn create_policy(
        &self,
        account_id: &AccountId,
        name: &str,
        description: &str,
        document: PolicyDocument,
    ) -> Result<PolicyTemplate, AuthzError> {
        validate_document(&document).into_result()?;

        let template = PolicyTemplate {
            account_id: account_id.clone(),
            policy_id: PolicyId::new(Uuid::new_v4().to_string()),
            name: name.to_string(),
            description: description.to_string(),
            document,
            created_at: Timestamp::now(),
        };
        self.store.create_template(&template).await?;
        tracing::info!(
            account_id = %account_id,
            policy_id = %template.policy_id,
            name,
            "policy template created"
        );
        Ok(template)
    }

    /// Loads a policy template.
    ///
    /// # Errors
    ///
    /// Returns [`AuthzError::Transport`] when the store call fails.
    pub async fn get_policy(
        &self,
        account_id: &AccountId,
        policy_id: &PolicyId,
    ) -> Result<Option<PolicyTemplate>, AuthzError> {
        Ok(self.store.get_template(account_id, policy_id).await?)
    }

    /// Updates a policy template and refreshes every attachment of the
    /// template at the evaluator. The row update lands first; attachment
    /// refreshes that fail are reported so the caller can retry, leaving
    /// state eventually consistent.
    ///
    /// # Errors
    ///
    /// Returns [`AuthzError::Validation`] when the document is rejected,
    /// [`AuthzError::NotFound`] when the template does not exist, and
    /// [`AuthzError::Transport`] when the row update or any attachment
    /// refresh fails.
    pub async fn update_policy(
        &self,
        account_id: &AccountId,
        policy_id: &PolicyId,
        name: &str,
        description: &str,
        document: PolicyDocument,
    ) -> Result<PolicyTemplate, AuthzError> {
        validate_document(&document).into_result()?;

        let existing = self.store.get_template(account_id, policy_id).await?.ok_or_else(|| {
            AuthzError::NotFound {
                kind: "policy",
                id: policy_id.to_string(),
            }
        })?;

        let updated = PolicyTemplate {
            account_id: account_id.clone(),
            policy_id: policy_id.clone(),
            name: name.to_string(),
            description: description.to_string(),
            document,
            created_at: existing.created_at,
        };
        self.store.update_template(&updated).await?;

        let attachments = self.store.list_attachments_by_policy(account_id, policy_id).await?;
        if !attachments.is_empty() {
            let account =
                self.store.get_account(account_id).await?.ok_or_else(|| AuthzError::NotFound {
                    kind: "account",
                    id: account_id.to_string(),
                })?;
            let policy_store_id = account.policy_store_id.ok_or_else(|| {
                AuthzError::Conflict(format!("account {account_id} has no policy store"))
            })?;

            let mut failed = Vec::new();
            for attachment in &attachments {
                let binding = PrincipalBinding {
                    target_type: attachment.target_type,
                    target_id: attachment.target_id.clone(),
                };
                let rules = translate_document(&updated.document, &binding)?;
                let text = rules.join("\n\n");
                if let Err(err) = self
                    .evaluator
                    .update_policy(&policy_store_id, &attachment.evaluator_policy_id, &text)
                    .await
                {
                    tracing::warn!(
                        account_id = %account_id,
                        attachment_id = %attachment.attachment_id,
                        error = %err,
                        "failed to refresh attachment after template update"
                    );
                    failed.push(attachment.attachment_id.clone());
                }
            }
            if !failed.is_empty() {
                let ids =
                    failed.iter().map(AttachmentId::as_str).collect::<Vec<_>>().join(", ");
                return Err(AuthzError::Transport(format!(
                    "template updated but {} attachment(s) were not refreshed: {ids}",
                    failed.len()
                )));
            }
        }

        tracing::info!(account_id = %account_id, policy_id = %policy_id, "policy template updated");
        Ok(updated)
    }

    /// Deletes a policy template. Refused while any attachment references it.
    ///
    /// # Errors
    ///
    /// Returns [`AuthzError::Conflict`] when attachments reference the
    /// template and [`AuthzError::Transport`] when a store call fails.
    pub async fn delete_policy(
        &self,
        account_id: &AccountId,
        policy_id: &PolicyId,
    ) -> Result<(), AuthzError> {
        let attachments = self.store.list_attachments_by_policy(account_id, policy_id).await?;
        if !attachments.is_empty() {
            return Err(AuthzError::Conflict(
                "cannot delete policy with existing attachments".to_string(),
            ));
        }
        Ok(self.store.delete_template(account_id, policy_id).await?)
    }

    /// Lists every policy template of the account.
    ///
    /// # Errors
    ///
    /// Returns [`AuthzError::Transport`] when the store call fails.
    pub async fn list_policies(
        &self,
        account_id: &AccountId,
    ) -> Result<Vec<PolicyTemplate>, AuthzError> {
        Ok(self.store.list_templates(account_id).await?)
    }

    // ========================================================================
    // SECTION: Attachment Operations
    // ========================================================================

    /// Attaches a template to a user or group: translate, register the
    /// compiled policy at the evaluator, then record the attachment row. If
    /// the row write fails the freshly created evaluator policy is removed.
    ///
    /// # Errors
    ///
    /// Returns [`AuthzError::NotFound`] when the account or template is
    /// missing, [`AuthzError::Conflict`] for accounts without a policy
    /// store, [`AuthzError::Translation`] when the stored document fails to
    /// translate, and [`AuthzError::Transport`] when a backend call fails.
    pub async fn attach_policy(
        &self,
        account_id: &AccountId,
        policy_id: &PolicyId,
        target_type: TargetType,
        target_id: &str,
    ) -> Result<Attachment, AuthzError> {
        let account =
            self.store.get_account(account_id).await?.ok_or_else(|| AuthzError::NotFound {
                kind: "account",
                id: account_id.to_string(),
            })?;
        let policy_store_id = account.policy_store_id.ok_or_else(|| {
            AuthzError::Conflict(
                "account has no policy store (privileged accounts cannot hold policies)"
                    .to_string(),
            )
        })?;

        let template =
            self.store.get_template(account_id, policy_id).await?.ok_or_else(|| {
                AuthzError::NotFound {
                    kind: "policy",
                    id: policy_id.to_string(),
                }
            })?;

        let binding = PrincipalBinding {
            target_type,
            target_id: target_id.to_string(),
        };
        let rules = translate_document(&template.document, &binding)?;
        // Statements are independent top-level rules; a blank line separates
        // them in the combined policy text.
        let text = rules.join("\n\n");

        let description =
            format!("policy {policy_id} attached to {target_type} {target_id}");
        let evaluator_policy_id =
            self.evaluator.create_policy(&policy_store_id, &text, &description).await?;

        let attachment = Attachment {
            account_id: account_id.clone(),
            attachment_id: AttachmentId::new(Uuid::new_v4().to_string()),
            policy_id: policy_id.clone(),
            target_type,
            target_id: target_id.to_string(),
            evaluator_policy_id: evaluator_policy_id.clone(),
            created_at: Timestamp::now(),
        };
        if let Err(err) = self.store.create_attachment(&attachment).await {
            if let Err(cleanup) =
                self.evaluator.delete_policy(&policy_store_id, &evaluator_policy_id).await
            {
                tracing::warn!(
                    evaluator_policy_id = %evaluator_policy_id,
                    error = %cleanup,
                    "failed to roll back evaluator policy after attachment write failure"
                );
            }
            return Err(err.into());
        }

        tracing::info!(
            account_id = %account_id,
            attachment_id = %attachment.attachment_id,
            policy_id = %policy_id,
            target_type = target_type.as_str(),
            target_id,
            "policy attached"
        );
        Ok(attachment)
    }

    /// Detaches a policy. The evaluator delete is best-effort: the policy may
    /// already be gone, and the attachment row is removed regardless.
    ///
    /// # Errors
    ///
    /// Returns [`AuthzError::NotFound`] when the attachment or account is
    /// missing and [`AuthzError::Transport`] when the row delete fails.
    pub async fn detach_policy(
        &self,
        account_id: &AccountId,
        attachment_id: &AttachmentId,
    ) -> Result<(), AuthzError> {
        let attachment = self
            .store
            .get_attachment(account_id, attachment_id)
            .await?
            .ok_or_else(|| AuthzError::NotFound {
                kind: "attachment",
                id: attachment_id.to_string(),
            })?;
        let account =
            self.store.get_account(account_id).await?.ok_or_else(|| AuthzError::NotFound {
                kind: "account",
                id: account_id.to_string(),
            })?;

        if let Some(policy_store_id) = &account.policy_store_id {
            if let Err(err) = self
                .evaluator
                .delete_policy(policy_store_id, &attachment.evaluator_policy_id)
                .await
            {
                tracing::warn!(
                    evaluator_policy_id = %attachment.evaluator_policy_id,
                    error = %err,
                    "failed to delete evaluator policy during detach"
                );
            }
        }

        self.store.delete_attachment(account_id, attachment_id).await?;
        tracing::info!(
            account_id = %account_id,
            attachment_id = %attachment_id,
            "policy detached"
        );
        Ok(())
    }

    /// Lists attachments matching the filter, using the store's secondary
    /// lookups where possible.
    ///
    /// # Errors
    ///
    /// Returns [`AuthzError::Transport`] when the store call fails.
    pub async fn list_attachments(
        &self,
        account_id: &AccountId,
        filter: &AttachmentFilter,
    ) -> Result<Vec<Attachment>, AuthzError> {
        if let Some((target_type, target_id)) = &filter.target {
            return Ok(self
                .store
                .list_attachments_by_target(account_id, *target_type, target_id)
                .await?);
        }
        if let Some(policy_id) = &filter.policy_id {
            return Ok(self.store.list_attachments_by_policy(account_id, policy_id).await?);
        }
        Ok(self.store.list_attachments(account_id).await?)
    }
}
