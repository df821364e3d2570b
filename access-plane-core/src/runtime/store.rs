// access-plane-core/src/runtime/store.rs
// ============================================================================
// Module: Access Plane In-Memory Store
// Description: In-memory implementation of every store interface.
// Purpose: Back tests and local runs without a durable backend.
// Dependencies: crate::{core, interfaces}, async-trait
// ============================================================================

//! ## Overview
//! A single mutex-guarded map set implementing the full [`AuthzStore`]
//! surface, including the secondary attachment lookups and the reverse
//! membership lookup. Not intended for production durability.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::MutexGuard;

use async_trait::async_trait;

use crate::core::identifiers::AccountId;
use crate::core::identifiers::AttachmentId;
use crate::core::identifiers::GroupId;
use crate::core::identifiers::PolicyId;
use crate::core::identifiers::PrincipalArn;
use crate::core::policy::TargetType;
use crate::core::records::Account;
use crate::core::records::Admin;
use crate::core::records::Attachment;
use crate::core::records::Group;
use crate::core::records::GroupMember;
use crate::core::records::PolicyTemplate;
use crate::interfaces::AccountStore;
use crate::interfaces::AdminStore;
use crate::interfaces::AttachmentStore;
use crate::interfaces::GroupStore;
use crate::interfaces::MemberStore;
use crate::interfaces::StoreError;
use crate::interfaces::TemplateStore;

// ============================================================================
// SECTION: State
// ============================================================================

/// All tables, keyed the way the durable store keys its rows.
#[derive(Debug, Default)]
struct State {
    accounts: BTreeMap<String, Account>,
    admins: BTreeMap<(String, String), Admin>,
    groups: BTreeMap<(String, String), Group>,
    members: BTreeMap<(String, String, String), GroupMember>,
    templates: BTreeMap<(String, String), PolicyTemplate>,
    attachments: BTreeMap<(String, String), Attachment>,
}

/// In-memory store implementing the full [`crate::interfaces::AuthzStore`]
/// surface.
#[derive(Debug, Default)]
pub struct InMemoryAuthzStore {
    inner: Mutex<State>,
}

impl InMemoryAuthzStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> Result<MutexGuard<'_, State>, StoreError> {
        self.inner.lock().map_err(|_| StoreError::Transport("state lock poisoned".to_string()))
    }
}

// ============================================================================
// SECTION: Accounts
// ============================================================================

#[async_trait]
impl AccountStore for InMemoryAuthzStore {
    async fn get_account(&self, id: &AccountId) -> Result<Option<Account>, StoreError> {
        Ok(self.state()?.accounts.get(id.as_str()).cloned())
    }

    async fn put_account(&self, record: &Account) -> Result<(), StoreError> {
        self.state()?.accounts.insert(record.account_id.as_str().to_string(), record.clone());
        Ok(())
    }

    async fn delete_account(&self, id: &AccountId) -> Result<(), StoreError> {
        self.state()?.accounts.remove(id.as_str());
        Ok(())
    }

    async fn list_accounts(&self) -> Result<Vec<Account>, StoreError> {
        Ok(self.state()?.accounts.values().cloned().collect())
    }

    async fn account_exists(&self, id: &AccountId) -> Result<bool, StoreError> {
        Ok(self.state()?.accounts.contains_key(id.as_str()))
    }
}

// ============================================================================
// SECTION: Admins
// ============================================================================

#[async_trait]
impl AdminStore for InMemoryAuthzStore {
    async fn is_admin(&self, account: &AccountId, arn: &PrincipalArn) -> Result<bool, StoreError> {
        let key = (account.as_str().to_string(), arn.as_str().to_string());
        Ok(self.state()?.admins.contains_key(&key))
    }

    async fn add_admin(&self, record: &Admin) -> Result<(), StoreError> {
        let key = (
            record.account_id.as_str().to_string(),
            record.principal_arn.as_str().to_string(),
        );
        self.state()?.admins.insert(key, record.clone());
        Ok(())
    }

    async fn remove_admin(
        &self,
        account: &AccountId,
        arn: &PrincipalArn,
    ) -> Result<(), StoreError> {
        let key = (account.as_str().to_string(), arn.as_str().to_string());
        self.state()?.admins.remove(&key);
        Ok(())
    }

    async fn list_admin_arns(&self, account: &AccountId) -> Result<Vec<PrincipalArn>, StoreError> {
        Ok(self
            .state()?
            .admins
            .values()
            .filter(|admin| admin.account_id == *account)
            .map(|admin| admin.principal_arn.clone())
            .collect())
    }
}

// ============================================================================
// SECTION: Groups
// ============================================================================

#[async_trait]
impl GroupStore for InMemoryAuthzStore {
    async fn create_group(&self, record: &Group) -> Result<(), StoreError> {
        let key = (record.account_id.as_str().to_string(), record.group_id.as_str().to_string());
        self.state()?.groups.insert(key, record.clone());
        Ok(())
    }

    async fn get_group(
        &self,
        account: &AccountId,
        group_id: &GroupId,
    ) -> Result<Option<Group>, StoreError> {
        let key = (account.as_str().to_string(), group_id.as_str().to_string());
        Ok(self.state()?.groups.get(&key).cloned())
    }

    async fn delete_group(
        &self,
        account: &AccountId,
        group_id: &GroupId,
    ) -> Result<(), StoreError> {
        let key = (account.as_str().to_string(), group_id.as_str().to_string());
        self.state()?.groups.remove(&key);
        Ok(())
    }

    async fn list_groups(&self, account: &AccountId) -> Result<Vec<Group>, StoreError> {
        Ok(self
            .state()?
            .groups
            .values()
            .filter(|group| group.account_id == *account)
            .cloned()
            .collect())
    }
}

// ============================================================================
// SECTION: Members
// ============================================================================

#[async_trait]
impl MemberStore for InMemoryAuthzStore {
    async fn add_member(&self, record: &GroupMember) -> Result<(), StoreError> {
        let key = (
            record.account_id.as_str().to_string(),
            record.group_id.as_str().to_string(),
            record.member_arn.as_str().to_string(),
        );
        self.state()?.members.insert(key, record.clone());
        Ok(())
    }

    async fn remove_member(
        &self,
        account: &AccountId,
        group_id: &GroupId,
        member: &PrincipalArn,
    ) -> Result<(), StoreError> {
        let key = (
            account.as_str().to_string(),
            group_id.as_str().to_string(),
            member.as_str().to_string(),
        );
        self.state()?.members.remove(&key);
        Ok(())
    }

    async fn remove_group_members(
        &self,
        account: &AccountId,
        group_id: &GroupId,
    ) -> Result<(), StoreError> {
        self.state()?.members.retain(|(acct, gid, _), _| {
            !(acct == account.as_str() && gid == group_id.as_str())
        });
        Ok(())
    }

    async fn list_group_members(
        &self,
        account: &AccountId,
        group_id: &GroupId,
    ) -> Result<Vec<PrincipalArn>, StoreError> {
        Ok(self
            .state()?
            .members
            .values()
            .filter(|member| member.account_id == *account && member.group_id == *group_id)
            .map(|member| member.member_arn.clone())
            .collect())
    }

    async fn groups_of(
        &self,
        account: &AccountId,
        member: &PrincipalArn,
    ) -> Result<Vec<GroupId>, StoreError> {
        Ok(self
            .state()?
            .members
            .values()
            .filter(|row| row.account_id == *account && row.member_arn == *member)
            .map(|row| row.group_id.clone())
            .collect())
    }
}

// ============================================================================
// SECTION: Templates
// ============================================================================

#[async_trait]
impl TemplateStore for InMemoryAuthzStore {
    async fn create_template(&self, record: &PolicyTemplate) -> Result<(), StoreError> {
        let key =
            (record.account_id.as_str().to_string(), record.policy_id.as_str().to_string());
        self.state()?.templates.insert(key, record.clone());
        Ok(())
    }

    async fn get_template(
        &self,
        account: &AccountId,
        policy_id: &PolicyId,
    ) -> Result<Option<PolicyTemplate>, StoreError> {
        let key = (account.as_str().to_string(), policy_id.as_str().to_string());
        Ok(self.state()?.templates.get(&key).cloned())
    }

    async fn update_template(&self, record: &PolicyTemplate) -> Result<(), StoreError> {
        let key =
            (record.account_id.as_str().to_string(), record.policy_id.as_str().to_string());
        self.state()?.templates.insert(key, record.clone());
        Ok(())
    }

    async fn delete_template(
        &self,
        account: &AccountId,
        policy_id: &PolicyId,
    ) -> Result<(), StoreError> {
        let key = (account.as_str().to_string(), policy_id.as_str().to_string());
        self.state()?.templates.remove(&key);
        Ok(())
    }

    async fn list_templates(
        &self,
        account: &AccountId,
    ) -> Result<Vec<PolicyTemplate>, StoreError> {
        Ok(self
            .state()?
            .templates
            .values()
            .filter(|template| template.account_id == *account)
            .cloned()
            .collect())
    }
}

// ============================================================================
// SECTION: Attachments
// ============================================================================

#[async_trait]
impl AttachmentStore for InMemoryAuthzStore {
    async fn create_attachment(&self, record: &Attachment) -> Result<(), StoreError> {
        let key =
            (record.account_id.as_str().to_string(), record.attachment_id.as_str().to_string());
        self.state()?.attachments.insert(key, record.clone());
        Ok(())
    }

    async fn get_attachment(
        &self,
        account: &AccountId,
        attachment_id: &AttachmentId,
    ) -> Result<Option<Attachment>, StoreError> {
        let key = (account.as_str().to_string(), attachment_id.as_str().to_string());
        Ok(self.state()?.attachments.get(&key).cloned())
    }

    async fn delete_attachment(
        &self,
        account: &AccountId,
        attachment_id: &AttachmentId,
    ) -> Result<(), StoreError> {
        let key = (account.as_str().to_string(), attachment_id.as_str().to_string());
        self.state()?.attachments.remove(&key);
        Ok(())
    }

    async fn list_attachments(&self, account: &AccountId) -> Result<Vec<Attachment>, StoreError> {
        Ok(self
            .state()?
            .attachments
            .values()
            .filter(|attachment| attachment.account_id == *account)
            .cloned()
            .collect())
    }

    async fn list_attachments_by_target(
        &self,
        account: &AccountId,
        target_type: TargetType,
        target_id: &str,
    ) -> Result<Vec<Attachment>, StoreError> {
        Ok(self
            .state()?
            .attachments
            .values()
            .filter(|attachment| {
                attachment.account_id == *account
                    && attachment.target_type == target_type
                    && attachment.target_id == target_id
            })
            .cloned()
            .collect())
    }

    async fn list_attachments_by_policy(
        &self,
        account: &AccountId,
        policy_id: &PolicyId,
    ) -> Result<Vec<Attachment>, StoreError> {
        Ok(self
            .state()?
            .attachments
            .values()
            .filter(|attachment| {
                attachment.account_id == *account && attachment.policy_id == *policy_id
            })
            .cloned()
            .collect())
    }
}
