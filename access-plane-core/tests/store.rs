// access-plane-core/tests/store.rs
// ============================================================================
// Module: In-Memory Store Tests
// Description: Behavior of the in-memory store implementation.
// Purpose: Pin missing-row semantics and the secondary lookups.
// Dependencies: access-plane-core, tokio
// ============================================================================
//! ## Overview
//! Validates that absent rows read as `None`/empty rather than errors, and
//! that the secondary lookups (attachments by target and by policy, groups
//! by member) filter correctly.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Test-only panic-based assertions are permitted."
)]

use access_plane_core::core::identifiers::AccountId;
use access_plane_core::core::identifiers::AttachmentId;
use access_plane_core::core::identifiers::EvaluatorPolicyId;
use access_plane_core::core::identifiers::GroupId;
use access_plane_core::core::identifiers::PolicyId;
use access_plane_core::core::identifiers::PrincipalArn;
use access_plane_core::core::policy::TargetType;
use access_plane_core::core::records::Attachment;
use access_plane_core::core::records::GroupMember;
use access_plane_core::core::time::Timestamp;
use access_plane_core::interfaces::AttachmentStore;
use access_plane_core::interfaces::MemberStore;
use access_plane_core::runtime::store::InMemoryAuthzStore;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn attachment(account: &str, id: &str, policy: &str, target_type: TargetType, target: &str) -> Attachment {
    Attachment {
        account_id: AccountId::new(account),
        attachment_id: AttachmentId::new(id),
        policy_id: PolicyId::new(policy),
        target_type,
        target_id: target.to_string(),
        evaluator_policy_id: EvaluatorPolicyId::new(format!("ep-{id}")),
        created_at: Timestamp::now(),
    }
}

fn member(account: &str, group: &str, arn: &str) -> GroupMember {
    GroupMember {
        account_id: AccountId::new(account),
        group_id: GroupId::new(group),
        member_arn: PrincipalArn::new(arn),
        created_at: Timestamp::now(),
    }
}

// ============================================================================
// SECTION: Missing Rows
// ============================================================================

/// Absent rows read as empty, never as errors.
#[tokio::test]
async fn missing_rows_read_as_empty() {
    let store = InMemoryAuthzStore::new();
    let account = AccountId::new("111122223333");

    assert!(
        store
            .get_attachment(&account, &AttachmentId::new("missing"))
            .await
            .expect("no error")
            .is_none()
    );
    assert!(store.list_attachments(&account).await.expect("no error").is_empty());
    assert!(
        store
            .groups_of(&account, &PrincipalArn::new("arn:aws:iam::1:user/ghost"))
            .await
            .expect("no error")
            .is_empty()
    );
}

// ============================================================================
// SECTION: Attachment Lookups
// ============================================================================

/// Secondary lookups filter by target and by policy within one account.
#[tokio::test]
async fn attachment_secondary_lookups() {
    let store = InMemoryAuthzStore::new();
    let account = AccountId::new("111122223333");

    store
        .create_attachment(&attachment("111122223333", "at-1", "p-1", TargetType::User, "arn:a"))
        .await
        .expect("creates");
    store
        .create_attachment(&attachment("111122223333", "at-2", "p-1", TargetType::Group, "g-1"))
        .await
        .expect("creates");
    store
        .create_attachment(&attachment("111122223333", "at-3", "p-2", TargetType::Group, "g-1"))
        .await
        .expect("creates");
    store
        .create_attachment(&attachment("444455556666", "at-4", "p-1", TargetType::Group, "g-1"))
        .await
        .expect("creates");

    let by_policy = store
        .list_attachments_by_policy(&account, &PolicyId::new("p-1"))
        .await
        .expect("lists");
    assert_eq!(by_policy.len(), 2);

    let by_target = store
        .list_attachments_by_target(&account, TargetType::Group, "g-1")
        .await
        .expect("lists");
    assert_eq!(by_target.len(), 2);
    assert!(by_target.iter().all(|a| a.target_id == "g-1"));

    let all = store.list_attachments(&account).await.expect("lists");
    assert_eq!(all.len(), 3);
}

// ============================================================================
// SECTION: Membership Lookups
// ============================================================================

/// The reverse lookup returns the groups of one member in one account.
#[tokio::test]
async fn membership_reverse_lookup() {
    let store = InMemoryAuthzStore::new();
    let account = AccountId::new("111122223333");
    let alice = PrincipalArn::new("arn:aws:iam::1:user/alice");

    store.add_member(&member("111122223333", "g-1", "arn:aws:iam::1:user/alice")).await.expect("adds");
    store.add_member(&member("111122223333", "g-2", "arn:aws:iam::1:user/alice")).await.expect("adds");
    store.add_member(&member("111122223333", "g-3", "arn:aws:iam::1:user/bob")).await.expect("adds");
    store.add_member(&member("444455556666", "g-9", "arn:aws:iam::1:user/alice")).await.expect("adds");

    let groups = store.groups_of(&account, &alice).await.expect("lists");
    assert_eq!(groups, vec![GroupId::new("g-1"), GroupId::new("g-2")]);

    store
        .remove_group_members(&account, &GroupId::new("g-1"))
        .await
        .expect("removes");
    let groups = store.groups_of(&account, &alice).await.expect("lists");
    assert_eq!(groups, vec![GroupId::new("g-2")]);
}
