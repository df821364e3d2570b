// access-plane-core/src/runtime/audit.rs
// ============================================================================
// Module: Access Plane Decision Audit
// Description: Structured audit events for authorization decisions.
// Purpose: Emit one event per decision without binding a logging backend.
// Dependencies: crate::{core, runtime}, serde, serde_json
// ============================================================================

//! ## Overview
//! Every authorization decision is recorded through a sink so deployments can
//! route events to their preferred pipeline. Events carry the full request
//! identity unredacted: account, caller, action, resource, the layer that
//! decided, and the verdict.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;

use serde::Serialize;

use crate::core::identifiers::AccountId;
use crate::core::identifiers::PrincipalArn;
use crate::core::time::Timestamp;
use crate::runtime::engine::Decision;
use crate::runtime::engine::DecisionSource;

// ============================================================================
// SECTION: Event
// ============================================================================

/// One recorded authorization decision.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionAuditEvent {
    /// Stable event label.
    pub event: &'static str,
    /// Decision time.
    pub timestamp: Timestamp,
    /// Tenant account.
    pub account_id: AccountId,
    /// Caller principal.
    pub caller_arn: PrincipalArn,
    /// Requested action as received.
    pub action: String,
    /// Target resource as received.
    pub resource: String,
    /// Layer that produced the decision.
    pub source: DecisionSource,
    /// The verdict.
    pub decision: Decision,
}

// ============================================================================
// SECTION: Sinks
// ============================================================================

/// Sink for decision audit events.
pub trait DecisionAuditSink: Send + Sync {
    /// Records one decision event.
    fn record(&self, event: &DecisionAuditEvent);
}

/// Sink that writes JSON lines to stderr.
pub struct StderrAuditSink;

impl DecisionAuditSink for StderrAuditSink {
    fn record(&self, event: &DecisionAuditEvent) {
        if let Ok(line) = serde_json::to_string(event) {
            let mut stderr = std::io::stderr().lock();
            let _ = writeln!(stderr, "{line}");
        }
    }
}

/// Sink that discards events.
pub struct NoopAuditSink;

impl DecisionAuditSink for NoopAuditSink {
    fn record(&self, _event: &DecisionAuditEvent) {}
}
