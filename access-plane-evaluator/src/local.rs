// access-plane-evaluator/src/local.rs
// ============================================================================
// Module: Local HTTP Evaluator Adapter
// Description: Adapter for a locally hosted HTTP policy evaluator.
// Purpose: Speak the agent's policy replace/add and is_authorized protocol.
// Dependencies: access-plane-core, reqwest, serde, serde_json
// ============================================================================

//! ## Overview
//! The local evaluator is a single-store policy agent: `PUT /v1/policies`
//! bulk-replaces the policy set, `POST /v1/policies` adds one policy, and
//! `POST /v1/is_authorized` answers queries with entities supplied inline.
//! Because the agent holds one policy set, create/update/delete are
//! implemented as clear-then-post. Policy store ids are synthesized locally;
//! the agent has no store concept. Schema upload is a no-op for the same
//! reason.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use access_plane_core::identifiers::EvaluatorPolicyId;
use access_plane_core::identifiers::PolicyStoreId;
use access_plane_core::interfaces::EvaluatorDecision;
use access_plane_core::interfaces::EvaluatorError;
use access_plane_core::interfaces::EvaluatorRequest;
use access_plane_core::interfaces::PolicyEvaluator;
use async_trait::async_trait;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Configuration for the local HTTP evaluator adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalEvaluatorConfig {
    /// Agent base URL.
    pub endpoint: String,
    /// Request timeout in milliseconds.
    pub timeout_ms: u64,
    /// User agent string for outbound requests.
    pub user_agent: String,
}

impl Default for LocalEvaluatorConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:8180".to_string(),
            timeout_ms: 30_000,
            user_agent: "access-plane/0.1".to_string(),
        }
    }
}

// ============================================================================
// SECTION: Wire Types
// ============================================================================

/// One policy uploaded to the agent.
#[derive(Debug, Clone, Serialize)]
struct PolicyUpload {
    /// Agent-side policy id.
    id: String,
    /// Rule text.
    content: String,
}

/// Query body for `POST /v1/is_authorized`.
#[derive(Debug, Serialize)]
struct QueryBody {
    principal: String,
    action: String,
    resource: String,
    context: serde_json::Map<String, Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    entities: Vec<EntityBody>,
}

/// One entity in the query graph.
#[derive(Debug, Serialize)]
struct EntityBody {
    uid: String,
    attrs: serde_json::Map<String, Value>,
    parents: Vec<String>,
}

/// Agent response for `POST /v1/is_authorized`.
#[derive(Debug, Deserialize)]
struct QueryResponse {
    decision: String,
    #[serde(default)]
    diagnostics: Diagnostics,
}

/// Agent decision diagnostics.
#[derive(Debug, Default, Deserialize)]
struct Diagnostics {
    #[serde(default)]
    reason: Vec<String>,
    #[serde(default)]
    errors: Vec<String>,
}

// ============================================================================
// SECTION: Adapter
// ============================================================================

/// Adapter for a locally hosted HTTP evaluator agent.
#[derive(Debug, Clone)]
pub struct LocalHttpEvaluator {
    /// Agent base URL without a trailing slash.
    endpoint: String,
    /// HTTP client used for outbound requests.
    client: reqwest::Client,
}

impl LocalHttpEvaluator {
    /// Creates a new adapter with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`EvaluatorError`] when the HTTP client cannot be created.
    pub fn new(config: LocalEvaluatorConfig) -> Result<Self, EvaluatorError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|err| EvaluatorError::Transport(format!("http client build failed: {err}")))?;
        Ok(Self {
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Replaces the agent's policy set with the empty set.
    async fn clear_policies(&self) -> Result<(), EvaluatorError> {
        let response = self
            .client
            .put(format!("{}/v1/policies", self.endpoint))
            .json(&Vec::<PolicyUpload>::new())
            .send()
            .await
            .map_err(|err| EvaluatorError::Transport(format!("clear policies failed: {err}")))?;
        ensure_success(response, "clear policies").await?;
        Ok(())
    }

    /// Adds one policy to the agent.
    async fn post_policy(&self, policy_id: &str, rule_text: &str) -> Result<(), EvaluatorError> {
        let payload = PolicyUpload {
            id: policy_id.to_string(),
            content: rule_text.to_string(),
        };
        let response = self
            .client
            .post(format!("{}/v1/policies", self.endpoint))
            .json(&payload)
            .send()
            .await
            .map_err(|err| EvaluatorError::Transport(format!("post policy failed: {err}")))?;
        ensure_success(response, "post policy").await?;
        Ok(())
    }

    /// Replaces the agent's policy set with a single policy, tolerating a
    /// failed clear (the agent may be empty already).
    async fn replace_with(&self, policy_id: &str, rule_text: &str) -> Result<(), EvaluatorError> {
        if let Err(err) = self.clear_policies().await {
            tracing::warn!(error = %err, "failed to clear local evaluator policies");
        }
        self.post_policy(policy_id, rule_text).await
    }
}

// ============================================================================
// SECTION: Evaluator Implementation
// ============================================================================

#[async_trait]
impl PolicyEvaluator for LocalHttpEvaluator {
    async fn create_policy_store(
        &self,
        _description: &str,
    ) -> Result<PolicyStoreId, EvaluatorError> {
        // The agent has no store concept; synthesize an id for bookkeeping.
        let store_id = PolicyStoreId::new(Uuid::new_v4().to_string());
        tracing::debug!(policy_store_id = %store_id, "created local policy store");
        Ok(store_id)
    }

    async fn put_schema(
        &self,
        policy_store_id: &PolicyStoreId,
        _schema_json: &str,
    ) -> Result<(), EvaluatorError> {
        tracing::debug!(
            policy_store_id = %policy_store_id,
            "local evaluator does not take schemas, skipping"
        );
        Ok(())
    }

    async fn create_policy(
        &self,
        policy_store_id: &PolicyStoreId,
        rule_text: &str,
        _description: &str,
    ) -> Result<EvaluatorPolicyId, EvaluatorError> {
        let policy_id = Uuid::new_v4().to_string();
        self.replace_with(&policy_id, rule_text).await?;
        tracing::debug!(
            policy_store_id = %policy_store_id,
            policy_id = %policy_id,
            "created policy at local evaluator"
        );
        Ok(EvaluatorPolicyId::new(policy_id))
    }

    async fn update_policy(
        &self,
        policy_store_id: &PolicyStoreId,
        policy_id: &EvaluatorPolicyId,
        rule_text: &str,
    ) -> Result<(), EvaluatorError> {
        self.replace_with(policy_id.as_str(), rule_text).await?;
        tracing::debug!(
            policy_store_id = %policy_store_id,
            policy_id = %policy_id,
            "updated policy at local evaluator"
        );
        Ok(())
    }

    async fn delete_policy(
        &self,
        _policy_store_id: &PolicyStoreId,
        policy_id: &EvaluatorPolicyId,
    ) -> Result<(), EvaluatorError> {
        if let Err(err) = self.clear_policies().await {
            tracing::warn!(
                policy_id = %policy_id,
                error = %err,
                "failed to clear local evaluator policies on delete"
            );
        }
        Ok(())
    }

    async fn delete_policy_store(
        &self,
        policy_store_id: &PolicyStoreId,
    ) -> Result<(), EvaluatorError> {
        tracing::debug!(policy_store_id = %policy_store_id, "deleted local policy store");
        Ok(())
    }

    async fn is_authorized(
        &self,
        request: &EvaluatorRequest,
    ) -> Result<EvaluatorDecision, EvaluatorError> {
        let body = build_query_body(request);
        let response = self
            .client
            .post(format!("{}/v1/is_authorized", self.endpoint))
            .json(&body)
            .send()
            .await
            .map_err(|err| EvaluatorError::Transport(format!("is_authorized failed: {err}")))?;
        let response = ensure_success(response, "is_authorized").await?;
        let parsed: QueryResponse = response
            .json()
            .await
            .map_err(|err| EvaluatorError::Transport(format!("invalid agent response: {err}")))?;

        tracing::debug!(
            decision = %parsed.decision,
            reasons = ?parsed.diagnostics.reason,
            errors = ?parsed.diagnostics.errors,
            "local evaluator decision"
        );

        if parsed.decision.eq_ignore_ascii_case("allow") {
            Ok(EvaluatorDecision::Allow)
        } else {
            Ok(EvaluatorDecision::Deny)
        }
    }
}

// ============================================================================
// SECTION: Request Rendering
// ============================================================================

/// Renders the evaluator query into the agent's wire shape.
fn build_query_body(request: &EvaluatorRequest) -> QueryBody {
    let context = request
        .context
        .iter()
        .map(|(key, value)| (key.clone(), value.to_json()))
        .collect();

    let entities = request
        .entities
        .iter()
        .map(|decl| EntityBody {
            uid: decl.entity.uid(),
            attrs: decl
                .attributes
                .iter()
                .map(|(name, value)| (name.clone(), value.to_json()))
                .collect(),
            parents: decl.parents.iter().map(|parent| parent.uid()).collect(),
        })
        .collect();

    QueryBody {
        principal: request.principal.uid(),
        action: request.action.uid(),
        resource: request.resource.uid(),
        context,
        entities,
    }
}

/// Maps non-success statuses to [`EvaluatorError::Rejected`] with the body.
async fn ensure_success(
    response: reqwest::Response,
    operation: &str,
) -> Result<reqwest::Response, EvaluatorError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(EvaluatorError::Rejected(format!("{operation} returned status {status}: {body}")))
}
