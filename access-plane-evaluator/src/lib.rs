// access-plane-evaluator/src/lib.rs
// ============================================================================
// Module: Access Plane Evaluator Adapters
// Description: The two evaluator adapter families behind one tagged client.
// Purpose: Select hosted or local evaluation from configuration.
// Dependencies: access-plane-config, access-plane-core, crate::{hosted, local}
// ============================================================================

//! ## Overview
//! The core is polymorphic over the evaluator capability set. This crate
//! provides the two expected adapter families as tagged variants of one
//! client type: the hosted cloud evaluator and a locally hosted HTTP agent.
//! Configuration selects the family: an `evaluator_endpoint` selects the
//! local adapter, otherwise the hosted one is used in the configured region.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod hosted;
pub mod local;

// ============================================================================
// SECTION: Imports
// ============================================================================

use access_plane_config::AppConfig;
use access_plane_core::identifiers::EvaluatorPolicyId;
use access_plane_core::identifiers::PolicyStoreId;
use access_plane_core::interfaces::EvaluatorDecision;
use access_plane_core::interfaces::EvaluatorError;
use access_plane_core::interfaces::EvaluatorRequest;
use access_plane_core::interfaces::PolicyEvaluator;
use async_trait::async_trait;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use hosted::HostedEvaluator;
pub use local::LocalEvaluatorConfig;
pub use local::LocalHttpEvaluator;

// ============================================================================
// SECTION: Tagged Client
// ============================================================================

/// The evaluator client, tagged by adapter family.
#[derive(Debug, Clone)]
pub enum EvaluatorClient {
    /// Hosted cloud evaluator.
    Hosted(HostedEvaluator),
    /// Locally hosted HTTP evaluator agent.
    Local(LocalHttpEvaluator),
}

impl EvaluatorClient {
    /// Builds the client selected by configuration.
    ///
    /// # Errors
    ///
    /// Returns [`EvaluatorError`] when the local adapter cannot be
    /// constructed.
    pub async fn from_config(config: &AppConfig) -> Result<Self, EvaluatorError> {
        match &config.evaluator_endpoint {
            Some(endpoint) => {
                let local = LocalHttpEvaluator::new(LocalEvaluatorConfig {
                    endpoint: endpoint.clone(),
                    timeout_ms: config.timeouts.evaluator_ms,
                    ..LocalEvaluatorConfig::default()
                })?;
                Ok(Self::Local(local))
            }
            None => Ok(Self::Hosted(HostedEvaluator::from_region(&config.region).await)),
        }
    }
}

#[async_trait]
impl PolicyEvaluator for EvaluatorClient {
    async fn create_policy_store(
        &self,
        description: &str,
    ) -> Result<PolicyStoreId, EvaluatorError> {
        match self {
            Self::Hosted(evaluator) => evaluator.create_policy_store(description).await,
            Self::Local(evaluator) => evaluator.create_policy_store(description).await,
        }
    }

    async fn put_schema(
        &self,
        policy_store_id: &PolicyStoreId,
        schema_json: &str,
    ) -> Result<(), EvaluatorError> {
        match self {
            Self::Hosted(evaluator) => evaluator.put_schema(policy_store_id, schema_json).await,
            Self::Local(evaluator) => evaluator.put_schema(policy_store_id, schema_json).await,
        }
    }

    async fn create_policy(
        &self,
        policy_store_id: &PolicyStoreId,
        rule_text: &str,
        description: &str,
    ) -> Result<EvaluatorPolicyId, EvaluatorError> {
        match self {
            Self::Hosted(evaluator) => {
                evaluator.create_policy(policy_store_id, rule_text, description).await
            }
            Self::Local(evaluator) => {
                evaluator.create_policy(policy_store_id, rule_text, description).await
            }
        }
    }

    async fn update_policy(
        &self,
        policy_store_id: &PolicyStoreId,
        policy_id: &EvaluatorPolicyId,
        rule_text: &str,
    ) -> Result<(), EvaluatorError> {
        match self {
            Self::Hosted(evaluator) => {
                evaluator.update_policy(policy_store_id, policy_id, rule_text).await
            }
            Self::Local(evaluator) => {
                evaluator.update_policy(policy_store_id, policy_id, rule_text).await
            }
        }
    }

    async fn delete_policy(
        &self,
        policy_store_id: &PolicyStoreId,
        policy_id: &EvaluatorPolicyId,
    ) -> Result<(), EvaluatorError> {
        match self {
            Self::Hosted(evaluator) => evaluator.delete_policy(policy_store_id, policy_id).await,
            Self::Local(evaluator) => evaluator.delete_policy(policy_store_id, policy_id).await,
        }
    }

    async fn delete_policy_store(
        &self,
        policy_store_id: &PolicyStoreId,
    ) -> Result<(), EvaluatorError> {
        match self {
            Self::Hosted(evaluator) => evaluator.delete_policy_store(policy_store_id).await,
            Self::Local(evaluator) => evaluator.delete_policy_store(policy_store_id).await,
        }
    }

    async fn is_authorized(
        &self,
        request: &EvaluatorRequest,
    ) -> Result<EvaluatorDecision, EvaluatorError> {
        match self {
            Self::Hosted(evaluator) => evaluator.is_authorized(request).await,
            Self::Local(evaluator) => evaluator.is_authorized(request).await,
        }
    }
}
