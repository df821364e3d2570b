// access-plane-evaluator/src/hosted.rs
// ============================================================================
// Module: Hosted Evaluator Adapter
// Description: Adapter for the hosted cloud policy evaluator.
// Purpose: Map the evaluator interface onto the Verified Permissions API.
// Dependencies: access-plane-core, aws-config, aws-sdk-verifiedpermissions
// ============================================================================

//! ## Overview
//! The hosted adapter maps the evaluator interface one-to-one onto Amazon
//! Verified Permissions: policy stores are real stores with strict schema
//! validation, and queries carry the context map and entity graph inline.
//! The service is authoritative for decisions; any non-allow verdict maps to
//! deny.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashMap;

use access_plane_core::identifiers::EvaluatorPolicyId;
use access_plane_core::identifiers::PolicyStoreId;
use access_plane_core::interfaces::AttributeValue as CoreAttributeValue;
use access_plane_core::interfaces::EntityRef;
use access_plane_core::interfaces::EvaluatorDecision;
use access_plane_core::interfaces::EvaluatorError;
use access_plane_core::interfaces::EvaluatorRequest;
use access_plane_core::interfaces::PolicyEvaluator;
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_config::Region;
use aws_sdk_verifiedpermissions::Client;
use aws_sdk_verifiedpermissions::error::DisplayErrorContext;
use aws_sdk_verifiedpermissions::types::ActionIdentifier;
use aws_sdk_verifiedpermissions::types::AttributeValue;
use aws_sdk_verifiedpermissions::types::ContextDefinition;
use aws_sdk_verifiedpermissions::types::Decision;
use aws_sdk_verifiedpermissions::types::EntitiesDefinition;
use aws_sdk_verifiedpermissions::types::EntityIdentifier;
use aws_sdk_verifiedpermissions::types::EntityItem;
use aws_sdk_verifiedpermissions::types::PolicyDefinition;
use aws_sdk_verifiedpermissions::types::SchemaDefinition;
use aws_sdk_verifiedpermissions::types::StaticPolicyDefinition;
use aws_sdk_verifiedpermissions::types::UpdatePolicyDefinition;
use aws_sdk_verifiedpermissions::types::UpdateStaticPolicyDefinition;
use aws_sdk_verifiedpermissions::types::ValidationMode;
use aws_sdk_verifiedpermissions::types::ValidationSettings;

// ============================================================================
// SECTION: Adapter
// ============================================================================

/// Adapter for the hosted cloud evaluator.
#[derive(Debug, Clone)]
pub struct HostedEvaluator {
    /// Service client.
    client: Client,
}

impl HostedEvaluator {
    /// Creates an adapter over an existing service client.
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self {
            client,
        }
    }

    /// Creates an adapter with ambient credentials in the given region.
    pub async fn from_region(region: &str) -> Self {
        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(region.to_string()))
            .load()
            .await;
        Self::new(Client::new(&sdk_config))
    }
}

// ============================================================================
// SECTION: Evaluator Implementation
// ============================================================================

#[async_trait]
impl PolicyEvaluator for HostedEvaluator {
    async fn create_policy_store(
        &self,
        description: &str,
    ) -> Result<PolicyStoreId, EvaluatorError> {
        let settings = ValidationSettings::builder()
            .mode(ValidationMode::Strict)
            .build()
            .map_err(|err| EvaluatorError::Rejected(err.to_string()))?;
        let output = self
            .client
            .create_policy_store()
            .validation_settings(settings)
            .description(description)
            .send()
            .await
            .map_err(|err| EvaluatorError::Transport(DisplayErrorContext(err).to_string()))?;
        Ok(PolicyStoreId::new(output.policy_store_id()))
    }

    async fn put_schema(
        &self,
        policy_store_id: &PolicyStoreId,
        schema_json: &str,
    ) -> Result<(), EvaluatorError> {
        self.client
            .put_schema()
            .policy_store_id(policy_store_id.as_str())
            .definition(SchemaDefinition::CedarJson(schema_json.to_string()))
            .send()
            .await
            .map_err(|err| EvaluatorError::Transport(DisplayErrorContext(err).to_string()))?;
        Ok(())
    }

    async fn create_policy(
        &self,
        policy_store_id: &PolicyStoreId,
        rule_text: &str,
        description: &str,
    ) -> Result<EvaluatorPolicyId, EvaluatorError> {
        let definition = StaticPolicyDefinition::builder()
            .statement(rule_text)
            .description(description)
            .build()
            .map_err(|err| EvaluatorError::Rejected(err.to_string()))?;
        let output = self
            .client
            .create_policy()
            .policy_store_id(policy_store_id.as_str())
            .definition(PolicyDefinition::Static(definition))
            .send()
            .await
            .map_err(|err| EvaluatorError::Transport(DisplayErrorContext(err).to_string()))?;
        Ok(EvaluatorPolicyId::new(output.policy_id()))
    }

    async fn update_policy(
        &self,
        policy_store_id: &PolicyStoreId,
        policy_id: &EvaluatorPolicyId,
        rule_text: &str,
    ) -> Result<(), EvaluatorError> {
        let definition = UpdateStaticPolicyDefinition::builder()
            .statement(rule_text)
            .build()
            .map_err(|err| EvaluatorError::Rejected(err.to_string()))?;
        self.client
            .update_policy()
            .policy_store_id(policy_store_id.as_str())
            .policy_id(policy_id.as_str())
            .definition(UpdatePolicyDefinition::Static(definition))
            .send()
            .await
            .map_err(|err| EvaluatorError::Transport(DisplayErrorContext(err).to_string()))?;
        Ok(())
    }

    async fn delete_policy(
        &self,
        policy_store_id: &PolicyStoreId,
        policy_id: &EvaluatorPolicyId,
    ) -> Result<(), EvaluatorError> {
        self.client
            .delete_policy()
            .policy_store_id(policy_store_id.as_str())
            .policy_id(policy_id.as_str())
            .send()
            .await
            .map_err(|err| EvaluatorError::Transport(DisplayErrorContext(err).to_string()))?;
        Ok(())
    }

    async fn delete_policy_store(
        &self,
        policy_store_id: &PolicyStoreId,
    ) -> Result<(), EvaluatorError> {
        self.client
            .delete_policy_store()
            .policy_store_id(policy_store_id.as_str())
            .send()
            .await
            .map_err(|err| EvaluatorError::Transport(DisplayErrorContext(err).to_string()))?;
        Ok(())
    }

    async fn is_authorized(
        &self,
        request: &EvaluatorRequest,
    ) -> Result<EvaluatorDecision, EvaluatorError> {
        let principal = entity_identifier(&request.principal)?;
        let resource = entity_identifier(&request.resource)?;
        let action = ActionIdentifier::builder()
            .action_type(request.action.entity_type.clone())
            .action_id(request.action.entity_id.clone())
            .build()
            .map_err(|err| EvaluatorError::Rejected(err.to_string()))?;

        let context: HashMap<String, AttributeValue> = request
            .context
            .iter()
            .map(|(key, value)| (key.clone(), attribute_value(value)))
            .collect();

        let mut entity_items = Vec::with_capacity(request.entities.len());
        for decl in &request.entities {
            let mut builder = EntityItem::builder().identifier(entity_identifier(&decl.entity)?);
            for (name, value) in &decl.attributes {
                builder = builder.attributes(name.clone(), attribute_value(value));
            }
            for parent in &decl.parents {
                builder = builder.parents(entity_identifier(parent)?);
            }
            entity_items.push(builder.build());
        }

        let output = self
            .client
            .is_authorized()
            .policy_store_id(request.policy_store_id.as_str())
            .principal(principal)
            .action(action)
            .resource(resource)
            .context(ContextDefinition::ContextMap(context))
            .entities(EntitiesDefinition::EntityList(entity_items))
            .send()
            .await
            .map_err(|err| EvaluatorError::Transport(DisplayErrorContext(err).to_string()))?;

        match output.decision() {
            Decision::Allow => Ok(EvaluatorDecision::Allow),
            _ => Ok(EvaluatorDecision::Deny),
        }
    }
}

// ============================================================================
// SECTION: Conversions
// ============================================================================

/// Converts an entity reference into the service identifier shape.
fn entity_identifier(entity: &EntityRef) -> Result<EntityIdentifier, EvaluatorError> {
    EntityIdentifier::builder()
        .entity_type(entity.entity_type.clone())
        .entity_id(entity.entity_id.clone())
        .build()
        .map_err(|err| EvaluatorError::Rejected(err.to_string()))
}

/// Converts a core attribute value into the service union shape.
fn attribute_value(value: &CoreAttributeValue) -> AttributeValue {
    match value {
        CoreAttributeValue::String(text) => AttributeValue::String(text.clone()),
        CoreAttributeValue::Long(number) => AttributeValue::Long(*number),
        CoreAttributeValue::Bool(flag) => AttributeValue::Boolean(*flag),
        CoreAttributeValue::Set(values) => {
            AttributeValue::Set(values.iter().map(attribute_value).collect())
        }
        CoreAttributeValue::Record(entries) => AttributeValue::Record(
            entries.iter().map(|(key, value)| (key.clone(), attribute_value(value))).collect(),
        ),
    }
}
