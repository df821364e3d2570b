// access-plane-core/src/core/policy.rs
// ============================================================================
// Module: Access Plane Policy Documents
// Description: Typed model of the v0 policy document language.
// Purpose: Define the wire shape consumed by the validator and translator.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! A v0 policy document is an IAM-style JSON document of ordered statements.
//! Condition values are kept as raw [`serde_json::Value`] leaves because the
//! language admits scalars and arrays of scalars interchangeably; the
//! validator and translator agree on exactly which shapes each operator
//! accepts. Condition maps use [`BTreeMap`] so that `(operator, key)`
//! iteration order is lexicographic and rule rendering is byte-reproducible.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::Serializer;
use serde_json::Value;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// The only supported document version string (empty is also accepted).
pub const DOCUMENT_VERSION: &str = "v0";

// ============================================================================
// SECTION: Document Model
// ============================================================================

/// Condition block: operator name to condition key to raw value.
pub type ConditionMap = BTreeMap<String, BTreeMap<String, Value>>;

/// A v0 policy document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyDocument {
    /// Document version; `"v0"` or empty.
    #[serde(default)]
    pub version: String,
    /// Ordered policy statements.
    #[serde(default)]
    pub statements: Vec<Statement>,
}

/// A single policy statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statement {
    /// Optional statement identifier, unique within the document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sid: Option<String>,
    /// Statement effect.
    pub effect: Effect,
    /// Action patterns; non-empty.
    pub actions: Vec<String>,
    /// Resource patterns; non-empty.
    pub resources: Vec<String>,
    /// Optional condition block.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub conditions: ConditionMap,
}

/// Statement effect.
///
/// Unrecognized effect strings deserialize to [`Effect::Other`]; the
/// validator rejects them and the translator falls back to `permit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// The statement grants access.
    Allow,
    /// The statement denies access.
    Deny,
    /// Any unrecognized effect string.
    Other,
}

impl Effect {
    /// Returns the canonical label for the effect.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Allow => "Allow",
            Self::Deny => "Deny",
            Self::Other => "Other",
        }
    }

    /// Parses an effect label.
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        match label {
            "Allow" => Self::Allow,
            "Deny" => Self::Deny,
            _ => Self::Other,
        }
    }
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Effect {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Effect {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let label = String::deserialize(deserializer)?;
        Ok(Self::from_label(&label))
    }
}

// ============================================================================
// SECTION: Attachment Targets
// ============================================================================

/// The kind of principal a policy attachment binds to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetType {
    /// A single principal identified by ARN.
    User,
    /// A group of principals identified by group id.
    Group,
}

impl TargetType {
    /// Returns the wire label for the target type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Group => "group",
        }
    }
}

impl fmt::Display for TargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
