//! Payload filter types for search queries.
//!
//! The structure mirrors Qdrant's filter JSON, so a [`FilterClause`] is sent
//! to the store as-is and evaluated locally by the memory store:
//!
//! ```json
//! {"must": [{"key": "city", "match": {"value": "Berlin"}}]}
//! ```

use serde::{Deserialize, Serialize};

/// Payload filter with `must` (AND) and `must_not` (AND-NOT) conditions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterClause {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub must: Vec<FieldCondition>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub must_not: Vec<FieldCondition>,
}

impl FilterClause {
    /// A filter requiring `payload[key] == value`.
    pub fn must_match(key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        Self {
            must: vec![FieldCondition::matches(key, value)],
            must_not: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.must.is_empty() && self.must_not.is_empty()
    }
}

/// A single condition on a payload field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldCondition {
    pub key: String,
    #[serde(rename = "match")]
    pub r#match: Match,
}

impl FieldCondition {
    pub fn matches(key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        Self {
            key: key.into(),
            r#match: Match::Value {
                value: value.into(),
            },
        }
    }

    pub fn matches_any(key: impl Into<String>, any: Vec<serde_json::Value>) -> Self {
        Self {
            key: key.into(),
            r#match: Match::Any { any },
        }
    }
}

/// Match operator of a [`FieldCondition`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Match {
    /// Exact equality.
    Value { value: serde_json::Value },
    /// Equality with any of the listed values.
    Any { any: Vec<serde_json::Value> },
}
