//! Inference oracle interface and response validation.
//!
//! The oracle is an external service that proposes attribute values for
//! phrases the knowledge base and extractor could not resolve. The engine
//! owns the request contract and treats every response as untrusted: only
//! keys and values that survive validation against the static catalog tables
//! become candidates, all at the inferred tier.

use apparel_catalog::{is_valid_value, AttributeKey, AttributeMap, AttributeValue, Category};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;

use crate::fusion::{AttributeCandidate, SourceTier};
use crate::knowledge_base::{json_to_value, KnowledgeBase};

/// Confidence assigned to validated oracle candidates. Responses carry no
/// per-key confidence, so the convention for an unscored source applies.
const ORACLE_CONFIDENCE: f32 = 1.0;

/// Everything an oracle gets to see for one inference call.
#[derive(Debug, Clone, Serialize)]
pub struct OracleRequest {
    /// The user's raw utterance.
    pub query: String,

    /// Attributes already resolved this turn, so the oracle fills gaps
    /// instead of re-deriving them.
    pub existing_attributes: AttributeMap,

    /// The full vibe mapping tables, keyed by table then vibe.
    pub knowledge_base_context: HashMap<String, HashMap<String, Value>>,
}

impl OracleRequest {
    /// Assemble a request for a query with the current partial resolution.
    pub fn new(query: &str, existing: &AttributeMap, kb: &KnowledgeBase) -> Self {
        Self {
            query: query.to_string(),
            existing_attributes: existing.clone(),
            knowledge_base_context: kb.oracle_context(),
        }
    }
}

/// External attribute inference backend.
///
/// Returns a JSON object mapping attribute names to values, or `None` when
/// the backend is unavailable or has nothing to offer. Failures are soft:
/// the pipeline proceeds with whatever the other sources produced.
pub trait InferenceOracle: Send + Sync {
    fn infer(&self, request: &OracleRequest) -> Option<Value>;
}

/// Oracle that never answers. The default when no backend is wired up.
pub struct NullOracle;

impl InferenceOracle for NullOracle {
    fn infer(&self, _request: &OracleRequest) -> Option<Value> {
        None
    }
}

/// Validate an oracle response into inferred-tier candidates.
///
/// Drops, with a diagnostic: unknown attribute names, attributes the active
/// category does not carry, and values outside their bounded validity table.
/// List values are filtered item by item. Free-form attributes pass through.
pub fn validate_response(response: &Value, category: Option<Category>) -> Vec<AttributeCandidate> {
    let Some(object) = response.as_object() else {
        tracing::warn!("oracle response is not a JSON object, ignored");
        return Vec::new();
    };

    let mut candidates = Vec::new();
    for (name, raw) in object {
        let Some(key) = AttributeKey::parse(name) else {
            tracing::debug!(attribute = %name, "oracle proposed unknown attribute, dropped");
            continue;
        };
        if let Some(category) = category {
            if !category.allows(key) {
                tracing::debug!(%category, attribute = %key, "attribute not carried by category, dropped");
                continue;
            }
        }
        let Some(value) = json_to_value(raw) else {
            tracing::debug!(attribute = %key, "oracle value has unusable shape, dropped");
            continue;
        };
        let Some(value) = validate_value(key, value) else {
            tracing::debug!(attribute = %key, "oracle value outside validity table, dropped");
            continue;
        };
        candidates.push(AttributeCandidate::new(
            key,
            value,
            SourceTier::Inferred,
            ORACLE_CONFIDENCE,
        ));
    }
    candidates
}

fn validate_value(key: AttributeKey, value: AttributeValue) -> Option<AttributeValue> {
    match value {
        AttributeValue::Scalar(s) => {
            if is_valid_value(key, &s) {
                Some(AttributeValue::Scalar(s))
            } else {
                None
            }
        }
        AttributeValue::List(items) => {
            let kept: Vec<String> = items
                .into_iter()
                .filter(|item| is_valid_value(key, item))
                .collect();
            if kept.is_empty() {
                None
            } else {
                Some(AttributeValue::List(kept))
            }
        }
        AttributeValue::Number(n) => Some(AttributeValue::Number(n)),
    }
}
