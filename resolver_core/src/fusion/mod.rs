//! Attribute Fusion Engine - merges candidates from independent sources into
//! one resolved attribute set.
//!
//! Resolution follows a strict priority ladder, independent of confidence:
//! `UserPreference > RuleBased > Inferred > Extracted`. A higher-priority
//! source's value unconditionally overwrites a lower one, provided the value
//! is non-empty. A separate, more permissive union merge exists as a utility
//! but is not invoked by the primary pipeline.

use apparel_catalog::{AttributeKey, AttributeMap, AttributeValue};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Origin of an attribute candidate, used to break fusion ties by priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceTier {
    /// Pulled directly from the user's utterance by the extractor.
    Extracted,
    /// Accepted similarity match against the vibe knowledge base.
    RuleBased,
    /// Produced by the inference oracle.
    Inferred,
    /// Explicitly supplied by the user.
    UserPreference,
}

impl SourceTier {
    /// Fusion priority; higher wins.
    pub fn priority(&self) -> u8 {
        match self {
            SourceTier::Extracted => 0,
            SourceTier::Inferred => 1,
            SourceTier::RuleBased => 2,
            SourceTier::UserPreference => 3,
        }
    }
}

/// One attribute proposal from an upstream stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributeCandidate {
    pub key: AttributeKey,
    pub value: AttributeValue,
    pub tier: SourceTier,
    /// Confidence in [0, 1]; 1.0 by convention for extraction and user preference.
    pub confidence: f32,
}

impl AttributeCandidate {
    /// Create a candidate, clamping confidence into [0, 1].
    pub fn new(
        key: AttributeKey,
        value: impl Into<AttributeValue>,
        tier: SourceTier,
        confidence: f32,
    ) -> Self {
        Self {
            key,
            value: value.into(),
            tier,
            confidence: confidence.clamp(0.0, 1.0),
        }
    }
}

/// The authoritative attribute set produced by fusion.
///
/// Every key present holds a non-empty value; confidence and provenance
/// track whichever candidate won fusion for that key.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ResolvedAttributes {
    values: AttributeMap,
    confidence: HashMap<AttributeKey, f32>,
    provenance: HashMap<AttributeKey, SourceTier>,
}

impl ResolvedAttributes {
    /// Create an empty resolved set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the resolved value for a key.
    pub fn get(&self, key: AttributeKey) -> Option<&AttributeValue> {
        self.values.get(&key)
    }

    /// Confidence of the candidate that won fusion for a key.
    pub fn confidence(&self, key: AttributeKey) -> Option<f32> {
        self.confidence.get(&key).copied()
    }

    /// Source tier of the candidate that won fusion for a key.
    pub fn provenance(&self, key: AttributeKey) -> Option<SourceTier> {
        self.provenance.get(&key).copied()
    }

    /// Whether the key holds a non-empty value.
    pub fn is_present(&self, key: AttributeKey) -> bool {
        self.values.get(&key).is_some_and(|v| !v.is_empty())
    }

    /// Number of resolved attributes.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether anything has been resolved.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The resolved values as a plain attribute map (for catalog filtering).
    pub fn values(&self) -> &AttributeMap {
        &self.values
    }

    /// Apply one candidate, overwriting any existing value for the key.
    ///
    /// Empty values never overwrite a populated key. A budget candidate that
    /// cannot be read as a number is dropped silently rather than raising.
    pub fn apply(&mut self, candidate: &AttributeCandidate) {
        if candidate.value.is_empty() {
            return;
        }

        let value = if candidate.key == AttributeKey::Budget {
            match candidate.value.as_number() {
                Some(budget) => AttributeValue::Number(budget),
                None => {
                    tracing::debug!(value = %candidate.value, "non-numeric budget candidate dropped");
                    return;
                }
            }
        } else {
            candidate.value.clone()
        };

        self.values.insert(candidate.key, value);
        self.confidence.insert(candidate.key, candidate.confidence);
        self.provenance.insert(candidate.key, candidate.tier);
    }
}

/// Fuse candidates from the four sources into one resolved set.
///
/// Sources are applied in ascending priority so each later tier overwrites
/// the earlier ones: extracted, inferred, rule-based, then user preference.
/// Fusing the same inputs twice yields an identical result.
pub fn fuse(
    extracted: &[AttributeCandidate],
    rule_based: &[AttributeCandidate],
    inferred: &[AttributeCandidate],
    user_preference: &[AttributeCandidate],
) -> ResolvedAttributes {
    let mut resolved = ResolvedAttributes::new();
    fuse_into(&mut resolved, extracted, rule_based, inferred, user_preference);
    resolved
}

/// Fuse a turn's candidates on top of an already-resolved base set.
///
/// Used for cross-turn accumulation: the retained set from earlier turns is
/// the base, and any non-empty candidate from the current turn overwrites it
/// in tier order.
pub fn fuse_into(
    resolved: &mut ResolvedAttributes,
    extracted: &[AttributeCandidate],
    rule_based: &[AttributeCandidate],
    inferred: &[AttributeCandidate],
    user_preference: &[AttributeCandidate],
) {
    for source in [extracted, inferred, rule_based, user_preference] {
        for candidate in source {
            resolved.apply(candidate);
        }
    }
}

/// Permissive merge of two attribute maps.
///
/// List values for the same key are unioned with duplicates removed; for
/// conflicting scalar strings the longer one is kept as more specific. This
/// is an available alternate strategy only - the primary fusion path uses
/// strict priority overwrite.
pub fn merge_permissive(base: &AttributeMap, other: &AttributeMap) -> AttributeMap {
    let mut merged = base.clone();

    for (key, value) in other {
        match merged.get(key) {
            None => {
                merged.insert(*key, value.clone());
            }
            Some(existing) if existing == value => {}
            Some(existing) => {
                let resolved = match (existing, value) {
                    (AttributeValue::List(a), AttributeValue::List(b)) => {
                        let mut union = a.clone();
                        for item in b {
                            if !union.contains(item) {
                                union.push(item.clone());
                            }
                        }
                        Some(AttributeValue::List(union))
                    }
                    (AttributeValue::Scalar(a), AttributeValue::Scalar(b)) => {
                        if b.len() > a.len() {
                            Some(AttributeValue::Scalar(b.clone()))
                        } else {
                            None
                        }
                    }
                    _ => None,
                };
                if let Some(resolved) = resolved {
                    merged.insert(*key, resolved);
                }
            }
        }
    }

    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(
        key: AttributeKey,
        value: &str,
        tier: SourceTier,
        confidence: f32,
    ) -> AttributeCandidate {
        AttributeCandidate::new(key, value, tier, confidence)
    }

    #[test]
    fn test_priority_override() {
        let extracted = vec![candidate(AttributeKey::Category, "top", SourceTier::Extracted, 1.0)];
        let rule_based = vec![candidate(AttributeKey::Category, "dress", SourceTier::RuleBased, 0.85)];

        let resolved = fuse(&extracted, &rule_based, &[], &[]);

        assert_eq!(
            resolved.get(AttributeKey::Category),
            Some(&AttributeValue::scalar("dress"))
        );
        assert_eq!(resolved.provenance(AttributeKey::Category), Some(SourceTier::RuleBased));
        assert_eq!(resolved.confidence(AttributeKey::Category), Some(0.85));
    }

    #[test]
    fn test_user_preference_always_wins() {
        let extracted = vec![candidate(AttributeKey::Size, "M", SourceTier::Extracted, 1.0)];
        let prefs = vec![candidate(AttributeKey::Size, "L", SourceTier::UserPreference, 1.0)];

        let resolved = fuse(&extracted, &[], &[], &prefs);

        assert_eq!(resolved.get(AttributeKey::Size), Some(&AttributeValue::scalar("L")));
        assert_eq!(resolved.provenance(AttributeKey::Size), Some(SourceTier::UserPreference));
    }

    #[test]
    fn test_rule_based_outranks_inferred() {
        let inferred = vec![candidate(AttributeKey::Fit, "Bodycon", SourceTier::Inferred, 1.0)];
        let rule_based = vec![candidate(AttributeKey::Fit, "Relaxed", SourceTier::RuleBased, 0.9)];

        let resolved = fuse(&[], &rule_based, &inferred, &[]);
        assert_eq!(resolved.get(AttributeKey::Fit), Some(&AttributeValue::scalar("Relaxed")));
    }

    #[test]
    fn test_empty_values_never_overwrite() {
        let extracted = vec![candidate(AttributeKey::Style, "casual", SourceTier::Extracted, 1.0)];
        let prefs = vec![candidate(AttributeKey::Style, "  ", SourceTier::UserPreference, 1.0)];

        let resolved = fuse(&extracted, &[], &[], &prefs);
        assert_eq!(resolved.get(AttributeKey::Style), Some(&AttributeValue::scalar("casual")));
        assert_eq!(resolved.provenance(AttributeKey::Style), Some(SourceTier::Extracted));
    }

    #[test]
    fn test_fusion_is_idempotent() {
        let extracted = vec![
            candidate(AttributeKey::Category, "dress", SourceTier::Extracted, 1.0),
            candidate(AttributeKey::Season, "summer", SourceTier::Extracted, 1.0),
        ];
        let rule_based = vec![candidate(AttributeKey::Fit, "Relaxed", SourceTier::RuleBased, 0.9)];

        let first = fuse(&extracted, &rule_based, &[], &[]);
        let second = fuse(&extracted, &rule_based, &[], &[]);

        for key in AttributeKey::ALL {
            assert_eq!(first.get(key), second.get(key));
            assert_eq!(first.provenance(key), second.provenance(key));
        }
    }

    #[test]
    fn test_non_numeric_budget_dropped() {
        let extracted = vec![
            candidate(AttributeKey::Budget, "cheap-ish", SourceTier::Extracted, 1.0),
            candidate(AttributeKey::Category, "top", SourceTier::Extracted, 1.0),
        ];

        let resolved = fuse(&extracted, &[], &[], &[]);
        assert!(resolved.get(AttributeKey::Budget).is_none());
        assert!(resolved.is_present(AttributeKey::Category));
    }

    #[test]
    fn test_scalar_budget_coerced_to_number() {
        let prefs = vec![candidate(AttributeKey::Budget, "$80", SourceTier::UserPreference, 1.0)];

        let resolved = fuse(&[], &[], &[], &prefs);
        assert_eq!(resolved.get(AttributeKey::Budget), Some(&AttributeValue::Number(80.0)));
    }

    #[test]
    fn test_fuse_into_accumulates_over_base() {
        let mut resolved = fuse(
            &[candidate(AttributeKey::Category, "dress", SourceTier::Extracted, 1.0)],
            &[],
            &[],
            &[],
        );

        fuse_into(
            &mut resolved,
            &[candidate(AttributeKey::Size, "M", SourceTier::Extracted, 1.0)],
            &[],
            &[],
            &[],
        );

        assert!(resolved.is_present(AttributeKey::Category));
        assert!(resolved.is_present(AttributeKey::Size));
    }

    #[test]
    fn test_permissive_merge_unions_lists() {
        let mut a = AttributeMap::new();
        a.insert(AttributeKey::Fabric, AttributeValue::list(["Linen", "Cotton"]));
        let mut b = AttributeMap::new();
        b.insert(AttributeKey::Fabric, AttributeValue::list(["Cotton", "Silk"]));

        let merged = merge_permissive(&a, &b);
        assert_eq!(
            merged.get(&AttributeKey::Fabric),
            Some(&AttributeValue::list(["Linen", "Cotton", "Silk"]))
        );
    }

    #[test]
    fn test_permissive_merge_keeps_longer_scalar() {
        let mut a = AttributeMap::new();
        a.insert(AttributeKey::ColorOrPrint, AttributeValue::scalar("blue"));
        let mut b = AttributeMap::new();
        b.insert(AttributeKey::ColorOrPrint, AttributeValue::scalar("sapphire blue"));

        let merged = merge_permissive(&a, &b);
        assert_eq!(
            merged.get(&AttributeKey::ColorOrPrint),
            Some(&AttributeValue::scalar("sapphire blue"))
        );

        // Shorter incoming value does not replace.
        let merged = merge_permissive(&b, &a);
        assert_eq!(
            merged.get(&AttributeKey::ColorOrPrint),
            Some(&AttributeValue::scalar("sapphire blue"))
        );
    }
}
