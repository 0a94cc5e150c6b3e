//! Similarity Matcher - maps free-text phrases onto vibe knowledge base keys.
//!
//! Matching runs in strict tier order:
//! 1. **Exact tier**: case-insensitive key equality, score 1.0, short-circuits
//! 2. **Dense semantic tier**: averaged word-embedding cosine against every key
//! 3. **Sparse lexical tier**: TF-IDF (1-3 grams) cosine, consulted only when
//!    the dense maximum is below 0.5, superseding it when higher
//!
//! The matcher exposes the raw score and never applies the acceptance
//! threshold; accepting or rejecting a match is a fusion-stage decision.

mod embedding;
mod tfidf;

pub use embedding::*;
pub use tfidf::*;

use apparel_catalog::AttributeMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::knowledge_base::KnowledgeBase;

/// Dense-tier score below which the lexical tier is consulted.
const LEXICAL_FALLBACK_THRESHOLD: f32 = 0.5;

/// A scored match against a vibe key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchResult {
    /// The matched vibe key.
    pub key: String,

    /// Raw similarity score in [0, 1]; 1.0 for an exact match.
    pub score: f32,

    /// The attribute bundle mapped to the key.
    pub attributes: AttributeMap,
}

/// Tiered similarity matcher over one immutable knowledge base.
///
/// Construct once next to the knowledge base and share read-only across
/// resolution requests; a reloaded knowledge base requires a new matcher.
pub struct SimilarityMatcher {
    kb: Arc<KnowledgeBase>,
    embedder: Arc<dyn Embedder>,

    /// Precomputed embedding per entry; `None` when the backend is unavailable.
    key_vectors: Vec<Option<Vec<f32>>>,

    tfidf: TfidfIndex,
}

impl SimilarityMatcher {
    /// Build the matcher, precomputing key embeddings and the TF-IDF space.
    pub fn new(kb: Arc<KnowledgeBase>, embedder: Arc<dyn Embedder>) -> Self {
        let key_vectors = kb
            .all_entries()
            .map(|entry| embedder.embed(&entry.key))
            .collect();
        let keys: Vec<&str> = kb.all_entries().map(|entry| entry.key.as_str()).collect();
        let tfidf = TfidfIndex::fit(&keys);

        Self {
            kb,
            embedder,
            key_vectors,
            tfidf,
        }
    }

    /// Matcher with the default deterministic embedding backend.
    pub fn with_defaults(kb: Arc<KnowledgeBase>) -> Self {
        Self::new(kb, Arc::new(HashEmbedder::default()))
    }

    /// The knowledge base this matcher was built over.
    pub fn knowledge_base(&self) -> &KnowledgeBase {
        &self.kb
    }

    /// Find the best-matching vibe key for a phrase.
    ///
    /// Returns `None` when the knowledge base is empty or no key scores
    /// above zero.
    pub fn match_phrase(&self, phrase: &str) -> Option<MatchResult> {
        if self.kb.is_empty() {
            return None;
        }
        let phrase = phrase.trim();
        if phrase.is_empty() {
            return None;
        }

        // Exact tier short-circuits everything else.
        if let Some(entry) = self.kb.entry_by_key(phrase) {
            return Some(MatchResult {
                key: entry.key.clone(),
                score: 1.0,
                attributes: entry.attributes.clone(),
            });
        }

        // Dense semantic tier: always runs when no exact hit.
        let phrase_vector = self.embedder.embed(phrase);
        let mut best_index = 0usize;
        let mut best_score = 0.0f32;
        for (index, key_vector) in self.key_vectors.iter().enumerate() {
            let score = match (&phrase_vector, key_vector) {
                (Some(p), Some(k)) => cosine(p, k),
                _ => 0.0,
            };
            if score > best_score {
                best_index = index;
                best_score = score;
            }
        }

        // Sparse lexical tier: backup when the dense tier stayed weak.
        if best_score < LEXICAL_FALLBACK_THRESHOLD {
            if let Some((index, score)) = self.tfidf.best_match(phrase) {
                if score > best_score {
                    best_index = index;
                    best_score = score;
                }
            }
        }

        if best_score <= 0.0 {
            return None;
        }

        let entry = &self.kb.entries()[best_index];
        Some(MatchResult {
            key: entry.key.clone(),
            score: best_score,
            attributes: entry.attributes.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apparel_catalog::{AttributeKey, AttributeValue};
    use serde_json::json;

    fn sample_kb() -> Arc<KnowledgeBase> {
        let mut kb = KnowledgeBase::new();
        kb.add_table(
            "seasonal",
            &json!({
                "summer brunch": { "fit": "Relaxed", "fabric": "Linen" },
                "winter formal": { "fabric": "Velvet", "occasion": "Evening" },
                "beach vacation": { "fabric": "Cotton", "occasion": "Vacation" },
            }),
        );
        Arc::new(kb)
    }

    #[test]
    fn test_exact_match_is_deterministic() {
        let matcher = SimilarityMatcher::with_defaults(sample_kb());

        for phrase in ["summer brunch", "Summer Brunch", "SUMMER BRUNCH", "  summer brunch "] {
            let result = matcher.match_phrase(phrase).unwrap();
            assert_eq!(result.key, "summer brunch");
            assert!((result.score - 1.0).abs() < f32::EPSILON);
            assert_eq!(
                result.attributes.get(&AttributeKey::Fit),
                Some(&AttributeValue::scalar("Relaxed"))
            );
        }
    }

    #[test]
    fn test_empty_knowledge_base_matches_nothing() {
        let matcher = SimilarityMatcher::with_defaults(Arc::new(KnowledgeBase::new()));
        assert!(matcher.match_phrase("anything").is_none());
    }

    #[test]
    fn test_dense_tier_finds_overlapping_phrase() {
        let matcher = SimilarityMatcher::with_defaults(sample_kb());

        let result = matcher.match_phrase("summer brunch outfit").unwrap();
        assert_eq!(result.key, "summer brunch");
        assert!(result.score > 0.0 && result.score < 1.0);
    }

    #[test]
    fn test_lexical_tier_covers_unavailable_embedder() {
        let matcher = SimilarityMatcher::new(sample_kb(), Arc::new(NullEmbedder));

        // Dense tier contributes 0; the TF-IDF tier still finds the key.
        let result = matcher.match_phrase("brunch in the summer").unwrap();
        assert_eq!(result.key, "summer brunch");
        assert!(result.score > 0.0);
    }

    #[test]
    fn test_no_signal_returns_none() {
        let matcher = SimilarityMatcher::new(sample_kb(), Arc::new(NullEmbedder));
        assert!(matcher.match_phrase("xylophone repair").is_none());
        assert!(matcher.match_phrase("   ").is_none());
    }
}
