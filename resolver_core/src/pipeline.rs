//! Resolution pipeline and the top-level recommendation engine.
//!
//! A turn flows through four candidate sources: the extractor, accepted
//! similarity matches against the knowledge base, the inference oracle, and
//! explicit user preferences. Fusion merges them onto whatever earlier turns
//! already resolved, and the completeness check decides between asking a
//! follow-up question and filtering the catalog.

use apparel_catalog::{
    AttributeKey, AttributeMap, Catalog, CatalogError, Category, EngineConfig, ProductRecord,
};
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;

use crate::clarification::{check_completeness, ClarificationRequest, ResolutionState};
use crate::extraction::{CandidateExtractor, Extraction, LexiconExtractor};
use crate::fusion::{fuse_into, AttributeCandidate, ResolvedAttributes, SourceTier};
use crate::knowledge_base::KnowledgeBase;
use crate::matcher::SimilarityMatcher;
use crate::oracle::{validate_response, InferenceOracle, NullOracle, OracleRequest};
use crate::render::{ResponseRenderer, TemplateRenderer};
use crate::session::ConversationContext;

/// Below this many distinct attributes from extraction and matching, the
/// oracle is consulted to fill the gaps.
const MIN_DISTINCT_ATTRIBUTES: usize = 3;

/// Phrases shorter than this are noise and never sent to the matcher.
const MIN_PHRASE_LENGTH: usize = 2;

/// Outcome of one resolution turn.
#[derive(Debug, Clone)]
pub enum TurnOutcome {
    /// The attribute set is incomplete; ask the user and retry.
    NeedsInfo {
        partial: ResolvedAttributes,
        request: ClarificationRequest,
    },
    /// The attribute set is complete and ready for catalog filtering.
    Ready(ResolvedAttributes),
}

/// The per-turn resolution pipeline.
///
/// Construct once next to the knowledge base and share read-only across
/// sessions; all per-conversation state lives in `ConversationContext`.
pub struct ResolutionPipeline {
    kb: Arc<KnowledgeBase>,
    matcher: SimilarityMatcher,
    extractor: Box<dyn CandidateExtractor>,
    oracle: Box<dyn InferenceOracle>,
    threshold: f32,
}

impl ResolutionPipeline {
    /// Pipeline with the default extractor and no oracle backend.
    pub fn new(kb: Arc<KnowledgeBase>, threshold: f32) -> Self {
        let matcher = SimilarityMatcher::with_defaults(Arc::clone(&kb));
        Self {
            kb,
            matcher,
            extractor: Box::new(LexiconExtractor::new()),
            oracle: Box::new(NullOracle),
            threshold,
        }
    }

    /// Replace the candidate extractor.
    pub fn with_extractor(mut self, extractor: Box<dyn CandidateExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    /// Replace the inference oracle.
    pub fn with_oracle(mut self, oracle: Box<dyn InferenceOracle>) -> Self {
        self.oracle = oracle;
        self
    }

    /// The knowledge base this pipeline resolves against.
    pub fn knowledge_base(&self) -> &KnowledgeBase {
        &self.kb
    }

    /// The acceptance threshold for similarity matches.
    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Resolve one user turn on top of the conversation's retained state.
    pub fn resolve_turn(
        &self,
        query: &str,
        context: &mut ConversationContext,
        user_preferences: &AttributeMap,
    ) -> TurnOutcome {
        let extraction = self.extractor.extract(query);
        let extracted: Vec<AttributeCandidate> = extraction
            .candidates
            .iter()
            .map(|(key, value)| {
                AttributeCandidate::new(*key, value.clone(), SourceTier::Extracted, 1.0)
            })
            .collect();

        let (rule_based, accepted_matches) = self.rule_based_candidates(&extraction);

        let distinct: HashSet<AttributeKey> = extracted
            .iter()
            .chain(rule_based.iter())
            .map(|c| c.key)
            .collect();

        let inferred = if accepted_matches == 0 || distinct.len() < MIN_DISTINCT_ATTRIBUTES {
            self.inferred_candidates(query, context, &extracted, &rule_based)
        } else {
            Vec::new()
        };

        let user_preference: Vec<AttributeCandidate> = user_preferences
            .iter()
            .map(|(key, value)| {
                AttributeCandidate::new(*key, value.clone(), SourceTier::UserPreference, 1.0)
            })
            .collect();

        let mut resolved = context.pending.clone();
        fuse_into(&mut resolved, &extracted, &rule_based, &inferred, &user_preference);

        let report = check_completeness(&resolved);
        tracing::debug!(
            session = %context.id,
            resolved = resolved.len(),
            state = ?report.state,
            "turn resolved"
        );

        match report.state {
            ResolutionState::Ready => {
                context.complete_turn();
                TurnOutcome::Ready(resolved)
            }
            ResolutionState::NeedsInfo => {
                let request = ClarificationRequest::for_missing(report.missing.clone());
                context.retain_partial(resolved.clone(), report.missing);
                TurnOutcome::NeedsInfo {
                    partial: resolved,
                    request,
                }
            }
        }
    }

    /// Match extracted phrases against the knowledge base and collect the
    /// attributes of every accepted match.
    ///
    /// When two accepted matches contest the same key, the higher-scoring
    /// match's value wins. Returns the candidates and the accepted count.
    fn rule_based_candidates(&self, extraction: &Extraction) -> (Vec<AttributeCandidate>, usize) {
        let mut phrases: Vec<&str> = extraction.key_phrases.iter().map(String::as_str).collect();
        for value in extraction.candidates.values() {
            if let Some(scalar) = value.as_scalar() {
                phrases.push(scalar);
            }
        }

        let mut seen: HashSet<String> = HashSet::new();
        let mut best: std::collections::HashMap<AttributeKey, AttributeCandidate> =
            std::collections::HashMap::new();
        let mut accepted = 0usize;

        for phrase in phrases {
            let phrase = phrase.trim();
            if phrase.len() < MIN_PHRASE_LENGTH || !seen.insert(phrase.to_lowercase()) {
                continue;
            }
            let Some(result) = self.matcher.match_phrase(phrase) else {
                continue;
            };
            if result.score < self.threshold {
                tracing::debug!(phrase, key = %result.key, score = result.score, "match below threshold, rejected");
                continue;
            }
            accepted += 1;
            for (key, value) in &result.attributes {
                let candidate =
                    AttributeCandidate::new(*key, value.clone(), SourceTier::RuleBased, result.score);
                match best.get(key) {
                    Some(existing) if existing.confidence >= candidate.confidence => {}
                    _ => {
                        best.insert(*key, candidate);
                    }
                }
            }
        }

        (best.into_values().collect(), accepted)
    }

    /// Consult the oracle with everything resolved so far and validate its
    /// response into inferred-tier candidates.
    fn inferred_candidates(
        &self,
        query: &str,
        context: &ConversationContext,
        extracted: &[AttributeCandidate],
        rule_based: &[AttributeCandidate],
    ) -> Vec<AttributeCandidate> {
        let mut existing = context.pending.clone();
        fuse_into(&mut existing, extracted, rule_based, &[], &[]);
        let existing = existing.values().clone();

        let category = existing
            .get(&AttributeKey::Category)
            .and_then(|v| v.as_scalar())
            .and_then(Category::parse);

        let request = OracleRequest::new(query, &existing, &self.kb);
        match self.oracle.infer(&request) {
            Some(response) => validate_response(&response, category),
            None => Vec::new(),
        }
    }
}

/// Errors raised while assembling the recommendation engine.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// Summary of what the engine loaded, for health display.
#[derive(Debug, Clone, Copy)]
pub struct EngineStatus {
    pub vibe_entries: usize,
    pub tables: usize,
    pub products: usize,
    pub similarity_threshold: f32,
}

/// One fully-handled turn: the reply plus everything behind it.
#[derive(Debug, Clone)]
pub struct TurnReply {
    pub message: String,
    pub state: ResolutionState,
    pub resolved: ResolvedAttributes,
    pub products: Vec<ProductRecord>,
}

/// The full recommendation engine: pipeline, catalog, and renderer.
pub struct RecommendationEngine {
    config: EngineConfig,
    pipeline: ResolutionPipeline,
    catalog: Catalog,
    renderer: Box<dyn ResponseRenderer>,
}

impl RecommendationEngine {
    /// Assemble the engine from configuration.
    ///
    /// The knowledge base loads softly (missing tables leave it partially
    /// populated); a missing catalog is a hard error.
    pub fn from_config(config: EngineConfig) -> Result<Self, EngineError> {
        let kb = Arc::new(KnowledgeBase::load(&config.vibes_data_dir));
        let catalog = Catalog::load(&config.catalog_file)?;
        let pipeline = ResolutionPipeline::new(kb, config.similarity_threshold);
        Ok(Self {
            config,
            pipeline,
            catalog,
            renderer: Box::new(TemplateRenderer),
        })
    }

    /// Assemble the engine from already-built components.
    pub fn with_components(
        config: EngineConfig,
        pipeline: ResolutionPipeline,
        catalog: Catalog,
        renderer: Box<dyn ResponseRenderer>,
    ) -> Self {
        Self {
            config,
            pipeline,
            catalog,
            renderer,
        }
    }

    /// The underlying resolution pipeline.
    pub fn pipeline(&self) -> &ResolutionPipeline {
        &self.pipeline
    }

    /// Health summary of the loaded components.
    pub fn status(&self) -> EngineStatus {
        EngineStatus {
            vibe_entries: self.pipeline.knowledge_base().len(),
            tables: self.pipeline.knowledge_base().table_names().len(),
            products: self.catalog.len(),
            similarity_threshold: self.config.similarity_threshold,
        }
    }

    /// Handle one conversation turn end to end.
    ///
    /// An incomplete turn replies with the first clarification question; a
    /// complete one filters the catalog and renders the recommendation.
    pub fn handle_turn(
        &self,
        query: &str,
        context: &mut ConversationContext,
        user_preferences: &AttributeMap,
    ) -> TurnReply {
        match self.pipeline.resolve_turn(query, context, user_preferences) {
            TurnOutcome::NeedsInfo { partial, request } => TurnReply {
                message: request.message,
                state: ResolutionState::NeedsInfo,
                resolved: partial,
                products: Vec::new(),
            },
            TurnOutcome::Ready(resolved) => {
                let products: Vec<ProductRecord> = self
                    .catalog
                    .filter(resolved.values(), self.config.max_results)
                    .into_iter()
                    .cloned()
                    .collect();
                let message = self.renderer.render(&resolved, &products);
                TurnReply {
                    message,
                    state: ResolutionState::Ready,
                    resolved,
                    products,
                }
            }
        }
    }
}
