//! Completeness Checker / Clarification State Machine.
//!
//! Decides whether a resolved attribute set is usable for catalog filtering.
//! Resolution cannot proceed without every critical attribute (category,
//! size, budget) plus at least one context attribute (occasion, season,
//! style, fit). Anything missing produces canned follow-up questions; the
//! machine cycles `NeedsInfo -> ... -> Ready` with no turn limit.

use apparel_catalog::AttributeKey;
use serde::{Deserialize, Serialize};

use crate::fusion::ResolvedAttributes;

/// Attributes that must all be present before filtering.
pub const CRITICAL_ATTRIBUTES: [AttributeKey; 3] = [
    AttributeKey::Category,
    AttributeKey::Size,
    AttributeKey::Budget,
];

/// Attributes of which at least one must accompany the critical set.
pub const CONTEXT_ATTRIBUTES: [AttributeKey; 4] = [
    AttributeKey::Occasion,
    AttributeKey::Season,
    AttributeKey::Style,
    AttributeKey::Fit,
];

/// State of a resolution turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResolutionState {
    /// The set is incomplete; clarification questions are pending.
    NeedsInfo,
    /// The set is complete and may be forwarded to catalog filtering.
    Ready,
}

/// One piece of missing information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MissingInfo {
    /// A specific attribute is absent.
    Key(AttributeKey),
    /// All criticals are present but no context attribute accompanies them.
    OccasionOrStyle,
}

impl std::fmt::Display for MissingInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MissingInfo::Key(key) => write!(f, "{}", key),
            MissingInfo::OccasionOrStyle => write!(f, "occasion or style"),
        }
    }
}

/// Outcome of a completeness check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletenessReport {
    pub state: ResolutionState,
    /// Missing markers in check order; empty exactly when state is `Ready`.
    pub missing: Vec<MissingInfo>,
}

/// Check a resolved set against the critical and context requirements.
pub fn check_completeness(resolved: &ResolvedAttributes) -> CompletenessReport {
    let mut missing: Vec<MissingInfo> = CRITICAL_ATTRIBUTES
        .iter()
        .filter(|&&key| !resolved.is_present(key))
        .map(|&key| MissingInfo::Key(key))
        .collect();

    if missing.is_empty() {
        let has_context = CONTEXT_ATTRIBUTES.iter().any(|&key| resolved.is_present(key));
        if !has_context {
            missing.push(MissingInfo::OccasionOrStyle);
        }
    }

    let state = if missing.is_empty() {
        ResolutionState::Ready
    } else {
        ResolutionState::NeedsInfo
    };
    CompletenessReport { state, missing }
}

/// A structured follow-up request for an incomplete turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClarificationRequest {
    /// The primary message: the first generated question.
    pub message: String,

    /// What is still missing, in check order.
    pub missing: Vec<MissingInfo>,

    /// One question per missing marker, in the same order.
    pub suggested_questions: Vec<String>,
}

impl ClarificationRequest {
    /// Build the request for a set of missing markers.
    pub fn for_missing(missing: Vec<MissingInfo>) -> Self {
        let suggested_questions: Vec<String> = missing.iter().map(question_for).collect();
        let message = suggested_questions
            .first()
            .cloned()
            .unwrap_or_else(|| "I need more information to find the right piece for you.".to_string());
        Self {
            message,
            missing,
            suggested_questions,
        }
    }
}

/// The canned question template for one missing marker.
pub fn question_for(missing: &MissingInfo) -> String {
    match missing {
        MissingInfo::Key(AttributeKey::Category) => {
            "What type of clothing are you looking for? Choose from: dress, top, skirt, pants".to_string()
        }
        MissingInfo::Key(AttributeKey::Size) => {
            "What size do you need? Available sizes: XS, S, M, L, XL, XXL".to_string()
        }
        MissingInfo::Key(AttributeKey::Budget) => {
            "What's your budget? You can say something like '$50', 'under $100', or '200 dollars'"
                .to_string()
        }
        MissingInfo::Key(AttributeKey::Occasion) => {
            "What's the occasion? For example: casual, formal, work, party, date, wedding".to_string()
        }
        MissingInfo::Key(AttributeKey::Season) => {
            "What season is this for? (spring, summer, fall, winter)".to_string()
        }
        MissingInfo::Key(AttributeKey::Style) => {
            "What style are you going for? Options include: casual, formal, chic, bohemian, minimalist, edgy"
                .to_string()
        }
        MissingInfo::Key(AttributeKey::Fit) => {
            "How would you like it to fit? Choose from: relaxed, tailored, loose, fitted".to_string()
        }
        MissingInfo::Key(key) => format!("Could you tell me more about the {}?", key),
        MissingInfo::OccasionOrStyle => {
            "Tell me about the occasion or style! For example: casual, formal, work, party or chic, bohemian"
                .to_string()
        }
    }
}
