//! Per-conversation state for multi-turn attribute accumulation.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::clarification::MissingInfo;
use crate::fusion::ResolvedAttributes;

/// Unique identifier for conversation sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    /// Create a new random session ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Cross-turn conversation state.
///
/// Owned exclusively by one session; never shared across sessions. Created
/// on the first unresolved turn, mutated by each subsequent turn's fusion
/// result, and cleared when a turn produces a complete set or the session is
/// explicitly reset. There is no hard turn limit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationContext {
    pub id: SessionId,

    /// Attributes accumulated so far.
    pub pending: ResolvedAttributes,

    /// What was still missing after the last turn.
    pub missing: Vec<MissingInfo>,

    /// Number of turns processed in this conversation.
    pub turn_count: u32,
}

impl ConversationContext {
    /// Start a fresh conversation.
    pub fn new() -> Self {
        Self {
            id: SessionId::new(),
            pending: ResolvedAttributes::new(),
            missing: Vec::new(),
            turn_count: 0,
        }
    }

    /// Whether any partial state is being carried.
    pub fn is_active(&self) -> bool {
        !self.pending.is_empty() || !self.missing.is_empty()
    }

    /// Record an unresolved turn's partial result.
    pub fn retain_partial(&mut self, pending: ResolvedAttributes, missing: Vec<MissingInfo>) {
        self.pending = pending;
        self.missing = missing;
        self.turn_count += 1;
    }

    /// Record a completed turn: the retained state is no longer needed.
    pub fn complete_turn(&mut self) {
        self.turn_count += 1;
        self.pending = ResolvedAttributes::new();
        self.missing = Vec::new();
    }

    /// Explicit reset: drop all retained state, keep the session identity.
    pub fn reset(&mut self) {
        self.pending = ResolvedAttributes::new();
        self.missing = Vec::new();
        self.turn_count = 0;
    }
}

impl Default for ConversationContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fusion::{AttributeCandidate, SourceTier};
    use apparel_catalog::AttributeKey;

    fn partial() -> ResolvedAttributes {
        let mut set = ResolvedAttributes::new();
        set.apply(&AttributeCandidate::new(
            AttributeKey::Category,
            "dress",
            SourceTier::Extracted,
            1.0,
        ));
        set
    }

    #[test]
    fn test_retain_and_reset() {
        let mut context = ConversationContext::new();
        assert!(!context.is_active());

        context.retain_partial(partial(), vec![MissingInfo::Key(AttributeKey::Budget)]);
        assert!(context.is_active());
        assert_eq!(context.turn_count, 1);

        context.reset();
        assert!(!context.is_active());
        assert_eq!(context.turn_count, 0);
    }

    #[test]
    fn test_complete_turn_clears_pending() {
        let mut context = ConversationContext::new();
        context.retain_partial(partial(), vec![MissingInfo::Key(AttributeKey::Size)]);

        context.complete_turn();
        assert!(!context.is_active());
        assert_eq!(context.turn_count, 2);
    }

    #[test]
    fn test_sessions_have_distinct_ids() {
        assert_ne!(ConversationContext::new().id, ConversationContext::new().id);
    }
}
