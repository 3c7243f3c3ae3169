//! Facade bundling a knowledge base with its suggestion table.

use std::sync::Arc;

use anyhow::Result;

use crate::kb::KnowledgeBase;
use crate::role::ViewerContext;
use crate::select::{answer, Match};
use crate::session::ConversationSession;
use crate::suggest::{Suggestion, SuggestionTable};

/// Shared, immutable assistant content. Cheap to clone.
#[derive(Debug, Clone)]
pub struct Assistant {
    kb: Arc<KnowledgeBase>,
    suggestions: Arc<SuggestionTable>,
}

impl Assistant {
    pub fn new(kb: KnowledgeBase, suggestions: SuggestionTable) -> Self {
        Self {
            kb: Arc::new(kb),
            suggestions: Arc::new(suggestions),
        }
    }

    /// Assistant over the built-in knowledge base and suggestion table.
    pub fn builtin() -> Result<Self> {
        Ok(Self::new(KnowledgeBase::builtin()?, SuggestionTable::builtin()?))
    }

    /// One-shot match. `None` only for a blank query.
    pub fn answer(&self, query: &str, viewer: &dyn ViewerContext) -> Option<Match<'_>> {
        answer(&self.kb, query, viewer)
    }

    pub fn suggestions_for(&self, path: &str) -> &[Suggestion] {
        self.suggestions.suggestions_for(path)
    }

    /// A fresh, unopened conversation over this knowledge base.
    pub fn session(&self) -> ConversationSession {
        ConversationSession::new(Arc::clone(&self.kb))
    }

    pub fn knowledge_base(&self) -> &KnowledgeBase {
        &self.kb
    }

    pub fn suggestion_table(&self) -> &SuggestionTable {
        &self.suggestions
    }
}
