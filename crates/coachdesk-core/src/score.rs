//! Keyword relevance scoring for a single knowledge-base entry.
//!
//! # Algorithm
//!
//! 1. Lowercase the query and split it on whitespace into tokens.
//! 2. For every keyword phrase of the entry:
//!    - if the lowercased query contains the phrase verbatim, add
//!      `3 × words(phrase)`;
//!    - for every token longer than two characters that occurs inside the
//!      phrase, add `1`.
//! 3. Add `1` if any word of the entry title equals a query token.
//! 4. Add `1` if the entry is tagged with exactly the viewer's role.
//!
//! Scores are small unbounded integers. They are not normalized by query
//! length, so a long query with many overlapping tokens scores higher.

use serde::Serialize;

use crate::kb::KbEntry;
use crate::role::ViewerRole;

/// Points per word of a keyword phrase found verbatim in the query.
pub const PHRASE_WEIGHT: u32 = 3;
/// Points per query token found inside a keyword phrase.
pub const TOKEN_WEIGHT: u32 = 1;
/// Points when a title word equals a query token.
pub const TITLE_BONUS: u32 = 1;
/// Points when the entry is tagged with exactly the viewer's role.
pub const ROLE_BONUS: u32 = 1;
/// Tokens this short take part in phrase containment only.
pub const MIN_TOKEN_CHARS: usize = 3;

/// A query lowercased and tokenized once, then scored against many entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedQuery {
    text: String,
    tokens: Vec<String>,
}

impl NormalizedQuery {
    /// Normalize `raw`. Returns `None` for empty or whitespace-only input.
    pub fn new(raw: &str) -> Option<Self> {
        let text = raw.trim().to_lowercase();
        if text.is_empty() {
            return None;
        }
        let tokens = text.split_whitespace().map(str::to_string).collect();
        Some(Self { text, tokens })
    }

    /// The lowercased query, used for phrase containment.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Every whitespace-separated token, short ones included.
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Tokens long enough to count for token overlap.
    pub fn scoring_tokens(&self) -> impl Iterator<Item = &str> + '_ {
        self.tokens
            .iter()
            .map(String::as_str)
            .filter(|t| t.chars().count() >= MIN_TOKEN_CHARS)
    }
}

/// Scoring breakdown for one entry against one query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScoreExplanation {
    /// Points from keyword phrases contained verbatim in the query.
    pub phrase: u32,
    /// Points from query tokens found inside keyword phrases.
    pub token: u32,
    pub title_bonus: u32,
    pub role_bonus: u32,
    pub total: u32,
}

/// Score `entry` against `query` for `viewer`, with a per-component breakdown.
pub fn explain(query: &NormalizedQuery, entry: &KbEntry, viewer: ViewerRole) -> ScoreExplanation {
    let mut phrase = 0;
    let mut token = 0;

    for keyword in &entry.keywords {
        if query.text().contains(keyword.as_str()) {
            phrase += PHRASE_WEIGHT * word_count(keyword);
        }
        for t in query.scoring_tokens() {
            if keyword.contains(t) {
                token += TOKEN_WEIGHT;
            }
        }
    }

    let title_hit = entry
        .title
        .split_whitespace()
        .map(str::to_lowercase)
        .any(|w| query.tokens().iter().any(|t| *t == w));
    let title_bonus = if title_hit { TITLE_BONUS } else { 0 };

    let role_bonus = if entry.role.is_exactly(viewer) {
        ROLE_BONUS
    } else {
        0
    };

    ScoreExplanation {
        phrase,
        token,
        title_bonus,
        role_bonus,
        total: phrase + token + title_bonus + role_bonus,
    }
}

/// Score `entry` against `query` for `viewer`.
pub fn score(query: &NormalizedQuery, entry: &KbEntry, viewer: ViewerRole) -> u32 {
    explain(query, entry, viewer).total
}

fn word_count(phrase: &str) -> u32 {
    phrase.split_whitespace().count() as u32
}
