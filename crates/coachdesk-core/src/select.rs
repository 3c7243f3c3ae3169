//! Best-match selection with a guaranteed fallback.
//!
//! [`select`] scores every eligible entry and keeps the highest. Ties go to
//! the entry with the smallest [`KbEntry::index`]. When the best score is
//! below [`MATCH_THRESHOLD`] a role-aware [`Fallback`] is synthesized, so
//! every non-blank query yields exactly one [`Match`].

use serde::Serialize;

use crate::kb::{Action, KbEntry, KnowledgeBase};
use crate::role::{ViewerContext, ViewerRole};
use crate::score::{score, NormalizedQuery};

/// Minimum score for an entry to be returned instead of the fallback.
pub const MATCH_THRESHOLD: u32 = 2;

/// Result of matching one query.
#[derive(Debug, Clone, PartialEq)]
pub enum Match<'a> {
    /// A knowledge-base entry scoring at or above [`MATCH_THRESHOLD`].
    Entry { entry: &'a KbEntry, score: u32 },
    /// Synthesized response when nothing scored high enough. Score is 0.
    Fallback(Fallback),
}

impl<'a> Match<'a> {
    pub fn title(&self) -> &str {
        match self {
            Match::Entry { entry, .. } => &entry.title,
            Match::Fallback(f) => &f.title,
        }
    }

    pub fn response(&self) -> &str {
        match self {
            Match::Entry { entry, .. } => &entry.response,
            Match::Fallback(f) => &f.response,
        }
    }

    pub fn actions(&self) -> &[Action] {
        match self {
            Match::Entry { entry, .. } => &entry.actions,
            Match::Fallback(f) => &f.actions,
        }
    }

    pub fn follow_ups(&self) -> &[String] {
        match self {
            Match::Entry { entry, .. } => &entry.follow_ups,
            Match::Fallback(f) => &f.follow_ups,
        }
    }

    pub fn score(&self) -> u32 {
        match self {
            Match::Entry { score, .. } => *score,
            Match::Fallback(_) => 0,
        }
    }

    /// The matched entry, or `None` for a fallback.
    pub fn entry(&self) -> Option<&'a KbEntry> {
        match self {
            Match::Entry { entry, .. } => Some(*entry),
            Match::Fallback(_) => None,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Match::Fallback(_))
    }

    /// An owned, serializable copy of this match.
    pub fn to_answer(&self) -> Answer {
        Answer {
            title: self.title().to_string(),
            response: self.response().to_string(),
            actions: self.actions().to_vec(),
            follow_ups: self.follow_ups().to_vec(),
            score: self.score(),
            entry_index: self.entry().map(|e| e.index),
            fallback: self.is_fallback(),
        }
    }
}

/// Owned form of a [`Match`] for rendering and JSON output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Answer {
    pub title: String,
    pub response: String,
    pub actions: Vec<Action>,
    pub follow_ups: Vec<String>,
    pub score: u32,
    /// Knowledge-base index of the matched entry; absent for a fallback.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry_index: Option<usize>,
    pub fallback: bool,
}

/// The always-available response for queries nothing matched.
///
/// Generated on demand; never stored in the knowledge base.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fallback {
    pub role: ViewerRole,
    pub title: String,
    pub response: String,
    pub actions: Vec<Action>,
    pub follow_ups: Vec<String>,
}

impl Fallback {
    pub fn for_role(role: ViewerRole) -> Self {
        let (address, response, follow_ups): (&str, &str, [&str; 3]) = match role {
            ViewerRole::Coach => (
                "Coach",
                "I can help you manage courses and quizzes, book sessions for your athletes, \
                 organize the drill library, and keep an eye on athlete progress.",
                [
                    "How do I create a course?",
                    "How do I create a quiz?",
                    "How do I manage bookings?",
                ],
            ),
            ViewerRole::Athlete => (
                "Athlete",
                "I can help you find your courses, take quizzes, practice your assigned drills, \
                 and book or reschedule sessions.",
                [
                    "Where are my courses?",
                    "How do I take a quiz?",
                    "Where are my drills?",
                ],
            ),
            ViewerRole::Visitor => (
                "Guest",
                "I can tell you about our programs and pricing, explain how booking works, \
                 and help you join.",
                [
                    "How do I sign up?",
                    "How much does training cost?",
                    "What programs do you offer?",
                ],
            ),
        };

        Self {
            role,
            title: format!("How Can I Help, {}?", address),
            response: response.to_string(),
            actions: quick_actions(),
            follow_ups: follow_ups.iter().map(|f| f.to_string()).collect(),
        }
    }
}

/// The global quick-action set, identical for every role.
pub fn quick_actions() -> Vec<Action> {
    vec![
        Action::new("Book a Session", "/booking"),
        Action::new("View Pricing", "/pricing"),
        Action::new("Browse Programs", "/programs"),
        Action::new("Contact Us", "/contact"),
    ]
}

/// Pick the best eligible entry for `query`, or the fallback for `viewer`.
///
/// `eligible` must already be filtered for `viewer`. Ties are broken by the
/// smallest entry index, independent of iteration order.
pub fn select<'a, I>(query: &NormalizedQuery, eligible: I, viewer: ViewerRole) -> Match<'a>
where
    I: IntoIterator<Item = &'a KbEntry>,
{
    let mut best: Option<(&'a KbEntry, u32)> = None;
    let mut considered = 0usize;

    for entry in eligible {
        considered += 1;
        let s = score(query, entry, viewer);
        let better = match best {
            None => s > 0,
            Some((current, best_score)) => {
                s > best_score || (s == best_score && entry.index < current.index)
            }
        };
        if better {
            best = Some((entry, s));
        }
    }

    match best {
        Some((entry, s)) if s >= MATCH_THRESHOLD => {
            tracing::debug!(
                query = query.text(),
                role = %viewer,
                entry = entry.index,
                title = %entry.title,
                score = s,
                considered,
                "matched knowledge base entry"
            );
            Match::Entry { entry, score: s }
        }
        _ => {
            tracing::debug!(
                query = query.text(),
                role = %viewer,
                best_score = best.map(|(_, s)| s).unwrap_or(0),
                considered,
                "no entry above threshold, using fallback"
            );
            Match::Fallback(Fallback::for_role(viewer))
        }
    }
}

/// Filter `kb` for `viewer` and select the best match for a raw query.
///
/// Returns `None` only when `raw` is blank.
pub fn answer<'a>(
    kb: &'a KnowledgeBase,
    raw: &str,
    viewer: &dyn ViewerContext,
) -> Option<Match<'a>> {
    let query = NormalizedQuery::new(raw)?;
    let role = viewer.role();
    Some(select(&query, kb.eligible(role), role))
}
