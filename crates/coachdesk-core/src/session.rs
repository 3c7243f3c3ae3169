//! Conversation state for one assistant widget.
//!
//! A [`ConversationSession`] is an append-only message log plus a phase:
//!
//! ```text
//! Unopened ──open()──▶ Greeted ──submit()──▶ Active ──submit()──▶ Active
//!     │                                         ▲
//!     └──────────────────submit()───────────────┘
//! ```
//!
//! `open()` greets exactly once per session. `close()` only hides the widget;
//! the log survives until the session is dropped. Messages are never edited
//! or removed: the log is private and only [`ConversationSession::apply`]
//! (and the thin wrappers around it) can append to it.
//!
//! The viewer is passed to every call and read fresh each time, so a role
//! change between calls takes effect on the next query.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::kb::{Action, KnowledgeBase};
use crate::role::{ViewerContext, ViewerRole};
use crate::select::{answer, Match};

/// Session lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Unopened,
    Greeted,
    Active,
}

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Assistant,
}

/// Rendering data for an assistant reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttachedMatch {
    pub title: String,
    pub actions: Vec<Action>,
    pub follow_ups: Vec<String>,
    pub score: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry_index: Option<usize>,
    pub fallback: bool,
}

impl From<&Match<'_>> for AttachedMatch {
    fn from(m: &Match<'_>) -> Self {
        Self {
            title: m.title().to_string(),
            actions: m.actions().to_vec(),
            follow_ups: m.follow_ups().to_vec(),
            score: m.score(),
            entry_index: m.entry().map(|e| e.index),
            fallback: m.is_fallback(),
        }
    }
}

/// One entry in the conversation log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    pub id: String,
    #[serde(rename = "role")]
    pub sender: Sender,
    pub text: String,
    pub created_at: DateTime<Utc>,
    /// Present only on assistant replies to a query.
    #[serde(rename = "match", skip_serializing_if = "Option::is_none")]
    pub attached: Option<AttachedMatch>,
}

impl Message {
    fn new(sender: Sender, text: String, attached: Option<AttachedMatch>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            sender,
            text,
            created_at: Utc::now(),
            attached,
        }
    }
}

/// Input to [`ConversationSession::apply`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Open,
    Close,
    Submit(String),
    SelectSuggestion(String),
}

/// Append-only conversation bound to one knowledge base.
#[derive(Debug, Clone)]
pub struct ConversationSession {
    kb: Arc<KnowledgeBase>,
    messages: Vec<Message>,
    phase: Phase,
    visible: bool,
}

impl ConversationSession {
    pub fn new(kb: Arc<KnowledgeBase>) -> Self {
        Self {
            kb,
            messages: Vec::new(),
            phase: Phase::Unopened,
            visible: false,
        }
    }

    /// Apply one event and return the messages it appended.
    pub fn apply(&mut self, event: SessionEvent, viewer: &dyn ViewerContext) -> &[Message] {
        let before = self.messages.len();
        match event {
            SessionEvent::Open => {
                self.visible = true;
                if self.phase == Phase::Unopened {
                    let text = greeting(viewer.role(), viewer.first_name());
                    self.push(Sender::Assistant, text, None);
                    self.phase = Phase::Greeted;
                }
            }
            SessionEvent::Close => {
                self.visible = false;
            }
            SessionEvent::Submit(query) | SessionEvent::SelectSuggestion(query) => {
                self.append_exchange(&query, viewer);
            }
        }
        &self.messages[before..]
    }

    /// Show the widget, greeting the viewer the first time.
    pub fn open(&mut self, viewer: &dyn ViewerContext) -> &[Message] {
        self.apply(SessionEvent::Open, viewer)
    }

    /// Hide the widget. Messages are kept.
    pub fn close(&mut self, viewer: &dyn ViewerContext) {
        self.apply(SessionEvent::Close, viewer);
    }

    /// Submit a typed query. Blank queries append nothing.
    pub fn submit(&mut self, query: &str, viewer: &dyn ViewerContext) -> &[Message] {
        self.apply(SessionEvent::Submit(query.to_string()), viewer)
    }

    /// Submit a suggestion or follow-up; identical to [`submit`](Self::submit).
    pub fn select_suggestion(&mut self, query: &str, viewer: &dyn ViewerContext) -> &[Message] {
        self.apply(SessionEvent::SelectSuggestion(query.to_string()), viewer)
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_open(&self) -> bool {
        self.visible
    }

    /// Follow-ups attached to the most recent assistant reply, if any.
    pub fn latest_follow_ups(&self) -> &[String] {
        self.messages
            .iter()
            .rev()
            .find_map(|m| m.attached.as_ref())
            .map(|a| a.follow_ups.as_slice())
            .unwrap_or(&[])
    }

    pub fn knowledge_base(&self) -> &Arc<KnowledgeBase> {
        &self.kb
    }

    fn append_exchange(&mut self, query: &str, viewer: &dyn ViewerContext) {
        let (reply, attached) = match answer(&self.kb, query, viewer) {
            Some(m) => (m.response().to_string(), AttachedMatch::from(&m)),
            None => return,
        };

        tracing::debug!(
            role = %viewer.role(),
            title = %attached.title,
            score = attached.score,
            fallback = attached.fallback,
            "assistant reply"
        );

        self.push(Sender::User, query.trim().to_string(), None);
        self.push(Sender::Assistant, reply, Some(attached));
        self.phase = Phase::Active;
    }

    fn push(&mut self, sender: Sender, text: String, attached: Option<AttachedMatch>) {
        self.messages.push(Message::new(sender, text, attached));
    }
}

/// Opening message for a viewer.
pub fn greeting(role: ViewerRole, first_name: Option<&str>) -> String {
    let hello = match first_name {
        Some(name) => format!("Hi {}!", name),
        None => "Hi there!".to_string(),
    };
    let topics = match role {
        ViewerRole::Coach => {
            "Ask me about managing courses, quizzes, drills, athletes, or bookings."
        }
        ViewerRole::Athlete => "Ask me about your courses, quizzes, drills, or upcoming sessions.",
        ViewerRole::Visitor => {
            "Ask me about our programs, pricing, or how to book your first session."
        }
    };
    format!("{} I'm the Coachdesk assistant. {}", hello, topics)
}
