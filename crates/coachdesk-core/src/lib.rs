//! # Coachdesk Core
//!
//! The in-app assistant engine for Coachdesk: an ordered knowledge base of
//! canned answers, a role filter, a keyword scorer, best-or-fallback match
//! selection, route-aware starter suggestions, and an append-only
//! conversation session.
//!
//! This crate performs no filesystem, network, or async work. Loading an
//! authored knowledge base from disk, configuration, and the CLI and HTTP
//! surfaces live in the `coachdesk` crate.
//!
//! ## Data Flow
//!
//! ```text
//! viewer role ──▶ RoleFilter ──▶ eligible entries
//!                                      │
//! query ──────────────────────▶ Scorer (per entry)
//!                                      │
//!                               MatchSelector ──▶ Match (entry or fallback)
//!                                      │
//!                          ConversationSession (append user + assistant)
//! ```
//!
//! ## Example
//!
//! ```rust
//! use coachdesk_core::kb::KnowledgeBase;
//! use coachdesk_core::role::ViewerRole;
//! use coachdesk_core::select::answer;
//!
//! let kb = KnowledgeBase::builtin().unwrap();
//! let m = answer(&kb, "pricing", &ViewerRole::Visitor).unwrap();
//! assert!(m.title().contains("Pricing"));
//! ```

pub mod assistant;
pub mod kb;
pub mod role;
pub mod score;
pub mod select;
pub mod session;
pub mod suggest;
