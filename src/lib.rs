//! # Coachdesk
//!
//! An in-app help assistant for a coaching platform. Viewers (visitors,
//! athletes and coaches) ask free-text questions; the assistant matches them
//! against a role-filtered knowledge base and replies with a canned answer,
//! navigation actions and follow-up questions.
//!
//! The matching engine, session state machine and route suggestions live in
//! the I/O-free [`coachdesk_core`] crate. This crate adds configuration,
//! logging, the `coachdesk` CLI and the HTTP API.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌─────────────────┐   ┌──────────────┐
//! │ config.toml  │──▶│ knowledge base  │──▶│ coachdesk-   │
//! │ data files   │   │ + suggestions   │   │ core engine  │
//! └──────────────┘   └─────────────────┘   └──────┬───────┘
//!                                                  │
//!                          ┌───────────────────────┤
//!                          ▼                       ▼
//!                     ┌──────────┐           ┌──────────┐
//!                     │   CLI    │           │   HTTP   │
//!                     │ ask/chat │           │ sessions │
//!                     └──────────┘           └──────────┘
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`logging`] | `tracing` subscriber setup |
//! | [`knowledge`] | Loading built-in or overridden content |
//! | [`ask`] | One-shot queries with score breakdowns |
//! | [`suggest_cmd`] | Route suggestions |
//! | [`kb_cmd`] | Knowledge base listing and validation |
//! | [`chat`] | Interactive session REPL |
//! | [`server`] | HTTP API |

pub mod ask;
pub mod chat;
pub mod config;
pub mod kb_cmd;
pub mod knowledge;
pub mod logging;
pub mod server;
pub mod suggest_cmd;
