//! The assistant's knowledge base: an ordered, immutable list of entries.
//!
//! Entries are authored as TOML `[[entries]]` tables and loaded once. Each
//! entry is stamped with its zero-based position in the authored sequence
//! ([`KbEntry::index`]); match selection breaks score ties on that index,
//! never on container iteration order.
//!
//! # Authored Format
//!
//! ```toml
//! [[entries]]
//! title = "Pricing & Packages"
//! role = "all"                      # all | athlete | coach | visitor
//! keywords = ["pricing", "how much"]
//! response = "Private sessions start at $65 per hour."
//! actions = [{ label = "View Pricing", path = "/pricing" }]
//! follow_ups = ["How do I book a session?"]
//! ```
//!
//! Keywords are trimmed and lowercased at load time; duplicates within one
//! entry are dropped.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::role::{RoleTag, ViewerRole};

const BUILTIN_KB: &str = include_str!("../data/knowledge_base.toml");

/// A navigable link attached to an answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub label: String,
    /// Route path for the host router, always starting with `/`.
    pub path: String,
}

impl Action {
    pub fn new(label: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            path: path.into(),
        }
    }
}

/// One canned answer in the knowledge base.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KbEntry {
    /// Position in the authored sequence. Lower wins ties.
    pub index: usize,
    /// Normalized (lowercase, trimmed, de-duplicated) keyword phrases.
    pub keywords: Vec<String>,
    pub title: String,
    pub response: String,
    pub actions: Vec<Action>,
    pub follow_ups: Vec<String>,
    pub role: RoleTag,
}

/// An entry as authored, before validation and indexing.
#[derive(Debug, Clone, Deserialize)]
pub struct EntrySpec {
    pub title: String,
    pub response: String,
    pub keywords: Vec<String>,
    #[serde(default)]
    pub role: RoleTag,
    #[serde(default)]
    pub actions: Vec<Action>,
    #[serde(default)]
    pub follow_ups: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct KbFile {
    #[serde(default)]
    entries: Vec<EntrySpec>,
}

/// Ordered, immutable collection of [`KbEntry`] values.
#[derive(Debug, Clone)]
pub struct KnowledgeBase {
    entries: Vec<KbEntry>,
}

impl KnowledgeBase {
    /// Parse an authored TOML knowledge base.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: KbFile =
            toml::from_str(content).with_context(|| "Failed to parse knowledge base")?;
        Self::from_specs(file.entries)
    }

    /// The knowledge base compiled into this crate.
    pub fn builtin() -> Result<Self> {
        Self::from_toml_str(BUILTIN_KB).context("built-in knowledge base is invalid")
    }

    /// Validate and index authored entries, preserving their order.
    pub fn from_specs(specs: Vec<EntrySpec>) -> Result<Self> {
        let entries = specs
            .into_iter()
            .enumerate()
            .map(|(index, spec)| {
                build_entry(index, spec).with_context(|| format!("knowledge base entry #{index}"))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { entries })
    }

    /// All entries in authored order.
    pub fn entries(&self) -> &[KbEntry] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&KbEntry> {
        self.entries.get(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries `viewer` may match, in authored order.
    pub fn eligible(&self, viewer: ViewerRole) -> impl Iterator<Item = &KbEntry> + '_ {
        eligible(&self.entries, viewer)
    }
}

/// Filter `entries` down to those visible to `viewer`, keeping order.
pub fn eligible(entries: &[KbEntry], viewer: ViewerRole) -> impl Iterator<Item = &KbEntry> + '_ {
    entries.iter().filter(move |e| e.role.visible_to(viewer))
}

fn build_entry(index: usize, spec: EntrySpec) -> Result<KbEntry> {
    let title = spec.title.trim().to_string();
    if title.is_empty() {
        bail!("title must not be empty");
    }
    let response = spec.response.trim().to_string();
    if response.is_empty() {
        bail!("'{}': response must not be empty", title);
    }

    let mut keywords: Vec<String> = Vec::with_capacity(spec.keywords.len());
    for raw in &spec.keywords {
        let kw = raw.trim().to_lowercase();
        if kw.is_empty() {
            bail!("'{}': keywords must not be blank", title);
        }
        if !keywords.contains(&kw) {
            keywords.push(kw);
        }
    }
    if keywords.is_empty() {
        bail!("'{}': at least one keyword is required", title);
    }

    for action in &spec.actions {
        if action.label.trim().is_empty() {
            bail!("'{}': action label must not be empty", title);
        }
        if !action.path.starts_with('/') {
            bail!(
                "'{}': action path '{}' must start with '/'",
                title,
                action.path
            );
        }
    }

    if spec.follow_ups.iter().any(|f| f.trim().is_empty()) {
        bail!("'{}': follow-ups must not be blank", title);
    }

    Ok(KbEntry {
        index,
        keywords,
        title,
        response,
        actions: spec.actions,
        follow_ups: spec
            .follow_ups
            .into_iter()
            .map(|f| f.trim().to_string())
            .collect(),
        role: spec.role,
    })
}
