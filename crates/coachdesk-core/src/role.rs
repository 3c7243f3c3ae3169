//! Viewer roles and knowledge-base visibility.
//!
//! The viewer's role is resolved outside this crate and read through the
//! [`ViewerContext`] trait on every call; nothing here caches it.
//!
//! # Visibility
//!
//! | Entry tag | Visitor | Athlete | Coach |
//! |-----------|---------|---------|-------|
//! | `all`     | yes     | yes     | yes   |
//! | `visitor` | yes     | no      | no    |
//! | `athlete` | no      | yes     | yes   |
//! | `coach`   | no      | no      | yes   |
//!
//! Coaches see athlete-facing entries so they can relay them to athletes.

use std::fmt;
use std::str::FromStr;

use anyhow::bail;
use serde::{Deserialize, Serialize};

/// The resolved role of the person using the assistant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewerRole {
    Visitor,
    Athlete,
    Coach,
}

impl ViewerRole {
    pub const ALL: [ViewerRole; 3] = [
        ViewerRole::Visitor,
        ViewerRole::Athlete,
        ViewerRole::Coach,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ViewerRole::Visitor => "visitor",
            ViewerRole::Athlete => "athlete",
            ViewerRole::Coach => "coach",
        }
    }
}

impl fmt::Display for ViewerRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for ViewerRole {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "visitor" | "guest" => Ok(ViewerRole::Visitor),
            "athlete" => Ok(ViewerRole::Athlete),
            "coach" => Ok(ViewerRole::Coach),
            other => bail!("Unknown role: '{other}'. Use visitor, athlete, or coach."),
        }
    }
}

/// Visibility tag carried by every knowledge-base entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoleTag {
    #[default]
    All,
    Athlete,
    Coach,
    Visitor,
}

impl RoleTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoleTag::All => "all",
            RoleTag::Athlete => "athlete",
            RoleTag::Coach => "coach",
            RoleTag::Visitor => "visitor",
        }
    }

    /// Whether an entry with this tag may be matched by `viewer`.
    pub fn visible_to(self, viewer: ViewerRole) -> bool {
        match (self, viewer) {
            (RoleTag::All, _) => true,
            (RoleTag::Visitor, ViewerRole::Visitor) => true,
            (RoleTag::Athlete, ViewerRole::Athlete | ViewerRole::Coach) => true,
            (RoleTag::Coach, ViewerRole::Coach) => true,
            (RoleTag::Visitor, ViewerRole::Athlete | ViewerRole::Coach) => false,
            (RoleTag::Athlete, ViewerRole::Visitor) => false,
            (RoleTag::Coach, ViewerRole::Visitor | ViewerRole::Athlete) => false,
        }
    }

    /// Whether the tag names exactly this viewer role.
    ///
    /// `All` never matches exactly, and a coach reading an athlete entry is
    /// eligible but not exact.
    pub fn is_exactly(self, viewer: ViewerRole) -> bool {
        matches!(
            (self, viewer),
            (RoleTag::Visitor, ViewerRole::Visitor)
                | (RoleTag::Athlete, ViewerRole::Athlete)
                | (RoleTag::Coach, ViewerRole::Coach)
        )
    }
}

impl fmt::Display for RoleTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Read-only view of the current viewer, supplied by the host application.
pub trait ViewerContext {
    /// The viewer's role at the moment of the call.
    fn role(&self) -> ViewerRole;

    /// The viewer's first name, when known. Used only for greetings.
    fn first_name(&self) -> Option<&str> {
        None
    }
}

impl ViewerContext for ViewerRole {
    fn role(&self) -> ViewerRole {
        *self
    }
}

/// A viewer with an optional first name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewer {
    pub role: ViewerRole,
    #[serde(default)]
    pub first_name: Option<String>,
}

impl Viewer {
    pub fn new(role: ViewerRole) -> Self {
        Self {
            role,
            first_name: None,
        }
    }

    pub fn with_first_name(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        let trimmed = name.trim();
        self.first_name = if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        };
        self
    }
}

impl ViewerContext for Viewer {
    fn role(&self) -> ViewerRole {
        self.role
    }

    fn first_name(&self) -> Option<&str> {
        self.first_name.as_deref()
    }
}
