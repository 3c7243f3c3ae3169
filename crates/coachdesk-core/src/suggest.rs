//! Route-aware "Try asking" suggestions shown before any user input.
//!
//! Lookup order for a route path:
//!
//! 1. Exact match on a registered path.
//! 2. Longest registered path that is a segment prefix of the route
//!    (`/admin/drills` covers `/admin/drills/42`). The root `/` never
//!    counts as a prefix here.
//! 3. The root path's suggestions.
//!
//! Suggestions only seed the pre-input list; they never affect scoring.

use std::collections::HashSet;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

const BUILTIN_SUGGESTIONS: &str = include_str!("../data/suggestions.toml");

pub const ROOT_PATH: &str = "/";

/// A pre-filled query offered to the viewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub label: String,
    pub query: String,
}

#[derive(Debug, Clone, Deserialize)]
struct RouteSpec {
    path: String,
    #[serde(default)]
    suggestions: Vec<Suggestion>,
}

#[derive(Debug, Deserialize)]
struct SuggestionFile {
    #[serde(default)]
    routes: Vec<RouteSpec>,
}

/// Static path → suggestions table.
#[derive(Debug, Clone)]
pub struct SuggestionTable {
    routes: Vec<(String, Vec<Suggestion>)>,
    root: usize,
}

impl SuggestionTable {
    /// Parse an authored TOML suggestion table. The root path is required.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: SuggestionFile =
            toml::from_str(content).with_context(|| "Failed to parse suggestion table")?;

        let mut seen = HashSet::new();
        let mut routes = Vec::with_capacity(file.routes.len());
        for route in file.routes {
            let path = normalize_path(&route.path);
            if !path.starts_with('/') {
                bail!("suggestion path '{}' must start with '/'", route.path);
            }
            if !seen.insert(path.clone()) {
                bail!("suggestion path '{}' is registered twice", path);
            }
            for s in &route.suggestions {
                if s.query.trim().is_empty() {
                    bail!("suggestion '{}' for '{}' has a blank query", s.label, path);
                }
            }
            routes.push((path, route.suggestions));
        }

        let root = routes
            .iter()
            .position(|(p, _)| p == ROOT_PATH)
            .ok_or_else(|| anyhow::anyhow!("suggestion table must register the root path '/'"))?;

        Ok(Self { routes, root })
    }

    /// The table compiled into this crate.
    pub fn builtin() -> Result<Self> {
        Self::from_toml_str(BUILTIN_SUGGESTIONS).context("built-in suggestion table is invalid")
    }

    /// Suggestions for the current route path.
    pub fn suggestions_for(&self, path: &str) -> &[Suggestion] {
        let path = normalize_path(path);

        if let Some((_, s)) = self.routes.iter().find(|(p, _)| *p == path) {
            return s;
        }

        self.routes
            .iter()
            .filter(|(p, _)| p != ROOT_PATH && is_segment_prefix(p, &path))
            .max_by_key(|(p, _)| p.len())
            .map(|(_, s)| s.as_slice())
            .unwrap_or(self.routes[self.root].1.as_slice())
    }

    /// Registered paths in authored order.
    pub fn paths(&self) -> impl Iterator<Item = &str> + '_ {
        self.routes.iter().map(|(p, _)| p.as_str())
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

/// Strip `?query` / `#fragment` and a trailing slash (except on the root).
fn normalize_path(path: &str) -> String {
    let end = path
        .find(|c: char| c == '?' || c == '#')
        .unwrap_or(path.len());
    let trimmed = path[..end].trim();
    if trimmed.is_empty() {
        return ROOT_PATH.to_string();
    }
    let stripped = trimmed.trim_end_matches('/');
    if stripped.is_empty() {
        ROOT_PATH.to_string()
    } else {
        stripped.to_string()
    }
}

fn is_segment_prefix(prefix: &str, path: &str) -> bool {
    path.len() > prefix.len()
        && path.starts_with(prefix)
        && path.as_bytes()[prefix.len()] == b'/'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn queries(s: &[Suggestion]) -> Vec<&str> {
        s.iter().map(|s| s.query.as_str()).collect()
    }

    fn table() -> SuggestionTable {
        SuggestionTable::from_toml_str(
            r#"
[[routes]]
path = "/"
suggestions = [{ label = "Home", query = "home" }]

[[routes]]
path = "/admin"
suggestions = [{ label = "Admin", query = "admin" }]

[[routes]]
path = "/admin/drills"
suggestions = [{ label = "Drills", query = "drills" }]
"#,
        )
        .unwrap()
    }

    #[test]
    fn test_builtin_loads_with_root() {
        let t = SuggestionTable::builtin().unwrap();
        assert!(t.paths().any(|p| p == "/"));
        assert!(!t.suggestions_for("/").is_empty());
    }

    #[test]
    fn test_builtin_admin_drills() {
        let t = SuggestionTable::builtin().unwrap();
        let drills = t.suggestions_for("/admin/drills");
        assert_ne!(drills, t.suggestions_for("/"));
        assert!(drills.iter().any(|s| s.query.to_lowercase().contains("drill")));
    }

    #[test]
    fn test_builtin_unknown_path_uses_root() {
        let t = SuggestionTable::builtin().unwrap();
        let root = t.suggestions_for("/");
        assert_eq!(t.suggestions_for("/unregistered/path"), root);
    }

    #[test]
    fn test_exact_match() {
        assert_eq!(queries(table().suggestions_for("/admin")), vec!["admin"]);
    }

    #[test]
    fn test_longest_prefix_wins() {
        let t = table();
        let nested = t.suggestions_for("/admin/drills/42/edit");
        assert_eq!(queries(nested), vec!["drills"]);
        assert_eq!(queries(t.suggestions_for("/admin/media")), vec!["admin"]);
    }

    #[test]
    fn test_prefix_respects_segments() {
        let t = table();
        let sibling = t.suggestions_for("/admin/drillsets");
        assert_eq!(queries(sibling), vec!["admin"]);
        assert_eq!(queries(t.suggestions_for("/administrator")), vec!["home"]);
    }

    #[test]
    fn test_query_string_and_trailing_slash_ignored() {
        let t = table();
        let paged = t.suggestions_for("/admin/drills/?page=2");
        assert_eq!(queries(paged), vec!["drills"]);
        assert_eq!(queries(t.suggestions_for("/admin#top")), vec!["admin"]);
        assert_eq!(queries(t.suggestions_for("")), vec!["home"]);
    }

    #[test]
    fn test_missing_root_rejected() {
        let err = SuggestionTable::from_toml_str(
            r#"
[[routes]]
path = "/admin"
suggestions = []
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("root path"));
    }

    #[test]
    fn test_duplicate_path_rejected() {
        let result = SuggestionTable::from_toml_str(
            r#"
[[routes]]
path = "/"
[[routes]]
path = "/admin/"
[[routes]]
path = "/admin"
"#,
        );
        assert!(result.is_err());
    }
}
