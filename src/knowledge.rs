//! Loads assistant content according to `[knowledge]` in the config.

use anyhow::{Context, Result};
use std::path::Path;

use coachdesk_core::assistant::Assistant;
use coachdesk_core::kb::KnowledgeBase;
use coachdesk_core::suggest::SuggestionTable;

use crate::config::Config;

/// Build the [`Assistant`] once for the process lifetime.
pub fn load_assistant(config: &Config) -> Result<Assistant> {
    let kb = match &config.knowledge.path {
        Some(path) => load_knowledge_base(path)?,
        None => KnowledgeBase::builtin()?,
    };
    let suggestions = match &config.knowledge.suggestions {
        Some(path) => load_suggestions(path)?,
        None => SuggestionTable::builtin()?,
    };

    tracing::info!(
        entries = kb.len(),
        routes = suggestions.len(),
        knowledge = %source_label(config.knowledge.path.as_deref()),
        suggestions = %source_label(config.knowledge.suggestions.as_deref()),
        "assistant content loaded"
    );

    Ok(Assistant::new(kb, suggestions))
}

pub fn load_knowledge_base(path: &Path) -> Result<KnowledgeBase> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read knowledge base: {}", path.display()))?;
    KnowledgeBase::from_toml_str(&content)
        .with_context(|| format!("Invalid knowledge base: {}", path.display()))
}

pub fn load_suggestions(path: &Path) -> Result<SuggestionTable> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read suggestion table: {}", path.display()))?;
    SuggestionTable::from_toml_str(&content)
        .with_context(|| format!("Invalid suggestion table: {}", path.display()))
}

fn source_label(path: Option<&Path>) -> String {
    match path {
        Some(p) => p.display().to_string(),
        None => "built-in".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coachdesk_core::role::ViewerRole;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_default_config_uses_builtin() {
        let assistant = load_assistant(&Config::minimal()).unwrap();
        assert!(assistant.knowledge_base().len() > 20);
        assert!(!assistant.suggestions_for("/").is_empty());
    }

    #[test]
    fn test_override_knowledge_base() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("kb.toml");
        fs::write(
            &path,
            r#"
[[entries]]
title = "Parking"
response = "Park behind the gym."
keywords = ["parking", "where to park"]
"#,
        )
        .unwrap();

        let mut cfg = Config::minimal();
        cfg.knowledge.path = Some(path);
        let assistant = load_assistant(&cfg).unwrap();
        assert_eq!(assistant.knowledge_base().len(), 1);
        let m = assistant
            .answer("where to park?", &ViewerRole::Visitor)
            .unwrap();
        assert_eq!(m.title(), "Parking");
    }

    #[test]
    fn test_invalid_file_names_path() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("broken.toml");
        let content = "[[entries]]\ntitle = \"\"\nresponse = \"x\"\nkeywords = [\"x\"]\n";
        fs::write(&path, content).unwrap();
        let err = load_knowledge_base(&path).unwrap_err();
        let msg = format!("{:#}", err);
        assert!(msg.contains("broken.toml"));
        assert!(msg.contains("title must not be empty"));
    }
}
