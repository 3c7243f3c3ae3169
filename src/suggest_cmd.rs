//! `coachdesk suggest`: prints the "Try asking" list for a route.

use anyhow::Result;
use serde_json::json;

use coachdesk_core::assistant::Assistant;

pub fn run_suggest(assistant: &Assistant, path: &str, json: bool) -> Result<()> {
    let suggestions = assistant.suggestions_for(path);

    if json {
        let out = json!({ "path": path, "suggestions": suggestions });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!("Try asking ({}):", path);
    for (i, s) in suggestions.iter().enumerate() {
        println!("  {}. {:<18} {}", i + 1, s.label, s.query);
    }
    Ok(())
}
