//! `coachdesk kb`: inspect and validate assistant content.

use anyhow::Result;

use coachdesk_core::assistant::Assistant;
use coachdesk_core::role::ViewerRole;

/// Print the entries visible to `role`, or every entry when `role` is `None`.
pub fn list_entries(assistant: &Assistant, role: Option<ViewerRole>) -> Result<()> {
    let kb = assistant.knowledge_base();

    println!("{:<6} {:<8} {:<36} KEYWORDS", "INDEX", "ROLE", "TITLE");
    let mut count = 0;
    for entry in kb.entries() {
        if let Some(r) = role {
            if !entry.role.visible_to(r) {
                continue;
            }
        }
        println!(
            "{:<6} {:<8} {:<36} {}",
            entry.index,
            entry.role,
            truncate(&entry.title, 36),
            truncate(&entry.keywords.join(", "), 60)
        );
        count += 1;
    }

    if count == 0 {
        println!("No entries.");
    }
    Ok(())
}

/// Report counts for the loaded content. Loading already validated it.
pub fn check(assistant: &Assistant) -> Result<()> {
    let kb = assistant.knowledge_base();
    println!("knowledge base: {} entries", kb.len());
    for role in ViewerRole::ALL {
        println!("  eligible for {:<8} {}", role, kb.eligible(role).count());
    }
    println!(
        "suggestions: {} routes",
        assistant.suggestion_table().len()
    );
    println!("ok");
    Ok(())
}

/// Truncate a string to fit in a column.
fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
