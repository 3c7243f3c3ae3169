//! `coachdesk ask`: one-shot query against the knowledge base.

use anyhow::Result;
use serde::Serialize;

use coachdesk_core::assistant::Assistant;
use coachdesk_core::role::ViewerRole;
use coachdesk_core::score::{explain, NormalizedQuery, ScoreExplanation};
use coachdesk_core::select::{Answer, MATCH_THRESHOLD};

/// One eligible entry with its score breakdown.
#[derive(Debug, Clone, Serialize)]
pub struct RankedEntry {
    pub index: usize,
    pub title: String,
    pub explain: ScoreExplanation,
}

/// Score every entry eligible for `role` and return the best `limit`,
/// highest score first, ties in authored order. Zero scores are omitted.
pub fn rank(
    assistant: &Assistant,
    query: &str,
    role: ViewerRole,
    limit: usize,
) -> Vec<RankedEntry> {
    let Some(nq) = NormalizedQuery::new(query) else {
        return Vec::new();
    };

    let mut ranked: Vec<RankedEntry> = assistant
        .knowledge_base()
        .eligible(role)
        .map(|e| RankedEntry {
            index: e.index,
            title: e.title.clone(),
            explain: explain(&nq, e, role),
        })
        .filter(|r| r.explain.total > 0)
        .collect();

    ranked.sort_by(|a, b| {
        b.explain
            .total
            .cmp(&a.explain.total)
            .then(a.index.cmp(&b.index))
    });
    ranked.truncate(limit);
    ranked
}

#[derive(Serialize)]
struct AskOutput<'a> {
    query: &'a str,
    role: ViewerRole,
    #[serde(rename = "match")]
    answer: Answer,
    #[serde(skip_serializing_if = "Option::is_none")]
    candidates: Option<Vec<RankedEntry>>,
}

/// CLI entry point: prints the selected answer to stdout.
pub fn run_ask(
    assistant: &Assistant,
    query: &str,
    role: ViewerRole,
    show_explain: bool,
    json: bool,
) -> Result<()> {
    let Some(m) = assistant.answer(query, &role) else {
        println!("No query.");
        return Ok(());
    };
    let answer = m.to_answer();
    let candidates = show_explain.then(|| rank(assistant, query, role, 5));

    if json {
        let out = AskOutput {
            query: query.trim(),
            role,
            answer,
            candidates,
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    if answer.fallback {
        println!("{}  (fallback)", answer.title);
    } else {
        println!("{}  [score {}]", answer.title, answer.score);
    }
    println!();
    println!("{}", answer.response);

    if !answer.actions.is_empty() {
        println!();
        println!("Actions:");
        for a in &answer.actions {
            println!("  {:<20} {}", a.label, a.path);
        }
    }

    if !answer.follow_ups.is_empty() {
        println!();
        println!("Try next:");
        for (i, f) in answer.follow_ups.iter().enumerate() {
            println!("  {}. {}", i + 1, f);
        }
    }

    if let Some(candidates) = candidates {
        println!();
        println!("Scoring: role={}, threshold={}", role, MATCH_THRESHOLD);
        if candidates.is_empty() {
            println!("    no entry scored above 0");
        }
        for c in &candidates {
            let ex = &c.explain;
            println!(
                "  #{:<3} {:<32} phrase={} token={} title={} role={} → {}",
                c.index, c.title, ex.phrase, ex.token, ex.title_bonus, ex.role_bonus, ex.total
            );
        }
    }

    Ok(())
}
