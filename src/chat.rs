//! `coachdesk chat`: interactive assistant session over stdin/stdout.
//!
//! Lines are submitted as queries. A few slash commands drive the widget:
//!
//! | Input | Effect |
//! |-------|--------|
//! | `#N` | Ask follow-up N of the last reply (or suggestion N before any reply) |
//! | `/role <role>` | Switch viewer role for later queries |
//! | `/suggest` | Show the route's starter suggestions again |
//! | `/close`, `/open` | Hide or show the assistant; the log is kept |
//! | `/quit` | Leave |

use std::io::{BufRead, Write};

use anyhow::Result;

use coachdesk_core::assistant::Assistant;
use coachdesk_core::role::{Viewer, ViewerRole};
use coachdesk_core::session::{ConversationSession, Message, Sender};

/// Run a chat loop until `/quit` or end of input.
pub fn run_chat<R: BufRead, W: Write>(
    assistant: &Assistant,
    mut viewer: Viewer,
    path: &str,
    input: R,
    out: &mut W,
    interactive: bool,
) -> Result<()> {
    let mut session = assistant.session();

    for m in session.open(&viewer) {
        render(out, m)?;
    }
    print_suggestions(assistant, path, out)?;

    let mut lines = input.lines();
    loop {
        if interactive {
            write!(out, "{}> ", viewer.role)?;
            out.flush()?;
        }
        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;
        let line = line.trim();

        match parse_command(line) {
            Command::Quit => break,
            Command::Close => {
                session.close(&viewer);
                writeln!(out, "(assistant hidden, /open to bring it back)")?;
            }
            Command::Open => {
                let appended = session.open(&viewer).to_vec();
                if appended.is_empty() {
                    let count = session.messages().len();
                    writeln!(out, "(assistant shown, {} messages)", count)?;
                }
                for m in &appended {
                    render(out, m)?;
                }
            }
            Command::Role(r) => match r.parse::<ViewerRole>() {
                Ok(role) => {
                    viewer.role = role;
                    tracing::info!(role = %role, "viewer role changed");
                    writeln!(out, "(now asking as {})", role)?;
                }
                Err(e) => writeln!(out, "{}", e)?,
            },
            Command::Suggest => print_suggestions(assistant, path, out)?,
            Command::Pick(n) => {
                let Some(query) = pick(&session, assistant, path, n) else {
                    writeln!(out, "(no suggestion #{})", n)?;
                    continue;
                };
                if !session.is_open() {
                    writeln!(out, "(assistant is hidden, /open first)")?;
                    continue;
                }
                writeln!(out, "you: {}", query)?;
                let appended = session.select_suggestion(&query, &viewer).to_vec();
                render_replies(out, &appended)?;
            }
            Command::Ask(query) => {
                if !session.is_open() {
                    writeln!(out, "(assistant is hidden, /open first)")?;
                    continue;
                }
                let appended = session.submit(query, &viewer).to_vec();
                render_replies(out, &appended)?;
            }
        }
    }

    tracing::debug!(messages = session.messages().len(), "chat ended");
    Ok(())
}

#[derive(Debug, PartialEq, Eq)]
enum Command<'a> {
    Quit,
    Close,
    Open,
    Suggest,
    Role(&'a str),
    Pick(usize),
    Ask(&'a str),
}

fn parse_command(line: &str) -> Command<'_> {
    match line {
        "/quit" | "/exit" => return Command::Quit,
        "/close" => return Command::Close,
        "/open" => return Command::Open,
        "/suggest" => return Command::Suggest,
        _ => {}
    }
    if let Some(r) = line.strip_prefix("/role") {
        return Command::Role(r.trim());
    }
    if let Some(rest) = line.strip_prefix('#') {
        if let Ok(n) = rest.trim().parse::<usize>() {
            return Command::Pick(n);
        }
    }
    Command::Ask(line)
}

/// Follow-up `n` (1-based) of the latest reply, or route suggestion `n`
/// while nothing has been asked yet.
fn pick(
    session: &ConversationSession,
    assistant: &Assistant,
    path: &str,
    n: usize,
) -> Option<String> {
    let idx = n.checked_sub(1)?;
    let follow_ups = session.latest_follow_ups();
    if !follow_ups.is_empty() {
        return follow_ups.get(idx).cloned();
    }
    assistant
        .suggestions_for(path)
        .get(idx)
        .map(|s| s.query.clone())
}

fn print_suggestions<W: Write>(assistant: &Assistant, path: &str, out: &mut W) -> Result<()> {
    let suggestions = assistant.suggestions_for(path);
    if suggestions.is_empty() {
        return Ok(());
    }
    writeln!(out, "Try asking:")?;
    for (i, s) in suggestions.iter().enumerate() {
        writeln!(out, "  #{} {}", i + 1, s.query)?;
    }
    Ok(())
}

fn render_replies<W: Write>(out: &mut W, appended: &[Message]) -> Result<()> {
    for m in appended.iter().filter(|m| m.sender == Sender::Assistant) {
        render(out, m)?;
    }
    Ok(())
}

fn render<W: Write>(out: &mut W, m: &Message) -> Result<()> {
    match &m.attached {
        None => writeln!(out, "assistant: {}", m.text)?,
        Some(a) => {
            writeln!(out, "assistant: {}", a.title)?;
            writeln!(out, "  {}", m.text)?;
            for action in &a.actions {
                writeln!(out, "  → {} ({})", action.label, action.path)?;
            }
            for (i, f) in a.follow_ups.iter().enumerate() {
                writeln!(out, "  #{} {}", i + 1, f)?;
            }
        }
    }
    Ok(())
}
