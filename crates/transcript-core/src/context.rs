//! Text context handed to an agent runtime alongside the current request.

use crate::content::{Role, TranscriptSnapshot};

/// Builds the prompt context for a new request from earlier turns.
///
/// Only text survives: media-only turns, error notes and empty turns are
/// skipped, since the runtime cannot see attachments through this channel.
pub fn conversation_context(history: &TranscriptSnapshot, current_request: &str) -> String {
    let mut lines = Vec::new();
    for turn in &history.turns {
        let text = turn.text();
        if text.trim().is_empty() {
            continue;
        }
        if lines.is_empty() {
            lines.push("Previous conversation:".to_string());
        }
        lines.push(format!("{}: {}", role_label(turn.role), text.trim()));
    }
    lines.push(format!("\nCurrent request: {}", current_request.trim()));
    lines.join("\n")
}

fn role_label(role: Role) -> &'static str {
    match role {
        Role::User => "User",
        Role::Assistant => "Assistant",
    }
}
