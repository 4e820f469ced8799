use crate::matcher::{find_anchor, find_exact_run, find_inline};
use crate::types::Hunk;
use log::{debug, warn};
use serde::Serialize;
use std::fmt;

/// What happened to a flat buffer when a hunk was applied to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TextOutcome {
    /// A run of lines starting at `line` was replaced.
    Replaced { line: usize, count: usize },
    /// Substring edit inside one line.
    Inline { line: usize },
    InsertedAfter { line: usize },
    Appended,
    /// Nothing matched; the buffer is unchanged.
    Unresolved,
}

impl TextOutcome {
    pub fn is_applied(&self) -> bool {
        !matches!(self, TextOutcome::Unresolved)
    }
}

impl fmt::Display for TextOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextOutcome::Replaced { line, count } => {
                write!(f, "replaced {} line(s) at line {}", count, line + 1)
            }
            TextOutcome::Inline { line } => write!(f, "inline edit on line {}", line + 1),
            TextOutcome::InsertedAfter { line } => write!(f, "inserted after line {}", line + 1),
            TextOutcome::Appended => write!(f, "appended at end"),
            TextOutcome::Unresolved => write!(f, "could not locate hunk"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextApplication {
    pub content: String,
    pub outcome: TextOutcome,
}

/// Applies one hunk to a newline-delimited buffer.
///
/// Unlike the structural path, a hunk whose deletions cannot be found leaves
/// the buffer unchanged and reports `TextOutcome::Unresolved`. Pure insertions
/// without a usable anchor are still appended. A buffer using `\r\n` keeps it
/// on every line, spliced ones included.
pub fn apply_to_text(content: &str, hunk: &Hunk) -> TextApplication {
    let ending = line_ending(content);
    let crlf = ending == CRLF;
    let mut lines: Vec<String> = content
        .split('\n')
        .map(|l| match l.strip_suffix('\r') {
            Some(stripped) if crlf => stripped.to_string(),
            _ => l.to_string(),
        })
        .collect();

    let outcome = if hunk.is_pure_insertion() {
        insert(content, &mut lines, hunk)
    } else if !hunk.deletions.is_empty() {
        replace(&mut lines, hunk)
    } else {
        TextOutcome::Unresolved
    };

    match outcome {
        TextOutcome::Unresolved => {
            warn!(
                "Could not apply hunk to text: first deletion {:?}",
                hunk.deletions.first()
            );
            TextApplication {
                content: content.to_string(),
                outcome,
            }
        }
        TextOutcome::Appended => {
            let additions = hunk.additions.join(ending);
            let content = if content.is_empty() {
                additions
            } else {
                format!("{}{}{}", content, ending, additions)
            };
            TextApplication { content, outcome }
        }
        _ => {
            debug!("Applied hunk to text: {}", outcome);
            TextApplication {
                content: lines.join(ending),
                outcome,
            }
        }
    }
}

const CRLF: &str = "\r\n";

fn line_ending(content: &str) -> &'static str {
    if content.contains(CRLF) {
        CRLF
    } else {
        "\n"
    }
}

/// Applies hunks in order, each against the result of the previous one.
pub fn apply_all_to_text(content: &str, hunks: &[Hunk]) -> (String, Vec<TextOutcome>) {
    let mut current = content.to_string();
    let mut outcomes = Vec::with_capacity(hunks.len());

    for hunk in hunks {
        let applied = apply_to_text(&current, hunk);
        current = applied.content;
        outcomes.push(applied.outcome);
    }

    (current, outcomes)
}

fn insert(content: &str, lines: &mut Vec<String>, hunk: &Hunk) -> TextOutcome {
    if let Some(last) = hunk.context_before.last() {
        if let Some(index) = find_anchor(lines.as_slice(), last) {
            lines.splice(index + 1..index + 1, hunk.additions.iter().cloned());
            return TextOutcome::InsertedAfter { line: index };
        }
    }
    debug!(
        "No anchor for insertion into {} byte buffer; appending",
        content.len()
    );
    TextOutcome::Appended
}

fn replace(lines: &mut Vec<String>, hunk: &Hunk) -> TextOutcome {
    if hunk.deletions.len() == 1 && hunk.additions.len() == 1 {
        let needle = &hunk.deletions[0];
        if let Some(index) = find_inline(lines.as_slice(), needle) {
            lines[index] = lines[index].replacen(needle.as_str(), &hunk.additions[0], 1);
            return TextOutcome::Inline { line: index };
        }
    }

    match find_exact_run(lines.as_slice(), &hunk.deletions) {
        Some(indices) => {
            let start = indices[0];
            let count = indices.len();
            lines.splice(start..start + count, hunk.additions.iter().cloned());
            TextOutcome::Replaced { line: start, count }
        }
        None => TextOutcome::Unresolved,
    }
}
