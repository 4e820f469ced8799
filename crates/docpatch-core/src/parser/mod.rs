pub mod fence;
pub mod line_kind;

use crate::types::Hunk;
use line_kind::{classify, LineKind};
use log::{debug, trace};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParserState {
    Idle,
    InContext,
    InChange,
}

/// Parses loosely formatted diff text into hunks, in the order they appear.
///
/// Never fails: text without any recognizable change yields an empty list,
/// which callers report as "no valid diff found".
pub fn parse(content: &str) -> Vec<Hunk> {
    let mut hunks = Vec::new();

    for region in fence::diff_regions(content) {
        parse_region(&region, &mut hunks);
    }

    debug!("Parsed {} hunk(s) from {} bytes", hunks.len(), content.len());
    hunks
}

fn parse_region(lines: &[&str], hunks: &mut Vec<Hunk>) {
    let mut state = ParserState::Idle;
    let mut current = Hunk::default();

    for (i, line) in lines.iter().enumerate() {
        let kind = classify(line);
        trace!("Line {}: {:?}", i, kind);

        if kind.is_structural() {
            continue;
        }

        match kind {
            LineKind::HunkHeader => {
                flush(&mut current, hunks);
                state = ParserState::InContext;
            }
            LineKind::Deletion(text) => {
                current.deletions.push(text);
                state = ParserState::InChange;
            }
            LineKind::Addition(text) => {
                current.additions.push(text);
                state = ParserState::InChange;
            }
            LineKind::Context(text) => match state {
                ParserState::Idle => {
                    current.context_before.push(text);
                    state = ParserState::InContext;
                }
                ParserState::InContext => current.context_before.push(text),
                ParserState::InChange => {
                    current.context_after.push(text);
                    flush(&mut current, hunks);
                    state = ParserState::Idle;
                }
            },
            _ => {}
        }
    }

    flush(&mut current, hunks);
}

/// Pushes the hunk under construction if it carries a change and starts a fresh one.
fn flush(current: &mut Hunk, hunks: &mut Vec<Hunk>) {
    let hunk = std::mem::take(current);
    if hunk.has_changes() {
        hunks.push(hunk);
    } else if !hunk.context_before.is_empty() {
        trace!(
            "Dropping {} context line(s) without a change",
            hunk.context_before.len()
        );
    }
}
