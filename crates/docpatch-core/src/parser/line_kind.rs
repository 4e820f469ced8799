pub const UDIFF_OLD_FILE_PREFIX: &str = "--- ";
pub const UDIFF_NEW_FILE_PREFIX: &str = "+++ ";
pub const GIT_DIFF_PREFIX: &str = "diff --git ";
pub const HUNK_HEADER_PREFIX: &str = "@@";
pub const FENCE_PREFIX: &str = "```";

/// Classification of a single line of pasted diff text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind {
    Blank,
    Fence,
    HunkHeader,
    FileHeader,
    NoNewlineNote,
    Deletion(String),
    Addition(String),
    Context(String),
}

impl LineKind {
    /// Lines that only shape the parse and are never stored in a hunk.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            LineKind::Blank | LineKind::Fence | LineKind::FileHeader | LineKind::NoNewlineNote
        )
    }
}

pub fn classify(raw: &str) -> LineKind {
    let line = raw.trim_end_matches(|c| c == '\r' || c == '\n');
    let stripped = line.trim_start();

    if stripped.trim_end().is_empty() {
        return LineKind::Blank;
    }
    if stripped.starts_with(FENCE_PREFIX) {
        return LineKind::Fence;
    }
    if stripped.starts_with(HUNK_HEADER_PREFIX) {
        return LineKind::HunkHeader;
    }
    if line.starts_with(UDIFF_OLD_FILE_PREFIX)
        || line.starts_with(UDIFF_NEW_FILE_PREFIX)
        || line.starts_with(GIT_DIFF_PREFIX)
    {
        return LineKind::FileHeader;
    }
    if stripped.starts_with('\\') {
        return LineKind::NoNewlineNote;
    }

    let indent = &line[..line.len() - stripped.len()];

    if indent.is_empty() {
        if is_marker(stripped, '-') {
            return LineKind::Deletion(stripped[1..].to_string());
        }
        if is_marker(stripped, '+') {
            return LineKind::Addition(stripped[1..].to_string());
        }
        return LineKind::Context(line.to_string());
    }

    // An indented line is only diff-marked when the marker is followed by
    // something that cannot be a list bullet, so " - item" stays context while
    // "  -- item" removes the nested bullet "  - item".
    if stripped.starts_with("--") && is_marker(stripped, '-') {
        return LineKind::Deletion(format!("{}{}", indent, &stripped[1..]));
    }
    if stripped.starts_with("+-") {
        return LineKind::Addition(format!("{}{}", indent, &stripped[1..]));
    }
    if let Some(rest) = line.strip_prefix(" +") {
        if !rest.starts_with(' ') && !rest.starts_with("++") {
            return LineKind::Addition(rest.to_string());
        }
    }
    if let Some(rest) = line.strip_prefix(" -") {
        if !rest.starts_with(' ') && !rest.starts_with("--") {
            return LineKind::Deletion(rest.to_string());
        }
    }
    if let Some(rest) = line.strip_prefix(' ') {
        return LineKind::Context(rest.to_string());
    }

    LineKind::Context(line.to_string())
}

/// `marker` opens the line and is not part of a `---` / `+++` run.
fn is_marker(stripped: &str, marker: char) -> bool {
    let mut chars = stripped.chars();
    chars.next() == Some(marker) && !(chars.next() == Some(marker) && chars.next() == Some(marker))
}
