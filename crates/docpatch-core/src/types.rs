use serde::Serialize;
use std::fmt;

/// One contiguous change pulled out of pasted diff text.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Hunk {
    pub context_before: Vec<String>,
    pub deletions: Vec<String>,
    pub additions: Vec<String>,
    pub context_after: Vec<String>,
}

impl Hunk {
    /// A hunk without deletions and additions carries no change and is never emitted.
    pub fn has_changes(&self) -> bool {
        !self.deletions.is_empty() || !self.additions.is_empty()
    }

    pub fn is_pure_insertion(&self) -> bool {
        self.deletions.is_empty() && !self.additions.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ProposalId(pub u64);

impl fmt::Display for ProposalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockKind {
    Paragraph,
    Code { lang: Option<String> },
    PendingDiff(ProposalId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub kind: BlockKind,
    pub text: String,
    /// A blank line separates this block from the previous one in the source text.
    pub blank_before: bool,
}

impl Block {
    pub fn paragraph(text: impl Into<String>) -> Self {
        Block {
            kind: BlockKind::Paragraph,
            text: text.into(),
            blank_before: false,
        }
    }

    pub fn code(text: impl Into<String>, lang: Option<String>) -> Self {
        Block {
            kind: BlockKind::Code { lang },
            text: text.into(),
            blank_before: false,
        }
    }

    pub fn marker(id: ProposalId) -> Self {
        Block {
            kind: BlockKind::PendingDiff(id),
            text: String::new(),
            blank_before: false,
        }
    }

    pub fn with_blank_before(mut self, blank_before: bool) -> Self {
        self.blank_before = blank_before;
        self
    }

    pub fn is_marker(&self) -> bool {
        matches!(self.kind, BlockKind::PendingDiff(_))
    }
}

/// Where and how a hunk lands on the current document.
///
/// Indices are positions in the block list (or line list on the text path)
/// at resolution time. `count` in `ExactBlockReplace` counts content blocks only,
/// so a pending marker sitting inside the run is stepped over, not removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Resolution {
    ExactBlockReplace { start: usize, count: usize },
    InlineReplace(usize),
    PureInsertAfter(usize),
    PureInsertBefore(usize),
    AppendAtEnd,
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resolution::ExactBlockReplace { start, count } => {
                write!(f, "replaced {} block(s) at {}", count, start)
            }
            Resolution::InlineReplace(i) => write!(f, "inline edit in block {}", i),
            Resolution::PureInsertAfter(i) => write!(f, "inserted after block {}", i),
            Resolution::PureInsertBefore(i) => write!(f, "inserted before block {}", i),
            Resolution::AppendAtEnd => write!(f, "appended at end"),
        }
    }
}
