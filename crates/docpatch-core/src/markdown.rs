use crate::document::Document;
use crate::types::{Block, BlockKind};
use once_cell::sync::Lazy;
use regex::Regex;

const CODE_FENCE: &str = "```";

static LIST_ITEM: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*(?:[-+*]|\d+\.)\s+").unwrap());
static HORIZONTAL_RULE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(?:-{3,}|\*{3,}|_{3,})\s*$").unwrap());
static QUOTE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^>").unwrap());

impl Document {
    /// Builds the block form of a markdown text.
    ///
    /// Fenced code becomes one code block holding the inner lines; every other
    /// non-blank line becomes one paragraph block. Blank lines only mark the
    /// gap before the next block.
    pub fn from_markdown(text: &str) -> Self {
        let mut blocks = Vec::new();
        let mut lines = text.lines();
        let mut blank_before = false;

        while let Some(line) = lines.next() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                blank_before = !blocks.is_empty();
                continue;
            }

            let block = if let Some(info) = trimmed.strip_prefix(CODE_FENCE) {
                let lang = Some(info.trim())
                    .filter(|l| !l.is_empty())
                    .map(str::to_string);
                let body: Vec<&str> = lines
                    .by_ref()
                    .take_while(|l| l.trim() != CODE_FENCE)
                    .collect();
                Block::code(body.join("\n"), lang)
            } else {
                Block::paragraph(line)
            };
            blocks.push(block.with_blank_before(blank_before));
            blank_before = false;
        }

        Document::from_blocks(blocks)
    }

    /// Serializes the content blocks back to markdown, keeping the blank line
    /// gaps recorded on each block. Pending markers are not part of the text.
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();

        for block in self.blocks() {
            let rendered = match &block.kind {
                BlockKind::Paragraph => block.text.clone(),
                BlockKind::Code { lang } => format!(
                    "{}{}\n{}\n{}",
                    CODE_FENCE,
                    lang.as_deref().unwrap_or(""),
                    block.text,
                    CODE_FENCE
                ),
                BlockKind::PendingDiff(_) => continue,
            };

            if !out.is_empty() {
                out.push_str(if block.blank_before { "\n\n" } else { "\n" });
            }
            out.push_str(&rendered);
        }

        if !out.is_empty() {
            out.push('\n');
        }
        out
    }
}

/// Splits markdown into logical sections: a fenced code block, a run of quote
/// lines or a run of list items is one section; a horizontal rule and every
/// other line stand alone. Blank lines are kept as empty sections.
pub fn split_sections(content: &str) -> Vec<String> {
    let lines: Vec<&str> = content.split('\n').map(|l| l.trim_end_matches('\r')).collect();
    let mut sections = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];

        if line.starts_with(CODE_FENCE) {
            let mut block = vec![line];
            i += 1;
            while i < lines.len() && !lines[i].starts_with(CODE_FENCE) {
                block.push(lines[i]);
                i += 1;
            }
            if i < lines.len() {
                block.push(lines[i]);
                i += 1;
            }
            sections.push(block.join("\n"));
            continue;
        }

        if QUOTE.is_match(line) || LIST_ITEM.is_match(line) {
            let pattern: &Regex = if QUOTE.is_match(line) { &QUOTE } else { &LIST_ITEM };
            let mut block = vec![line];
            i += 1;
            while i < lines.len() && pattern.is_match(lines[i]) {
                block.push(lines[i]);
                i += 1;
            }
            sections.push(block.join("\n"));
            continue;
        }

        if HORIZONTAL_RULE.is_match(line) {
            sections.push(line.to_string());
            i += 1;
            continue;
        }

        sections.push(line.to_string());
        i += 1;
    }

    sections
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_markdown_splits_paragraphs_and_code() {
        let doc = Document::from_markdown(
            "# Title\n\nFirst paragraph.\n\n```rust\nfn main() {}\nlet x = 1;\n```\n- item\n",
        );
        assert_eq!(
            doc.blocks(),
            &[
                Block::paragraph("# Title"),
                Block::paragraph("First paragraph.").with_blank_before(true),
                Block::code("fn main() {}\nlet x = 1;", Some("rust".into()))
                    .with_blank_before(true),
                Block::paragraph("- item"),
            ]
        );
    }

    #[test]
    fn test_unterminated_code_fence_takes_the_rest() {
        let doc = Document::from_markdown("intro\n```\ncode line");
        assert_eq!(
            doc.blocks(),
            &[Block::paragraph("intro"), Block::code("code line", None)]
        );
    }

    #[test]
    fn test_to_markdown_round_trips_blocks() {
        let text = "# Title\n\nBody line.\n\n```sh\nls -la\n```\n";
        let doc = Document::from_markdown(text);
        assert_eq!(doc.to_markdown(), text);
        assert_eq!(Document::from_markdown(&doc.to_markdown()), doc);
    }

    #[test]
    fn test_tight_lists_and_wrapped_paragraphs_round_trip() {
        let text = "# Title\n- one\n- two\n\nfirst half of a paragraph\nsecond half of it\n\n\n> quote\n";
        let doc = Document::from_markdown(text);
        assert_eq!(doc.len(), 6);
        assert!(!doc.blocks()[2].blank_before);
        assert!(doc.blocks()[3].blank_before);
        assert!(!doc.blocks()[4].blank_before);
        assert_eq!(
            doc.to_markdown(),
            "# Title\n- one\n- two\n\nfirst half of a paragraph\nsecond half of it\n\n> quote\n"
        );
    }

    #[test]
    fn test_leading_blank_lines_are_dropped() {
        let doc = Document::from_markdown("\n\nfirst\nsecond\n");
        assert!(!doc.blocks()[0].blank_before);
        assert_eq!(doc.to_markdown(), "first\nsecond\n");
    }

    #[test]
    fn test_to_markdown_skips_markers() {
        let doc = Document::from_blocks(vec![
            Block::paragraph("a"),
            Block::marker(crate::types::ProposalId(1)),
            Block::paragraph("b").with_blank_before(true),
            Block::paragraph("c"),
        ]);
        assert_eq!(doc.to_markdown(), "a\n\nb\nc\n");
        assert_eq!(Document::new().to_markdown(), "");
    }

    #[test]
    fn test_split_sections_groups_blocks() {
        let sample = "# Sample Article\n\nThis is a paragraph.\n\n- item 1\n- item 2\n\n> quote line 1\n> quote line 2\n\n---\n\n```\ncode block\n```\n";
        assert_eq!(
            split_sections(sample),
            vec![
                "# Sample Article",
                "",
                "This is a paragraph.",
                "",
                "- item 1\n- item 2",
                "",
                "> quote line 1\n> quote line 2",
                "",
                "---",
                "",
                "```\ncode block\n```",
                "",
            ]
        );
    }

    #[test]
    fn test_split_sections_nested_lists_and_code() {
        let sample = "- item 1\n  - subitem 1\n  - subitem 2\n\n```js\ncode1\n```\n\nSome text.\n";
        assert_eq!(
            split_sections(sample),
            vec![
                "- item 1\n  - subitem 1\n  - subitem 2",
                "",
                "```js\ncode1\n```",
                "",
                "Some text.",
                "",
            ]
        );
    }
}
