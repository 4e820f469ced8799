use crate::document::{BlockOp, Document};
use crate::error::{EngineError, Result};
use crate::matcher::resolve;
use crate::types::{Block, Hunk, Resolution};
use log::{debug, warn};

/// Turns a resolution into the block operations that realize `hunk`.
///
/// Operations are meant to be applied in order as one batch; removals come
/// in descending index order so earlier indices stay valid.
pub fn plan(document: &Document, hunk: &Hunk, resolution: Resolution) -> Result<Vec<BlockOp>> {
    let blocks = document.blocks();
    let mut ops = Vec::new();

    match resolution {
        Resolution::ExactBlockReplace { start, count } => {
            let targets = content_run(document, start, count)?;
            for &index in targets.iter().rev() {
                ops.push(BlockOp::Remove { index });
            }
            let first = blocks[start].blank_before;
            let rest = targets.get(1).map_or(first, |&i| blocks[i].blank_before);
            ops.extend(insertions(start, &hunk.additions, Spacing { first, rest }));
        }
        Resolution::InlineReplace(index) => {
            let block = blocks.get(index).ok_or(EngineError::Mutation {
                index,
                len: blocks.len(),
            })?;
            let needle = hunk.deletions.first().map(String::as_str).unwrap_or("");
            let replacement = hunk.additions.first().map(String::as_str).unwrap_or("");
            if hunk.additions.len() > 1 {
                warn!(
                    "Inline edit keeps only the first of {} added line(s)",
                    hunk.additions.len()
                );
            }
            ops.push(BlockOp::ReplaceText {
                index,
                text: block.text.replacen(needle, replacement, 1),
            });
        }
        Resolution::PureInsertAfter(index) => {
            check_index(document, index)?;
            let spacing = Spacing::like(&blocks[index]);
            ops.extend(insertions(index + 1, &hunk.additions, spacing));
        }
        Resolution::PureInsertBefore(index) => {
            check_index(document, index)?;
            let spacing = Spacing::like(&blocks[index]);
            ops.extend(insertions(index, &hunk.additions, spacing));
        }
        Resolution::AppendAtEnd => {
            let spacing = blocks
                .iter()
                .rev()
                .find(|b| !b.is_marker())
                .map(Spacing::like)
                .unwrap_or_default();
            ops.extend(insertions(blocks.len(), &hunk.additions, spacing));
        }
    }

    Ok(ops)
}

/// Applies `hunk` at `resolution`; the document is unchanged on error.
pub fn apply(document: &mut Document, hunk: &Hunk, resolution: Resolution) -> Result<()> {
    let ops = plan(document, hunk, resolution)?;
    debug!("Applying {} block op(s) for {:?}", ops.len(), resolution);
    document.apply_ops(&ops)
}

/// Resolves `hunk` against the current document and applies it.
pub fn resolve_and_apply(document: &mut Document, hunk: &Hunk) -> Result<Resolution> {
    let resolution = resolve(hunk, document);
    apply(document, hunk, resolution)?;
    Ok(resolution)
}

/// Blank line gaps given to inserted blocks: `first` for the first one,
/// `rest` for every following one.
#[derive(Debug, Clone, Copy, Default)]
struct Spacing {
    first: bool,
    rest: bool,
}

impl Spacing {
    fn like(block: &Block) -> Self {
        Spacing {
            first: block.blank_before,
            rest: block.blank_before,
        }
    }
}

fn insertions(
    at: usize,
    additions: &[String],
    spacing: Spacing,
) -> impl Iterator<Item = BlockOp> + '_ {
    additions
        .iter()
        .enumerate()
        .map(move |(offset, line)| BlockOp::Insert {
            index: at + offset,
            block: Block::paragraph(line.as_str()).with_blank_before(if offset == 0 {
                spacing.first
            } else {
                spacing.rest
            }),
        })
}

/// Indices of `count` content blocks starting at `start`, stepping over markers.
fn content_run(document: &Document, start: usize, count: usize) -> Result<Vec<usize>> {
    let blocks = document.blocks();
    let run: Vec<usize> = (start..blocks.len())
        .filter(|&i| !blocks[i].is_marker())
        .take(count)
        .collect();

    if run.len() != count || run.first() != Some(&start) {
        return Err(EngineError::Mutation {
            index: start + count,
            len: blocks.len(),
        });
    }
    Ok(run)
}

fn check_index(document: &Document, index: usize) -> Result<()> {
    if index < document.len() {
        Ok(())
    } else {
        Err(EngineError::Mutation {
            index,
            len: document.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ProposalId;

    fn lines(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_exact_replace_swaps_blocks() {
        let mut doc = Document::from_lines(&["A", "B", "C", "D"]);
        let hunk = Hunk {
            context_before: lines(&["A"]),
            deletions: lines(&["B", "C"]),
            additions: lines(&["B2"]),
            context_after: lines(&["D"]),
        };
        let resolution = resolve_and_apply(&mut doc, &hunk).unwrap();
        assert_eq!(resolution, Resolution::ExactBlockReplace { start: 1, count: 2 });
        assert_eq!(doc.content_texts(), vec!["A", "B2", "D"]);
    }

    #[test]
    fn test_exact_replace_keeps_interleaved_marker() {
        let mut doc = Document::from_blocks(vec![
            Block::paragraph("A"),
            Block::marker(ProposalId(3)),
            Block::paragraph("B"),
            Block::paragraph("C"),
        ]);
        let hunk = Hunk {
            deletions: lines(&["A", "B"]),
            additions: lines(&["X", "Y", "Z"]),
            ..Default::default()
        };
        resolve_and_apply(&mut doc, &hunk).unwrap();
        assert_eq!(doc.content_texts(), vec!["X", "Y", "Z", "C"]);
        assert_eq!(doc.marker_index(ProposalId(3)), Some(3));
    }

    #[test]
    fn test_replacement_keeps_spacing_of_replaced_blocks() {
        let mut doc = Document::from_markdown("intro\n\n- one\n- two\n\noutro\n");
        let hunk = Hunk {
            deletions: lines(&["one", "two"]),
            additions: lines(&["- uno", "- dos", "- tres"]),
            ..Default::default()
        };
        resolve_and_apply(&mut doc, &hunk).unwrap();
        assert_eq!(
            doc.to_markdown(),
            "intro\n\n- uno\n- dos\n- tres\n\noutro\n"
        );

        let append = Hunk {
            deletions: lines(&["missing"]),
            additions: lines(&["closing words"]),
            ..Default::default()
        };
        resolve_and_apply(&mut doc, &append).unwrap();
        assert!(doc.to_markdown().ends_with("outro\n\nclosing words\n"));
    }

    #[test]
    fn test_pure_deletion_removes_blocks() {
        let mut doc = Document::from_lines(&["keep", "drop me", "keep too"]);
        let hunk = Hunk {
            deletions: lines(&["drop me"]),
            ..Default::default()
        };
        resolve_and_apply(&mut doc, &hunk).unwrap();
        assert_eq!(doc.content_texts(), vec!["keep", "keep too"]);
    }

    #[test]
    fn test_inline_replace_edits_in_place() {
        let mut doc = Document::from_lines(&["This is a sentence with old word here."]);
        let hunk = Hunk {
            deletions: lines(&["old word"]),
            additions: lines(&["new phrase"]),
            ..Default::default()
        };
        let resolution = resolve_and_apply(&mut doc, &hunk).unwrap();
        assert_eq!(resolution, Resolution::InlineReplace(0));
        assert_eq!(
            doc.content_texts(),
            vec!["This is a sentence with new phrase here."]
        );
    }

    #[test]
    fn test_inline_replace_only_first_occurrence() {
        let mut doc = Document::from_lines(&["one cat, two cat"]);
        let hunk = Hunk {
            deletions: lines(&["cat"]),
            additions: lines(&["dog"]),
            ..Default::default()
        };
        resolve_and_apply(&mut doc, &hunk).unwrap();
        assert_eq!(doc.content_texts(), vec!["one dog, two cat"]);
    }

    #[test]
    fn test_inline_without_additions_removes_substring() {
        let mut doc = Document::from_lines(&["remove the very word"]);
        let hunk = Hunk {
            deletions: lines(&["very "]),
            ..Default::default()
        };
        resolve_and_apply(&mut doc, &hunk).unwrap();
        assert_eq!(doc.content_texts(), vec!["remove the word"]);
    }

    #[test]
    fn test_pure_insertions() {
        let mut doc = Document::from_lines(&["X", "Y"]);
        let after = Hunk {
            context_before: lines(&["X"]),
            additions: lines(&["Z1", "Z2"]),
            ..Default::default()
        };
        resolve_and_apply(&mut doc, &after).unwrap();
        assert_eq!(doc.content_texts(), vec!["X", "Z1", "Z2", "Y"]);

        let before = Hunk {
            additions: lines(&["W"]),
            context_after: lines(&["X"]),
            ..Default::default()
        };
        assert_eq!(
            resolve_and_apply(&mut doc, &before).unwrap(),
            Resolution::PureInsertBefore(0)
        );
        assert_eq!(doc.content_texts(), vec!["W", "X", "Z1", "Z2", "Y"]);
    }

    #[test]
    fn test_missing_deletion_falls_back_to_append() {
        let mut doc = Document::from_lines(&["A", "B"]);
        let hunk = Hunk {
            deletions: lines(&["not in document"]),
            additions: lines(&["appended"]),
            ..Default::default()
        };
        assert_eq!(
            resolve_and_apply(&mut doc, &hunk).unwrap(),
            Resolution::AppendAtEnd
        );
        assert_eq!(doc.content_texts(), vec!["A", "B", "appended"]);
    }

    #[test]
    fn test_stale_resolution_is_rejected_without_mutation() {
        let mut doc = Document::from_lines(&["A"]);
        let hunk = Hunk {
            deletions: lines(&["A", "B"]),
            additions: lines(&["C"]),
            ..Default::default()
        };
        let result = apply(
            &mut doc,
            &hunk,
            Resolution::ExactBlockReplace { start: 0, count: 2 },
        );
        assert!(matches!(result, Err(EngineError::Mutation { .. })));
        assert_eq!(doc.content_texts(), vec!["A"]);

        let result = apply(&mut doc, &hunk, Resolution::PureInsertAfter(4));
        assert_eq!(result, Err(EngineError::Mutation { index: 4, len: 1 }));
    }
}
