use crate::error::{EngineError, Result};
use crate::matcher::TextUnits;
use crate::types::{Block, BlockKind, ProposalId};

/// A single block-level mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockOp {
    Insert { index: usize, block: Block },
    Remove { index: usize },
    ReplaceText { index: usize, text: String },
}

/// The structural form of a document: an ordered list of blocks.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Document {
    blocks: Vec<Block>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_blocks(blocks: Vec<Block>) -> Self {
        Document { blocks }
    }

    /// One paragraph block per line, in order.
    pub fn from_lines<S: AsRef<str>>(lines: &[S]) -> Self {
        Document {
            blocks: lines.iter().map(|l| Block::paragraph(l.as_ref())).collect(),
        }
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Texts of the content blocks, pending markers left out.
    pub fn content_texts(&self) -> Vec<&str> {
        self.blocks
            .iter()
            .filter(|b| !b.is_marker())
            .map(|b| b.text.as_str())
            .collect()
    }

    pub fn marker_index(&self, id: ProposalId) -> Option<usize> {
        self.blocks
            .iter()
            .position(|b| b.kind == BlockKind::PendingDiff(id))
    }

    /// Applies `ops` in order as one batch.
    ///
    /// The batch runs against a copy of the block list and is committed only
    /// when every operation succeeds; on error the document is left untouched.
    pub fn apply_ops(&mut self, ops: &[BlockOp]) -> Result<()> {
        let mut blocks = self.blocks.clone();

        for op in ops {
            match op {
                BlockOp::Insert { index, block } => {
                    if *index > blocks.len() {
                        return Err(EngineError::Mutation {
                            index: *index,
                            len: blocks.len(),
                        });
                    }
                    blocks.insert(*index, block.clone());
                }
                BlockOp::Remove { index } => {
                    if *index >= blocks.len() {
                        return Err(EngineError::Mutation {
                            index: *index,
                            len: blocks.len(),
                        });
                    }
                    blocks.remove(*index);
                }
                BlockOp::ReplaceText { index, text } => {
                    let len = blocks.len();
                    let block = blocks
                        .get_mut(*index)
                        .ok_or(EngineError::Mutation { index: *index, len })?;
                    block.text = text.clone();
                }
            }
        }

        self.blocks = blocks;
        Ok(())
    }
}

impl TextUnits for Document {
    fn unit_count(&self) -> usize {
        self.blocks.len()
    }

    fn unit_text(&self, index: usize) -> Option<&str> {
        self.blocks
            .get(index)
            .filter(|b| !b.is_marker())
            .map(|b| b.text.as_str())
    }
}
