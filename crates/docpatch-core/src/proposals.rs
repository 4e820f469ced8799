use crate::document::{BlockOp, Document};
use crate::error::{EngineError, Result};
use crate::matcher::resolve;
use crate::operations::structural;
use crate::parser::parse;
use crate::types::{Block, Hunk, ProposalId, Resolution};
use log::{debug, info};

/// A parsed hunk waiting for an accept or reject decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Proposal {
    id: ProposalId,
    hunk: Hunk,
}

impl Proposal {
    pub fn id(&self) -> ProposalId {
        self.id
    }

    pub fn hunk(&self) -> &Hunk {
        &self.hunk
    }
}

/// Owns the document being edited together with its pending proposals.
///
/// Every proposal has exactly one pending-diff marker block in the document
/// while it is pending. Positions are never cached: a proposal is resolved
/// against the document as it is when the proposal is accepted.
#[derive(Debug, Clone, Default)]
pub struct ProposalStore {
    document: Document,
    proposals: Vec<Proposal>,
    next_id: u64,
}

impl ProposalStore {
    pub fn new(document: Document) -> Self {
        ProposalStore {
            document,
            proposals: Vec::new(),
            next_id: 1,
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn into_document(self) -> Document {
        self.document
    }

    /// Pending proposals in the order they were parsed.
    pub fn pending(&self) -> &[Proposal] {
        &self.proposals
    }

    pub fn get(&self, id: ProposalId) -> Option<&Proposal> {
        self.proposals.iter().find(|p| p.id == id)
    }

    /// Parses pasted text and turns every hunk into a pending proposal.
    pub fn propose(&mut self, raw: &str) -> Result<Vec<ProposalId>> {
        let hunks = parse(raw);
        if hunks.is_empty() {
            return Err(EngineError::NoValidDiff);
        }
        self.propose_hunks(hunks)
    }

    pub fn propose_hunks(&mut self, hunks: Vec<Hunk>) -> Result<Vec<ProposalId>> {
        let mut ids = Vec::with_capacity(hunks.len());

        for hunk in hunks.into_iter().filter(Hunk::has_changes) {
            let id = ProposalId(self.next_id.max(1));
            self.next_id = id.0 + 1;

            let position = marker_position(&self.document, resolve(&hunk, &self.document));
            self.document.apply_ops(&[BlockOp::Insert {
                index: position,
                block: Block::marker(id),
            }])?;
            debug!("Proposal {} placed at block {}", id, position);

            self.proposals.push(Proposal { id, hunk });
            ids.push(id);
        }

        Ok(ids)
    }

    /// Applies a proposal to the current document and drops its marker.
    ///
    /// Marker removal and content mutation run as one batch on a copy of the
    /// document; if any step fails nothing changes and the proposal stays pending.
    pub fn accept(&mut self, id: ProposalId) -> Result<Resolution> {
        let index = self.index_of(id)?;
        let mut working = self.document.clone();
        remove_marker(&mut working, id)?;

        let hunk = &self.proposals[index].hunk;
        let resolution = resolve(hunk, &working);
        structural::apply(&mut working, hunk, resolution)?;

        self.document = working;
        self.proposals.remove(index);
        info!("Accepted proposal {}: {}", id, resolution);
        Ok(resolution)
    }

    /// Discards a proposal. Only its marker leaves the document.
    pub fn reject(&mut self, id: ProposalId) -> Result<Hunk> {
        let index = self.index_of(id)?;
        remove_marker(&mut self.document, id)?;
        let proposal = self.proposals.remove(index);
        info!("Rejected proposal {}", id);
        Ok(proposal.hunk)
    }

    /// Applies edits made outside the diff flow; pending proposals stay pending.
    pub fn edit_document(&mut self, ops: &[BlockOp]) -> Result<()> {
        self.document.apply_ops(ops)
    }

    fn index_of(&self, id: ProposalId) -> Result<usize> {
        self.proposals
            .iter()
            .position(|p| p.id == id)
            .ok_or(EngineError::UnknownProposal(id))
    }
}

fn remove_marker(document: &mut Document, id: ProposalId) -> Result<()> {
    match document.marker_index(id) {
        Some(index) => document.apply_ops(&[BlockOp::Remove { index }]),
        None => Ok(()),
    }
}

/// Where a proposal's marker is shown: right after the blocks it touches.
fn marker_position(document: &Document, resolution: Resolution) -> usize {
    let blocks = document.blocks();
    let position = match resolution {
        Resolution::ExactBlockReplace { start, count } => (start..blocks.len())
            .filter(|&i| !blocks[i].is_marker())
            .take(count)
            .last()
            .map(|i| i + 1)
            .unwrap_or(blocks.len()),
        Resolution::InlineReplace(i) | Resolution::PureInsertAfter(i) => i + 1,
        Resolution::PureInsertBefore(i) => i,
        Resolution::AppendAtEnd => blocks.len(),
    };
    position.min(blocks.len())
}
