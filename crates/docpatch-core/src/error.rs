use crate::types::ProposalId;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("no valid diff found")]
    NoValidDiff,

    #[error("no pending proposal {0}")]
    UnknownProposal(ProposalId),

    #[error("block index {index} is out of range for a document of {len} block(s)")]
    Mutation { index: usize, len: usize },
}

pub type Result<T> = std::result::Result<T, EngineError>;
