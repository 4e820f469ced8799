pub mod document;
pub mod error;
pub mod markdown;
pub mod matcher;
pub mod normalizer;
pub mod operations;
pub mod parser;
pub mod prompt;
pub mod proposals;
pub mod types;

pub use document::{BlockOp, Document};
pub use error::{EngineError, Result};
pub use markdown::split_sections;
pub use matcher::{resolve, TextUnits};
pub use normalizer::{equivalent, normalize};
pub use operations::{
    apply_all_to_text, apply_to_text, resolve_and_apply, TextApplication, TextOutcome,
};
pub use parser::parse;
pub use prompt::{fenced_prompt, unified_prompt};
pub use proposals::{Proposal, ProposalStore};
pub use types::{Block, BlockKind, Hunk, ProposalId, Resolution};
