pub mod structural;
pub mod text;

pub use structural::{apply, plan, resolve_and_apply};
pub use text::{apply_all_to_text, apply_to_text, TextApplication, TextOutcome};
