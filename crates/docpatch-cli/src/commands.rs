use crate::config::{ReviewAction, ReviewPolicy};
use anyhow::{bail, Context, Result};
use docpatch_core::{
    apply_all_to_text, parse, Document, EngineError, Hunk, Proposal, ProposalId, ProposalStore,
    Resolution, TextOutcome,
};
use log::info;
use std::ffi::OsString;
use std::fs;
use std::io::{self, BufRead, Read, Write};
use std::path::{Path, PathBuf};

const NO_DIFF_MESSAGE: &str = "No valid diff found in the input.";

/// Reads patch text from `path`, or from stdin when no path is given.
pub fn read_patch(path: Option<&Path>) -> Result<String> {
    let content = if let Some(path) = path {
        fs::read_to_string(path)
            .with_context(|| format!("Patch file not found at '{}'", path.display()))?
    } else {
        if atty::is(atty::Stream::Stdin) {
            bail!("No patch file specified and no data piped from stdin.");
        }
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        buffer
    };

    if content.trim().is_empty() {
        bail!("Empty patch content.");
    }
    Ok(content)
}

/// Diff-style rendering of a hunk for terminal output.
pub fn render_hunk(hunk: &Hunk) -> String {
    let prefixed = |prefix: char, lines: &[String]| {
        lines
            .iter()
            .map(|l| format!("{}{}", prefix, l))
            .collect::<Vec<_>>()
    };

    let mut out = prefixed(' ', &hunk.context_before);
    out.extend(prefixed('-', &hunk.deletions));
    out.extend(prefixed('+', &hunk.additions));
    out.extend(prefixed(' ', &hunk.context_after));
    out.join("\n")
}

pub fn run_parse(patch: &str, json: bool) -> Result<()> {
    let hunks = parse(patch);
    if hunks.is_empty() {
        bail!(NO_DIFF_MESSAGE);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&hunks)?);
        return Ok(());
    }

    for (i, hunk) in hunks.iter().enumerate() {
        println!("--- Hunk {} ---", i + 1);
        println!("{}", render_hunk(hunk));
    }
    println!("\nTotal hunks: {}", hunks.len());
    Ok(())
}

#[derive(Debug)]
pub struct ApplyReport {
    pub outcomes: Vec<TextOutcome>,
    pub written: bool,
    pub backup: Option<PathBuf>,
}

impl ApplyReport {
    pub fn applied(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_applied()).count()
    }

    pub fn unresolved(&self) -> usize {
        self.outcomes.len() - self.applied()
    }
}

/// Applies every hunk of `patch` to the file at `document` as plain text.
///
/// The file is only rewritten when its content changed and `dry_run` is off.
pub fn apply_to_file(
    document: &Path,
    patch: &str,
    dry_run: bool,
    backup: bool,
) -> Result<ApplyReport> {
    let hunks = parse(patch);
    if hunks.is_empty() {
        bail!(NO_DIFF_MESSAGE);
    }

    let content = fs::read_to_string(document)
        .with_context(|| format!("Failed to read document at '{}'", document.display()))?;
    let (updated, outcomes) = apply_all_to_text(&content, &hunks);

    let mut report = ApplyReport {
        outcomes,
        written: false,
        backup: None,
    };
    if dry_run || updated == content {
        return Ok(report);
    }

    if backup {
        let backup_path = backup_path_for(document);
        fs::write(&backup_path, &content)
            .with_context(|| format!("Failed to write backup to '{}'", backup_path.display()))?;
        report.backup = Some(backup_path);
    }
    fs::write(document, &updated)
        .with_context(|| format!("Failed to write document at '{}'", document.display()))?;
    report.written = true;
    info!("Wrote {} bytes to {}", updated.len(), document.display());

    Ok(report)
}

/// Prints the per-hunk outcome and summary. Returns false when a hunk was left unresolved.
pub fn run_apply(document: &Path, patch: &str, dry_run: bool, backup: bool) -> Result<bool> {
    let report = apply_to_file(document, patch, dry_run, backup)?;

    for (i, outcome) in report.outcomes.iter().enumerate() {
        println!("Hunk {}: {}", i + 1, outcome);
    }

    println!("\n--- Summary ---");
    println!("Total hunks:          {}", report.outcomes.len());
    println!("Successfully applied: {}", report.applied());
    println!("Unresolved:           {}", report.unresolved());

    if dry_run {
        println!("\nDry run: '{}' was not modified.", document.display());
    } else if report.written {
        println!("\nUpdated '{}'.", document.display());
        if let Some(ref backup) = report.backup {
            println!("Backup written to '{}'.", backup.display());
        }
    }

    Ok(report.unresolved() == 0)
}

fn backup_path_for(document: &Path) -> PathBuf {
    let mut name = OsString::from(document.as_os_str());
    name.push(".orig");
    PathBuf::from(name)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Accept,
    Reject,
}

#[derive(Debug, Default)]
pub struct ReviewReport {
    pub accepted: Vec<(ProposalId, Resolution)>,
    pub rejected: Vec<ProposalId>,
}

/// Proposes every hunk of `patch` against the markdown blocks of `markdown`,
/// then settles each proposal in parse order with `decide`.
pub fn review_markdown<F>(
    markdown: &str,
    patch: &str,
    mut decide: F,
) -> Result<(String, ReviewReport)>
where
    F: FnMut(&Proposal) -> Result<Decision>,
{
    let mut store = ProposalStore::new(Document::from_markdown(markdown));
    let ids = match store.propose(patch) {
        Err(EngineError::NoValidDiff) => bail!(NO_DIFF_MESSAGE),
        other => other?,
    };

    let mut report = ReviewReport::default();
    for id in ids {
        let proposal = store
            .get(id)
            .cloned()
            .ok_or(EngineError::UnknownProposal(id))?;

        match decide(&proposal)? {
            Decision::Accept => {
                let resolution = store.accept(id)?;
                report.accepted.push((id, resolution));
            }
            Decision::Reject => {
                store.reject(id)?;
                report.rejected.push(id);
            }
        }
    }

    Ok((store.into_document().to_markdown(), report))
}

/// The decision an empty answer stands for, if the configured action names one.
fn default_decision(action: ReviewAction) -> Option<Decision> {
    match action {
        ReviewAction::Accept => Some(Decision::Accept),
        ReviewAction::Reject => Some(Decision::Reject),
        ReviewAction::Ask => None,
    }
}

/// Asks on `input` until the answer is yes or no. An empty answer or end of
/// input takes `default` when it is `accept` or `reject`.
pub fn ask_decision<R: BufRead, W: Write>(
    proposal: &Proposal,
    default: ReviewAction,
    input: &mut R,
    output: &mut W,
) -> Result<Decision> {
    writeln!(output, "\n--- Proposal {} ---", proposal.id())?;
    writeln!(output, "{}", render_hunk(proposal.hunk()))?;

    let fallback = default_decision(default);
    let choices = match fallback {
        Some(Decision::Accept) => "[Y/n]",
        Some(Decision::Reject) => "[y/N]",
        None => "[y/n]",
    };

    loop {
        write!(output, "Accept proposal {}? {} ", proposal.id(), choices)?;
        output.flush()?;

        let mut answer = String::new();
        if input.read_line(&mut answer)? == 0 {
            return fallback
                .with_context(|| format!("No answer given for proposal {}.", proposal.id()));
        }
        match (answer.trim().to_ascii_lowercase().as_str(), fallback) {
            ("y" | "yes", _) => return Ok(Decision::Accept),
            ("n" | "no", _) => return Ok(Decision::Reject),
            ("", Some(decision)) => return Ok(decision),
            _ => writeln!(output, "Please answer y or n.")?,
        }
    }
}

pub fn run_review(
    document: &Path,
    patch: &str,
    policy: ReviewPolicy,
    patch_from_stdin: bool,
) -> Result<()> {
    let markdown = fs::read_to_string(document)
        .with_context(|| format!("Failed to read document at '{}'", document.display()))?;

    let (updated, report) = match policy {
        ReviewPolicy::AcceptAll => review_markdown(&markdown, patch, |_| Ok(Decision::Accept))?,
        ReviewPolicy::RejectAll => review_markdown(&markdown, patch, |_| Ok(Decision::Reject))?,
        ReviewPolicy::Prompt { default } if patch_from_stdin => {
            let Some(decision) = default_decision(default) else {
                bail!("Interactive review reads answers from stdin; pass the patch as a file or use --accept-all / --reject-all.");
            };
            info!("Patch read from stdin; settling every proposal with {:?}", default);
            review_markdown(&markdown, patch, |_| Ok(decision))?
        }
        ReviewPolicy::Prompt { default } => {
            let stdin = io::stdin();
            let mut input = stdin.lock();
            let mut output = io::stdout();
            review_markdown(&markdown, patch, |p| {
                ask_decision(p, default, &mut input, &mut output)
            })?
        }
    };

    for (id, resolution) in &report.accepted {
        println!("Accepted {}: {}", id, resolution);
    }
    for id in &report.rejected {
        println!("Rejected {}", id);
    }

    if !report.accepted.is_empty() {
        fs::write(document, updated)
            .with_context(|| format!("Failed to write document at '{}'", document.display()))?;
    }

    println!("\n--- Summary ---");
    println!("Accepted: {}", report.accepted.len());
    println!("Rejected: {}", report.rejected.len());
    Ok(())
}

pub fn run_prompt(
    document: &Path,
    selection: Option<&str>,
    instruction: &str,
    fenced: bool,
) -> Result<()> {
    let content = fs::read_to_string(document)
        .with_context(|| format!("Failed to read document at '{}'", document.display()))?;

    let prompt = if fenced {
        docpatch_core::fenced_prompt(&content, selection.unwrap_or(""), instruction)
    } else {
        docpatch_core::unified_prompt(&content, instruction)
    };
    println!("{}", prompt);
    Ok(())
}
