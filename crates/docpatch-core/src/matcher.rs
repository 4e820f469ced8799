use crate::normalizer::normalize;
use crate::types::{Hunk, Resolution};
use log::{debug, warn};

/// An ordered sequence of addressable text units: blocks of a document or
/// lines of a flat buffer.
pub trait TextUnits {
    fn unit_count(&self) -> usize;

    /// `None` marks a unit that never takes part in matching, such as a
    /// pending-diff marker.
    fn unit_text(&self, index: usize) -> Option<&str>;
}

impl<S: AsRef<str>> TextUnits for [S] {
    fn unit_count(&self) -> usize {
        self.len()
    }

    fn unit_text(&self, index: usize) -> Option<&str> {
        self.get(index).map(|s| s.as_ref())
    }
}

/// Normalized forms of every matchable unit, computed once per resolution.
struct NormalizedView<'a> {
    raw: Vec<Option<&'a str>>,
    normalized: Vec<Option<String>>,
}

impl<'a> NormalizedView<'a> {
    fn new<U: TextUnits + ?Sized>(units: &'a U) -> Self {
        let raw: Vec<Option<&str>> = (0..units.unit_count())
            .map(|i| units.unit_text(i))
            .collect();
        let normalized = raw.iter().map(|t| t.map(normalize)).collect();
        NormalizedView { raw, normalized }
    }

    fn matches(&self, index: usize, target: &str) -> bool {
        self.normalized[index].as_deref() == Some(target)
    }
}

/// Finds the first run of units that normalize-match `lines` in order.
///
/// Returns the matched unit indices; non-matchable units inside the run are
/// stepped over, so the indices are contiguous unless a marker interleaves.
pub fn find_exact_run<U: TextUnits + ?Sized>(units: &U, lines: &[String]) -> Option<Vec<usize>> {
    let view = NormalizedView::new(units);
    exact_run(&view, lines)
}

/// Finds the first unit that contains `needle` verbatim without being that
/// whole line, i.e. an edit inside a sentence.
pub fn find_inline<U: TextUnits + ?Sized>(units: &U, needle: &str) -> Option<usize> {
    let view = NormalizedView::new(units);
    inline(&view, needle)
}

/// Finds the first unit equivalent to `line` after normalization.
pub fn find_anchor<U: TextUnits + ?Sized>(units: &U, line: &str) -> Option<usize> {
    let view = NormalizedView::new(units);
    anchor(&view, line)
}

fn exact_run(view: &NormalizedView<'_>, lines: &[String]) -> Option<Vec<usize>> {
    let targets: Vec<String> = lines.iter().map(|l| normalize(l)).collect();
    let first = targets.first()?;
    let len = view.normalized.len();

    for start in 0..len {
        if !view.matches(start, first) {
            continue;
        }

        let mut indices = vec![start];
        let mut cursor = start + 1;
        for target in &targets[1..] {
            while cursor < len && view.normalized[cursor].is_none() {
                cursor += 1;
            }
            if cursor < len && view.matches(cursor, target) {
                indices.push(cursor);
                cursor += 1;
            } else {
                break;
            }
        }

        if indices.len() == targets.len() {
            return Some(indices);
        }
    }

    None
}

fn inline(view: &NormalizedView<'_>, needle: &str) -> Option<usize> {
    let needle_trimmed = needle.trim();
    if needle_trimmed.is_empty() {
        return None;
    }

    view.raw.iter().position(|unit| {
        unit.map(|text| text.contains(needle) && text.trim() != needle_trimmed)
            .unwrap_or(false)
    })
}

fn anchor(view: &NormalizedView<'_>, line: &str) -> Option<usize> {
    let target = normalize(line);
    if target.is_empty() {
        return None;
    }
    (0..view.normalized.len()).find(|&i| view.matches(i, &target))
}

/// Decides where `hunk` applies on `units`. First match wins, in this order:
///
/// 1. an exact normalized run of all deletions,
/// 2. the first deletion as a strict substring of a unit,
/// 3. pure insertion after the last `context_before` line,
/// 4. pure insertion before the first `context_after` line,
/// 5. append at the end.
pub fn resolve<U: TextUnits + ?Sized>(hunk: &Hunk, units: &U) -> Resolution {
    let view = NormalizedView::new(units);

    if let Some(first_deletion) = hunk.deletions.first() {
        if let Some(indices) = exact_run(&view, &hunk.deletions) {
            let resolution = Resolution::ExactBlockReplace {
                start: indices[0],
                count: indices.len(),
            };
            debug!("Resolved hunk to {:?}", resolution);
            return resolution;
        }

        if let Some(index) = inline(&view, first_deletion) {
            debug!("Resolved hunk to inline edit of unit {}", index);
            return Resolution::InlineReplace(index);
        }
    } else if let Some(last) = hunk.context_before.last() {
        if let Some(index) = anchor(&view, last) {
            debug!("Resolved insertion after unit {}", index);
            return Resolution::PureInsertAfter(index);
        }
    } else if let Some(first) = hunk.context_after.first() {
        if hunk.has_changes() {
            if let Some(index) = anchor(&view, first) {
                debug!("Resolved insertion before unit {}", index);
                return Resolution::PureInsertBefore(index);
            }
        }
    }

    warn!(
        "Could not locate hunk ({} deletion(s), {} addition(s)); falling back to append",
        hunk.deletions.len(),
        hunk.additions.len()
    );
    Resolution::AppendAtEnd
}
