use super::line_kind::FENCE_PREFIX;

const DIFF_FENCE_TAGS: [&str; 2] = ["diff", "patch"];

/// Splits pasted text into the regions that carry diff content.
///
/// When at least one fence tagged `diff` is present, only the lines inside such
/// fences are returned, one region per fence, and everything around them is
/// dropped. Otherwise the whole input is a single bare region. An unterminated
/// diff fence runs to the end of the input.
pub fn diff_regions(text: &str) -> Vec<Vec<&str>> {
    let lines: Vec<&str> = text.lines().collect();

    if !lines.iter().any(|l| is_diff_fence_open(l)) {
        return vec![lines];
    }

    let mut regions = Vec::new();
    let mut current: Option<Vec<&str>> = None;

    for line in lines {
        if current.is_none() {
            if is_diff_fence_open(line) {
                current = Some(Vec::new());
            }
        } else if is_fence_close(line) {
            regions.extend(current.take());
        } else if let Some(region) = current.as_mut() {
            region.push(line);
        }
    }

    regions.extend(current);
    regions
}

fn is_diff_fence_open(line: &str) -> bool {
    line.trim()
        .strip_prefix(FENCE_PREFIX)
        .map(|tag| {
            let tag = tag.trim().to_ascii_lowercase();
            DIFF_FENCE_TAGS.contains(&tag.as_str())
        })
        .unwrap_or(false)
}

fn is_fence_close(line: &str) -> bool {
    line.trim() == FENCE_PREFIX
}
