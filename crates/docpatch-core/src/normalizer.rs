use once_cell::sync::Lazy;
use regex::Regex;

static LIST_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(?:[-*+]|\d+\.)\s+").unwrap());
static HEADING_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^#+\s+").unwrap());
static QUOTE_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^>\s*").unwrap());
static STRONG_STARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*(.+?)\*\*").unwrap());
static STRONG_UNDERSCORES: Lazy<Regex> = Lazy::new(|| Regex::new(r"__(.+?)__").unwrap());
static EM_STAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*(.+?)\*").unwrap());
static EM_UNDERSCORE: Lazy<Regex> = Lazy::new(|| Regex::new(r"_(.+?)_").unwrap());
static INLINE_CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"`([^`]+)`").unwrap());
static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

const DIFF_DELETION_MARKER: &str = "- ";

/// Canonical form of a line used for every comparison against the document.
///
/// Markdown decoration (list bullets, heading hashes, quote markers, emphasis,
/// inline code) and whitespace differences are dropped. Every step removes or
/// collapses characters, so the pipeline is repeated until the text stops changing; this
/// makes `normalize(normalize(x)) == normalize(x)` hold for stacked markers
/// such as `- - item`.
pub fn normalize(line: &str) -> String {
    let mut current = normalize_once(line);
    loop {
        let next = normalize_once(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

/// Two lines are equivalent iff their normalized forms are identical.
pub fn equivalent(a: &str, b: &str) -> bool {
    normalize(a) == normalize(b)
}

fn normalize_once(line: &str) -> String {
    let trimmed = line.trim();
    let text = trimmed.strip_prefix(DIFF_DELETION_MARKER).unwrap_or(trimmed);

    let text = LIST_MARKER.replace(text, "");
    let text = HEADING_MARKER.replace(&text, "");
    let text = QUOTE_MARKER.replace(&text, "");

    let text = STRONG_STARS.replace_all(&text, "${1}");
    let text = STRONG_UNDERSCORES.replace_all(&text, "${1}");
    let text = EM_STAR.replace_all(&text, "${1}");
    let text = EM_UNDERSCORE.replace_all(&text, "${1}");
    let text = INLINE_CODE.replace_all(&text, "${1}");

    WHITESPACE_RUN.replace_all(&text, " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_strips_list_and_heading_markers() {
        assert_eq!(normalize("  - item one\n"), "item one");
        assert_eq!(normalize("* item"), "item");
        assert_eq!(normalize("+ item"), "item");
        assert_eq!(normalize("12. numbered"), "numbered");
        assert_eq!(normalize("### Heading  text"), "Heading text");
        assert_eq!(normalize("> quoted"), "quoted");
    }

    #[test]
    fn test_strips_inline_markup() {
        assert_eq!(normalize("a **bold** word"), "a bold word");
        assert_eq!(normalize("an *em* word"), "an em word");
        assert_eq!(normalize("__strong__ and _em_"), "strong and em");
        assert_eq!(normalize("call `run()` now"), "call run() now");
    }

    #[test]
    fn test_keeps_text_without_markers() {
        assert_eq!(normalize("#hashtag stays"), "#hashtag stays");
        assert_eq!(normalize("-dash without space"), "-dash without space");
        assert_eq!(normalize("Case Matters"), "Case Matters");
        assert_ne!(normalize("Case Matters"), normalize("case matters"));
    }

    #[test]
    fn test_stacked_markers_are_fully_removed() {
        assert_eq!(normalize("- - - item"), "item");
        assert_eq!(normalize("- ## **Title**"), "Title");
    }

    #[test]
    fn test_equivalent_ignores_decoration() {
        assert!(equivalent("- **Install** the `tool`", "Install the tool"));
        assert!(equivalent("##  Setup", "Setup"));
        assert!(!equivalent("Setup", "Set up"));
    }

    proptest! {
        #[test]
        fn test_normalize_is_idempotent(line in ".*") {
            let once = normalize(&line);
            prop_assert_eq!(normalize(&once), once);
        }

        #[test]
        fn test_normalize_is_idempotent_on_markdown(
            line in r"[-*+#>_` 0-9.a-z]{0,40}",
        ) {
            let once = normalize(&line);
            prop_assert_eq!(normalize(&once), once);
        }
    }
}
