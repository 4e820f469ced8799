use docpatch_core::{
    apply_all_to_text, apply_to_text, normalize, parse, resolve_and_apply, Document, EngineError,
    Hunk, ProposalStore, Resolution, TextOutcome,
};
use proptest::prelude::*;

fn lines(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_pasted_chat_reply_end_to_end() {
    let document = Document::from_markdown(
        "# Release notes\n\nThis is the original text.\n\nThis line will be replaced.\n\nThis is another line.\n",
    );
    let reply = r#"Here is the change you asked for:

```diff
@@ -1,3 +1,3 @@
 This is the original text.
-This line will be replaced.
+This line has been updated.
 This is another line.
```

Let me know if you need anything else."#;

    let mut store = ProposalStore::new(document);
    let ids = store.propose(reply).unwrap();
    assert_eq!(ids.len(), 1);

    let resolution = store.accept(ids[0]).unwrap();
    assert_eq!(resolution, Resolution::ExactBlockReplace { start: 2, count: 1 });
    assert_eq!(
        store.document().to_markdown(),
        "# Release notes\n\nThis is the original text.\n\nThis line has been updated.\n\nThis is another line.\n"
    );
}

#[test]
fn test_round_trip_exact_block() {
    let hunk = Hunk {
        context_before: lines(&["A"]),
        deletions: lines(&["B"]),
        additions: lines(&["B2"]),
        context_after: lines(&["C"]),
    };
    assert_eq!(apply_to_text("A\nB\nC", &hunk).content, "A\nB2\nC");

    let mut document = Document::from_lines(&["A", "B", "C"]);
    resolve_and_apply(&mut document, &hunk).unwrap();
    assert_eq!(document.content_texts(), vec!["A", "B2", "C"]);
}

#[test]
fn test_pure_insertion() {
    let hunk = Hunk {
        context_before: lines(&["X"]),
        additions: lines(&["Z"]),
        ..Default::default()
    };
    assert_eq!(apply_to_text("X\nY", &hunk).content, "X\nZ\nY");
}

#[test]
fn test_inline_replacement() {
    let hunk = Hunk {
        deletions: lines(&["old word"]),
        additions: lines(&["new phrase"]),
        ..Default::default()
    };
    assert_eq!(
        apply_to_text("This is a sentence with old word here.", &hunk).content,
        "This is a sentence with new phrase here."
    );
}

#[test]
fn test_parser_rejects_prose() {
    assert!(parse("This is not a valid diff format").is_empty());

    let mut store = ProposalStore::new(Document::from_lines(&["A"]));
    assert_eq!(
        store.propose("This is not a valid diff format"),
        Err(EngineError::NoValidDiff)
    );
}

#[test]
fn test_reject_leaves_document_unchanged() {
    let original = Document::from_lines(&["alpha", "beta", "gamma"]);
    let mut store = ProposalStore::new(original.clone());
    let ids = store.propose(" alpha\n-beta\n+BETA\n gamma").unwrap();
    assert_ne!(store.document(), &original);

    store.reject(ids[0]).unwrap();
    assert_eq!(store.document(), &original);
    assert!(store.pending().is_empty());
}

#[test]
fn test_multi_hunk_independence() {
    let diff = "@@\n A\n-B\n+B2\n C\n@@\n C\n-D\n+D2\n";

    for accept_first in [true, false] {
        let mut store = ProposalStore::new(Document::from_lines(&["A", "B", "C", "D"]));
        let ids = store.propose(diff).unwrap();
        assert_eq!(ids.len(), 2);

        let (accepted, rejected) = if accept_first {
            (ids[0], ids[1])
        } else {
            (ids[1], ids[0])
        };
        store.reject(rejected).unwrap();
        store.accept(accepted).unwrap();

        let expected = if accept_first {
            vec!["A", "B2", "C", "D"]
        } else {
            vec!["A", "B", "C", "D2"]
        };
        assert_eq!(store.document().content_texts(), expected);
        assert_eq!(store.document().len(), 4);
    }
}

#[test]
fn test_fallback_on_miss_appends_on_accept() {
    let mut store = ProposalStore::new(Document::from_lines(&["A", "B"]));
    let ids = store.propose("-no such line\n+appended line\n").unwrap();
    assert_eq!(store.accept(ids[0]).unwrap(), Resolution::AppendAtEnd);
    assert_eq!(
        store.document().content_texts(),
        vec!["A", "B", "appended line"]
    );

    // The flat-buffer path reports the miss instead.
    let hunk = &parse("-no such line\n+appended line\n")[0];
    let applied = apply_to_text("A\nB", hunk);
    assert_eq!(applied.content, "A\nB");
    assert_eq!(applied.outcome, TextOutcome::Unresolved);
}

#[test]
fn test_markdown_decorations_do_not_block_matching() {
    let mut store = ProposalStore::new(Document::from_markdown(
        "## Goals\n\n- **Fast** startup\n- Small binary\n",
    ));
    let ids = store.propose("```diff\n Goals\n-Fast startup\n+Instant startup\n```").unwrap();
    store.accept(ids[0]).unwrap();
    assert_eq!(
        store.document().content_texts(),
        vec!["## Goals", "Instant startup", "- Small binary"]
    );
}

#[test]
fn test_apply_all_to_text_reports_each_hunk() {
    let hunks = parse("@@\n-one\n+ONE\n@@\n-missing\n+never\n@@\n three\n+four\n");
    let (content, outcomes) = apply_all_to_text("one\ntwo\nthree", &hunks);
    assert_eq!(content, "ONE\ntwo\nthree\nfour");
    assert_eq!(outcomes.len(), 3);
    assert!(outcomes[0].is_applied());
    assert_eq!(outcomes[1], TextOutcome::Unresolved);
    assert_eq!(outcomes[2], TextOutcome::InsertedAfter { line: 2 });
}

proptest! {
    #[test]
    fn prop_normalize_is_idempotent(s in "\\PC*") {
        let once = normalize(&s);
        prop_assert_eq!(normalize(&once), once);
    }

    #[test]
    fn prop_parse_never_yields_empty_hunks(s in "[ +\\-a-z@`\n*#]{0,200}") {
        for hunk in parse(&s) {
            prop_assert!(hunk.has_changes());
        }
    }

    #[test]
    fn prop_reject_restores_document(
        doc in prop::collection::vec("[a-d ]{1,6}", 0..6),
        raw in "[ +\\-a-d\n]{1,60}",
    ) {
        let original = Document::from_lines(&doc);
        let mut store = ProposalStore::new(original.clone());
        if let Ok(ids) = store.propose(&raw) {
            for id in ids {
                store.reject(id).unwrap();
            }
        }
        prop_assert_eq!(store.document(), &original);
    }
}
