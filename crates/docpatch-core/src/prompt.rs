//! Prompts for the external completion service that produces the diffs.

const UNIFIED_RULES: &str = "\
You are an expert editorial assistant.

TASK
- Read the Markdown document between <<<DOC_START and DOC_END>>>.
- Apply the instruction between <<<INSTRUCTION and INSTRUCTION_END>>>.
- Answer with a unified diff of the document.

DIFF FORMAT
1. Keep exactly one unchanged context line above and below every change block.
2. Prefix unchanged context with a single space, deletions with \"-\" and additions with \"+\".
3. Output only the diff lines. No commentary, headings or fences.

SPACING
- Keep blank lines around headings, lists and code blocks.
- Preserve the blank line pattern the document already uses.

EXAMPLE
Before:
A
B
C

Instruction: replace \"B\" with \"B2\"
Answer:
 A
-B
+B2
 C";

const FENCED_RULES: &str = "\
You are a document writing assistant.

- You receive the full document, a selected part of it and the user's writing requirements.
- Update the document according to the requirements and answer with a unified diff only.
- Start every hunk with a bare `@@` line.
- Wrap the whole patch in a fenced code block labeled diff.

Example answer:

```diff
@@
+## Added Section
+
+This section is new.
@@
-This software is released under the MIT License.
+This software is released under the MIT License,
+see the LICENSE file for more information.
```

A line only prefixed with `+` is added, a line only prefixed with `-` is removed,
and a `-old` line directly followed by a `+new` line edits it in place.

Reply in the language of the requirements.";

/// Prompt asking for bare unified diff lines against the whole document.
pub fn unified_prompt(document: &str, instruction: &str) -> String {
    format!(
        "{}\n\nDOCUMENT\n<<<DOC_START\n{}\nDOC_END>>>\n\nINSTRUCTION\n<<<INSTRUCTION\n{}\nINSTRUCTION_END>>>",
        UNIFIED_RULES, document, instruction
    )
}

/// Prompt asking for a fenced `diff` patch focused on `selection`.
///
/// An empty selection stands for the whole document.
pub fn fenced_prompt(document: &str, selection: &str, instruction: &str) -> String {
    let selection = if selection.trim().is_empty() {
        document
    } else {
        selection
    };
    format!(
        "{}\n\n```\nfull content:\n{}\n\n===\nwriting requirements: {}\n\n===\nselected content:\n{}\n```\n",
        FENCED_RULES, document, instruction, selection
    )
}
