//! The instruction sent to the completion service for each chunk.
//!
//! The wording is the contract with the model; `tests/fixtures/prompt_golden.txt`
//! pins it byte for byte.

use crate::pr::{Chunk, ParsedFile, PullRequestContext};

const INSTRUCTIONS: &str = r#"Your task is to review pull requests. Instructions:
- Provide the response in following JSON format: [{"lineNumber": "<line_number>", "reviewComment": "<review comment>"}]
- Do not give positive comments or compliments.
- Provide comments and suggestions ONLY if there is something to improve, otherwise return an empty array: []
- Write the comment in GitHub Markdown format.
- Use the given description only for the overall context and only comment the code.
- IMPORTANT: NEVER suggest adding comments to the code.
"#;

/// Build the review prompt for one chunk of `file`.
///
/// Title, description and path are embedded verbatim. Change lines are rendered as
/// `<line-number> <line>`, numbered by [`crate::pr::ChangeLine::display_line`].
pub fn build_prompt(file: &ParsedFile, chunk: &Chunk, pr: &PullRequestContext) -> String {
    let changes = chunk
        .changes
        .iter()
        .map(|change| match change.display_line() {
            Some(line) => format!("{} {}", line, change.content),
            None => format!(" {}", change.content),
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "{instructions}
Review the following code diff in the file \"{path}\" and take the pull request title and description into account when writing the response.

Pull request title: {title}
Pull request description:

---
{description}
---

Git diff to review:

```diff
{header}
{changes}
```
",
        instructions = INSTRUCTIONS,
        path = file.match_path(),
        title = pr.title,
        description = pr.description,
        header = chunk.content,
        changes = changes,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pr::{ChangeKind, ChangeLine};

    fn sample_context() -> PullRequestContext {
        PullRequestContext {
            owner: "acme".to_string(),
            repo: "widgets".to_string(),
            pull_number: 7,
            title: "Share the \"a\" constant".to_string(),
            description: "Exports `b`.\n\nNo behavior change.".to_string(),
        }
    }

    fn sample_file() -> ParsedFile {
        ParsedFile {
            target: Some("src/a.ts".to_string()),
            chunks: vec![Chunk {
                content: "@@ -10,2 +10,3 @@ export const a = 1;".to_string(),
                old_start: 10,
                old_count: 2,
                new_start: 10,
                new_count: 3,
                changes: vec![
                    ChangeLine {
                        kind: ChangeKind::Context,
                        content: " const a = 1;".to_string(),
                        old_line: Some(10),
                        new_line: Some(10),
                    },
                    ChangeLine {
                        kind: ChangeKind::Addition,
                        content: "+const b = a;".to_string(),
                        old_line: None,
                        new_line: Some(11),
                    },
                    ChangeLine {
                        kind: ChangeKind::Context,
                        content: " export { a };".to_string(),
                        old_line: Some(11),
                        new_line: Some(12),
                    },
                ],
            }],
        }
    }

    #[test]
    fn test_prompt_matches_golden() {
        let file = sample_file();
        let prompt = build_prompt(&file, &file.chunks[0], &sample_context());
        assert_eq!(prompt, include_str!("../../tests/fixtures/prompt_golden.txt"));
    }

    #[test]
    fn test_prompt_embeds_description_verbatim() {
        let file = sample_file();
        let mut pr = sample_context();
        pr.description = "Closes #12 <b>{not a placeholder}</b>".to_string();
        let prompt = build_prompt(&file, &file.chunks[0], &pr);
        assert!(prompt.contains("---\nCloses #12 <b>{not a placeholder}</b>\n---"));
    }

    #[test]
    fn test_prompt_with_empty_description() {
        let file = sample_file();
        let mut pr = sample_context();
        pr.description = String::new();
        let prompt = build_prompt(&file, &file.chunks[0], &pr);
        assert!(prompt.contains("Pull request description:\n\n---\n\n---"));
    }
}
