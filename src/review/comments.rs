use tracing::{debug, warn};

use super::types::{PostableComment, ReviewSuggestion};
use crate::pr::{Chunk, ParsedFile};

/// Marks every comment this tool posts.
pub const COMMENT_PREFIX: &str = "[GPT-REVIEW] ";

/// Turn a chunk's suggestions into inline comments on the file's target path.
///
/// Nothing is checked against the chunk's lines: GitHub decides whether a line is
/// commentable. Deleted files yield no comments, and so do suggestions whose
/// line number has no leading digits.
pub fn map_comments(
    file: &ParsedFile,
    chunk: &Chunk,
    suggestions: Vec<ReviewSuggestion>,
) -> Vec<PostableComment> {
    let Some(path) = file.target.as_deref().filter(|p| !p.is_empty()) else {
        debug!(chunk = %chunk.content, dropped = suggestions.len(), "file has no target path");
        return Vec::new();
    };

    suggestions
        .into_iter()
        .filter_map(|suggestion| {
            let Some(line) = coerce_line(&suggestion.line_number) else {
                warn!(path, line_number = %suggestion.line_number, "dropping suggestion without a usable line number");
                return None;
            };
            Some(PostableComment {
                body: format!("{}{}", COMMENT_PREFIX, suggestion.review_comment),
                path: path.to_string(),
                line,
            })
        })
        .collect()
}

/// Integer value of the leading digits, so `"12"`, `" 12 "` and `"12-14"` all give 12.
fn coerce_line(text: &str) -> Option<u64> {
    let text = text.trim();
    let text = text.strip_prefix('+').unwrap_or(text);
    let end = text
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(text.len());
    text[..end].parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pr::{ChangeKind, ChangeLine};

    fn chunk() -> Chunk {
        Chunk {
            content: "@@ -1 +1,2 @@".to_string(),
            old_start: 1,
            old_count: 1,
            new_start: 1,
            new_count: 2,
            changes: vec![ChangeLine {
                kind: ChangeKind::Addition,
                content: "+x".to_string(),
                old_line: None,
                new_line: Some(2),
            }],
        }
    }

    fn suggestion(line: &str, comment: &str) -> ReviewSuggestion {
        ReviewSuggestion {
            line_number: line.to_string(),
            review_comment: comment.to_string(),
        }
    }

    #[test]
    fn test_maps_suggestion_to_comment() {
        let file = ParsedFile {
            target: Some("src/a.ts".to_string()),
            chunks: vec![chunk()],
        };
        let comments = map_comments(&file, &file.chunks[0], vec![suggestion("12", "fix this")]);
        assert_eq!(
            comments,
            vec![PostableComment {
                body: "[GPT-REVIEW] fix this".to_string(),
                path: "src/a.ts".to_string(),
                line: 12,
            }]
        );
    }

    #[test]
    fn test_keeps_order_and_duplicates() {
        let file = ParsedFile {
            target: Some("b.rs".to_string()),
            chunks: vec![chunk()],
        };
        let comments = map_comments(
            &file,
            &file.chunks[0],
            vec![suggestion("3", "one"), suggestion("1", "two"), suggestion("3", "one")],
        );
        let lines: Vec<u64> = comments.iter().map(|c| c.line).collect();
        assert_eq!(lines, vec![3, 1, 3]);
    }

    #[test]
    fn test_line_outside_chunk_is_not_validated() {
        let file = ParsedFile {
            target: Some("b.rs".to_string()),
            chunks: vec![chunk()],
        };
        let comments = map_comments(&file, &file.chunks[0], vec![suggestion("999", "far away")]);
        assert_eq!(comments[0].line, 999);
    }

    #[test]
    fn test_deleted_file_yields_nothing() {
        let file = ParsedFile {
            target: None,
            chunks: vec![chunk()],
        };
        assert!(map_comments(&file, &file.chunks[0], vec![suggestion("1", "gone")]).is_empty());
    }

    #[test]
    fn test_unusable_line_numbers_are_dropped() {
        let file = ParsedFile {
            target: Some("b.rs".to_string()),
            chunks: vec![chunk()],
        };
        let comments = map_comments(
            &file,
            &file.chunks[0],
            vec![suggestion("n/a", "x"), suggestion("-4", "y"), suggestion("7", "z")],
        );
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].line, 7);
    }

    #[test]
    fn test_coerce_line() {
        assert_eq!(coerce_line("12"), Some(12));
        assert_eq!(coerce_line(" 7 "), Some(7));
        assert_eq!(coerce_line("12-14"), Some(12));
        assert_eq!(coerce_line("+5"), Some(5));
        assert_eq!(coerce_line("0"), Some(0));
        assert_eq!(coerce_line(""), None);
        assert_eq!(coerce_line("line 4"), None);
    }
}
