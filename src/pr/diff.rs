use super::types::{ChangeKind, ChangeLine, Chunk, ParsedFile};
use super::PrError;

const DEV_NULL: &str = "/dev/null";

/// Parse a unified diff string into the files it touches, in diff order.
///
/// Accepts both `git diff` output (GitHub's diff media type) and plain unified
/// diffs that only carry `---`/`+++` headers.
///
/// Each file section starts with:
///   diff --git a/{path} b/{path}
///
/// Deleted files have `+++ /dev/null` (or a `deleted file mode` line) and come back
/// with `target: None`.
///
/// Hunks start with `@@ -{old_start},{old_count} +{new_start},{new_count} @@` and
/// their bodies are consumed by those counts, so a removed line reading `--- x`
/// is never taken for a file header.
pub fn parse_diff(raw_diff: &str) -> Result<Vec<ParsedFile>, PrError> {
    if raw_diff.trim().is_empty() {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    let mut current_file: Option<ParsedFile> = None;
    let mut current_hunk: Option<HunkCursor> = None;

    for (index, line) in raw_diff.lines().enumerate() {
        let line_no = index + 1;

        if let Some(hunk) = current_hunk.as_mut() {
            hunk.push(line, line_no)?;
            if hunk.is_complete() {
                if let (Some(file), Some(hunk)) = (current_file.as_mut(), current_hunk.take()) {
                    hunk.finish_into(file);
                }
            }
            continue;
        }

        if let Some(rest) = line.strip_prefix("diff --git ") {
            if let Some(file) = current_file.take() {
                files.push(file);
            }
            current_file = Some(ParsedFile {
                target: Some(git_header_path(rest, line_no)?),
                chunks: Vec::new(),
            });
            continue;
        }

        if line.starts_with("--- ") {
            // Plain unified diffs have no `diff --git` line between files.
            let starts_new_file = current_file
                .as_ref()
                .map_or(true, |file| !file.chunks.is_empty());
            if starts_new_file {
                if let Some(file) = current_file.take() {
                    files.push(file);
                }
                current_file = Some(ParsedFile {
                    target: None,
                    chunks: Vec::new(),
                });
            }
            continue;
        }

        if let Some(rest) = line.strip_prefix("+++ ") {
            let file = current_file.as_mut().ok_or_else(|| {
                PrError::DiffParse(format!("line {}: `+++` header without a file", line_no))
            })?;
            file.target = target_path(rest);
            continue;
        }

        if line.starts_with("@@") {
            if current_file.is_none() {
                return Err(PrError::DiffParse(format!(
                    "line {}: hunk header outside of a file section",
                    line_no
                )));
            }
            let cursor = HunkCursor::open(line, line_no)?;
            if cursor.is_complete() {
                continue;
            }
            current_hunk = Some(cursor);
            continue;
        }

        if line.starts_with("deleted file mode") {
            if let Some(file) = current_file.as_mut() {
                file.target = None;
            }
        }
        // index, mode, rename, similarity and "Binary files" lines carry nothing we need
    }

    if current_hunk.is_some() {
        return Err(PrError::DiffParse(
            "diff ended in the middle of a hunk".to_string(),
        ));
    }
    if let Some(file) = current_file.take() {
        files.push(file);
    }
    if files.is_empty() {
        return Err(PrError::DiffParse("no file headers found".to_string()));
    }
    Ok(files)
}

/// Tracks line numbers and the remaining declared counts while a hunk body is read.
struct HunkCursor {
    chunk: Chunk,
    old_next: usize,
    new_next: usize,
    old_remaining: usize,
    new_remaining: usize,
}

impl HunkCursor {
    fn open(header: &str, line_no: usize) -> Result<Self, PrError> {
        let (old_start, old_count, new_start, new_count) = parse_hunk_header(header, line_no)?;
        Ok(Self {
            chunk: Chunk {
                content: header.to_string(),
                old_start,
                old_count,
                new_start,
                new_count,
                changes: Vec::new(),
            },
            old_next: old_start,
            new_next: new_start,
            old_remaining: old_count,
            new_remaining: new_count,
        })
    }

    fn is_complete(&self) -> bool {
        self.old_remaining == 0 && self.new_remaining == 0
    }

    fn push(&mut self, line: &str, line_no: usize) -> Result<(), PrError> {
        let overflow = || {
            PrError::DiffParse(format!(
                "line {}: hunk `{}` has more lines than its header declares",
                line_no, self.chunk.content
            ))
        };

        let kind = match line.chars().next() {
            // `\ No newline at end of file`
            Some('\\') => return Ok(()),
            Some('+') => ChangeKind::Addition,
            Some('-') => ChangeKind::Deletion,
            // Some tools strip the trailing space of empty context lines.
            Some(' ') | None => ChangeKind::Context,
            Some(_) => {
                return Err(PrError::DiffParse(format!(
                    "line {}: hunk `{}` ended before its declared line counts",
                    line_no, self.chunk.content
                )))
            }
        };

        let (old_line, new_line) = match kind {
            ChangeKind::Context => {
                if self.old_remaining == 0 || self.new_remaining == 0 {
                    return Err(overflow());
                }
                self.old_remaining -= 1;
                self.new_remaining -= 1;
                self.old_next += 1;
                self.new_next += 1;
                (Some(self.old_next - 1), Some(self.new_next - 1))
            }
            ChangeKind::Addition => {
                if self.new_remaining == 0 {
                    return Err(overflow());
                }
                self.new_remaining -= 1;
                self.new_next += 1;
                (None, Some(self.new_next - 1))
            }
            ChangeKind::Deletion => {
                if self.old_remaining == 0 {
                    return Err(overflow());
                }
                self.old_remaining -= 1;
                self.old_next += 1;
                (Some(self.old_next - 1), None)
            }
        };

        self.chunk.changes.push(ChangeLine {
            kind,
            content: line.to_string(),
            old_line,
            new_line,
        });
        Ok(())
    }

    fn finish_into(self, file: &mut ParsedFile) {
        if !self.chunk.changes.is_empty() {
            file.chunks.push(self.chunk);
        }
    }
}

/// Target path from the `diff --git a/{path} b/{path}` header.
fn git_header_path(rest: &str, line_no: usize) -> Result<String, PrError> {
    let mut parts = rest.split_whitespace();
    let a_path = parts.next().ok_or_else(|| {
        PrError::DiffParse(format!("line {}: missing a/ path in diff header", line_no))
    })?;
    let b_path = parts.next().ok_or_else(|| {
        PrError::DiffParse(format!("line {}: missing b/ path in diff header", line_no))
    })?;
    let path = b_path
        .strip_prefix("b/")
        .or_else(|| a_path.strip_prefix("a/"))
        .unwrap_or(b_path);
    Ok(path.to_string())
}

/// Target path from a `+++` header; `None` for `/dev/null`.
fn target_path(rest: &str) -> Option<String> {
    // Plain diffs may append a tab and a timestamp.
    let raw = rest.split('\t').next().unwrap_or(rest).trim().trim_matches('"');
    if raw == DEV_NULL {
        return None;
    }
    Some(raw.strip_prefix("b/").unwrap_or(raw).to_string())
}

fn parse_hunk_header(line: &str, line_no: usize) -> Result<(usize, usize, usize, usize), PrError> {
    let invalid = |what: &str| PrError::DiffParse(format!("line {}: {} in `{}`", line_no, what, line));

    let header = line
        .trim()
        .strip_prefix("@@")
        .ok_or_else(|| invalid("invalid hunk header"))?;
    let mut parts = header.split_whitespace();
    let old_part = parts.next().ok_or_else(|| invalid("missing old range"))?;
    let new_part = parts.next().ok_or_else(|| invalid("missing new range"))?;

    let (old_start, old_count) = parse_range(old_part, '-').ok_or_else(|| invalid("invalid old range"))?;
    let (new_start, new_count) = parse_range(new_part, '+').ok_or_else(|| invalid("invalid new range"))?;

    Ok((old_start, old_count, new_start, new_count))
}

fn parse_range(part: &str, prefix: char) -> Option<(usize, usize)> {
    let range = part.strip_prefix(prefix)?;
    let (start, count) = match range.split_once(',') {
        Some((start, count)) => (start, count),
        None => (range, "1"),
    };
    Some((start.parse().ok()?, count.parse().ok()?))
}
