/// Repository coordinates taken from the triggering event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    pub owner: String,
    pub repo: String,
}

/// Everything the reviewer knows about the pull request under review.
/// Built once per run from the event payload and the GitHub PR-detail response,
/// never mutated afterwards.
#[derive(Debug, Clone)]
pub struct PullRequestContext {
    pub owner: String,
    pub repo: String,
    /// PR number (e.g., 42)
    pub pull_number: u64,
    pub title: String,
    /// PR body; an empty string when GitHub reports `null`
    pub description: String,
}

impl PullRequestContext {
    pub fn repo_ref(&self) -> RepoRef {
        RepoRef {
            owner: self.owner.clone(),
            repo: self.repo.clone(),
        }
    }
}

/// One file's changes within a unified diff.
#[derive(Debug, Clone)]
pub struct ParsedFile {
    /// Target path (e.g., "src/auth/config.rs"). `None` when the file was deleted
    /// (`+++ /dev/null`).
    pub target: Option<String>,
    /// Hunks in diff order
    pub chunks: Vec<Chunk>,
}

impl ParsedFile {
    pub fn is_deleted(&self) -> bool {
        self.target.is_none()
    }

    /// Path used for exclude-pattern matching; deleted files match as "".
    pub fn match_path(&self) -> &str {
        self.target.as_deref().unwrap_or("")
    }
}

/// A contiguous region of changes within a file.
#[derive(Debug, Clone)]
#[allow(dead_code)] // Range fields are kept from the header for callers that need them
pub struct Chunk {
    /// Raw hunk header, e.g. `@@ -1,5 +1,7 @@ fn main() {`
    pub content: String,
    pub old_start: usize,
    pub old_count: usize,
    pub new_start: usize,
    pub new_count: usize,
    /// Every line of the hunk body, in order. Never empty.
    pub changes: Vec<ChangeLine>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Context,
    Addition,
    Deletion,
}

/// A single hunk line with its line numbers.
///
/// Additions only carry `new_line`, deletions only `old_line`, context lines carry both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeLine {
    pub kind: ChangeKind,
    /// Raw line including its `+`, `-` or ` ` prefix
    pub content: String,
    pub old_line: Option<usize>,
    pub new_line: Option<usize>,
}

impl ChangeLine {
    /// Line number shown to the model: the old-side number when present,
    /// otherwise the new-side one.
    pub fn display_line(&self) -> Option<usize> {
        self.old_line.or(self.new_line)
    }
}
