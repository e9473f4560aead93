use crate::orchestrator::RunStatus;
use crate::review::PostableComment;

/// Summary of one review run, rendered for the terminal or as markdown.
#[derive(Debug)]
pub struct Report {
    /// "owner/repo"
    pub repository: String,
    pub pr_number: u64,
    pub pr_title: String,
    pub status: RunStatus,
    pub files_in_diff: usize,
    /// Files sent for review (after dropping deleted and excluded ones)
    pub files_reviewed: usize,
    pub files_excluded: usize,
    pub files_deleted: usize,
    pub chunks_reviewed: usize,
    /// Chunks the completion service gave no usable answer for
    pub chunks_skipped: usize,
    pub comments: Vec<PostableComment>,
}

impl Report {
    /// Whether the comments listed were actually posted.
    pub fn posted(&self) -> bool {
        self.status == RunStatus::Submitted
    }
}
