use std::fmt;

use crate::pr::PullRequestContext;
use crate::review::PostableComment;

/// Pipeline stages a run moves through, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Init,
    ContextResolved,
    DiffObtained,
    Filtered,
    Analyzed,
    Submitted,
    Skipped,
}

/// Why a run ended without creating a review.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    UnsupportedEvent(String),
    EmptyDiff,
    NoComments,
    /// `--dry-run`: comments were produced but not posted.
    DryRun,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::UnsupportedEvent(action) => write!(f, "unsupported event `{}`", action),
            SkipReason::EmptyDiff => write!(f, "empty diff"),
            SkipReason::NoComments => write!(f, "no comments"),
            SkipReason::DryRun => write!(f, "dry run"),
        }
    }
}

/// Terminal state of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunStatus {
    Submitted,
    Skipped(SkipReason),
}

impl RunStatus {
    pub fn stage(&self) -> Stage {
        match self {
            RunStatus::Submitted => Stage::Submitted,
            RunStatus::Skipped(_) => Stage::Skipped,
        }
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunStatus::Submitted => write!(f, "SUBMITTED"),
            RunStatus::Skipped(reason) => write!(f, "SKIPPED ({})", reason),
        }
    }
}

/// Counters collected while analyzing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunStats {
    pub files_in_diff: usize,
    pub files_deleted: usize,
    pub files_excluded: usize,
    pub files_reviewed: usize,
    pub chunks_reviewed: usize,
    /// Chunks the review client gave no result for
    pub chunks_skipped: usize,
}

/// Everything a finished run produced.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub context: PullRequestContext,
    pub status: RunStatus,
    /// Comments in diff order; posted only when `status` is `Submitted`
    pub comments: Vec<PostableComment>,
    pub stats: RunStats,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_display() {
        assert_eq!(RunStatus::Submitted.to_string(), "SUBMITTED");
        assert_eq!(
            RunStatus::Skipped(SkipReason::UnsupportedEvent("closed".to_string())).to_string(),
            "SKIPPED (unsupported event `closed`)"
        );
    }

    #[test]
    fn test_status_stage() {
        assert_eq!(RunStatus::Submitted.stage(), Stage::Submitted);
        assert_eq!(RunStatus::Skipped(SkipReason::EmptyDiff).stage(), Stage::Skipped);
    }
}
