pub mod types;

pub use types::{RunOutcome, RunStats, RunStatus, SkipReason, Stage};

use thiserror::Error;
use tracing::{debug, info, info_span, Instrument};

use crate::config::ConfigError;
use crate::event::{EventError, EventKind, PullRequestEvent};
use crate::filter::{filter_files, ExcludePatterns, FilterError};
use crate::pr::{self, HostingApi, ParsedFile, PrError, PullRequestContext};
use crate::report::ReportError;
use crate::review::{build_prompt, map_comments, PostableComment, ReviewClient, ReviewError};

/// Anything that makes a run fail. Recovered conditions (unsupported event, empty
/// diff, unusable completion replies) never show up here.
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Event(#[from] EventError),

    #[error(transparent)]
    Filter(#[from] FilterError),

    #[error(transparent)]
    Hosting(#[from] PrError),

    #[error(transparent)]
    Completion(#[from] ReviewError),

    #[error(transparent)]
    Report(#[from] ReportError),
}

/// Drives one review run: context, diff, filter, analyze, submit.
///
/// Chunks are reviewed one at a time, in diff order, and all comments go out in a
/// single comment-only review at the end.
pub struct Reviewer<'a> {
    hosting: &'a dyn HostingApi,
    client: &'a ReviewClient,
    excludes: &'a ExcludePatterns,
    dry_run: bool,
}

impl<'a> Reviewer<'a> {
    pub fn new(hosting: &'a dyn HostingApi, client: &'a ReviewClient, excludes: &'a ExcludePatterns) -> Self {
        Self {
            hosting,
            client,
            excludes,
            dry_run: false,
        }
    }

    /// Produce comments without creating the review.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub async fn run(&self, event: &PullRequestEvent) -> Result<RunOutcome, RunError> {
        info!(stage = ?Stage::Init, owner = %event.repo.owner, repo = %event.repo.repo, pr = event.number, "starting review");

        let context = pr::fetch_context(self.hosting, &event.repo, event.number).await?;
        info!(stage = ?Stage::ContextResolved, title = %context.title, "resolved pull request");

        let mut stats = RunStats::default();

        let diff = match &event.kind {
            EventKind::Opened => self.hosting.pull_request_diff(&event.repo, event.number).await?,
            EventKind::Synchronize { before, after } => {
                self.hosting.compare_diff(&event.repo, before, after).await?
            }
            EventKind::Other(action) => {
                let status = RunStatus::Skipped(SkipReason::UnsupportedEvent(action.clone()));
                return Ok(finish(context, status, Vec::new(), stats));
            }
        };

        if diff.trim().is_empty() {
            return Ok(finish(context, RunStatus::Skipped(SkipReason::EmptyDiff), Vec::new(), stats));
        }
        info!(stage = ?Stage::DiffObtained, diff_bytes = diff.len(), "obtained diff");

        let parsed = pr::diff::parse_diff(&diff)?;
        stats.files_in_diff = parsed.len();

        let (deleted, live): (Vec<ParsedFile>, Vec<ParsedFile>) =
            parsed.into_iter().partition(ParsedFile::is_deleted);
        stats.files_deleted = deleted.len();

        let live_count = live.len();
        let files = filter_files(live, self.excludes);
        stats.files_excluded = live_count - files.len();
        info!(
            stage = ?Stage::Filtered,
            files = files.len(),
            deleted = stats.files_deleted,
            excluded = stats.files_excluded,
            "filtered diff"
        );

        let comments = self.analyze(&files, &context, &mut stats).await;
        info!(
            stage = ?Stage::Analyzed,
            comments = comments.len(),
            chunks = stats.chunks_reviewed,
            chunks_skipped = stats.chunks_skipped,
            "analysis complete"
        );

        if comments.is_empty() {
            return Ok(finish(context, RunStatus::Skipped(SkipReason::NoComments), comments, stats));
        }
        if self.dry_run {
            return Ok(finish(context, RunStatus::Skipped(SkipReason::DryRun), comments, stats));
        }

        self.hosting
            .create_review(&context.repo_ref(), context.pull_number, &comments)
            .await?;
        Ok(finish(context, RunStatus::Submitted, comments, stats))
    }

    async fn analyze(
        &self,
        files: &[ParsedFile],
        context: &PullRequestContext,
        stats: &mut RunStats,
    ) -> Vec<PostableComment> {
        let mut comments = Vec::new();
        for file in files {
            let span = info_span!("review_file", path = %file.match_path(), chunks = file.chunks.len());
            self.review_file(file, context, stats, &mut comments)
                .instrument(span)
                .await;
            stats.files_reviewed += 1;
        }
        comments
    }

    async fn review_file(
        &self,
        file: &ParsedFile,
        context: &PullRequestContext,
        stats: &mut RunStats,
        comments: &mut Vec<PostableComment>,
    ) {
        for chunk in &file.chunks {
            let prompt = build_prompt(file, chunk, context);
            debug!(chunk = %chunk.content, prompt_len = prompt.len(), "reviewing chunk");
            stats.chunks_reviewed += 1;

            match self.client.review(&prompt).await {
                Some(suggestions) => {
                    let mapped = map_comments(file, chunk, suggestions);
                    debug!(chunk = %chunk.content, comments = mapped.len(), "chunk reviewed");
                    comments.extend(mapped);
                }
                None => stats.chunks_skipped += 1,
            }
        }
    }
}

fn finish(
    context: PullRequestContext,
    status: RunStatus,
    comments: Vec<PostableComment>,
    stats: RunStats,
) -> RunOutcome {
    info!(stage = ?status.stage(), status = %status, comments = comments.len(), "run finished");
    RunOutcome {
        context,
        status,
        comments,
        stats,
    }
}
