pub mod types;

pub use types::Report;

use crate::orchestrator::{RunOutcome, RunStatus};
use colored::Colorize;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, instrument};

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Failed to write report file: {0}")]
    FileWrite(#[from] std::io::Error),
}

/// Build a Report from a finished run.
pub fn build(outcome: &RunOutcome) -> Report {
    let context = &outcome.context;
    Report {
        repository: format!("{}/{}", context.owner, context.repo),
        pr_number: context.pull_number,
        pr_title: context.title.clone(),
        status: outcome.status.clone(),
        files_in_diff: outcome.stats.files_in_diff,
        files_reviewed: outcome.stats.files_reviewed,
        files_excluded: outcome.stats.files_excluded,
        files_deleted: outcome.stats.files_deleted,
        chunks_reviewed: outcome.stats.chunks_reviewed,
        chunks_skipped: outcome.stats.chunks_skipped,
        comments: outcome.comments.clone(),
    }
}

/// Print the report to the terminal, and also write it as markdown when
/// `output_path` is given.
#[instrument(skip(report), fields(pr = report.pr_number, status = %report.status))]
pub fn output(report: &Report, output_path: Option<&Path>) -> Result<(), ReportError> {
    debug!("writing report to terminal");
    print_terminal_report(report);

    if let Some(path) = output_path {
        debug!(path = %path.display(), "writing report to file");
        write_markdown_report(report, path)?;
    }
    Ok(())
}

/// Terminal layout:
///
/// PR #7 in acme/widgets: "Add totals helper"
/// Files in diff: 2 | reviewed: 1 | excluded: 1 | deleted: 0 | Chunks: 1 (0 without answer)
///
/// ═══ Comments (posted) ═══
///   • y.ts:5 [GPT-REVIEW] Remove debug logging.
///
/// ═══ Result: SUBMITTED ═══
fn print_terminal_report(report: &Report) {
    println!();
    println!(
        "PR #{} in {}: \"{}\"",
        report.pr_number, report.repository, report.pr_title
    );
    println!(
        "Files in diff: {} | reviewed: {} | excluded: {} | deleted: {} | Chunks: {} ({} without answer)",
        report.files_in_diff,
        report.files_reviewed,
        report.files_excluded,
        report.files_deleted,
        report.chunks_reviewed,
        report.chunks_skipped
    );
    println!();

    let heading = if report.posted() { "posted" } else { "not posted" };
    println!("═══ Comments ({}) ═══", heading);
    if report.comments.is_empty() {
        println!("  No comments.");
    } else {
        for comment in &report.comments {
            println!(
                "  • {} {}",
                format!("{}:{}", comment.path, comment.line).bold(),
                comment.body
            );
        }
    }
    println!();

    println!("═══ Result: {} ═══", colorize_status(&report.status));
    println!();
}

fn write_markdown_report(report: &Report, path: &Path) -> Result<(), ReportError> {
    let mut md = String::new();
    md.push_str(&format!(
        "# PR #{} in {}: \"{}\"\n\n",
        report.pr_number, report.repository, report.pr_title
    ));
    md.push_str(&format!(
        "**Files in diff:** {} | **Reviewed:** {} | **Excluded:** {} | **Deleted:** {} | **Chunks:** {} ({} without answer)\n\n",
        report.files_in_diff,
        report.files_reviewed,
        report.files_excluded,
        report.files_deleted,
        report.chunks_reviewed,
        report.chunks_skipped
    ));

    let heading = if report.posted() { "posted" } else { "not posted" };
    md.push_str(&format!("## Comments ({})\n\n", heading));
    if report.comments.is_empty() {
        md.push_str("No comments.\n\n");
    } else {
        for comment in &report.comments {
            md.push_str(&format!(
                "- `{}:{}` {}\n",
                comment.path, comment.line, comment.body
            ));
        }
        md.push('\n');
    }

    md.push_str(&format!("## Result: {}\n", report.status));

    std::fs::write(path, md)?;
    Ok(())
}

fn colorize_status(status: &RunStatus) -> colored::ColoredString {
    match status {
        RunStatus::Submitted => status.to_string().green().bold(),
        RunStatus::Skipped(_) => status.to_string().yellow().bold(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orchestrator::{RunStats, SkipReason};
    use crate::pr::PullRequestContext;
    use crate::review::PostableComment;

    fn sample_outcome(status: RunStatus) -> RunOutcome {
        RunOutcome {
            context: PullRequestContext {
                owner: "acme".to_string(),
                repo: "widgets".to_string(),
                pull_number: 7,
                title: "Add totals helper".to_string(),
                description: String::new(),
            },
            status,
            comments: vec![PostableComment {
                body: "[GPT-REVIEW] Remove debug logging.".to_string(),
                path: "y.ts".to_string(),
                line: 5,
            }],
            stats: RunStats {
                files_in_diff: 2,
                files_deleted: 0,
                files_excluded: 1,
                files_reviewed: 1,
                chunks_reviewed: 1,
                chunks_skipped: 0,
            },
        }
    }

    #[test]
    fn test_build_report_metadata() {
        let report = build(&sample_outcome(RunStatus::Submitted));
        assert_eq!(report.repository, "acme/widgets");
        assert_eq!(report.pr_number, 7);
        assert_eq!(report.files_excluded, 1);
        assert_eq!(report.comments.len(), 1);
        assert!(report.posted());
    }

    #[test]
    fn test_write_markdown_report() {
        let report = build(&sample_outcome(RunStatus::Submitted));

        let path = std::env::temp_dir().join("gpt_pr_reviewer_test_report.md");
        write_markdown_report(&report, &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("# PR #7 in acme/widgets"));
        assert!(content.contains("**Files in diff:** 2 | **Reviewed:** 1 | **Excluded:** 1"));
        assert!(content.contains("## Comments (posted)"));
        assert!(content.contains("- `y.ts:5` [GPT-REVIEW] Remove debug logging."));
        assert!(content.contains("## Result: SUBMITTED"));

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_markdown_for_skipped_run() {
        let mut outcome = sample_outcome(RunStatus::Skipped(SkipReason::EmptyDiff));
        outcome.comments.clear();
        let report = build(&outcome);

        let path = std::env::temp_dir().join("gpt_pr_reviewer_test_skipped.md");
        write_markdown_report(&report, &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("## Comments (not posted)"));
        assert!(content.contains("No comments."));
        assert!(content.contains("## Result: SKIPPED (empty diff)"));

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_output_to_terminal_and_file() {
        let report = build(&sample_outcome(RunStatus::Skipped(SkipReason::DryRun)));
        let path = std::env::temp_dir().join("gpt_pr_reviewer_test_output.md");
        output(&report, Some(&path)).unwrap();
        assert!(path.exists());
        std::fs::remove_file(&path).ok();
    }
}
