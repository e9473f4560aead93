mod config;
mod event;
mod filter;
mod orchestrator;
mod pr;
mod report;
mod review;

use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info, info_span, Instrument};
use tracing_subscriber::EnvFilter;

use crate::orchestrator::{RunError, Reviewer};

/// GPT PR Reviewer: reviews the diff of a GitHub Pull Request chunk by chunk
/// with a language model and posts the findings as inline review comments.
///
/// Meant to run as a CI step on `pull_request` events.
#[derive(Parser, Debug)]
#[command(name = "gpt-pr-reviewer", version, about)]
struct Cli {
    /// Path to the triggering event payload (JSON)
    #[arg(long, env = "GITHUB_EVENT_PATH")]
    event_path: PathBuf,

    /// Config file to use instead of ./.pr-reviewer.toml
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Run the whole review but do not post it
    #[arg(long)]
    dry_run: bool,

    /// Optional output file path for a markdown run report
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let span = info_span!("pr_review", event_path = %cli.event_path.display());

    if let Err(err) = run(cli).instrument(span).await {
        error!(error = %err, "review run failed");
        return Err(err.into());
    }
    Ok(())
}

async fn run(cli: Cli) -> Result<(), RunError> {
    info!("loading configuration");
    let config = config::Config::load(cli.config.as_deref())?;

    info!("reading event payload");
    let event = event::PullRequestEvent::load(&cli.event_path)?;

    let excludes = filter::ExcludePatterns::parse(&config.review.exclude)?;
    if !excludes.is_empty() {
        info!(patterns = ?excludes.patterns(), "exclude patterns");
    }

    let github = pr::GitHubClient::new(&config.github)?;
    let completion = review::OpenAiClient::new(&config.openai)?;
    info!(model = %config.openai.model, endpoint = %config.openai.endpoint, "completion service configured");
    let client = review::ReviewClient::new(Box::new(completion));

    let outcome = Reviewer::new(&github, &client, &excludes)
        .dry_run(cli.dry_run)
        .run(&event)
        .await?;

    let built_report = report::build(&outcome);
    report::output(&built_report, cli.output.as_deref())?;
    info!(status = %outcome.status, comments = outcome.comments.len(), "done");

    Ok(())
}
