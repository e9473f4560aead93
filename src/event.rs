use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::pr::RepoRef;

#[derive(Debug, Error)]
pub enum EventError {
    #[error("Failed to read event payload: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Malformed event payload: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("`synchronize` event is missing the `{0}` commit")]
    MissingCommit(&'static str),
}

/// What happened to the pull request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    Opened,
    Synchronize { before: String, after: String },
    /// Any other action (closed, edited, labeled, ...); the run does nothing.
    Other(String),
}

/// The triggering pull-request event, validated at entry.
#[derive(Debug, Clone)]
pub struct PullRequestEvent {
    pub repo: RepoRef,
    pub number: u64,
    pub kind: EventKind,
}

#[derive(Deserialize)]
struct RawEvent {
    action: String,
    number: u64,
    repository: RawRepository,
    before: Option<String>,
    after: Option<String>,
}

#[derive(Deserialize)]
struct RawRepository {
    name: String,
    owner: RawOwner,
}

#[derive(Deserialize)]
struct RawOwner {
    login: String,
}

impl PullRequestEvent {
    /// Read the payload the CI runner wrote to `path` (GITHUB_EVENT_PATH).
    pub fn load(path: &Path) -> Result<Self, EventError> {
        let contents = fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    pub fn parse(payload: &str) -> Result<Self, EventError> {
        let raw: RawEvent = serde_json::from_str(payload)?;

        let kind = match raw.action.as_str() {
            "opened" => EventKind::Opened,
            "synchronize" => EventKind::Synchronize {
                before: raw.before.ok_or(EventError::MissingCommit("before"))?,
                after: raw.after.ok_or(EventError::MissingCommit("after"))?,
            },
            _ => EventKind::Other(raw.action),
        };

        Ok(Self {
            repo: RepoRef {
                owner: raw.repository.owner.login,
                repo: raw.repository.name,
            },
            number: raw.number,
            kind,
        })
    }
}
