use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use thiserror::Error;
use tracing::debug;

use crate::pr::ParsedFile;

#[derive(Debug, Error)]
pub enum FilterError {
    #[error("Invalid exclude pattern `{pattern}`: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },
}

/// Compiled exclude globs. `*` does not cross `/`; use `**` for that.
#[derive(Debug, Clone)]
pub struct ExcludePatterns {
    patterns: Vec<String>,
    set: GlobSet,
}

impl ExcludePatterns {
    /// Compile a comma-separated pattern list. Entries are trimmed, empty ones skipped.
    pub fn parse(list: &str) -> Result<Self, FilterError> {
        let mut builder = GlobSetBuilder::new();
        let mut patterns = Vec::new();

        for pattern in list.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let glob = GlobBuilder::new(pattern)
                .literal_separator(true)
                .build()
                .map_err(|source| FilterError::InvalidPattern {
                    pattern: pattern.to_string(),
                    source,
                })?;
            builder.add(glob);
            patterns.push(pattern.to_string());
        }

        let set = builder.build().map_err(|source| FilterError::InvalidPattern {
            pattern: list.to_string(),
            source,
        })?;
        Ok(Self { patterns, set })
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    pub fn is_excluded(&self, path: &str) -> bool {
        self.set.is_match(path)
    }
}

/// Drop every file whose target path matches an exclude pattern.
/// Deleted files are matched by the empty path.
pub fn filter_files(files: Vec<ParsedFile>, excludes: &ExcludePatterns) -> Vec<ParsedFile> {
    files
        .into_iter()
        .filter(|file| {
            let excluded = excludes.is_excluded(file.match_path());
            if excluded {
                debug!(path = %file.match_path(), "excluded by pattern");
            }
            !excluded
        })
        .collect()
}
