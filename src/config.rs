use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

pub const DEFAULT_CONFIG_FILE: &str = ".pr-reviewer.toml";
pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";
pub const DEFAULT_OPENAI_ENDPOINT: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4";
pub const DEFAULT_MAX_TOKENS: u32 = 700;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Process-wide settings, read once at startup and passed explicitly to the
/// GitHub client, the completion client and the reviewer.
///
/// All fields are optional in the file; credentials normally come from the
/// environment the CI runner provides.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub github: GitHubConfig,

    #[serde(default)]
    pub openai: OpenAiConfig,

    #[serde(default)]
    pub review: ReviewConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GitHubConfig {
    /// GitHub API token. Overridden by GITHUB_TOKEN.
    pub token: Option<String>,
    /// REST API base URL. Overridden by GITHUB_API_URL (set on GitHub Enterprise runners).
    #[serde(default = "default_github_api_url")]
    pub api_url: String,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            token: None,
            api_url: default_github_api_url(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpenAiConfig {
    /// Completion service key. Overridden by OPENAI_API_KEY.
    pub api_key: Option<String>,
    /// Base URL of an OpenAI-compatible API. Overridden by OPENAI_API_ENDPOINT.
    #[serde(default = "default_openai_endpoint")]
    pub endpoint: String,
    /// Model or deployment name. Overridden by OPENAI_API_MODEL.
    #[serde(default = "default_model")]
    pub model: String,
    /// Output-length cap per completion
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: default_openai_endpoint(),
            model: default_model(),
            max_tokens: default_max_tokens(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReviewConfig {
    /// Comma-separated glob patterns of files never sent for review.
    /// Overridden by INPUT_EXCLUDE (the action's `exclude` input).
    #[serde(default)]
    pub exclude: String,
}

fn default_github_api_url() -> String {
    DEFAULT_GITHUB_API_URL.to_string()
}

fn default_openai_endpoint() -> String {
    DEFAULT_OPENAI_ENDPOINT.to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_max_tokens() -> u32 {
    DEFAULT_MAX_TOKENS
}

impl Config {
    /// Load configuration from `path`, or from .pr-reviewer.toml in the current
    /// directory when no path is given (defaults if that file doesn't exist), then
    /// apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
        let mut config = match path {
            Some(path) => Self::load_from(path)?,
            None => {
                let path = Path::new(DEFAULT_CONFIG_FILE);
                if path.exists() {
                    Self::load_from(path)?
                } else {
                    Config::default()
                }
            }
        };

        config.apply_env(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Load from a specific path without consulting the environment.
    pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Overlay environment values. Empty values are ignored since CI runners
    /// export unset action inputs as "".
    fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        if let Some(token) = get("GITHUB_TOKEN") {
            self.github.token = Some(token);
        }
        if let Some(url) = get("GITHUB_API_URL") {
            self.github.api_url = url;
        }
        if let Some(key) = get("OPENAI_API_KEY") {
            self.openai.api_key = Some(key);
        }
        if let Some(endpoint) = get("OPENAI_API_ENDPOINT") {
            self.openai.endpoint = endpoint;
        }
        if let Some(model) = get("OPENAI_API_MODEL") {
            self.openai.model = model;
        }
        if let Some(exclude) = get("INPUT_EXCLUDE") {
            self.review.exclude = exclude;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.github.token.is_none());
        assert_eq!(config.github.api_url, "https://api.github.com");
        assert!(config.openai.api_key.is_none());
        assert_eq!(config.openai.model, "gpt-4");
        assert_eq!(config.openai.max_tokens, 700);
        assert!(config.review.exclude.is_empty());
    }

    #[test]
    fn test_parse_config_toml() {
        let toml_str = r#"
[openai]
endpoint = "https://example.openai.azure.com/openai/v1"
model = "gpt-4o"

[review]
exclude = "**/*.md, dist/**"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.openai.model, "gpt-4o");
        assert_eq!(config.openai.max_tokens, 700);
        assert_eq!(config.review.exclude, "**/*.md, dist/**");
        assert_eq!(config.github.api_url, "https://api.github.com");
    }

    #[test]
    fn test_env_overrides_file_values() {
        let mut config: Config = toml::from_str("[openai]\nmodel = \"gpt-4o\"\n").unwrap();
        let env: HashMap<&str, &str> = [
            ("GITHUB_TOKEN", "ghs_123"),
            ("OPENAI_API_KEY", "sk-test"),
            ("OPENAI_API_MODEL", "gpt-4-turbo"),
            ("INPUT_EXCLUDE", "*.lock"),
        ]
        .into_iter()
        .collect();

        config.apply_env(|name| env.get(name).map(|v| v.to_string()));

        assert_eq!(config.github.token.as_deref(), Some("ghs_123"));
        assert_eq!(config.openai.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.openai.model, "gpt-4-turbo");
        assert_eq!(config.review.exclude, "*.lock");
    }

    #[test]
    fn test_empty_env_values_are_ignored() {
        let mut config = Config::default();
        config.apply_env(|name| match name {
            "OPENAI_API_MODEL" | "INPUT_EXCLUDE" => Some(String::new()),
            _ => None,
        });
        assert_eq!(config.openai.model, "gpt-4");
        assert!(config.review.exclude.is_empty());
    }

    #[test]
    fn test_load_from_missing_file_is_an_error() {
        let path = std::env::temp_dir().join("gpt-pr-reviewer-does-not-exist.toml");
        assert!(matches!(Config::load_from(&path), Err(ConfigError::FileRead(_))));
    }
}
