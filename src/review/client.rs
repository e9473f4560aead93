use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, instrument, trace, warn};

use super::types::ReviewSuggestion;
use super::{CompletionService, ReviewError};
use crate::config::OpenAiConfig;

/// Sampling settings applied to every review request.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationSettings {
    pub model: String,
    pub temperature: f32,
    pub top_p: f32,
    pub frequency_penalty: f32,
    pub presence_penalty: f32,
    pub max_tokens: u32,
}

impl GenerationSettings {
    pub fn from_config(config: &OpenAiConfig) -> Self {
        Self {
            model: config.model.clone(),
            temperature: 0.2,
            top_p: 1.0,
            frequency_penalty: 0.0,
            presence_penalty: 0.0,
            max_tokens: config.max_tokens,
        }
    }
}

/// Chat-completions client for OpenAI and OpenAI-compatible endpoints.
pub struct OpenAiClient {
    client: reqwest::Client,
    api_key: String,
    url_chat: String,
    settings: GenerationSettings,
}

impl OpenAiClient {
    pub fn new(config: &OpenAiConfig) -> Result<Self, ReviewError> {
        let api_key = config.api_key.clone().ok_or(ReviewError::MissingApiKey)?;
        let endpoint = config.endpoint.trim();
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            return Err(ReviewError::InvalidEndpoint(config.endpoint.clone()));
        }

        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            url_chat: format!("{}/chat/completions", endpoint.trim_end_matches('/')),
            settings: GenerationSettings::from_config(config),
        })
    }
}

#[async_trait]
impl CompletionService for OpenAiClient {
    #[instrument(skip(self, prompt), fields(model = %self.settings.model, prompt_len = prompt.len()))]
    async fn complete(&self, prompt: &str) -> Result<String, ReviewError> {
        let started = Instant::now();
        let body = ChatCompletionRequest::new(&self.settings, prompt);

        debug!("POST {}", self.url_chat);
        let response = self
            .client
            .post(&self.url_chat)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ReviewError::Status {
                status,
                snippet: snippet(&text),
            });
        }

        let out: ChatCompletionResponse = response.json().await?;
        let content = out
            .choices
            .into_iter()
            .next()
            .ok_or(ReviewError::EmptyChoices)?
            .message
            .content
            .unwrap_or_default();

        debug!(
            latency_ms = started.elapsed().as_millis(),
            reply_len = content.len(),
            "chat completion completed"
        );
        Ok(content)
    }
}

/// Request body for `/chat/completions`. The prompt is the only message.
#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    temperature: f32,
    top_p: f32,
    frequency_penalty: f32,
    presence_penalty: f32,
    max_tokens: u32,
    messages: [ChatMessage<'a>; 1],
}

impl<'a> ChatCompletionRequest<'a> {
    fn new(settings: &'a GenerationSettings, prompt: &'a str) -> Self {
        Self {
            model: &settings.model,
            temperature: settings.temperature,
            top_p: settings.top_p,
            frequency_penalty: settings.frequency_penalty,
            presence_penalty: settings.presence_penalty,
            max_tokens: settings.max_tokens,
            messages: [ChatMessage {
                role: "system",
                content: prompt,
            }],
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessageOut,
}

#[derive(Debug, Deserialize)]
struct ChatMessageOut {
    content: Option<String>,
}

fn snippet(text: &str) -> String {
    const MAX: usize = 300;
    match text.char_indices().nth(MAX) {
        Some((cut, _)) => format!("{}…", &text[..cut]),
        None => text.to_string(),
    }
}

/// Fault-isolating boundary around the completion service.
///
/// `review` never fails: transport errors and replies that are not a suggestion
/// list both come back as `None`, so one bad chunk cannot stop the run.
pub struct ReviewClient {
    service: Box<dyn CompletionService>,
}

impl ReviewClient {
    pub fn new(service: Box<dyn CompletionService>) -> Self {
        Self { service }
    }

    pub async fn review(&self, prompt: &str) -> Option<Vec<ReviewSuggestion>> {
        let reply = match self.service.complete(prompt).await {
            Ok(reply) => reply,
            Err(err) => {
                warn!(error = %err, "completion request failed, skipping chunk");
                return None;
            }
        };
        trace!(reply = %reply, "completion reply");

        let parsed = parse_suggestions(&reply);
        if parsed.is_none() {
            warn!(reply_len = reply.len(), "completion reply is not a suggestion list, skipping chunk");
        }
        parsed
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SuggestionReply {
    List(Vec<ReviewSuggestion>),
    Wrapped { reviews: Vec<ReviewSuggestion> },
}

/// Interpret a raw model reply. Accepts a bare JSON array or `{"reviews": [...]}`,
/// optionally inside a markdown code fence. Anything else is `None`.
pub fn parse_suggestions(reply: &str) -> Option<Vec<ReviewSuggestion>> {
    let text = strip_code_fence(reply.trim());
    if text.is_empty() {
        return None;
    }
    match serde_json::from_str::<SuggestionReply>(text) {
        Ok(SuggestionReply::List(suggestions)) => Some(suggestions),
        Ok(SuggestionReply::Wrapped { reviews }) => Some(reviews),
        Err(err) => {
            debug!(error = %err, "failed to decode suggestions");
            None
        }
    }
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    // Drop the info string (e.g. `json`) on the opening line.
    let body = rest.split_once('\n').map_or("", |(_, body)| body);
    body.trim_end()
        .strip_suffix("```")
        .unwrap_or(body)
        .trim()
}
