//! Language-service interaction: one prompt in, one JSON-shaped text out.
//!
//! The service sits behind the [`Summarizer`] trait so tests can answer
//! with canned text. The default implementation speaks the OpenAI-style
//! `chat/completions` protocol against any compatible endpoint, requesting
//! a strict JSON object via `response_format`.
//!
//! This module is intentionally thin: prompt wording lives in
//! [`crate::prompts`], parsing and the injection invariant live in
//! [`crate::pipeline::compose`]. There is exactly one request per run — no
//! streaming, no multi-turn context, no retry, no timeout override; the run
//! lives or dies with this call.

use crate::config::DigestConfig;
use crate::error::DigestError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Default model identifier sent to the service.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Default API base for the OpenAI-compatible endpoint.
pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";

/// Environment variable holding the service credential.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// A generative-language backend able to answer with JSON-shaped text.
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Send one instruction block and return the raw completion text.
    async fn complete_json(&self, prompt: &str) -> Result<String, DigestError>;
}

/// Default [`Summarizer`] over an OpenAI-compatible `chat/completions`
/// endpoint.
pub struct OpenAiSummarizer {
    client: reqwest::Client,
    api_base: String,
    api_key: Option<String>,
    model: String,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
}

impl OpenAiSummarizer {
    /// Build the summarizer from the run configuration.
    ///
    /// The credential is read once, here: the config value wins, else the
    /// `OPENAI_API_KEY` environment variable. A missing key is *not* an
    /// error at this point — the request goes out unauthenticated and the
    /// service's 401 reply surfaces as [`DigestError::Api`].
    pub fn from_config(config: &DigestConfig) -> Self {
        let api_key = config
            .api_key
            .clone()
            .or_else(|| std::env::var(API_KEY_ENV).ok());
        Self {
            client: reqwest::Client::new(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            api_key,
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }

    fn request_body<'a>(&'a self, prompt: &'a str) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            response_format: ResponseFormat {
                kind: "json_object",
            },
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }
}

#[async_trait]
impl Summarizer for OpenAiSummarizer {
    async fn complete_json(&self, prompt: &str) -> Result<String, DigestError> {
        let url = format!("{}/chat/completions", self.api_base);
        debug!("requesting completion from {url} with model {}", self.model);

        let mut request = self.client.post(&url).json(&self.request_body(prompt));
        if let Some(ref key) = self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(DigestError::Api { status, body });
        }

        let reply: ChatResponse = response.json().await?;
        reply
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or(DigestError::EmptyCompletion)
    }
}

// ── Wire types ───────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    response_format: ResponseFormat,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: MessageContent,
}

#[derive(Debug, Deserialize)]
struct MessageContent {
    content: String,
}
