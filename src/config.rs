//! Configuration for a digest run.
//!
//! Every knob lives in [`DigestConfig`], built via its
//! [`DigestConfigBuilder`]. One struct keeps a run's behavior inspectable
//! and makes two runs diffable when their outputs differ.
//!
//! The three external collaborators — PDF backend, topic model, language
//! service — are injectable here as trait objects. Leaving them `None`
//! selects the production defaults; tests substitute deterministic stubs
//! without touching the pipeline itself.

use crate::error::DigestError;
use crate::pipeline::extract::TextSource;
use crate::pipeline::llm::{Summarizer, DEFAULT_API_BASE, DEFAULT_MODEL};
use crate::pipeline::topics::TopicModel;
use std::fmt;
use std::sync::Arc;

/// Configuration for one PDF-to-digest run.
///
/// # Example
/// ```rust
/// use pdf_digest::DigestConfig;
///
/// let config = DigestConfig::builder()
///     .model("gpt-4o-mini")
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct DigestConfig {
    /// Model identifier sent to the language service. Default: `gpt-4o-mini`.
    pub model: String,

    /// Base URL of the OpenAI-compatible endpoint. Default:
    /// `https://api.openai.com/v1`. Point this at a local gateway to run
    /// against vLLM, Ollama, or a capture proxy.
    pub api_base: String,

    /// Explicit credential. `None` falls back to the `OPENAI_API_KEY`
    /// environment variable at summarizer construction; a key missing in
    /// both places is not an error until the service rejects the call.
    pub api_key: Option<String>,

    /// Sampling temperature. `None` (default) leaves it to the service.
    pub temperature: Option<f32>,

    /// Completion-length cap. `None` (default) leaves it to the service.
    pub max_tokens: Option<u32>,

    /// Minimum filtered lines for a document to be worth analyzing.
    /// Default: 5. Below this the run stops with the sparse-content error
    /// before any modeling work happens.
    pub min_lines: usize,

    /// Cluster-count target for the default topic model. Default: 6.
    /// The model may fit fewer; at most 5 topics reach the prompt either way.
    pub target_topics: usize,

    /// PDF backend override. Default: the `pdf-extract` source.
    pub text_source: Option<Arc<dyn TextSource>>,

    /// Topic-model override. Default: the term-clustering model.
    pub topic_model: Option<Arc<dyn TopicModel>>,

    /// Language-service override. Default: the OpenAI-style client.
    pub summarizer: Option<Arc<dyn Summarizer>>,
}

impl Default for DigestConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            api_key: None,
            temperature: None,
            max_tokens: None,
            min_lines: 5,
            target_topics: 6,
            text_source: None,
            topic_model: None,
            summarizer: None,
        }
    }
}

impl fmt::Debug for DigestConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DigestConfig")
            .field("model", &self.model)
            .field("api_base", &self.api_base)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("min_lines", &self.min_lines)
            .field("target_topics", &self.target_topics)
            .field("text_source", &self.text_source.as_ref().map(|_| "<dyn TextSource>"))
            .field("topic_model", &self.topic_model.as_ref().map(|_| "<dyn TopicModel>"))
            .field("summarizer", &self.summarizer.as_ref().map(|_| "<dyn Summarizer>"))
            .finish()
    }
}

impl DigestConfig {
    /// Create a new builder.
    pub fn builder() -> DigestConfigBuilder {
        DigestConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`DigestConfig`].
#[derive(Debug)]
pub struct DigestConfigBuilder {
    config: DigestConfig,
}

impl DigestConfigBuilder {
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn api_base(mut self, base: impl Into<String>) -> Self {
        self.config.api_base = base.into();
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = Some(key.into());
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = Some(t.clamp(0.0, 2.0));
        self
    }

    pub fn max_tokens(mut self, n: u32) -> Self {
        self.config.max_tokens = Some(n);
        self
    }

    pub fn min_lines(mut self, n: usize) -> Self {
        self.config.min_lines = n;
        self
    }

    pub fn target_topics(mut self, n: usize) -> Self {
        self.config.target_topics = n;
        self
    }

    pub fn text_source(mut self, source: Arc<dyn TextSource>) -> Self {
        self.config.text_source = Some(source);
        self
    }

    pub fn topic_model(mut self, model: Arc<dyn TopicModel>) -> Self {
        self.config.topic_model = Some(model);
        self
    }

    pub fn summarizer(mut self, summarizer: Arc<dyn Summarizer>) -> Self {
        self.config.summarizer = Some(summarizer);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<DigestConfig, DigestError> {
        let c = &self.config;
        if c.model.trim().is_empty() {
            return Err(DigestError::InvalidConfig("model must not be empty".into()));
        }
        if c.api_base.trim().is_empty() {
            return Err(DigestError::InvalidConfig(
                "api_base must not be empty".into(),
            ));
        }
        if c.min_lines == 0 {
            return Err(DigestError::InvalidConfig("min_lines must be ≥ 1".into()));
        }
        if c.target_topics == 0 {
            return Err(DigestError::InvalidConfig(
                "target_topics must be ≥ 1".into(),
            ));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = DigestConfig::builder().build().unwrap();
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.min_lines, 5);
        assert_eq!(config.target_topics, 6);
        assert!(config.summarizer.is_none());
    }

    #[test]
    fn temperature_is_clamped() {
        let config = DigestConfig::builder().temperature(9.0).build().unwrap();
        assert_eq!(config.temperature, Some(2.0));
    }

    #[test]
    fn zero_min_lines_is_rejected() {
        let err = DigestConfig::builder().min_lines(0).build().unwrap_err();
        assert!(matches!(err, DigestError::InvalidConfig(_)));
    }

    #[test]
    fn empty_model_is_rejected() {
        let err = DigestConfig::builder().model("  ").build().unwrap_err();
        assert!(matches!(err, DigestError::InvalidConfig(_)));
    }

    #[test]
    fn debug_redacts_credentials() {
        let config = DigestConfig::builder().api_key("sk-secret").build().unwrap();
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("sk-secret"));
        assert!(rendered.contains("<redacted>"));
    }
}
