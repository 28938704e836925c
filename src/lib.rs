//! # pdf-digest
//!
//! Turn a single PDF into a structured, human-readable digest: a short
//! summary plus a handful of labeled topics, composed by a generative
//! language model and grounded in unsupervised topic discovery over the
//! document's own text.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Extract  per-page text, noise filtering (pdf-extract, spawn_blocking)
//!  ├─ 2. Guard    fewer than 5 usable lines → "too sparse" error
//!  ├─ 3. Topics   TF-IDF term clustering → at most 5 ranked topic labels
//!  ├─ 4. Compose  prompt (clues + excerpt) → one LLM call → JSON object
//!  └─ 5. Inject   serverFilename + fullText, pipeline-owned, always last
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdf_digest::{digest, DigestConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Credential read from OPENAI_API_KEY.
//!     let config = DigestConfig::default();
//!     let result = digest("document.pdf", &config).await?;
//!     println!("{}", serde_json::to_string(&result)?);
//!     Ok(())
//! }
//! ```
//!
//! ## Swappable collaborators
//!
//! The three external black boxes sit behind traits, each replaceable via
//! [`DigestConfig`] — handy for tests and for pointing the summarizer at a
//! non-OpenAI endpoint:
//!
//! | Trait | Default | Covers |
//! |-------|---------|--------|
//! | [`TextSource`] | `pdf-extract` | PDF parsing |
//! | [`TopicModel`] | TF-IDF term clustering | topic discovery |
//! | [`Summarizer`] | OpenAI-style `chat/completions` | digest generation |
//!
//! ## Output contract
//!
//! A run produces exactly one JSON object: either the digest
//! (`{summary, topics, serverFilename, fullText}`) or `{error}`. The
//! `serverFilename` and `fullText` fields are always pipeline-controlled —
//! the language model cannot override them — while `summary` and `topics`
//! are passed through exactly as the model produced them.
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf-digest` binary (clap + dotenvy + tracing-subscriber) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod digest;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod prompts;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{DigestConfig, DigestConfigBuilder};
pub use digest::{digest, digest_from_bytes, digest_sync};
pub use error::{DigestError, TopicModelError};
pub use output::{Digest, ErrorReport, TopicCard};
pub use pipeline::extract::{DocumentCorpus, PdfTextSource, TextSource};
pub use pipeline::llm::{OpenAiSummarizer, Summarizer};
pub use pipeline::topics::{
    TermClusterModel, TopicDescriptor, TopicModel, TopicSummary, MAX_TOPIC_DESCRIPTORS,
    OUTLIER_TOPIC_ID,
};
