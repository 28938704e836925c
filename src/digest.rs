//! Top-level pipeline driver.
//!
//! One call runs the whole sequence: extract → content guard → topic model
//! → compose. Each run is an isolated one-shot transformation — nothing is
//! cached or shared across invocations, and a run yields exactly one
//! [`Digest`] or one [`DigestError`], never a mixture.
//!
//! Extraction and clustering are CPU-bound and run under
//! `tokio::task::spawn_blocking`; the service call is the only await on
//! network I/O. There is no intra-run concurrency beyond that hygiene.

use crate::config::DigestConfig;
use crate::error::DigestError;
use crate::output::Digest;
use crate::pipeline::compose::compose_digest;
use crate::pipeline::extract::{self, DocumentCorpus, PdfTextSource, TextSource};
use crate::pipeline::llm::{OpenAiSummarizer, Summarizer};
use crate::pipeline::topics::{discover_topics, TermClusterModel, TopicModel};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Analyze a PDF file and produce its digest.
///
/// This is the primary entry point for the library.
///
/// # Errors
///
/// * [`DigestError::ContentTooSparse`] — fewer than `config.min_lines`
///   usable lines survived filtering. Unreadable and corrupt files land
///   here too; extraction failures are never surfaced distinctly.
/// * [`DigestError::Topics`] — the topic model could not converge.
/// * [`DigestError::Service`] / [`DigestError::Api`] /
///   [`DigestError::MalformedResponse`] — the language-service round trip
///   failed or produced unusable output.
pub async fn digest(
    input: impl AsRef<Path>,
    config: &DigestConfig,
) -> Result<Digest, DigestError> {
    let path = input.as_ref().to_path_buf();
    let server_filename = display_name(&path);
    info!("analyzing {}", path.display());

    // ── Extract ──────────────────────────────────────────────────────────
    let source = resolve_text_source(config);
    let corpus = {
        let source = Arc::clone(&source);
        let path = path.clone();
        tokio::task::spawn_blocking(move || extract::corpus_from_file(source.as_ref(), &path))
            .await
            .map_err(|e| DigestError::Internal(format!("extraction task failed: {e}")))?
    };

    run_stages(corpus, server_filename, config).await
}

/// Analyze a PDF already in memory.
///
/// `display_name` is injected as `serverFilename` since no path exists to
/// derive it from.
pub async fn digest_from_bytes(
    bytes: &[u8],
    display_name: impl Into<String>,
    config: &DigestConfig,
) -> Result<Digest, DigestError> {
    let source = resolve_text_source(config);
    let corpus = {
        let source = Arc::clone(&source);
        let bytes = bytes.to_vec();
        tokio::task::spawn_blocking(move || extract::corpus_from_bytes(source.as_ref(), &bytes))
            .await
            .map_err(|e| DigestError::Internal(format!("extraction task failed: {e}")))?
    };

    run_stages(corpus, display_name.into(), config).await
}

/// Synchronous wrapper around [`digest`].
///
/// Creates a temporary tokio runtime internally.
pub fn digest_sync(
    input: impl AsRef<Path>,
    config: &DigestConfig,
) -> Result<Digest, DigestError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| DigestError::Internal(format!("failed to create tokio runtime: {e}")))?
        .block_on(digest(input, config))
}

// ── Internal helpers ─────────────────────────────────────────────────────

/// Content guard, topic modeling, and composition — shared by both entry
/// points once a corpus exists.
async fn run_stages(
    corpus: DocumentCorpus,
    server_filename: String,
    config: &DigestConfig,
) -> Result<Digest, DigestError> {
    // ── Content guard ────────────────────────────────────────────────────
    if corpus.lines.len() < config.min_lines {
        return Err(DigestError::ContentTooSparse {
            lines: corpus.lines.len(),
        });
    }
    info!("corpus has {} lines, {} chars", corpus.lines.len(), corpus.text.chars().count());

    // ── Topic model ──────────────────────────────────────────────────────
    let model = resolve_topic_model(config);
    let topics = {
        let lines = corpus.lines.clone();
        tokio::task::spawn_blocking(move || discover_topics(model.as_ref(), &lines))
            .await
            .map_err(|e| DigestError::Internal(format!("topic-model task failed: {e}")))??
    };
    info!("discovered {} topic(s)", topics.len());

    // ── Compose ──────────────────────────────────────────────────────────
    let summarizer = resolve_summarizer(config);
    let digest = compose_digest(summarizer.as_ref(), &topics, &corpus.text, &server_filename).await?;
    info!("digest composed for {server_filename}");
    Ok(digest)
}

fn resolve_text_source(config: &DigestConfig) -> Arc<dyn TextSource> {
    config
        .text_source
        .clone()
        .unwrap_or_else(|| Arc::new(PdfTextSource))
}

fn resolve_topic_model(config: &DigestConfig) -> Arc<dyn TopicModel> {
    config.topic_model.clone().unwrap_or_else(|| {
        Arc::new(TermClusterModel {
            target_topics: config.target_topics,
            ..TermClusterModel::default()
        })
    })
}

fn resolve_summarizer(config: &DigestConfig) -> Arc<dyn Summarizer> {
    config
        .summarizer
        .clone()
        .unwrap_or_else(|| Arc::new(OpenAiSummarizer::from_config(config)))
}

/// Base name of the input path, falling back to the path itself for inputs
/// with no final component.
fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
