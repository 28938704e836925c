//! Error types for the pdf-digest library.
//!
//! Two error types reflect the two layers that can fail:
//!
//! * [`DigestError`] — a pipeline run cannot produce a digest (no usable
//!   content, service failure, unparseable reply). Returned as
//!   `Err(DigestError)` from the top-level `digest*` functions. The CLI
//!   turns each of these into the `{"error": …}` payload and exit code 1.
//!
//! * [`TopicModelError`] — the topic model could not be fitted at all
//!   (degenerate input). Wrapped into [`DigestError::Topics`] on the way up;
//!   there is no fallback topic list — a model that cannot converge fails
//!   the run.
//!
//! Extraction failures are deliberately absent here: a PDF that cannot be
//! read yields zero lines and surfaces as [`DigestError::ContentTooSparse`],
//! so callers see one uniform "nothing to analyze" case whether the file was
//! corrupt, encrypted, or genuinely empty.

use thiserror::Error;

/// All errors returned by the pdf-digest library.
#[derive(Debug, Error)]
pub enum DigestError {
    // ── Usage errors ──────────────────────────────────────────────────────
    /// No input path was supplied on the command line.
    #[error("missing PDF file path")]
    MissingInput,

    // ── Content errors ────────────────────────────────────────────────────
    /// Fewer than the required number of usable lines survived filtering.
    ///
    /// Also covers unreadable, corrupt, and encrypted PDFs — extraction
    /// failures are normalized to zero lines before this guard runs.
    #[error("PDF content too sparse to analyze")]
    ContentTooSparse {
        /// Lines that survived filtering (diagnostic only; not displayed).
        lines: usize,
    },

    // ── Modeling errors ───────────────────────────────────────────────────
    /// The topic model could not be fitted over the extracted lines.
    #[error("topic modeling failed: {0}")]
    Topics(#[from] TopicModelError),

    // ── Service errors ────────────────────────────────────────────────────
    /// The HTTP round trip to the language service failed outright.
    #[error("language service request failed: {0}")]
    Service(#[from] reqwest::Error),

    /// The language service answered with a non-success status.
    #[error("language service error {status}: {body}")]
    Api { status: u16, body: String },

    /// The service reply was not a parseable JSON object.
    #[error("language service returned malformed JSON: {detail}")]
    MalformedResponse { detail: String },

    /// The service reply carried no completion at all.
    #[error("language service returned no completion choices")]
    EmptyCompletion,

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error (runtime construction, task join).
    #[error("internal error: {0}")]
    Internal(String),
}

/// Errors from fitting the term-clustering topic model.
///
/// These correspond to input the model cannot converge on; they propagate
/// to the pipeline driver unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TopicModelError {
    /// Every candidate term was filtered out before vectorization.
    #[error("empty vocabulary; perhaps the lines only contain stop words")]
    EmptyVocabulary,

    /// The model was handed too few lines to cluster.
    #[error("not enough lines to fit a topic model ({got} provided)")]
    NotEnoughLines { got: usize },
}
