//! Pipeline stages for PDF-to-digest analysis.
//!
//! Each submodule implements exactly one transformation step. Keeping
//! stages separate makes each independently testable and lets the three
//! external collaborators (PDF backend, topic model, language service) be
//! swapped behind their traits without touching the other stages.
//!
//! ## Data Flow
//!
//! ```text
//! extract ──▶ topics ──▶ compose
//! (pdf text)  (clusters)  (prompt + LLM + inject)
//! ```
//!
//! 1. [`extract`] — per-page text via the [`extract::TextSource`] backend,
//!    noise filtering, corpus assembly; runs under `spawn_blocking` because
//!    PDF parsing is CPU-bound
//! 2. [`topics`]  — TF-IDF term clustering over the line sequence, yielding
//!    at most five ranked topic descriptors
//! 3. [`llm`]     — the single language-service round trip; the only stage
//!    with network I/O
//! 4. [`compose`] — prompt assembly, reply parsing, and the pipeline-owned
//!    field injection
//!
//! The sparse-content guard between extraction and topic modeling is owned
//! by the driver in [`crate::digest`].

pub mod compose;
pub mod extract;
pub mod llm;
pub mod topics;
