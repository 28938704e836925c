//! Digest composition: topic clues + corpus → validated digest payload.
//!
//! Builds the instruction block, makes the single service call, parses the
//! reply as a JSON object, and applies the one invariant the pipeline
//! enforces on the result: `serverFilename` and `fullText` are set by the
//! pipeline, last, unconditionally — a reply that tries to supply its own
//! values for those keys loses. Model-produced `summary`/`topics` content
//! is passed through without shape validation; that boundary belongs to
//! the consumer.

use crate::error::DigestError;
use crate::output::Digest;
use crate::pipeline::llm::Summarizer;
use crate::pipeline::topics::TopicDescriptor;
use crate::prompts::build_digest_prompt;
use serde_json::{Map, Value};
use tracing::debug;

/// Compose the digest for one document.
///
/// `corpus_text` is the capped corpus string; it is both quoted (in part)
/// into the prompt and injected verbatim as `fullText`. `server_filename`
/// is the base name of the input, injected as `serverFilename`.
pub async fn compose_digest(
    summarizer: &dyn Summarizer,
    topics: &[TopicDescriptor],
    corpus_text: &str,
    server_filename: &str,
) -> Result<Digest, DigestError> {
    let prompt = build_digest_prompt(topics, corpus_text);
    debug!("prompt is {} chars", prompt.chars().count());

    let reply = summarizer.complete_json(&prompt).await?;
    let body = parse_object(&reply)?;

    Ok(Digest::from_parts(body, server_filename, corpus_text))
}

/// Parse the reply as a JSON object, rejecting anything else.
///
/// A bare array or string may be syntactically valid JSON but gives the
/// injection step nothing to attach fields to, so it is malformed here.
fn parse_object(reply: &str) -> Result<Map<String, Value>, DigestError> {
    match serde_json::from_str::<Value>(reply) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(DigestError::MalformedResponse {
            detail: format!("expected a JSON object, got {}", json_kind(&other)),
        }),
        Err(e) => Err(DigestError::MalformedResponse {
            detail: e.to_string(),
        }),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
