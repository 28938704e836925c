//! Output types: the digest payload and the error payload.
//!
//! A run emits exactly one of the two shapes, never a mixture:
//!
//! * [`Digest`] — `{summary, topics: [{emoji, title, description}, …],
//!   serverFilename, fullText}`
//! * [`ErrorReport`] — `{error}`
//!
//! `Digest` wraps the language service's parsed JSON object **as-is**: the
//! pipeline does not validate that `summary` or `topics` exist or have the
//! right shape — that is the consumer's job. What the pipeline does own are
//! the two metadata fields: `serverFilename` and `fullText` are injected by
//! [`Digest::from_parts`] and overwrite any same-named field the model may
//! have produced. There is no way to construct a `Digest` without that
//! overwrite happening.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Pipeline-owned key: base name of the input file.
pub(crate) const KEY_SERVER_FILENAME: &str = "serverFilename";
/// Pipeline-owned key: the capped corpus string.
pub(crate) const KEY_FULL_TEXT: &str = "fullText";

/// The final digest payload for one document.
///
/// Serializes transparently as the underlying JSON object, so whatever the
/// language service produced (plus the two injected fields) reaches the
/// consumer unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Digest {
    body: Map<String, Value>,
}

/// One topic entry as consumers expect it.
///
/// This is a *view* type: [`Digest::topics`] deserializes into it on a
/// best-effort basis, skipping entries that don't match. It is not used to
/// validate the service reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicCard {
    pub emoji: String,
    pub title: String,
    pub description: String,
}

impl Digest {
    /// Assemble the digest from the parsed service reply plus the two
    /// pipeline-controlled fields.
    ///
    /// The inserts happen last and unconditionally: a reply that already
    /// carries `serverFilename` or `fullText` has those values discarded.
    pub(crate) fn from_parts(
        mut body: Map<String, Value>,
        server_filename: &str,
        full_text: &str,
    ) -> Self {
        body.insert(
            KEY_SERVER_FILENAME.to_string(),
            Value::String(server_filename.to_string()),
        );
        body.insert(KEY_FULL_TEXT.to_string(), Value::String(full_text.to_string()));
        Self { body }
    }

    /// The model-produced summary, if one with the expected shape exists.
    pub fn summary(&self) -> Option<&str> {
        self.body.get("summary").and_then(Value::as_str)
    }

    /// The model-produced topics that match the expected entry shape.
    pub fn topics(&self) -> Vec<TopicCard> {
        self.body
            .get("topics")
            .and_then(Value::as_array)
            .map(|entries| {
                entries
                    .iter()
                    .filter_map(|v| serde_json::from_value(v.clone()).ok())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Base name of the input file. Always present; always pipeline-set.
    pub fn server_filename(&self) -> &str {
        self.body
            .get(KEY_SERVER_FILENAME)
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    /// The capped corpus string. Always present; always pipeline-set.
    pub fn full_text(&self) -> &str {
        self.body
            .get(KEY_FULL_TEXT)
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    /// The raw payload, for consumers that want untyped access.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.body
    }
}

/// The error payload: a single human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorReport {
    pub error: String,
}

impl ErrorReport {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body(v: Value) -> Map<String, Value> {
        v.as_object().expect("test body must be an object").clone()
    }

    #[test]
    fn injected_fields_overwrite_model_output() {
        let reply = body(json!({
            "summary": "a short overview",
            "serverFilename": "spoofed.pdf",
            "fullText": "spoofed corpus",
        }));
        let digest = Digest::from_parts(reply, "report.pdf", "the real corpus");
        assert_eq!(digest.server_filename(), "report.pdf");
        assert_eq!(digest.full_text(), "the real corpus");
        assert_eq!(digest.summary(), Some("a short overview"));
    }

    #[test]
    fn serializes_with_camel_case_metadata_keys() {
        let digest = Digest::from_parts(body(json!({"summary": "s"})), "a.pdf", "text");
        let out = serde_json::to_value(&digest).unwrap();
        assert_eq!(out["serverFilename"], "a.pdf");
        assert_eq!(out["fullText"], "text");
        assert!(out.get("error").is_none());
    }

    #[test]
    fn topics_view_skips_malformed_entries() {
        let digest = Digest::from_parts(
            body(json!({
                "topics": [
                    {"emoji": "📄", "title": "Intro", "description": "Opening material"},
                    {"title": "missing emoji"},
                    "not even an object",
                ]
            })),
            "a.pdf",
            "",
        );
        let topics = digest.topics();
        assert_eq!(topics.len(), 1);
        assert_eq!(topics[0].title, "Intro");
    }

    #[test]
    fn missing_topics_key_passes_through() {
        let digest = Digest::from_parts(body(json!({"summary": "only"})), "a.pdf", "");
        assert!(digest.topics().is_empty());
        // The unvalidated body is preserved as-is.
        assert!(digest.as_map().get("topics").is_none());
    }

    #[test]
    fn error_report_shape() {
        let report = ErrorReport::new("PDF content too sparse to analyze");
        let out = serde_json::to_value(&report).unwrap();
        assert_eq!(out, json!({"error": "PDF content too sparse to analyze"}));
    }
}
