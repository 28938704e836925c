//! Prompt templates for digest composition.
//!
//! Every piece of instruction text lives here so the wording can change
//! without touching request or parsing logic, and so tests can inspect the
//! exact prompt a given corpus produces without calling a real service.

use crate::pipeline::topics::TopicDescriptor;

/// How much of the corpus is quoted into the prompt, in characters.
pub const EXCERPT_CHARS: usize = 5_000;

/// Fixed role/task statement and required output shape.
///
/// The service is asked for a strict JSON object; the shape of `summary`
/// and `topics` described here is a request, not something the pipeline
/// validates afterwards.
pub const DIGEST_INSTRUCTIONS: &str = r#"You are a document assistant. Generate JSON from the information below.

1. "summary": a 100-200 character overview of the document, in a friendly tone.
2. "topics": an array of 3-5 core topics, each an object with "emoji", "title", and "description"."#;

/// Heading for the clue lines contributed by the topic model.
pub const TOPIC_CLUES_HEADING: &str = "[Algorithm-extracted topic clues]:";

/// Heading for the quoted document text.
pub const EXCERPT_HEADING: &str = "[Document excerpt]:";

/// Marker appended to the excerpt so the model knows it saw a prefix.
pub const TRUNCATION_MARKER: &str = "… (truncated)";

/// Render the `- <name>` clue lines for the kept topics.
///
/// An empty descriptor set renders no lines; the heading still appears so
/// the prompt shape stays stable.
pub fn render_clue_lines(topics: &[TopicDescriptor]) -> String {
    let mut block = String::from(TOPIC_CLUES_HEADING);
    for topic in topics {
        block.push_str("\n- ");
        block.push_str(&topic.name);
    }
    block
}

/// Assemble the full instruction block for one document.
///
/// Quotes at most [`EXCERPT_CHARS`] characters of `corpus_text` and always
/// appends the truncation marker, mirroring how the excerpt is presented
/// even when the document is short.
pub fn build_digest_prompt(topics: &[TopicDescriptor], corpus_text: &str) -> String {
    let excerpt: String = corpus_text.chars().take(EXCERPT_CHARS).collect();
    format!(
        "{instructions}\n\n{clues}\n{excerpt_heading}\n{excerpt}{marker}",
        instructions = DIGEST_INSTRUCTIONS,
        clues = render_clue_lines(topics),
        excerpt_heading = EXCERPT_HEADING,
        excerpt = excerpt,
        marker = TRUNCATION_MARKER,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn topic(id: i32, name: &str) -> TopicDescriptor {
        TopicDescriptor {
            id,
            name: name.to_string(),
        }
    }

    #[test]
    fn clue_lines_render_one_dash_per_topic() {
        let block = render_clue_lines(&[topic(0, "0_apple_cider"), topic(1, "1_rust_compiler")]);
        assert!(block.starts_with(TOPIC_CLUES_HEADING));
        assert!(block.contains("\n- 0_apple_cider"));
        assert!(block.contains("\n- 1_rust_compiler"));
    }

    #[test]
    fn prompt_contains_all_sections() {
        let prompt = build_digest_prompt(&[topic(0, "0_alpha_beta")], "body text of the document");
        assert!(prompt.contains(DIGEST_INSTRUCTIONS));
        assert!(prompt.contains("- 0_alpha_beta"));
        assert!(prompt.contains(EXCERPT_HEADING));
        assert!(prompt.contains("body text of the document"));
        assert!(prompt.ends_with(TRUNCATION_MARKER));
    }

    #[test]
    fn excerpt_is_capped_at_five_thousand_chars() {
        let corpus = "y".repeat(20_000);
        let prompt = build_digest_prompt(&[], &corpus);
        let quoted = prompt.matches('y').count();
        assert_eq!(quoted, EXCERPT_CHARS);
    }

    #[test]
    fn truncation_marker_present_even_for_short_documents() {
        let prompt = build_digest_prompt(&[], "short");
        assert!(prompt.ends_with(TRUNCATION_MARKER));
    }
}
