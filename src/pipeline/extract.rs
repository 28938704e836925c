//! Text extraction: PDF bytes → filtered line corpus.
//!
//! The PDF backend sits behind the [`TextSource`] trait so tests can feed
//! fixed pages. The default backend is `pdf-extract`, which can panic on
//! malformed input rather than returning an error; calls are wrapped in
//! [`std::panic::catch_unwind`] and every failure mode — unreadable file,
//! corrupt structure, extraction panic, encrypted document — collapses to
//! "no pages". The sparse-content guard downstream is then the single place
//! a user learns the document had nothing usable in it.
//!
//! ## Line filtering
//!
//! Per page, text splits on `\n` and a line survives only if, after
//! trimming, it is at least 10 characters long and is not a pagination
//! footer (`Page <n> of <m>`, matched case-sensitively). Page boundaries
//! are then discarded: the corpus is one flat, ordered line sequence.

use once_cell::sync::Lazy;
use regex::Regex;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use tracing::{debug, warn};

/// Minimum trimmed length for a line to count as body text.
pub const MIN_LINE_CHARS: usize = 10;

/// Hard cap on the concatenated corpus string, in characters.
pub const MAX_CORPUS_CHARS: usize = 120_000;

/// Pagination footers like `Page 3 of 12`, anywhere in the line.
/// The `Page` token is matched case-sensitively.
static PAGINATION_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"Page \d+ of \d+").unwrap());

/// A source of per-page text for one document.
///
/// Infallible by contract: a backend that cannot read the document returns
/// no pages, and the pipeline's content guard handles the rest. A page with
/// no extractable text may be returned as an empty string or omitted.
pub trait TextSource: Send + Sync {
    /// Extract one text blob per page, in page order.
    fn page_texts(&self, bytes: &[u8]) -> Vec<String>;
}

/// Default [`TextSource`] over the `pdf-extract` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfTextSource;

impl TextSource for PdfTextSource {
    fn page_texts(&self, bytes: &[u8]) -> Vec<String> {
        // Owned copy for the unwind boundary.
        let data = bytes.to_vec();
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            pdf_extract::extract_text_from_mem_by_pages(&data)
        }));
        match result {
            Ok(Ok(pages)) => pages,
            Ok(Err(e)) => {
                warn!("PDF extraction failed, treating as empty: {e}");
                Vec::new()
            }
            Err(_) => {
                warn!("PDF extraction panicked (malformed document), treating as empty");
                Vec::new()
            }
        }
    }
}

/// The cleaned text of one document: filtered lines plus the capped
/// concatenation used for prompting. Built once per run, read-only after.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentCorpus {
    /// Surviving lines across all pages, page order preserved.
    pub lines: Vec<String>,
    /// Lines joined with `\n`, truncated to [`MAX_CORPUS_CHARS`] characters.
    pub text: String,
}

impl DocumentCorpus {
    /// Build the corpus from already-filtered lines.
    pub fn from_lines(lines: Vec<String>) -> Self {
        let joined = lines.join("\n");
        let text = truncate_chars(&joined, MAX_CORPUS_CHARS).to_string();
        Self { lines, text }
    }
}

/// Whether a trimmed line counts as body text.
fn keeps_line(trimmed: &str) -> bool {
    !PAGINATION_RE.is_match(trimmed) && trimmed.chars().count() >= MIN_LINE_CHARS
}

/// Run the line filter over per-page text blobs.
pub fn filter_pages(pages: &[String]) -> Vec<String> {
    let mut lines = Vec::new();
    for page in pages {
        for line in page.split('\n') {
            let trimmed = line.trim();
            if keeps_line(trimmed) {
                lines.push(trimmed.to_string());
            }
        }
    }
    lines
}

/// Extract the corpus for a document already in memory.
pub fn corpus_from_bytes(source: &dyn TextSource, bytes: &[u8]) -> DocumentCorpus {
    let pages = source.page_texts(bytes);
    debug!("extracted {} page(s)", pages.len());
    let lines = filter_pages(&pages);
    debug!("{} line(s) survived filtering", lines.len());
    DocumentCorpus::from_lines(lines)
}

/// Extract the corpus for a document on disk.
///
/// A file that cannot be read yields an empty corpus, not an error — the
/// caller's content guard reports it uniformly.
pub fn corpus_from_file(source: &dyn TextSource, path: &Path) -> DocumentCorpus {
    match std::fs::read(path) {
        Ok(bytes) => corpus_from_bytes(source, &bytes),
        Err(e) => {
            warn!("could not read {}: {e}", path.display());
            DocumentCorpus::from_lines(Vec::new())
        }
    }
}

/// Truncate to at most `max_chars` characters on a char boundary.
fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &s[..byte_idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(lines: &[&str]) -> String {
        lines.join("\n")
    }

    #[test]
    fn short_lines_are_dropped() {
        let pages = vec![page(&["tiny", "this line is long enough", "12345678", "123456789x"])];
        let lines = filter_pages(&pages);
        assert_eq!(lines, vec!["this line is long enough", "123456789x"]);
    }

    #[test]
    fn length_check_runs_after_trimming() {
        // 9 payload chars padded with whitespace: must still be dropped.
        let pages = vec![page(&["   123456789      "])];
        assert!(filter_pages(&pages).is_empty());
    }

    #[test]
    fn pagination_footers_are_dropped() {
        let pages = vec![page(&[
            "Page 3 of 12",
            "Printed on Page 7 of 7 for review",
            "page 3 of 12 lowercased survives",
        ])];
        let lines = filter_pages(&pages);
        // The literal `Page` token is case-sensitive.
        assert_eq!(lines, vec!["page 3 of 12 lowercased survives"]);
    }

    #[test]
    fn order_is_preserved_across_pages() {
        let pages = vec![
            page(&["first page line one", "first page line two"]),
            page(&[]),
            page(&["second page line one"]),
        ];
        let lines = filter_pages(&pages);
        assert_eq!(
            lines,
            vec![
                "first page line one",
                "first page line two",
                "second page line one"
            ]
        );
    }

    #[test]
    fn corpus_text_is_capped_not_errored() {
        let long = "x".repeat(1_000);
        let lines: Vec<String> = (0..200).map(|_| long.clone()).collect();
        let corpus = DocumentCorpus::from_lines(lines);
        assert_eq!(corpus.text.chars().count(), MAX_CORPUS_CHARS);
        assert_eq!(corpus.lines.len(), 200);
    }

    #[test]
    fn corpus_cap_respects_char_boundaries() {
        // Multi-byte content must not split a code point.
        let lines: Vec<String> = (0..20_000).map(|_| "ééééééé".to_string()).collect();
        let corpus = DocumentCorpus::from_lines(lines);
        assert_eq!(corpus.text.chars().count(), MAX_CORPUS_CHARS);
        // é is two bytes; a byte-based cut at this count would have panicked.
        assert!(corpus.text.len() > MAX_CORPUS_CHARS);
    }

    #[test]
    fn short_corpus_is_left_alone() {
        let corpus = DocumentCorpus::from_lines(vec![
            "a perfectly ordinary line".to_string(),
            "and one more for the road".to_string(),
        ]);
        assert_eq!(corpus.text, "a perfectly ordinary line\nand one more for the road");
    }

    #[test]
    fn garbage_bytes_yield_empty_corpus() {
        let corpus = corpus_from_bytes(&PdfTextSource, b"not a pdf at all");
        assert!(corpus.lines.is_empty());
        assert!(corpus.text.is_empty());
    }

    #[test]
    fn truncated_pdf_header_yields_empty_corpus() {
        let corpus = corpus_from_bytes(&PdfTextSource, b"%PDF-1.4\n%%EOF\n");
        assert!(corpus.lines.is_empty());
    }

    #[test]
    fn missing_file_yields_empty_corpus() {
        let corpus = corpus_from_file(&PdfTextSource, Path::new("/no/such/file.pdf"));
        assert!(corpus.lines.is_empty());
    }
}
