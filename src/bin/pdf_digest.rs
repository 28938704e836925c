//! CLI binary for pdf-digest.
//!
//! A thin shim over the library crate: parse arguments, run the pipeline,
//! and emit exactly one JSON object on stdout. All logging and diagnostics
//! go to stderr so stdout stays machine-readable.

use clap::Parser;
use pdf_digest::{digest, DigestConfig, DigestError, ErrorReport};
use serde::Serialize;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

const AFTER_HELP: &str = r#"EXAMPLES:
  # Analyze a PDF (digest JSON on stdout)
  pdf-digest report.pdf

  # Pretty-print the digest
  pdf-digest --pretty report.pdf

  # Use a different model or an OpenAI-compatible endpoint
  pdf-digest --model gpt-4o report.pdf
  pdf-digest --api-base http://localhost:11434/v1 --model llama3.2 report.pdf

OUTPUT:
  stdout carries exactly one JSON object per run:
    {"summary": "...", "topics": [{"emoji": "...", "title": "...",
     "description": "..."}, ...], "serverFilename": "...", "fullText": "..."}
  or, on failure:
    {"error": "..."}
  The serverFilename and fullText fields are always set by the pipeline,
  never by the language model.

EXIT STATUS:
  0  a digest was produced
  1  missing argument, unusable PDF content, or a modeling/service failure
     (the {"error": ...} object is still written to stdout)

ENVIRONMENT VARIABLES:
  OPENAI_API_KEY    Credential for the language service (.env files are
                    honored). Missing keys surface as a service 401 error.
  OPENAI_BASE_URL   Override the API base URL
  PDF_DIGEST_MODEL  Override the model id
"#;

/// Produce a structured topic digest for a PDF document.
#[derive(Parser, Debug)]
#[command(
    name = "pdf-digest",
    version,
    about = "Produce a structured topic digest for a PDF document",
    long_about = "Extract a PDF's text, discover its topical structure with unsupervised \
term clustering, and compose a short summary plus 3-5 labeled topics via an \
OpenAI-compatible language model. Emits one JSON object on stdout.",
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Path to the PDF file to analyze.
    input: Option<PathBuf>,

    /// Language-service model id.
    #[arg(long, env = "PDF_DIGEST_MODEL", default_value = "gpt-4o-mini")]
    model: String,

    /// Base URL of the OpenAI-compatible endpoint.
    #[arg(long, env = "OPENAI_BASE_URL", default_value = "https://api.openai.com/v1")]
    api_base: String,

    /// Pretty-print the emitted JSON.
    #[arg(long)]
    pretty: bool,

    /// Enable DEBUG-level logs on stderr.
    #[arg(short, long)]
    verbose: bool,

    /// Suppress all logs except errors.
    #[arg(short, long)]
    quiet: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    // .env must load before clap reads env-backed defaults.
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // ── Logging setup (stderr only; stdout is the JSON channel) ──────────
    let filter = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_writer(io::stderr)
        .init();

    // ── Argument check: no path, no file I/O ─────────────────────────────
    let Some(input) = cli.input else {
        return emit_failure(&DigestError::MissingInput, cli.pretty);
    };

    let config = match DigestConfig::builder()
        .model(cli.model)
        .api_base(cli.api_base)
        .build()
    {
        Ok(config) => config,
        Err(e) => return emit_failure(&e, cli.pretty),
    };

    match digest(&input, &config).await {
        Ok(result) => {
            emit(&result, cli.pretty);
            ExitCode::SUCCESS
        }
        Err(e) => emit_failure(&e, cli.pretty),
    }
}

/// Write the diagnostic error chain to stderr, the `{"error": …}` payload
/// to stdout, and signal failure.
fn emit_failure(err: &DigestError, pretty: bool) -> ExitCode {
    tracing::error!("digest run failed: {err}");
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        tracing::error!("caused by: {cause}");
        source = cause.source();
    }

    emit(&ErrorReport::new(err.to_string()), pretty);
    ExitCode::FAILURE
}

/// Serialize one payload to stdout.
fn emit<T: Serialize>(payload: &T, pretty: bool) {
    let rendered = if pretty {
        serde_json::to_string_pretty(payload)
    } else {
        serde_json::to_string(payload)
    };
    match rendered {
        Ok(json) => println!("{json}"),
        // Unreachable for the current payload types.
        Err(e) => eprintln!("failed to serialize output: {e}"),
    }
}
