//! Command-line interface definitions for AI Focus Digest.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! Most arguments can be provided via command-line flags or environment variables.

use crate::models::TimeRange;
use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for the AI Focus Digest application.
///
/// # Examples
///
/// ```sh
/// # Digest for the past week, printed to stdout
/// ai_focus_digest -k "mixture of experts"
///
/// # Past 24 hours, written to a file with a JSON dump alongside
/// ai_focus_digest -k "LLM agent" -t past-24h -o digest.md -j ./json
///
/// # Check which registry sources the extractors can handle
/// ai_focus_digest --check-sources
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Keyword or phrase to search for
    #[arg(short, long, default_value = "")]
    pub keywords: String,

    /// How far back to look
    #[arg(short, long, value_enum, default_value_t = TimeRange::PastWeek)]
    pub time_range: TimeRange,

    /// Source registry file (JSON, or YAML when the extension is .yaml/.yml)
    #[arg(short, long, env = "AI_DIGEST_SOURCES", default_value = "sources.json")]
    pub sources: PathBuf,

    /// Write the Markdown report here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Also dump the collected records as JSON under this directory
    #[arg(short, long, env = "AI_DIGEST_JSON_DIR")]
    pub json_output_dir: Option<String>,

    /// Maximum number of arXiv papers to request
    #[arg(long, env = "AI_DIGEST_MAX_PAPERS", default_value_t = 4)]
    pub max_papers: usize,

    /// Search results fetched per source
    #[arg(long, env = "AI_DIGEST_RESULTS_PER_SOURCE", default_value_t = 2)]
    pub results_per_source: usize,

    /// Sources searched concurrently
    #[arg(long, env = "AI_DIGEST_CONCURRENCY", default_value_t = 4)]
    pub concurrency: usize,

    /// Wall-clock budget in seconds for searching all sites
    #[arg(long, env = "AI_DIGEST_BUDGET_SECS", default_value_t = 180)]
    pub budget_secs: u64,

    /// Language hint for the search provider
    #[arg(long, env = "AI_DIGEST_LANG", default_value = "en")]
    pub lang: String,

    /// Test every registry source against the extractors instead of building a digest
    #[arg(long)]
    pub check_sources: bool,
}
