//! # AI Focus Digest
//!
//! Builds a Markdown digest of recent AI material for a keyword: newest arXiv
//! papers plus articles found on a curated registry of tech blogs and news
//! sites, each filtered to a chosen time range.
//!
//! ## Usage
//!
//! ```sh
//! ai_focus_digest -k "mixture of experts" -t past-week -o digest.md
//! ai_focus_digest --check-sources
//! ```
//!
//! ## Architecture
//!
//! 1. **Papers**: query the arXiv Atom API sorted by submission date
//! 2. **Discovery**: one site-scoped web search per registry source
//! 3. **Extraction**: fetch each result and pull out title, publish date and summary
//! 4. **Output**: render Markdown, optionally dump the records as JSON
//!
//! Logs go to stderr so the report can be piped from stdout.

use chrono::Utc;
use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod api;
mod cli;
mod compat;
mod config;
mod digest;
mod extractors;
mod models;
mod outputs;
mod scrapers;
mod utils;

use api::HttpClient;
use cli::Cli;
use config::{DigestOptions, load_registry};
use digest::Digest;
use models::SourceRegistry;
use scrapers::search::DuckDuckGo;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .with_writer(std::io::stderr)
        .init();

    let start_time = std::time::Instant::now();
    info!("ai_focus_digest starting up");

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    let options = DigestOptions::from_cli(&args);
    let http = HttpClient::new(options.page_timeout, &options.lang)?;
    let search = DuckDuckGo::new(&http, options.search_endpoint.clone());

    if args.check_sources {
        let registry = load_registry(&args.sources).await?;
        let checks = compat::check_sources(&search, &http, &registry, &options, Utc::now()).await;
        emit(&args, &compat::render_checks(&checks)).await?;
        info!(elapsed = ?start_time.elapsed(), "Source check complete");
        return Ok(());
    }

    // The registry is not needed (and may not exist) when there is nothing to search for.
    let registry = if args.keywords.trim().is_empty() {
        SourceRegistry::default()
    } else {
        load_registry(&args.sources).await?
    };

    let digest = Digest::new(&search, &http, &registry, &options).with_json_dump(args.json_output_dir.as_deref());
    let report = digest.build_report(&args.keywords, args.time_range).await;
    emit(&args, &report).await?;

    let elapsed = start_time.elapsed();
    info!(?elapsed, secs = elapsed.as_secs(), "Execution complete");

    Ok(())
}

/// Write `text` to the `--output` file, or stdout when none was given.
async fn emit(args: &Cli, text: &str) -> Result<(), Box<dyn Error>> {
    match &args.output {
        Some(path) => {
            info!(path = %path.display(), "Writing Markdown");
            if let Err(e) = tokio::fs::write(path, text).await {
                error!(path = %path.display(), error = %e, "Failed writing Markdown");
                return Err(e.into());
            }
        }
        None => println!("{text}"),
    }
    Ok(())
}
