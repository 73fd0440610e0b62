//! Runtime tunables and source registry loading.
//!
//! [`DigestOptions`] gathers every knob the pipeline reads. Defaults mirror the
//! values the digest has always used (two search results per source, four
//! papers, 300-character summaries, a 15 second page timeout); the CLI can
//! override each of them.
//!
//! The source registry is a JSON or YAML document with two lists,
//! `tech_blogs` and `news_sites`, each entry holding a `name` and a `url`.

use crate::cli::Cli;
use crate::extractors::summary::DEFAULT_SUMMARY_CHARS;
use crate::models::SourceRegistry;
use std::error::Error;
use std::path::Path;
use std::time::Duration;
use tokio::fs;
use tracing::{info, instrument};

/// arXiv Atom API endpoint.
pub const ARXIV_API_ENDPOINT: &str = "https://export.arxiv.org/api/query";

/// DuckDuckGo's JavaScript-free results page.
pub const DUCKDUCKGO_HTML_ENDPOINT: &str = "https://html.duckduckgo.com/html/";

/// Every tunable read by the digest pipeline.
#[derive(Debug, Clone)]
pub struct DigestOptions {
    /// Bound on a single article page GET.
    pub page_timeout: Duration,
    /// Bound on a single search provider call.
    pub search_timeout: Duration,
    /// URLs requested from the search provider per source.
    pub results_per_source: usize,
    /// Maximum arXiv entries requested.
    pub max_papers: usize,
    /// Maximum summary length in characters (before the ellipsis).
    pub summary_chars: usize,
    /// Sources searched at the same time.
    pub concurrency: usize,
    /// Wall-clock budget for the whole website search phase.
    pub budget: Duration,
    /// Language hint passed to the search provider.
    pub lang: String,
    pub search_endpoint: String,
    pub arxiv_endpoint: String,
    /// Extra attempts made after a failed arXiv request.
    pub arxiv_retries: usize,
    pub arxiv_backoff: Duration,
    /// Pause between sources in the compatibility check.
    pub politeness_delay: Duration,
}

impl Default for DigestOptions {
    fn default() -> Self {
        Self {
            page_timeout: Duration::from_secs(15),
            search_timeout: Duration::from_secs(20),
            results_per_source: 2,
            max_papers: 4,
            summary_chars: DEFAULT_SUMMARY_CHARS,
            concurrency: 4,
            budget: Duration::from_secs(180),
            lang: "en".to_string(),
            search_endpoint: DUCKDUCKGO_HTML_ENDPOINT.to_string(),
            arxiv_endpoint: ARXIV_API_ENDPOINT.to_string(),
            arxiv_retries: 2,
            arxiv_backoff: Duration::from_secs(1),
            politeness_delay: Duration::from_secs(2),
        }
    }
}

impl DigestOptions {
    /// Defaults overridden by whatever the command line supplied.
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            results_per_source: cli.results_per_source.max(1),
            max_papers: cli.max_papers,
            concurrency: cli.concurrency.max(1),
            budget: Duration::from_secs(cli.budget_secs),
            lang: cli.lang.clone(),
            ..Self::default()
        }
    }
}

/// Load the source registry from `path`.
///
/// Files ending in `.yaml`/`.yml` are read as YAML, anything else as JSON.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn load_registry(path: &Path) -> Result<SourceRegistry, Box<dyn Error>> {
    let raw = fs::read_to_string(path).await?;
    let is_yaml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));
    let registry = parse_registry(&raw, is_yaml)?;
    info!(
        tech_blogs = registry.tech_blogs.len(),
        news_sites = registry.news_sites.len(),
        "Loaded source registry"
    );
    Ok(registry)
}

/// Parse registry text in either supported format.
pub fn parse_registry(raw: &str, is_yaml: bool) -> Result<SourceRegistry, Box<dyn Error>> {
    if is_yaml {
        Ok(serde_yaml::from_str(raw)?)
    } else {
        Ok(serde_json::from_str(raw)?)
    }
}
