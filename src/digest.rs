//! One digest request from keyword to rendered report.
//!
//! The arXiv search and the two website categories run concurrently. Website
//! sources share a single deadline (`now + budget`); arXiv is bounded by its
//! own retry policy and the HTTP client timeout. Whatever was collected when
//! everything has finished or timed out is rendered.

use crate::api::FetchText;
use crate::config::DigestOptions;
use crate::models::{DigestResults, NEWS_SITES_CATEGORY, SourceRegistry, TECH_BLOGS_CATEGORY, TimeRange, TimeWindow};
use crate::outputs::json::write_digest;
use crate::outputs::markdown::render_report;
use crate::scrapers::arxiv::search_arxiv_papers;
use crate::scrapers::search::SearchProvider;
use crate::scrapers::sources::search_website_articles;
use chrono::{DateTime, Utc};
use tokio::time::Instant;
use tracing::{error, info, instrument};

/// Returned in place of a report when no keyword was given.
pub const EMPTY_KEYWORDS_PROMPT: &str = "Please enter a keyword to search for.";

/// The collaborators a digest needs, borrowed for the duration of a request.
pub struct Digest<'a, S, H> {
    search: &'a S,
    http: &'a H,
    registry: &'a SourceRegistry,
    options: &'a DigestOptions,
    json_output_dir: Option<&'a str>,
}

impl<'a, S: SearchProvider, H: FetchText> Digest<'a, S, H> {
    pub fn new(search: &'a S, http: &'a H, registry: &'a SourceRegistry, options: &'a DigestOptions) -> Self {
        Self {
            search,
            http,
            registry,
            options,
            json_output_dir: None,
        }
    }

    /// Also dump the collected records as JSON under `dir` on every report.
    pub fn with_json_dump(mut self, dir: Option<&'a str>) -> Self {
        self.json_output_dir = dir;
        self
    }

    /// Build the Markdown report for `keywords` over `range`, ending now.
    pub async fn build_report(&self, keywords: &str, range: TimeRange) -> String {
        self.build_report_at(keywords, range, Utc::now()).await
    }

    /// Same as [`build_report`](Self::build_report) with an explicit clock.
    pub async fn build_report_at(&self, keywords: &str, range: TimeRange, now: DateTime<Utc>) -> String {
        let Some(results) = self.collect(keywords, range, now).await else {
            return EMPTY_KEYWORDS_PROMPT.to_string();
        };

        // A failed dump never costs the user the report.
        if let Some(dir) = self.json_output_dir {
            match write_digest(&results, dir).await {
                Ok(path) => info!(path = %path.display(), "Wrote JSON dump"),
                Err(e) => error!(error = %e, "Failed to write JSON dump"),
            }
        }

        render_report(&results)
    }

    /// Gather papers and articles without rendering them.
    ///
    /// Returns `None`, without touching the network, when `keywords` is empty
    /// or only whitespace.
    #[instrument(level = "info", skip_all, fields(%keywords, %range))]
    pub async fn collect(&self, keywords: &str, range: TimeRange, now: DateTime<Utc>) -> Option<DigestResults> {
        let keywords = keywords.trim();
        if keywords.is_empty() {
            info!("No keywords given; skipping search");
            return None;
        }

        let window = TimeWindow::ending_at(now, range);
        let deadline = Instant::now() + self.options.budget;
        info!(cutoff = %window.cutoff, budget = ?self.options.budget, "Starting digest");

        let (papers, tech_blogs, news) = futures::join!(
            search_arxiv_papers(self.http, keywords, &window, self.options),
            search_website_articles(
                self.search,
                self.http,
                keywords,
                TECH_BLOGS_CATEGORY,
                &self.registry.tech_blogs,
                &window,
                self.options,
                deadline,
            ),
            search_website_articles(
                self.search,
                self.http,
                keywords,
                NEWS_SITES_CATEGORY,
                &self.registry.news_sites,
                &window,
                self.options,
                deadline,
            ),
        );

        info!(
            papers = papers.len(),
            tech_blogs = tech_blogs.len(),
            news = news.len(),
            "Digest collected"
        );

        Some(DigestResults {
            keywords: keywords.to_string(),
            time_range: range,
            window,
            papers,
            tech_blogs,
            news,
        })
    }
}
