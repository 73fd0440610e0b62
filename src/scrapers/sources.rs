//! Article discovery across a list of registry sources.
//!
//! For each [`SourceDescriptor`] a site-scoped query is sent to the search
//! provider and every returned URL goes through the page fetcher. Sources are
//! worked on concurrently but collected in registry order, and within a source
//! records keep the search engine's order.
//!
//! A source whose search fails, times out or misses the overall deadline
//! contributes nothing; the others are unaffected. A source that reaches the
//! deadline while fetching pages keeps the records it already has.

use super::page::fetch_page;
use super::search::{SearchProvider, site_query};
use crate::api::FetchText;
use crate::config::DigestOptions;
use crate::models::{ArticleRecord, SourceDescriptor, TimeWindow};
use futures::stream::{self, StreamExt};
use itertools::Itertools;
use std::error::Error;
use tokio::time::{Instant, timeout, timeout_at};
use tracing::{error, info, instrument, warn};

/// Search every source for `keywords` and collect the qualifying articles.
///
/// Records with the same URL (possible when two sources overlap) are kept
/// only once, at their first position.
#[instrument(level = "info", skip_all, fields(%category, sources = sources.len()))]
pub async fn search_website_articles<S, H>(
    search: &S,
    http: &H,
    keywords: &str,
    category: &str,
    sources: &[SourceDescriptor],
    window: &TimeWindow,
    options: &DigestOptions,
    deadline: Instant,
) -> Vec<ArticleRecord>
where
    S: SearchProvider,
    H: FetchText,
{
    let per_source: Vec<Vec<ArticleRecord>> = stream::iter(sources)
        .map(move |source| async move {
            match search_source(search, http, keywords, source, window, options, deadline).await {
                Ok(records) => {
                    info!(source = %source.name, count = records.len(), "Source searched");
                    records
                }
                Err(e) => {
                    error!(source = %source.name, url = %source.url, error = %e, "Search failed for source");
                    Vec::new()
                }
            }
        })
        .buffered(options.concurrency.max(1))
        .collect()
        .await;

    let articles: Vec<ArticleRecord> = per_source
        .into_iter()
        .flatten()
        .unique_by(|article| article.url.clone())
        .collect();
    info!(count = articles.len(), "Collected articles for category");
    articles
}

/// Search one source and fetch each result page.
///
/// Only the search call can fail this function; page problems just drop that
/// page. When `deadline` passes during page fetching, the records extracted
/// so far are returned.
#[instrument(level = "info", skip_all, fields(source = %source.name))]
async fn search_source<S, H>(
    search: &S,
    http: &H,
    keywords: &str,
    source: &SourceDescriptor,
    window: &TimeWindow,
    options: &DigestOptions,
    deadline: Instant,
) -> Result<Vec<ArticleRecord>, Box<dyn Error>>
where
    S: SearchProvider,
    H: FetchText,
{
    let query = site_query(keywords, &source.url);
    info!(%query, "Searching source");

    let search_call = timeout(
        options.search_timeout,
        search.search(&query, &options.lang, options.results_per_source),
    );
    let urls = match timeout_at(deadline, search_call).await {
        Ok(result) => result??,
        Err(_) => return Err("missed the search deadline".into()),
    };

    let mut records = Vec::new();
    for url in urls.into_iter().take(options.results_per_source) {
        let page = match timeout_at(deadline, fetch_page(http, &url, window, options)).await {
            Ok(page) => page,
            Err(_) => {
                warn!(%url, kept = records.len(), "Source missed the search deadline; keeping pages fetched so far");
                break;
            }
        };
        if let Some(page) = page {
            records.push(ArticleRecord {
                title: page.title,
                url,
                publish_date: page.publish_date,
                summary: page.summary,
                source_name: source.name.clone(),
            });
        }
    }

    Ok(records)
}
