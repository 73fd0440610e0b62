//! arXiv paper search.
//!
//! Unlike the website sources, arXiv is queried through its structured Atom
//! API (`export.arxiv.org/api/query`), sorted by submission date, newest
//! first. Entries submitted before the cutoff are dropped.
//!
//! Requests go through [`RetryFetch`] because the API rate-limits and
//! occasionally drops connections; once retries are exhausted the search
//! degrades to an empty list.

use crate::api::{FetchText, RetryFetch};
use crate::config::DigestOptions;
use crate::models::{PaperRecord, TimeWindow};
use crate::utils::{escape_markdown_brackets, normalize_whitespace, truncate_with_ellipsis};
use chrono::{DateTime, Utc};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use std::error::Error;
use tracing::{debug, error, info, instrument, warn};

/// Paper summaries are cut to this many characters.
const PAPER_SUMMARY_CHARS: usize = 200;

/// One `<entry>` of an arXiv Atom feed.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ArxivEntry {
    pub id: String,
    pub title: String,
    pub summary: String,
    pub published: String,
    pub authors: Vec<String>,
    pub pdf_url: Option<String>,
}

/// Search arXiv for `keywords` and keep papers submitted inside `window`.
///
/// Never fails: transport, status and parse errors are logged and yield an
/// empty list.
#[instrument(level = "info", skip_all, fields(%keywords, max_results = options.max_papers))]
pub async fn search_arxiv_papers<H: FetchText>(
    http: &H,
    keywords: &str,
    window: &TimeWindow,
    options: &DigestOptions,
) -> Vec<PaperRecord> {
    let client = RetryFetch::new(http, options.arxiv_retries, options.arxiv_backoff);
    let url = query_url(&options.arxiv_endpoint, keywords, options.max_papers);

    let entries = match client.fetch(&url).await {
        Ok(body) => match parse_atom(&body) {
            Ok(entries) => entries,
            Err(e) => {
                error!(%url, error = %e, "Failed to parse arXiv response");
                return Vec::new();
            }
        },
        Err(e) => {
            error!(%url, error = %e, "arXiv search failed");
            return Vec::new();
        }
    };

    let total = entries.len();
    let papers: Vec<PaperRecord> = entries
        .into_iter()
        .filter_map(|entry| into_record(entry, window))
        .collect();
    info!(total, kept = papers.len(), "arXiv search complete");
    papers
}

/// Atom API URL for a keyword query sorted by submission date.
pub fn query_url(endpoint: &str, keywords: &str, max_results: usize) -> String {
    format!(
        "{}?search_query={}&start=0&max_results={}&sortBy=submittedDate&sortOrder=descending",
        endpoint,
        urlencoding::encode(keywords),
        max_results
    )
}

/// Convert a feed entry into a record, or `None` when it is an API error
/// entry, undated, or older than the cutoff.
fn into_record(entry: ArxivEntry, window: &TimeWindow) -> Option<PaperRecord> {
    if entry.id.contains("/api/errors") {
        warn!(message = %entry.summary, "arXiv returned an error entry");
        return None;
    }

    let publish_date = match DateTime::parse_from_rfc3339(&entry.published) {
        Ok(dt) => dt.with_timezone(&Utc),
        Err(e) => {
            warn!(id = %entry.id, published = %entry.published, error = %e, "Unparseable arXiv date");
            return None;
        }
    };
    if !window.includes(publish_date) {
        debug!(id = %entry.id, %publish_date, "arXiv entry older than cutoff");
        return None;
    }

    let url = entry
        .pdf_url
        .unwrap_or_else(|| entry.id.replacen("/abs/", "/pdf/", 1));

    Some(PaperRecord {
        title: escape_markdown_brackets(&entry.title),
        url,
        authors: entry.authors,
        publish_date,
        summary: truncate_with_ellipsis(&entry.summary, PAPER_SUMMARY_CHARS),
    })
}

/// Parse an arXiv Atom feed into its entries, in feed order.
///
/// Text fields are whitespace-normalized. Element names are matched on their
/// local part so namespace prefixes do not matter.
pub fn parse_atom(xml: &str) -> Result<Vec<ArxivEntry>, Box<dyn Error>> {
    let mut reader = Reader::from_str(xml);
    let mut entries = Vec::new();
    let mut current: Option<ArxivEntry> = None;
    let mut in_author = false;
    let mut text = String::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                match e.local_name().as_ref() {
                    b"entry" => current = Some(ArxivEntry::default()),
                    b"author" => in_author = true,
                    b"link" => {
                        if let Some(entry) = current.as_mut() {
                            take_pdf_link(&e, entry);
                        }
                    }
                    _ => {}
                }
                text.clear();
            }
            Event::Empty(e) => {
                if e.local_name().as_ref() == b"link" {
                    if let Some(entry) = current.as_mut() {
                        take_pdf_link(&e, entry);
                    }
                }
            }
            Event::Text(t) => text.push_str(&unescape_lossy(&String::from_utf8_lossy(&t))),
            Event::CData(c) => text.push_str(&String::from_utf8_lossy(&c)),
            Event::GeneralRef(r) => {
                text.push_str(&unescape_lossy(&format!("&{};", String::from_utf8_lossy(&r))))
            }
            Event::End(e) => {
                let value = normalize_whitespace(&text);
                text.clear();

                let local = e.local_name();
                let tag = local.as_ref();
                if tag == b"entry" {
                    entries.extend(current.take());
                    continue;
                }
                if tag == b"author" {
                    in_author = false;
                    continue;
                }
                let Some(entry) = current.as_mut() else {
                    continue;
                };
                match tag {
                    b"id" => entry.id = value,
                    b"title" => entry.title = value,
                    b"summary" => entry.summary = value,
                    b"published" => entry.published = value,
                    b"name" if in_author => entry.authors.push(value),
                    _ => {}
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(entries)
}

/// Record the `href` of a `<link title="pdf">` element.
fn take_pdf_link(link: &BytesStart<'_>, entry: &mut ArxivEntry) {
    let mut href = None;
    let mut is_pdf = false;
    for attr in link.attributes().flatten() {
        let value = unescape_lossy(&String::from_utf8_lossy(&attr.value));
        match attr.key.local_name().as_ref() {
            b"href" => href = Some(value),
            b"title" if value == "pdf" => is_pdf = true,
            b"type" if value == "application/pdf" => is_pdf = true,
            _ => {}
        }
    }
    if is_pdf {
        if let Some(href) = href {
            entry.pdf_url = Some(href);
        }
    }
}

fn unescape_lossy(raw: &str) -> String {
    quick_xml::escape::unescape(raw)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| raw.to_string())
}
