//! Single article page fetch and extraction.
//!
//! A page is usable only when a publish date can be found and that date falls
//! inside the request's [`TimeWindow`]. Pages without a discoverable date are
//! dropped; they are never given a synthesized date.

use crate::api::FetchText;
use crate::config::DigestOptions;
use crate::extractors::{date::extract_publish_date, summary::extract_summary, title::extract_title};
use crate::models::TimeWindow;
use crate::utils::truncate_for_log;
use chrono::{DateTime, Utc};
use scraper::Html;
use tokio::time::timeout;
use tracing::{debug, info, instrument, warn};

/// The fields pulled out of one qualifying page.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedPage {
    pub title: String,
    pub publish_date: DateTime<Utc>,
    pub summary: String,
}

/// Fetch `url` and extract it, or `None` when the page is unreachable,
/// undated, or older than the window's cutoff.
///
/// Transport errors, non-success statuses and timeouts are logged and
/// downgraded to `None`.
#[instrument(level = "info", skip_all, fields(%url))]
pub async fn fetch_page<H: FetchText>(
    http: &H,
    url: &str,
    window: &TimeWindow,
    options: &DigestOptions,
) -> Option<ExtractedPage> {
    let body = match timeout(options.page_timeout, http.fetch(url)).await {
        Ok(Ok(body)) => body,
        Ok(Err(e)) => {
            warn!(%url, error = %e, "Page fetch failed");
            return None;
        }
        Err(_) => {
            warn!(%url, timeout = ?options.page_timeout, "Page fetch timed out");
            return None;
        }
    };
    extract_page(&body, url, window, options.summary_chars)
}

/// Run the extractors over an already downloaded page body.
pub fn extract_page(
    body: &str,
    url: &str,
    window: &TimeWindow,
    summary_chars: usize,
) -> Option<ExtractedPage> {
    let document = Html::parse_document(body);

    let Some(publish_date) = extract_publish_date(&document) else {
        info!(%url, bytes = body.len(), "No publish date found; skipping page");
        debug!(preview = %truncate_for_log(body, 300), "Undated page body");
        return None;
    };

    if !window.includes(publish_date) {
        debug!(%url, %publish_date, cutoff = %window.cutoff, "Page older than cutoff");
        return None;
    }

    let title = extract_title(&document, url);
    let summary = extract_summary(&document, summary_chars);
    info!(%url, %publish_date, %title, "Extracted article");

    Some(ExtractedPage {
        title,
        publish_date,
        summary,
    })
}
