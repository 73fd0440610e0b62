//! Source compatibility check.
//!
//! Runs every registry source through the same search and extraction path a
//! digest uses, with a generic `"AI"` query and a 90 day cutoff, and reports
//! which sources yield a usable record. Sources are checked one at a time with
//! a pause in between so the search provider is not hammered.

use crate::api::FetchText;
use crate::config::DigestOptions;
use crate::models::{SourceDescriptor, SourceRegistry, TimeWindow};
use crate::scrapers::page::{ExtractedPage, fetch_page};
use crate::scrapers::search::{SearchProvider, site_query};
use crate::utils::truncate_with_ellipsis;
use chrono::{DateTime, Utc};
use tokio::time::{sleep, timeout};
use tracing::{info, instrument, warn};

/// Query used to find one test article per source.
pub const CHECK_KEYWORD: &str = "AI";
/// Look-back for test articles; wider than any digest range so most active sites qualify.
pub const CHECK_WINDOW_DAYS: i64 = 90;

/// What happened when one source was checked.
#[derive(Debug, Clone, PartialEq)]
pub enum CheckOutcome {
    /// A record was extracted from the test article.
    Parsed { url: String, page: ExtractedPage },
    /// The test article gave no record: unreachable, undated, or too old.
    NotParsed { url: String },
    /// The search returned nothing for this site.
    NoTestArticle,
    /// The search itself failed or timed out.
    SearchFailed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SourceCheck {
    pub category: &'static str,
    pub source: SourceDescriptor,
    pub outcome: CheckOutcome,
}

/// Check every source in `registry`, tech blogs first.
#[instrument(level = "info", skip_all)]
pub async fn check_sources<S, H>(
    search: &S,
    http: &H,
    registry: &SourceRegistry,
    options: &DigestOptions,
    now: DateTime<Utc>,
) -> Vec<SourceCheck>
where
    S: SearchProvider,
    H: FetchText,
{
    let window = TimeWindow::days_before(now, CHECK_WINDOW_DAYS);
    let mut checks = Vec::new();

    for (i, (category, source)) in registry.categorized().enumerate() {
        if i > 0 {
            sleep(options.politeness_delay).await;
        }
        let outcome = check_source(search, http, source, &window, options).await;
        info!(source = %source.name, ?outcome, "Checked source");
        checks.push(SourceCheck {
            category,
            source: source.clone(),
            outcome,
        });
    }

    checks
}

async fn check_source<S, H>(
    search: &S,
    http: &H,
    source: &SourceDescriptor,
    window: &TimeWindow,
    options: &DigestOptions,
) -> CheckOutcome
where
    S: SearchProvider,
    H: FetchText,
{
    let query = site_query(CHECK_KEYWORD, &source.url);
    let urls = match timeout(options.search_timeout, search.search(&query, &options.lang, 1)).await {
        Ok(Ok(urls)) => urls,
        Ok(Err(e)) => {
            warn!(source = %source.name, error = %e, "Search failed during check");
            return CheckOutcome::SearchFailed(e.to_string());
        }
        Err(_) => return CheckOutcome::SearchFailed("search timed out".to_string()),
    };

    let Some(url) = urls.into_iter().next() else {
        return CheckOutcome::NoTestArticle;
    };

    match fetch_page(http, &url, window, options).await {
        Some(page) => CheckOutcome::Parsed { url, page },
        None => CheckOutcome::NotParsed { url },
    }
}

/// Markdown checklist of the results, grouped by category.
pub fn render_checks(checks: &[SourceCheck]) -> String {
    let mut md = String::from("# Source compatibility check\n");
    let mut current_category = None;

    for check in checks {
        if current_category != Some(check.category) {
            md.push_str(&format!("\n## {}\n\n", check.category));
            current_category = Some(check.category);
        }

        let name = &check.source.name;
        let site = &check.source.url;
        match &check.outcome {
            CheckOutcome::Parsed { url, page } => {
                md.push_str(&format!("- ✅ **{name}** (`{site}`): parsed {url}\n"));
                md.push_str(&format!("  - Title: {}\n", truncate_with_ellipsis(&page.title, 50)));
                md.push_str(&format!("  - Date: {}\n", page.publish_date.format("%Y-%m-%d")));
                md.push_str(&format!("  - Summary: {}\n", truncate_with_ellipsis(&page.summary, 100)));
            }
            CheckOutcome::NotParsed { url } => md.push_str(&format!(
                "- ❌ **{name}** (`{site}`): no usable record from {url} (unreachable, undated, or older than {CHECK_WINDOW_DAYS} days)\n"
            )),
            CheckOutcome::NoTestArticle => {
                md.push_str(&format!("- 🟡 **{name}** (`{site}`): no test article found\n"))
            }
            CheckOutcome::SearchFailed(e) => {
                md.push_str(&format!("- 💥 **{name}** (`{site}`): search error: {e}\n"))
            }
        }
    }

    let passed = checks
        .iter()
        .filter(|c| matches!(c.outcome, CheckOutcome::Parsed { .. }))
        .count();
    md.push_str(&format!(
        "\n{passed}/{} sources parsed. Keep the ✅ sources in your registry.\n",
        checks.len()
    ));
    md
}
