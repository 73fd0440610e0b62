//! Field extractors for arbitrary article pages.
//!
//! Each extractor takes an already parsed [`scraper::Html`] document and runs a
//! cascade: an ordered list of strategies tried until one yields a value.
//! Failures inside a strategy (bad selector match, unparseable date, malformed
//! JSON-LD) are swallowed and the cascade moves on.
//!
//! | Field | Module | Fallback when nothing matches |
//! |-------|--------|-------------------------------|
//! | Publish date | [`date`] | `None` (page is unusable) |
//! | Title | [`title`] | The page URL |
//! | Summary | [`summary`] | A fixed placeholder sentence |
//!
//! None of the extractors mutate the caller's document; the summary extractor
//! strips boilerplate from its own copy.

pub mod date;
pub mod summary;
pub mod title;

use scraper::{ElementRef, Selector};

/// Compile a list of CSS selectors known at build time.
///
/// Invalid entries are dropped rather than aborting the cascade.
pub(crate) fn compile_selectors(raw: &[&str]) -> Vec<Selector> {
    raw.iter().filter_map(|s| Selector::parse(s).ok()).collect()
}

/// Concatenated text content of an element, trimmed.
pub(crate) fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Trimmed `content` attribute of a `<meta>` element.
pub(crate) fn meta_content(element: ElementRef<'_>) -> String {
    element
        .value()
        .attr("content")
        .unwrap_or_default()
        .trim()
        .to_string()
}
