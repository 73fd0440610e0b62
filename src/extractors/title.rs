//! Display title extraction.

use super::{compile_selectors, element_text, meta_content};
use once_cell::sync::Lazy;
use scraper::{Html, Selector};

const TITLE_SELECTORS: [&str; 8] = [
    "h1.title",
    "h1.post-title",
    "h1.article-title",
    "h1.entry-title",
    "h1",
    "title",
    r#"meta[property="og:title"]"#,
    r#"meta[name="twitter:title"]"#,
];

/// A candidate must be longer than this many characters after trimming.
const MIN_TITLE_CHARS: usize = 5;

static SELECTORS: Lazy<Vec<Selector>> = Lazy::new(|| compile_selectors(&TITLE_SELECTORS));

/// Best-effort title for a page, falling back to `url` so the result is never empty.
///
/// Only the first element matching each selector is considered. `<meta>`
/// candidates contribute their `content` attribute, everything else its text.
pub fn extract_title(document: &Html, url: &str) -> String {
    SELECTORS
        .iter()
        .filter_map(|selector| document.select(selector).next())
        .map(|element| {
            if element.value().name() == "meta" {
                meta_content(element)
            } else {
                element_text(element)
            }
        })
        .find(|title| title.chars().count() > MIN_TITLE_CHARS)
        .unwrap_or_else(|| url.to_string())
}
