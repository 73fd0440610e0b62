//! Plain-text summary extraction.
//!
//! Boilerplate (`script`, `style`, `nav`, `header`, `footer`, `aside`,
//! `advertisement`) is removed from a private copy of the document before any
//! candidate is read, so the caller's tree is left untouched and the order in
//! which extractors run does not matter.

use super::{element_text, meta_content};
use crate::utils::{normalize_whitespace, truncate_with_ellipsis};
use once_cell::sync::Lazy;
use scraper::{Html, Selector};

/// Default maximum summary length in characters.
pub const DEFAULT_SUMMARY_CHARS: usize = 300;

/// Returned when no candidate produced any text.
pub const NO_SUMMARY_PLACEHOLDER: &str = "No summary could be extracted.";

/// A candidate counts as a real summary once it is longer than this.
const MIN_SUMMARY_CHARS: usize = 50;

/// Paragraphs concatenated by the last-resort candidate.
const FALLBACK_PARAGRAPHS: usize = 5;

#[derive(Debug, Clone, Copy)]
enum Candidate {
    /// `content` attribute of the first match.
    Meta,
    /// Text of the first match.
    Container,
    /// Text of the first few matches joined by spaces.
    Paragraphs,
}

static BOILERPLATE: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("script, style, nav, header, footer, aside, advertisement").unwrap()
});

static CANDIDATES: Lazy<Vec<(Candidate, Selector)>> = Lazy::new(|| {
    [
        (Candidate::Meta, r#"meta[name="description"]"#),
        (Candidate::Meta, r#"meta[property="og:description"]"#),
        (Candidate::Container, ".article-content"),
        (Candidate::Container, ".post-content"),
        (Candidate::Container, ".entry-content"),
        (Candidate::Container, ".content"),
        (Candidate::Container, "article"),
        (Candidate::Container, "main"),
        (Candidate::Container, ".main-content"),
        (Candidate::Container, r#"[role="main"]"#),
        (Candidate::Paragraphs, "p"),
    ]
    .into_iter()
    .filter_map(|(kind, raw)| Selector::parse(raw).ok().map(|s| (kind, s)))
    .collect()
});

/// Short whitespace-collapsed excerpt of a page, at most `max_length`
/// characters plus a trailing `...` when cut.
///
/// Candidates are tried in order and the first one longer than 50 characters
/// wins. When none qualifies, the text of the last candidate that matched
/// anything is used; an empty result becomes [`NO_SUMMARY_PLACEHOLDER`].
pub fn extract_summary(document: &Html, max_length: usize) -> String {
    let cleaned = strip_boilerplate(document);
    let mut content = String::new();

    for (kind, selector) in CANDIDATES.iter() {
        let mut matches = cleaned.select(selector).peekable();
        let Some(first) = matches.peek().copied() else {
            continue;
        };

        let raw = match kind {
            Candidate::Meta => meta_content(first),
            Candidate::Container => element_text(first),
            Candidate::Paragraphs => matches
                .take(FALLBACK_PARAGRAPHS)
                .map(element_text)
                .filter(|text| !text.is_empty())
                .collect::<Vec<_>>()
                .join(" "),
        };

        content = normalize_whitespace(&raw);
        if content.chars().count() > MIN_SUMMARY_CHARS {
            break;
        }
    }

    if content.is_empty() {
        NO_SUMMARY_PLACEHOLDER.to_string()
    } else {
        truncate_with_ellipsis(&content, max_length)
    }
}

/// Copy of `document` with boilerplate subtrees removed.
///
/// Detached nodes stay in the tree's arena and would still be found by
/// `select`, so the pruned tree is serialized and parsed again.
fn strip_boilerplate(document: &Html) -> Html {
    let mut pruned = document.clone();
    let doomed: Vec<_> = pruned.select(&BOILERPLATE).map(|element| element.id()).collect();
    if doomed.is_empty() {
        return pruned;
    }
    for id in doomed {
        if let Some(mut node) = pruned.tree.get_mut(id) {
            node.detach();
        }
    }
    Html::parse_document(&pruned.root_element().html())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::ELLIPSIS;

    fn summary_of(html: &str) -> String {
        extract_summary(&Html::parse_document(html), DEFAULT_SUMMARY_CHARS)
    }

    #[test]
    fn test_meta_description_wins() {
        let html = r#"<html><head>
            <meta name="description" content="A detailed look at how sparse mixture-of-experts layers route tokens between experts.">
            </head><body><article>Some body text that is long enough to qualify as a summary on its own.</article></body></html>"#;
        assert_eq!(
            summary_of(html),
            "A detailed look at how sparse mixture-of-experts layers route tokens between experts."
        );
    }

    #[test]
    fn test_short_meta_falls_through_to_container() {
        let html = r#"<html><head>
            <meta name="description" content="Blog">
            </head><body>
            <div class="post-content">
                <p>We trained   a new
                model on a large corpus and measured its reasoning ability across benchmarks.</p>
            </div></body></html>"#;
        assert_eq!(
            summary_of(html),
            "We trained a new model on a large corpus and measured its reasoning ability across benchmarks."
        );
    }

    #[test]
    fn test_boilerplate_removed_before_reading() {
        let html = r#"<html><body><main>
            <nav>Home About Careers Contact Pricing Enterprise Documentation Login</nav>
            <script>var tracking = "a very long inline script that must never show up";</script>
            <p>The research team released an open-weight model with a permissive license today.</p>
            </main></body></html>"#;
        let summary = summary_of(html);
        assert_eq!(
            summary,
            "The research team released an open-weight model with a permissive license today."
        );
    }

    #[test]
    fn test_footer_paragraphs_ignored() {
        let html = r#"<html><body>
            <footer><p>Copyright 2025 Example Corp. All rights reserved worldwide forever and ever.</p></footer>
            <div><p>Short.</p></div>
            </body></html>"#;
        assert_eq!(summary_of(html), "Short.");
    }

    #[test]
    fn test_content_block_inside_header_ignored() {
        let html = r#"<html><body>
            <header><div class="content">Subscribe to our newsletter for weekly updates on everything we ship.</div></header>
            <article>Researchers describe a retrieval method that halves latency on long documents.</article>
            </body></html>"#;
        assert_eq!(
            summary_of(html),
            "Researchers describe a retrieval method that halves latency on long documents."
        );
    }

    #[test]
    fn test_caller_document_untouched() {
        let html = r#"<html><body><nav>Menu entries</nav><p>Body</p></body></html>"#;
        let document = Html::parse_document(html);
        let _ = extract_summary(&document, DEFAULT_SUMMARY_CHARS);

        let nav = Selector::parse("nav").unwrap();
        assert_eq!(document.select(&nav).count(), 1);
    }

    #[test]
    fn test_paragraph_fallback_joins_first_five() {
        let html = r#"<html><body>
            <p>One.</p><p></p><p>Two.</p><p>Three.</p><p>Four.</p><p>Five.</p><p>Six.</p>
            </body></html>"#;
        assert_eq!(summary_of(html), "One. Two. Three. Four.");
    }

    #[test]
    fn test_placeholder_when_nothing_found() {
        let html = r#"<html><head><title>Empty</title></head><body><div></div></body></html>"#;
        assert_eq!(summary_of(html), NO_SUMMARY_PLACEHOLDER);
    }

    #[test]
    fn test_truncation_bound() {
        let long = "word ".repeat(200);
        let html = format!(r#"<html><body><article>{long}</article></body></html>"#);
        let document = Html::parse_document(&html);

        for max in [10, 60, 300] {
            let summary = extract_summary(&document, max);
            assert!(summary.chars().count() <= max + ELLIPSIS.len());
            assert!(summary.ends_with(ELLIPSIS));
        }
    }
}
