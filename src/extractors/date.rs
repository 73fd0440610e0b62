//! Publish date extraction.
//!
//! Pages announce their publication date in wildly different ways. The
//! extractor tries, strictly in this order, stopping at the first success:
//!
//! 1. The first `<time>` element's `datetime` attribute
//! 2. `application/ld+json` blocks (`datePublished`, `dateCreated`, `dateModified`, `publishedAt`)
//! 3. A fixed list of `<meta>` tags
//! 4. Elements whose class or id looks date-like, scanned for a literal date in their text
//!
//! # Timezones
//!
//! Every parsed value is read as a naive wall-clock time and stamped UTC. Any
//! offset present in the source text is discarded, so `2025-05-06T23:30:00-07:00`
//! becomes `2025-05-06T23:30:00Z`.

use super::{compile_selectors, element_text, meta_content};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use once_cell::sync::Lazy;
use regex::{Match, Regex};
use scraper::{Html, Selector};
use serde_json::Value;
use tracing::{debug, trace};

/// JSON-LD fields that may carry the publish date, in priority order.
const JSON_LD_DATE_FIELDS: [&str; 4] = ["datePublished", "dateCreated", "dateModified", "publishedAt"];

const META_DATE_SELECTORS: [&str; 7] = [
    r#"meta[property="article:published_time"]"#,
    r#"meta[name="publish_date"]"#,
    r#"meta[name="date"]"#,
    r#"meta[name="pubdate"]"#,
    r#"meta[property="og:published_time"]"#,
    r#"meta[name="article:published_time"]"#,
    r#"meta[name="DC.date.issued"]"#,
];

const DATE_ELEMENT_SELECTORS: [&str; 14] = [
    ".publish-date",
    ".publication-date",
    ".post-date",
    ".article-date",
    ".date-published",
    ".entry-date",
    ".blog-date",
    ".news-date",
    "#publish-date",
    "#publication-date",
    "#post-date",
    r#"[class*="date"]"#,
    r#"[class*="time"]"#,
    r#"[id*="date"]"#,
];

/// Formats tried on date-time text once any trailing offset has been removed.
const NAIVE_DATETIME_FORMATS: [&str; 6] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
];

const NAIVE_DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%Y/%m/%d"];

static TIME_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("time").unwrap());
static JSON_LD_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"script[type="application/ld+json"]"#).unwrap());
static META_SELECTORS: Lazy<Vec<Selector>> = Lazy::new(|| compile_selectors(&META_DATE_SELECTORS));
static DATE_SELECTORS: Lazy<Vec<Selector>> = Lazy::new(|| compile_selectors(&DATE_ELEMENT_SELECTORS));

/// Trailing timezone designator after a time of day.
static TRAILING_OFFSET: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<body>.*\d{2}:\d{2}(?::\d{2}(?:\.\d+)?)?)\s*(?:[zZ]|(?i:utc|gmt)|[+-]\d{2}(?::?\d{2})?)$")
        .unwrap()
});

static ISO_DATE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d{4})-(\d{2})-(\d{2})").unwrap());
static SLASH_DATE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d{2})/(\d{2})/(\d{4})").unwrap());
static DAY_MONTH_YEAR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(\d{1,2})\s+(jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)\w*\s+(\d{4})").unwrap()
});
static MONTH_DAY_YEAR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)\w*\s+(\d{1,2}),?\s+(\d{4})").unwrap()
});

type DateStrategy = fn(&Html) -> Option<DateTime<Utc>>;

/// Run the date cascade over a parsed document.
///
/// Returns `None` when no strategy produced a parseable date.
pub fn extract_publish_date(document: &Html) -> Option<DateTime<Utc>> {
    let cascade: [(&str, DateStrategy); 4] = [
        ("time_element", from_time_element),
        ("json_ld", from_json_ld),
        ("meta_tag", from_meta_tags),
        ("date_element", from_date_elements),
    ];

    cascade.iter().find_map(|(strategy, run)| {
        let found = run(document);
        if let Some(date) = found {
            debug!(strategy, %date, "Extracted publish date");
        }
        found
    })
}

fn from_time_element(document: &Html) -> Option<DateTime<Utc>> {
    let time = document.select(&TIME_SELECTOR).next()?;
    parse_date_text(time.value().attr("datetime")?)
}

fn from_json_ld(document: &Html) -> Option<DateTime<Utc>> {
    document
        .select(&JSON_LD_SELECTOR)
        .find_map(|script| date_from_json_ld(&script.text().collect::<String>()))
}

/// Date from one JSON-LD block.
///
/// A top-level array contributes only its first element. The first date
/// field present decides the outcome for the block.
fn date_from_json_ld(raw: &str) -> Option<DateTime<Utc>> {
    let value: Value = match serde_json::from_str(raw.trim()) {
        Ok(value) => value,
        Err(e) => {
            trace!(error = %e, "Skipping malformed JSON-LD block");
            return None;
        }
    };
    let node = match value {
        Value::Array(items) => items.into_iter().next()?,
        other => other,
    };
    let node = if has_date_field(&node) {
        node
    } else {
        node.get("@graph")
            .and_then(Value::as_array)
            .and_then(|graph| graph.iter().find(|n| has_date_field(n)))
            .cloned()?
    };

    let field = JSON_LD_DATE_FIELDS.iter().find_map(|f| node.get(*f))?;
    parse_date_text(field.as_str()?)
}

fn has_date_field(node: &Value) -> bool {
    JSON_LD_DATE_FIELDS.iter().any(|f| node.get(*f).is_some())
}

fn from_meta_tags(document: &Html) -> Option<DateTime<Utc>> {
    META_SELECTORS.iter().find_map(|selector| {
        let meta = document.select(selector).next()?;
        let content = meta_content(meta);
        if content.is_empty() {
            return None;
        }
        parse_date_text(&content)
    })
}

fn from_date_elements(document: &Html) -> Option<DateTime<Utc>> {
    DATE_SELECTORS.iter().find_map(|selector| {
        document.select(selector).find_map(|element| {
            let text = element_text(element);
            if text.chars().count() <= 6 {
                return None;
            }
            find_date_in_text(&text)
        })
    })
}

/// Parse a free-standing date value as found in attributes, JSON-LD and meta tags.
///
/// Accepts RFC 3339, RFC 2822, ISO-like date-times with or without an
/// offset or fractional seconds, bare ISO dates, and finally any of the
/// literal patterns understood by [`find_date_in_text`] when it makes up the
/// whole value (`"Updated 2025-05-06"` is rejected). The offset, if any, is
/// dropped and the wall-clock value is stamped UTC.
pub fn parse_date_text(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local().and_utc());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.naive_local().and_utc());
    }

    let naive = TRAILING_OFFSET
        .captures(s)
        .and_then(|caps| caps.name("body"))
        .map_or(s, |body| body.as_str());

    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(naive, format) {
            return Some(dt.and_utc());
        }
    }
    for format in NAIVE_DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(naive, format) {
            return midnight(date);
        }
    }

    exact_literal_date(s)
}

/// Look for one of four literal date patterns inside arbitrary text.
///
/// Patterns are tried in order: `YYYY-MM-DD`, `NN/NN/YYYY`, `D Mon YYYY`,
/// `Mon D, YYYY` (month names case-insensitive, abbreviated or full). The
/// first pattern that matches decides the result; an impossible date such as
/// `2024-13-40` yields `None` rather than trying later patterns.
pub fn find_date_in_text(text: &str) -> Option<DateTime<Utc>> {
    let (_, date) = first_literal_date(text)?;
    midnight(date?)
}

/// Like [`find_date_in_text`], but the pattern must span the whole of `text`.
fn exact_literal_date(text: &str) -> Option<DateTime<Utc>> {
    let (span, date) = first_literal_date(text)?;
    if span.start() != 0 || span.end() != text.len() {
        trace!(%text, "Literal date is surrounded by other text");
        return None;
    }
    midnight(date?)
}

/// Span of the first literal pattern found in `text`, and the date it denotes when valid.
fn first_literal_date(text: &str) -> Option<(Match<'_>, Option<NaiveDate>)> {
    if let Some(caps) = ISO_DATE.captures(text) {
        return Some((caps.get(0)?, ymd(&caps[1], &caps[2], &caps[3])));
    }
    if let Some(caps) = SLASH_DATE.captures(text) {
        // Month-first, falling back to day-first when that is the only valid reading.
        let date = ymd(&caps[3], &caps[1], &caps[2]).or_else(|| ymd(&caps[3], &caps[2], &caps[1]));
        return Some((caps.get(0)?, date));
    }
    if let Some(caps) = DAY_MONTH_YEAR.captures(text) {
        let date = month_number(&caps[2]).and_then(|m| ymd_num(&caps[3], m, &caps[1]));
        return Some((caps.get(0)?, date));
    }
    if let Some(caps) = MONTH_DAY_YEAR.captures(text) {
        let date = month_number(&caps[1]).and_then(|m| ymd_num(&caps[3], m, &caps[2]));
        return Some((caps.get(0)?, date));
    }
    None
}

fn midnight(date: NaiveDate) -> Option<DateTime<Utc>> {
    date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc())
}

fn ymd(year: &str, month: &str, day: &str) -> Option<NaiveDate> {
    ymd_num(year, month.parse().ok()?, day)
}

fn ymd_num(year: &str, month: u32, day: &str) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year.parse().ok()?, month, day.parse().ok()?)
}

fn month_number(name: &str) -> Option<u32> {
    const MONTHS: [&str; 12] = [
        "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
    ];
    let prefix = name.get(..3)?.to_ascii_lowercase();
    MONTHS
        .iter()
        .position(|m| *m == prefix)
        .map(|idx| idx as u32 + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, s).unwrap()
    }

    fn extract(html: &str) -> Option<DateTime<Utc>> {
        extract_publish_date(&Html::parse_document(html))
    }

    #[test]
    fn test_time_element_wins_over_meta() {
        let html = r#"<html><head>
            <meta property="article:published_time" content="2020-01-01T00:00:00Z">
            </head><body>
            <time datetime="2025-05-06T14:30:00Z">May 6</time>
            </body></html>"#;
        assert_eq!(extract(html), Some(utc(2025, 5, 6, 14, 30, 0)));
    }

    #[test]
    fn test_offset_is_discarded_not_converted() {
        let html = r#"<time datetime="2025-05-06T23:30:00-07:00"></time>"#;
        assert_eq!(extract(html), Some(utc(2025, 5, 6, 23, 30, 0)));
    }

    #[test]
    fn test_time_without_datetime_falls_through() {
        let html = r#"<html><head>
            <meta name="date" content="2025-04-01">
            </head><body><time>yesterday</time></body></html>"#;
        assert_eq!(extract(html), Some(utc(2025, 4, 1, 0, 0, 0)));
    }

    #[test]
    fn test_unparseable_time_falls_through_to_json_ld() {
        let html = r#"<html><head>
            <script type="application/ld+json">{"@type":"BlogPosting","datePublished":"2025-03-02T08:00:00+02:00"}</script>
            </head><body><time datetime="not a date"></time></body></html>"#;
        assert_eq!(extract(html), Some(utc(2025, 3, 2, 8, 0, 0)));
    }

    #[test]
    fn test_json_ld_array_uses_first_element() {
        let html = r#"<script type="application/ld+json">
            [{"dateCreated": "2025-02-10"}, {"datePublished": "2019-01-01"}]
            </script>"#;
        assert_eq!(extract(html), Some(utc(2025, 2, 10, 0, 0, 0)));
    }

    #[test]
    fn test_json_ld_field_priority() {
        let html = r#"<script type="application/ld+json">
            {"dateModified": "2025-02-12", "datePublished": "2025-02-10"}
            </script>"#;
        assert_eq!(extract(html), Some(utc(2025, 2, 10, 0, 0, 0)));
    }

    #[test]
    fn test_malformed_json_ld_skipped() {
        let html = r#"<html><head>
            <script type="application/ld+json">{ broken json </script>
            <script type="application/ld+json">{"publishedAt": "2025-01-20T10:00:00Z"}</script>
            </head></html>"#;
        assert_eq!(extract(html), Some(utc(2025, 1, 20, 10, 0, 0)));
    }

    #[test]
    fn test_json_ld_graph_node() {
        let html = r#"<script type="application/ld+json">
            {"@context":"https://schema.org","@graph":[
                {"@type":"WebSite","name":"Blog"},
                {"@type":"Article","datePublished":"2025-06-01T09:15:00+00:00"}
            ]}</script>"#;
        assert_eq!(extract(html), Some(utc(2025, 6, 1, 9, 15, 0)));
    }

    #[test]
    fn test_meta_selector_order() {
        let html = r#"<html><head>
            <meta name="DC.date.issued" content="2024-12-24">
            <meta property="og:published_time" content="2024-12-25T10:00:00Z">
            </head></html>"#;
        assert_eq!(extract(html), Some(utc(2024, 12, 25, 10, 0, 0)));
    }

    #[test]
    fn test_empty_meta_content_skipped() {
        let html = r#"<html><head>
            <meta property="article:published_time" content="">
            <meta name="pubdate" content="2024-11-11 08:30:00">
            </head></html>"#;
        assert_eq!(extract(html), Some(utc(2024, 11, 11, 8, 30, 0)));
    }

    #[test]
    fn test_date_class_iso_text() {
        let html = r#"<div class="post-date">Posted on 2025-03-14</div>"#;
        assert_eq!(extract(html), Some(utc(2025, 3, 14, 0, 0, 0)));
    }

    #[test]
    fn test_date_class_day_month_year_text() {
        let html = r#"<span class="entry-date">Published 5 SEPTEMBER 2024</span>"#;
        assert_eq!(extract(html), Some(utc(2024, 9, 5, 0, 0, 0)));
    }

    #[test]
    fn test_date_class_month_day_year_text() {
        let html = r#"<p id="article-date-line">Updated: Jan 7, 2025 by staff</p>"#;
        assert_eq!(extract(html), Some(utc(2025, 1, 7, 0, 0, 0)));
    }

    #[test]
    fn test_short_date_text_ignored() {
        let html = r#"<span class="date">Today</span>"#;
        assert_eq!(extract(html), None);
    }

    #[test]
    fn test_no_date_anywhere() {
        let html = r#"<html><head><title>Nothing here</title></head><body><p>Hello</p></body></html>"#;
        assert_eq!(extract(html), None);
    }

    #[test]
    fn test_slash_date_month_first() {
        assert_eq!(find_date_in_text("on 03/04/2025"), Some(utc(2025, 3, 4, 0, 0, 0)));
        assert_eq!(find_date_in_text("12/25/2024"), Some(utc(2024, 12, 25, 0, 0, 0)));
    }

    #[test]
    fn test_slash_date_day_first_fallback() {
        assert_eq!(find_date_in_text("on 25/12/2024"), Some(utc(2024, 12, 25, 0, 0, 0)));
        assert_eq!(find_date_in_text("31/31/2024"), None);
    }

    #[test]
    fn test_attribute_value_with_surrounding_text_rejected() {
        assert_eq!(parse_date_text("Updated 2025-05-06"), None);
        assert_eq!(parse_date_text("6 May 2025"), Some(utc(2025, 5, 6, 0, 0, 0)));
        assert_eq!(parse_date_text("04/05/2025"), Some(utc(2025, 4, 5, 0, 0, 0)));
    }

    #[test]
    fn test_junk_time_attribute_falls_through_to_meta() {
        let html = r#"<html><head>
            <meta name="date" content="2025-04-01">
            </head><body><time datetime="Updated 2025-05-06">May 6</time></body></html>"#;
        assert_eq!(extract(html), Some(utc(2025, 4, 1, 0, 0, 0)));
    }

    #[test]
    fn test_invalid_iso_pattern_yields_none() {
        assert_eq!(find_date_in_text("build 2024-13-45, Jan 2, 2025"), None);
    }

    #[test]
    fn test_parse_date_text_formats() {
        assert_eq!(parse_date_text("2025-05-06T14:30:00.123Z").map(|d| d.date_naive()),
            NaiveDate::from_ymd_opt(2025, 5, 6));
        assert_eq!(parse_date_text("2025-05-06T14:30:00+0530"), Some(utc(2025, 5, 6, 14, 30, 0)));
        assert_eq!(parse_date_text("2025-05-06T14:30:00"), Some(utc(2025, 5, 6, 14, 30, 0)));
        assert_eq!(parse_date_text("2025-05-06 14:30"), Some(utc(2025, 5, 6, 14, 30, 0)));
        assert_eq!(parse_date_text("2025/05/06"), Some(utc(2025, 5, 6, 0, 0, 0)));
        assert_eq!(parse_date_text("Tue, 06 May 2025 14:30:00 GMT"), Some(utc(2025, 5, 6, 14, 30, 0)));
        assert_eq!(parse_date_text("2025-05-06 14:30:00 UTC"), Some(utc(2025, 5, 6, 14, 30, 0)));
        assert_eq!(parse_date_text("May 6, 2025"), Some(utc(2025, 5, 6, 0, 0, 0)));
        assert_eq!(parse_date_text("   "), None);
        assert_eq!(parse_date_text("soon"), None);
    }

    #[test]
    fn test_month_number() {
        assert_eq!(month_number("January"), Some(1));
        assert_eq!(month_number("sept"), Some(9));
        assert_eq!(month_number("DEC"), Some(12));
        assert_eq!(month_number("xy"), None);
    }
}
