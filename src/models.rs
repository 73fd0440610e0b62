//! Data models for discovered papers, articles and the sources they come from.
//!
//! This module defines the value objects that flow through one digest request:
//! - [`SourceDescriptor`] / [`SourceRegistry`]: the sites to search, grouped by category
//! - [`TimeRange`] / [`TimeWindow`]: the user's recency choice and the cutoff derived from it
//! - [`ArticleRecord`]: a web page that passed date extraction and the cutoff
//! - [`PaperRecord`]: an arXiv entry that passed the cutoff
//! - [`DigestResults`]: everything collected for one request, ready for rendering
//!
//! All records are created per request and dropped after rendering.

use chrono::{DateTime, Duration, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A site to search for articles.
///
/// `url` is either a bare domain (`huggingface.co`) or a domain plus path prefix
/// (`openai.com/blog`); it is used verbatim in a `site:` search operator.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SourceDescriptor {
    /// Display name used to group articles in the report.
    pub name: String,
    /// Domain or domain+path prefix.
    pub url: String,
}

/// The two categories of sites searched for every digest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct SourceRegistry {
    /// Company and research blogs.
    #[serde(default)]
    pub tech_blogs: Vec<SourceDescriptor>,
    /// AI-focused and mainstream tech news outlets.
    #[serde(default)]
    pub news_sites: Vec<SourceDescriptor>,
}

impl SourceRegistry {
    /// Every source, tech blogs first, paired with its category heading.
    pub fn categorized(&self) -> impl Iterator<Item = (&'static str, &SourceDescriptor)> {
        self.tech_blogs
            .iter()
            .map(|s| (TECH_BLOGS_CATEGORY, s))
            .chain(self.news_sites.iter().map(|s| (NEWS_SITES_CATEGORY, s)))
    }
}

/// Category heading for [`SourceRegistry::tech_blogs`].
pub const TECH_BLOGS_CATEGORY: &str = "Tech Blogs";
/// Category heading for [`SourceRegistry::news_sites`].
pub const NEWS_SITES_CATEGORY: &str = "Industry News";

/// How far back a digest looks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize)]
pub enum TimeRange {
    #[value(name = "past-24h", alias = "past 24h")]
    #[serde(rename = "past 24h")]
    Past24Hours,
    #[default]
    #[value(name = "past-week", alias = "past week")]
    #[serde(rename = "past week")]
    PastWeek,
    #[value(name = "past-month", alias = "past month")]
    #[serde(rename = "past month")]
    PastMonth,
}

impl TimeRange {
    /// Number of days covered by the range.
    pub fn days(self) -> i64 {
        match self {
            TimeRange::Past24Hours => 1,
            TimeRange::PastWeek => 7,
            TimeRange::PastMonth => 30,
        }
    }

    /// Human readable label shown in the report header.
    pub fn label(self) -> &'static str {
        match self {
            TimeRange::Past24Hours => "past 24h",
            TimeRange::PastWeek => "past week",
            TimeRange::PastMonth => "past month",
        }
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The inclusive lower bound on publish dates for one request.
///
/// There is no upper bound: anything published at or after `cutoff` qualifies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeWindow {
    pub cutoff: DateTime<Utc>,
}

impl TimeWindow {
    /// Window covering `range` and ending at `now`.
    pub fn ending_at(now: DateTime<Utc>, range: TimeRange) -> Self {
        Self::days_before(now, range.days())
    }

    /// Window starting `days` days before `now`.
    pub fn days_before(now: DateTime<Utc>, days: i64) -> Self {
        Self {
            cutoff: now - Duration::days(days),
        }
    }

    /// Whether a publish date falls inside the window (`date >= cutoff`).
    pub fn includes(&self, date: DateTime<Utc>) -> bool {
        date >= self.cutoff
    }
}

/// A web article that passed date extraction and the time window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArticleRecord {
    pub title: String,
    pub url: String,
    /// Always stamped UTC before comparison with the cutoff.
    pub publish_date: DateTime<Utc>,
    /// Plain text, bounded by the summary extractor's maximum length.
    pub summary: String,
    /// Display name of the [`SourceDescriptor`] the article was found through.
    pub source_name: String,
}

/// An arXiv paper that passed the time window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaperRecord {
    /// Title with `[` and `]` escaped for Markdown link text.
    pub title: String,
    /// PDF link.
    pub url: String,
    /// Author names in the order arXiv lists them.
    pub authors: Vec<String>,
    pub publish_date: DateTime<Utc>,
    /// At most 200 characters plus an ellipsis.
    pub summary: String,
}

impl PaperRecord {
    /// Authors joined for display.
    pub fn authors_display(&self) -> String {
        self.authors.join(", ")
    }
}

/// Everything collected for one digest request.
#[derive(Debug, Clone, Serialize)]
pub struct DigestResults {
    pub keywords: String,
    pub time_range: TimeRange,
    pub window: TimeWindow,
    pub papers: Vec<PaperRecord>,
    pub tech_blogs: Vec<ArticleRecord>,
    pub news: Vec<ArticleRecord>,
}
