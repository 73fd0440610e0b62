//! Markdown rendering of a digest.
//!
//! Every section header is always present. An empty section gets a fixed
//! placeholder line instead of being omitted, so the report shape never
//! depends on what was found.

use crate::models::{ArticleRecord, DigestResults, NEWS_SITES_CATEGORY, PaperRecord, TECH_BLOGS_CATEGORY};

/// Heading of the arXiv section.
pub const ARXIV_HEADING: &str = "## 🔬 ArXiv Papers";
/// Line shown under [`ARXIV_HEADING`] when no paper qualified.
pub const NO_PAPERS_PLACEHOLDER: &str = "No relevant papers found in the selected time range.";
/// Line shown under a website category when no article qualified.
pub const NO_ARTICLES_PLACEHOLDER: &str =
    "No relevant content found on the listed sites in the selected time range.";

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Full report: title block, then arXiv, tech blogs and news sections.
pub fn render_report(results: &DigestResults) -> String {
    let mut md = format!(
        "# AI Focus Digest: “{}”\n(Time range: {})\n\n",
        results.keywords, results.time_range
    );
    md.push_str(&arxiv_section(&results.papers));
    md.push_str(&website_section(&results.tech_blogs, TECH_BLOGS_CATEGORY));
    md.push_str(&website_section(&results.news, NEWS_SITES_CATEGORY));
    md
}

/// The arXiv section, one bullet per paper.
pub fn arxiv_section(papers: &[PaperRecord]) -> String {
    if papers.is_empty() {
        return format!("{ARXIV_HEADING}\n\n{NO_PAPERS_PLACEHOLDER}\n\n");
    }

    let mut md = format!("{ARXIV_HEADING}\n\n");
    for paper in papers {
        md.push_str(&format!("- **[{}]({})**\n", paper.title, paper.url));
        md.push_str(&format!("  - **Authors**: {}\n", paper.authors_display()));
        md.push_str(&format!(
            "  - **Published**: {}\n",
            paper.publish_date.format(DATE_FORMAT)
        ));
        md.push_str(&format!("  - **Summary**: {}\n\n", paper.summary));
    }
    md
}

/// A website category section with articles grouped by source, sources in
/// order of first appearance.
pub fn website_section(articles: &[ArticleRecord], category: &str) -> String {
    if articles.is_empty() {
        return format!("## 📰 {category}\n\n{NO_ARTICLES_PLACEHOLDER}\n\n");
    }

    let mut groups: Vec<(&str, Vec<&ArticleRecord>)> = Vec::new();
    for article in articles {
        match groups.iter_mut().find(|(name, _)| *name == article.source_name) {
            Some((_, members)) => members.push(article),
            None => groups.push((&article.source_name, vec![article])),
        }
    }

    let mut md = format!("## 📰 {category}\n\n");
    for (source, members) in groups {
        md.push_str(&format!("### From {source}\n"));
        for article in members {
            md.push_str(&format!("- **[{}]({})**\n", article.title, article.url));
            md.push_str(&format!(
                "  - **Published**: {}\n",
                article.publish_date.format(DATE_FORMAT)
            ));
            md.push_str(&format!("  - **Summary**: {}\n\n", article.summary));
        }
    }
    md
}
