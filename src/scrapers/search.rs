//! Web search provider used to discover candidate article URLs.
//!
//! The shipped provider scrapes DuckDuckGo's JavaScript-free results page,
//! which needs no API key and honours the `site:` operator.
//!
//! # Result links
//!
//! DuckDuckGo wraps organic results in a redirect of the form
//! `//duckduckgo.com/l/?uddg=<percent-encoded target>&rut=...`. The target is
//! recovered from the `uddg` parameter; ad links and anything that is not
//! plain http(s) are dropped.

use crate::api::FetchText;
use itertools::Itertools;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use std::error::Error;
use tracing::{debug, instrument};
use url::Url;

static RESULT_LINK: Lazy<Selector> = Lazy::new(|| Selector::parse("a.result__a[href]").unwrap());

/// Anything that can turn a query into an ordered list of result URLs.
pub trait SearchProvider {
    /// Run `query` and return at most `num_results` URLs in engine order.
    async fn search(
        &self,
        query: &str,
        lang: &str,
        num_results: usize,
    ) -> Result<Vec<String>, Box<dyn Error>>;
}

impl<T: SearchProvider + ?Sized> SearchProvider for &T {
    async fn search(
        &self,
        query: &str,
        lang: &str,
        num_results: usize,
    ) -> Result<Vec<String>, Box<dyn Error>> {
        (**self).search(query, lang, num_results).await
    }
}

/// Build the site-scoped query for one source: `"<keyword>" site:<url>`.
pub fn site_query(keywords: &str, site: &str) -> String {
    format!("\"{}\" site:{}", keywords, site)
}

/// DuckDuckGo HTML results scraper.
#[derive(Debug, Clone)]
pub struct DuckDuckGo<H> {
    http: H,
    endpoint: String,
}

impl<H: FetchText> DuckDuckGo<H> {
    pub fn new(http: H, endpoint: impl Into<String>) -> Self {
        Self {
            http,
            endpoint: endpoint.into(),
        }
    }

    fn query_url(&self, query: &str, lang: &str) -> String {
        format!(
            "{}?q={}&kl={}",
            self.endpoint,
            urlencoding::encode(query),
            region_for_lang(lang)
        )
    }
}

impl<H: FetchText> SearchProvider for DuckDuckGo<H> {
    #[instrument(level = "info", skip_all, fields(%query, %lang, num_results))]
    async fn search(
        &self,
        query: &str,
        lang: &str,
        num_results: usize,
    ) -> Result<Vec<String>, Box<dyn Error>> {
        let body = self.http.fetch(&self.query_url(query, lang)).await?;
        let urls = parse_result_links(&body, num_results);
        debug!(count = urls.len(), urls = ?urls, "DuckDuckGo results");
        Ok(urls)
    }
}

/// DuckDuckGo region code for a language hint.
fn region_for_lang(lang: &str) -> &'static str {
    match lang.to_ascii_lowercase().as_str() {
        "en" => "us-en",
        "de" => "de-de",
        "fr" => "fr-fr",
        "es" => "es-es",
        "zh" => "cn-zh",
        "ja" => "jp-jp",
        _ => "wt-wt",
    }
}

/// Organic result URLs from a DuckDuckGo HTML page, deduplicated, in page order.
pub fn parse_result_links(html: &str, limit: usize) -> Vec<String> {
    let document = Html::parse_document(html);
    document
        .select(&RESULT_LINK)
        .filter_map(|a| a.value().attr("href"))
        .filter_map(resolve_result_href)
        .unique()
        .take(limit)
        .collect()
}

/// Target URL of one result link, unwrapping DuckDuckGo redirects.
fn resolve_result_href(href: &str) -> Option<String> {
    let base = Url::parse("https://duckduckgo.com/").ok()?;
    let link = base.join(href).ok()?;

    let target = if is_duckduckgo_host(&link) && link.path() == "/l/" {
        let (_, uddg) = link.query_pairs().find(|(key, _)| key == "uddg")?;
        Url::parse(&uddg).ok()?
    } else {
        link
    };

    let is_web = matches!(target.scheme(), "http" | "https");
    (is_web && !is_duckduckgo_host(&target)).then(|| target.to_string())
}

fn is_duckduckgo_host(url: &Url) -> bool {
    url.host_str()
        .is_some_and(|host| host == "duckduckgo.com" || host.ends_with(".duckduckgo.com"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    const RESULTS_PAGE: &str = r#"<html><body>
        <div class="result results_links_deep web-result">
          <h2 class="result__title">
            <a rel="nofollow" class="result__a" href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fhuggingface.co%2Fblog%2Fmoe&amp;rut=abc123">Mixture of Experts Explained</a>
          </h2>
        </div>
        <div class="result result--ad">
          <a class="result__a" href="https://duckduckgo.com/y.js?ad_domain=example.com&amp;u3=x">Sponsored</a>
        </div>
        <div class="result">
          <a class="result__a" href="https://huggingface.co/blog/moe-serving">Serving MoE models</a>
        </div>
        <div class="result">
          <a class="result__a" href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fhuggingface.co%2Fblog%2Fmoe&amp;rut=def">Duplicate</a>
        </div>
        <div class="result">
          <a class="result__a" href="https://huggingface.co/blog/third">Third</a>
        </div>
        </body></html>"#;

    #[test]
    fn test_site_query() {
        assert_eq!(
            site_query("transformer", "openai.com/blog"),
            "\"transformer\" site:openai.com/blog"
        );
    }

    #[test]
    fn test_parse_result_links_unwraps_and_filters() {
        let urls = parse_result_links(RESULTS_PAGE, 10);
        assert_eq!(
            urls,
            vec![
                "https://huggingface.co/blog/moe".to_string(),
                "https://huggingface.co/blog/moe-serving".to_string(),
                "https://huggingface.co/blog/third".to_string(),
            ]
        );
    }

    #[test]
    fn test_parse_result_links_respects_limit() {
        let urls = parse_result_links(RESULTS_PAGE, 2);
        assert_eq!(urls.len(), 2);
        assert_eq!(urls[0], "https://huggingface.co/blog/moe");
    }

    #[test]
    fn test_resolve_rejects_non_web_links() {
        assert_eq!(resolve_result_href("javascript:void(0)"), None);
        assert_eq!(resolve_result_href("mailto:press@example.com"), None);
    }

    struct Recording {
        requested: RefCell<Vec<String>>,
    }

    impl FetchText for Recording {
        async fn fetch(&self, url: &str) -> Result<String, Box<dyn Error>> {
            self.requested.borrow_mut().push(url.to_string());
            Ok(RESULTS_PAGE.to_string())
        }
    }

    #[tokio::test]
    async fn test_duckduckgo_query_url() {
        let http = Recording {
            requested: RefCell::new(Vec::new()),
        };
        let ddg = DuckDuckGo::new(&http, "https://html.duckduckgo.com/html/");

        let urls = ddg
            .search(&site_query("LLM agent", "huggingface.co/blog"), "en", 2)
            .await
            .unwrap();

        assert_eq!(urls.len(), 2);
        assert_eq!(
            http.requested.borrow()[0],
            "https://html.duckduckgo.com/html/?q=%22LLM%20agent%22%20site%3Ahuggingface.co%2Fblog&kl=us-en"
        );
    }
}
