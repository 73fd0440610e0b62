//! HTTP access with an optional exponential backoff retry layer.
//!
//! Every outbound GET in the application (article pages, the arXiv API, the
//! search provider) goes through the [`FetchText`] trait so that the pipeline
//! can be exercised against canned responses.
//!
//! # Architecture
//!
//! - [`FetchText`]: Core trait defining an async "GET this URL as text"
//! - [`HttpClient`]: `reqwest` implementation with a browser user agent and timeout
//! - [`RetryFetch`]: Decorator that adds retry logic to any `FetchText` implementation
//!
//! # Retry Strategy
//!
//! - Configurable number of retry attempts
//! - Exponential backoff from a configurable base delay
//! - Maximum delay capped at 30 seconds
//! - Random jitter (0-250ms) added to prevent thundering herd

use rand::{Rng, rng};
use reqwest::header::{ACCEPT_LANGUAGE, HeaderMap, HeaderValue};
use std::error::Error;
use std::fmt;
use std::time::{Duration as StdDuration, Instant};
use tokio::time::sleep;
use tracing::{debug, error, instrument, warn};

/// User agent sent with every request; many blogs refuse obvious bots.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Trait for fetching a URL as text.
///
/// Implementors must surface non-success statuses and transport failures as
/// errors; callers decide whether to recover.
pub trait FetchText {
    /// GET `url` and return the response body.
    async fn fetch(&self, url: &str) -> Result<String, Box<dyn Error>>;
}

impl<T: FetchText + ?Sized> FetchText for &T {
    async fn fetch(&self, url: &str) -> Result<String, Box<dyn Error>> {
        (**self).fetch(url).await
    }
}

/// `reqwest`-backed [`FetchText`] implementation.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
}

impl HttpClient {
    /// Build a client with the browser user agent, a per-request timeout and
    /// an `Accept-Language` hint.
    pub fn new(timeout: StdDuration, lang: &str) -> Result<Self, Box<dyn Error>> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_str(lang)?);
        let client = reqwest::Client::builder()
            .user_agent(BROWSER_USER_AGENT)
            .default_headers(headers)
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }
}

impl FetchText for HttpClient {
    #[instrument(level = "debug", skip_all, fields(%url))]
    async fn fetch(&self, url: &str) -> Result<String, Box<dyn Error>> {
        let t0 = Instant::now();
        let response = self.client.get(url).send().await?.error_for_status()?;
        let body = response.text().await?;
        debug!(
            bytes = body.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Fetched URL"
        );
        Ok(body)
    }
}

/// Wrapper that adds exponential backoff retry logic to any [`FetchText`] implementation.
///
/// The delay between retries follows this formula:
/// ```text
/// delay = min(base_delay * 2^(attempt-1), max_delay) + random_jitter(0..250ms)
/// ```
pub struct RetryFetch<T> {
    /// The underlying client to wrap.
    inner: T,
    /// Maximum number of retry attempts before giving up.
    max_retries: usize,
    /// Initial delay between retries (doubles with each attempt).
    base_delay: StdDuration,
    /// Maximum delay cap to prevent excessive waiting.
    max_delay: StdDuration,
}

impl<T> RetryFetch<T>
where
    T: FetchText,
{
    /// Create a new retry wrapper around an existing [`FetchText`] implementation.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let client = HttpClient::new(Duration::from_secs(15), "en")?;
    /// let retrying = RetryFetch::new(&client, 2, Duration::from_secs(1));
    /// ```
    pub fn new(inner: T, max_retries: usize, base_delay: StdDuration) -> Self {
        Self {
            inner,
            max_retries,
            base_delay,
            max_delay: StdDuration::from_secs(30),
        }
    }

    fn backoff(&self, attempt: usize) -> StdDuration {
        let shift = (attempt - 1).min(16) as u32;
        let delay = self.base_delay.saturating_mul(1 << shift).min(self.max_delay);
        let jitter_ms: u64 = rng().random_range(0..=250);
        delay + StdDuration::from_millis(jitter_ms)
    }
}

impl<T> fmt::Debug for RetryFetch<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryFetch")
            .field("max_retries", &self.max_retries)
            .field("base_delay", &self.base_delay)
            .field("max_delay", &self.max_delay)
            .finish()
    }
}

impl<T> FetchText for RetryFetch<T>
where
    T: FetchText,
{
    #[instrument(level = "info", skip_all, fields(%url))]
    async fn fetch(&self, url: &str) -> Result<String, Box<dyn Error>> {
        let total_t0 = Instant::now();
        let mut attempt = 0usize;

        loop {
            let attempt_t0 = Instant::now();
            match self.inner.fetch(url).await {
                Ok(body) => return Ok(body),
                Err(e) => {
                    attempt += 1;
                    let attempt_dt = attempt_t0.elapsed();
                    let total_dt = total_t0.elapsed();

                    if attempt > self.max_retries {
                        error!(
                            attempt,
                            max = self.max_retries,
                            elapsed_ms_attempt = attempt_dt.as_millis() as u64,
                            elapsed_ms_total = total_dt.as_millis() as u64,
                            error = %e,
                            "fetch() exhausted retries"
                        );
                        return Err(e);
                    }

                    let delay = self.backoff(attempt);
                    warn!(
                        attempt,
                        max = self.max_retries,
                        elapsed_ms_attempt = attempt_dt.as_millis() as u64,
                        elapsed_ms_total = total_dt.as_millis() as u64,
                        ?delay,
                        error = %e,
                        "fetch() attempt failed; backing off"
                    );
                    sleep(delay).await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct Flaky {
        failures_left: Cell<usize>,
        calls: Cell<usize>,
    }

    impl FetchText for Flaky {
        async fn fetch(&self, _url: &str) -> Result<String, Box<dyn Error>> {
            self.calls.set(self.calls.get() + 1);
            if self.failures_left.get() > 0 {
                self.failures_left.set(self.failures_left.get() - 1);
                return Err("connection reset".into());
            }
            Ok("ok".to_string())
        }
    }

    #[tokio::test]
    async fn test_retry_recovers_after_transient_failure() {
        let inner = Flaky {
            failures_left: Cell::new(2),
            calls: Cell::new(0),
        };
        let retrying = RetryFetch::new(&inner, 3, StdDuration::from_millis(1));

        let body = retrying.fetch("https://example.com").await.unwrap();
        assert_eq!(body, "ok");
        assert_eq!(inner.calls.get(), 3);
    }

    #[tokio::test]
    async fn test_retry_gives_up_after_max_retries() {
        let inner = Flaky {
            failures_left: Cell::new(10),
            calls: Cell::new(0),
        };
        let retrying = RetryFetch::new(&inner, 1, StdDuration::from_millis(1));

        assert!(retrying.fetch("https://example.com").await.is_err());
        assert_eq!(inner.calls.get(), 2);
    }

    #[test]
    fn test_backoff_is_capped() {
        let inner = Flaky {
            failures_left: Cell::new(0),
            calls: Cell::new(0),
        };
        let retrying = RetryFetch::new(&inner, 40, StdDuration::from_secs(1));

        let first = retrying.backoff(1);
        assert!(first >= StdDuration::from_secs(1));
        assert!(first <= StdDuration::from_millis(1250));

        let late = retrying.backoff(30);
        assert!(late <= StdDuration::from_millis(30_250));
    }
}
