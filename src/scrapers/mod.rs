//! Collection of papers and articles from the outside world.
//!
//! Website sources follow a two-phase pattern:
//!
//! 1. **Discovery**: a site-scoped web search returns candidate URLs
//! 2. **Fetching**: each URL is downloaded and run through the extractors
//!
//! # Modules
//!
//! | Module | Role |
//! |--------|------|
//! | [`arxiv`] | Atom API query, newest submissions first |
//! | [`search`] | [`SearchProvider`](search::SearchProvider) trait and the DuckDuckGo HTML provider |
//! | [`page`] | Fetch one page, extract title/date/summary, apply the cutoff |
//! | [`sources`] | Fan out over a category of registry sources with bounded concurrency |
//!
//! Failures never propagate past these modules: a broken source or page is
//! logged and skipped.

pub mod arxiv;
pub mod page;
pub mod search;
pub mod sources;
