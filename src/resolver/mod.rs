//! Landing-page resolution into direct-download URLs.
//!
//! [`LinkResolver`] turns a landing-page URL into the direct link the page
//! points at. URLs that already carry the direct-download segment (`/dl/`)
//! are returned as-is without any request. Otherwise the page is fetched and
//! scanned with [`DirectLinkPatterns`]. Every failure on this path is logged
//! and reported as "no direct link", never as an error.
//!
//! # Example
//!
//! ```no_run
//! use ff_downloader_core::config::DownloaderConfig;
//! use ff_downloader_core::resolver::LinkResolver;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let resolver = LinkResolver::new(&DownloaderConfig::new("./downloads"), None)?;
//! if let Some(direct) = resolver.resolve("https://fuckingfast.co/abc123").await {
//!     println!("direct link: {direct}");
//! }
//! # Ok(())
//! # }
//! ```

mod error;
mod http_client;
mod patterns;

pub use error::ResolveError;
pub use http_client::build_page_client;
pub use patterns::DirectLinkPatterns;

use std::sync::Arc;

use reqwest::Client;
use reqwest::cookie::Jar;
use tracing::{debug, instrument, warn};

use crate::config::DownloaderConfig;

/// The URL to download plus the landing page it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTarget {
    /// Direct-download URL to fetch.
    pub url: String,
    /// Landing-page URL, sent as Referer and used in reports.
    pub original_url: String,
}

impl ResolvedTarget {
    /// Creates a resolved target.
    #[must_use]
    pub fn new(url: impl Into<String>, original_url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            original_url: original_url.into(),
        }
    }

    /// Referer value for the direct-download request.
    #[must_use]
    pub fn referer(&self) -> &str {
        &self.original_url
    }
}

/// Resolves landing pages to direct-download URLs.
#[derive(Debug, Clone)]
pub struct LinkResolver {
    client: Client,
    patterns: Arc<DirectLinkPatterns>,
    direct_segment: String,
}

impl LinkResolver {
    /// Creates a resolver from the run configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::ClientBuild`] when the page client cannot be built.
    pub fn new(
        config: &DownloaderConfig,
        cookie_jar: Option<Arc<Jar>>,
    ) -> Result<Self, ResolveError> {
        Ok(Self {
            client: build_page_client(config, cookie_jar)?,
            patterns: Arc::new(DirectLinkPatterns::new(
                &config.direct_host,
                &config.direct_segment,
            )),
            direct_segment: config.direct_segment.clone(),
        })
    }

    /// Returns true if `url` already follows the direct-download convention.
    #[must_use]
    pub fn is_direct(&self, url: &str) -> bool {
        url.contains(&self.direct_segment)
    }

    /// Resolves `page_url` to a direct-download URL.
    ///
    /// Returns `None` when the page cannot be loaded or contains no known
    /// link pattern; the caller then fetches `page_url` itself.
    #[instrument(skip(self), fields(page_url = %page_url))]
    pub async fn resolve(&self, page_url: &str) -> Option<String> {
        if self.is_direct(page_url) {
            debug!("url is already direct, skipping page fetch");
            return Some(page_url.to_string());
        }

        let body = match self.fetch_page(page_url).await {
            Ok(body) => body,
            Err(e) => {
                warn!(error = %e, "Error fetching page {page_url}");
                return None;
            }
        };

        let found = self.patterns.extract(&body, page_url);
        match &found {
            Some(direct) => debug!(direct = %direct, "found direct link"),
            None => debug!("no direct link on page"),
        }
        found
    }

    /// Resolves `original_url` into a [`ResolvedTarget`], or `None` when no
    /// direct link was found.
    pub async fn resolve_target(&self, original_url: &str) -> Option<ResolvedTarget> {
        self.resolve(original_url)
            .await
            .map(|url| ResolvedTarget::new(url, original_url))
    }

    async fn fetch_page(&self, page_url: &str) -> Result<String, ResolveError> {
        let response = self
            .client
            .get(page_url)
            .send()
            .await
            .map_err(|e| ResolveError::request(page_url, e))?;

        let status = response.status();
        if !status.is_success() {
            // Error pages are scanned like any other body.
            debug!(status = status.as_u16(), "landing page returned non-success status");
        }

        response
            .text()
            .await
            .map_err(|e| ResolveError::body(page_url, e))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn resolver() -> LinkResolver {
        LinkResolver::new(&DownloaderConfig::new("out"), None).unwrap()
    }

    #[test]
    fn test_is_direct_detects_segment() {
        let resolver = resolver();
        assert!(resolver.is_direct("https://fuckingfast.co/dl/abc"));
        assert!(!resolver.is_direct("https://fuckingfast.co/abc#file.rar"));
    }

    #[tokio::test]
    async fn test_resolve_direct_url_without_request() {
        // Port 9 (discard) on localhost is not served; a request would fail
        // and yield None, so Some proves no request was made.
        let resolver = resolver();
        let url = "http://127.0.0.1:9/dl/abc";
        assert_eq!(resolver.resolve(url).await.as_deref(), Some(url));
    }

    #[tokio::test]
    async fn test_resolve_unreachable_page_yields_none() {
        let resolver = resolver();
        assert_eq!(resolver.resolve("http://127.0.0.1:9/landing").await, None);
    }

    #[tokio::test]
    async fn test_resolve_target_sets_referer() {
        let resolver = resolver();
        let target = resolver
            .resolve_target("http://127.0.0.1:9/dl/abc")
            .await
            .unwrap();
        assert_eq!(target.url, "http://127.0.0.1:9/dl/abc");
        assert_eq!(target.referer(), "http://127.0.0.1:9/dl/abc");
    }
}
