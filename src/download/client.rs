//! HTTP client wrapper for fetching files.
//!
//! This module provides [`HttpClient`], which issues the GET for a resolved
//! URL and hands back a [`FetchedResponse`] whose body is consumed as a
//! stream of chunks, so arbitrarily large files never sit in memory.

use std::sync::Arc;

use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use reqwest::cookie::Jar;
use reqwest::header::{HeaderMap, REFERER};
use reqwest::Client;
use tracing::{debug, instrument};
use url::Url;

use super::error::DownloadError;
use crate::config::DownloaderConfig;

/// HTTP client for streaming file downloads.
///
/// Created once per run and cloned into every worker; clones share the
/// connection pool.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
}

/// A successful (2xx) response whose body has not been read yet.
#[derive(Debug)]
pub struct FetchedResponse {
    requested_url: String,
    response: reqwest::Response,
}

impl HttpClient {
    /// Creates a client from the run configuration.
    ///
    /// The fetch timeout applies to connecting and to every individual read,
    /// not to the whole transfer. Redirects are followed automatically.
    ///
    /// # Errors
    ///
    /// Returns the builder error when the TLS backend cannot be initialised
    /// or the configured User-Agent is not a valid header value.
    pub fn new(
        config: &DownloaderConfig,
        cookie_jar: Option<Arc<Jar>>,
    ) -> Result<Self, reqwest::Error> {
        let mut builder = Client::builder()
            .connect_timeout(config.fetch_timeout)
            .read_timeout(config.fetch_timeout)
            .gzip(true)
            .user_agent(config.user_agent.as_str());
        if let Some(jar) = cookie_jar {
            builder = builder.cookie_provider(jar);
        }
        Ok(Self {
            client: builder.build()?,
        })
    }

    /// Sends a GET for `url`, with a Referer header when `referer` is given.
    ///
    /// # Errors
    ///
    /// - [`DownloadError::InvalidUrl`] if `url` does not parse
    /// - [`DownloadError::Timeout`] / [`DownloadError::Network`] on request failure
    /// - [`DownloadError::HttpStatus`] for any non-2xx final status
    #[instrument(skip(self), fields(url = %url, referer = ?referer))]
    pub async fn fetch(
        &self,
        url: &str,
        referer: Option<&str>,
    ) -> Result<FetchedResponse, DownloadError> {
        let parsed = Url::parse(url).map_err(|_| DownloadError::invalid_url(url))?;

        let mut request = self.client.get(parsed);
        if let Some(referer) = referer {
            request = request.header(REFERER, referer);
        }

        let response = request
            .send()
            .await
            .map_err(|e| DownloadError::network(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::http_status(url, status.as_u16()));
        }

        debug!(
            status = status.as_u16(),
            effective_url = %response.url(),
            "response received"
        );
        Ok(FetchedResponse {
            requested_url: url.to_string(),
            response,
        })
    }
}

impl FetchedResponse {
    /// Response headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        self.response.headers()
    }

    /// URL after following redirects.
    #[must_use]
    pub fn effective_url(&self) -> &Url {
        self.response.url()
    }

    /// Consumes the response into a stream of body chunks.
    pub fn into_chunks(self) -> impl Stream<Item = Result<Bytes, DownloadError>> {
        let url = self.requested_url;
        self.response
            .bytes_stream()
            .map(move |chunk| chunk.map_err(|e| DownloadError::network(url.as_str(), e)))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fetch_rejects_invalid_url() {
        let client = HttpClient::new(&DownloaderConfig::new("out"), None).unwrap();
        let result = client.fetch("not a url", None).await;
        assert!(matches!(result, Err(DownloadError::InvalidUrl { .. })));
    }

    #[test]
    fn test_client_rejects_invalid_user_agent() {
        let config = DownloaderConfig::new("out").with_user_agent("bad\nagent");
        assert!(HttpClient::new(&config, None).is_err());
    }
}
