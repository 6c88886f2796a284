//! Error types for landing-page resolution.
//!
//! These never escape [`LinkResolver::resolve`](super::LinkResolver::resolve):
//! a failed page load is logged and resolution yields no direct link, so the
//! worker falls back to fetching the original URL.

use thiserror::Error;

/// Errors that can occur while loading a landing page.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The page HTTP client could not be built.
    #[error("failed to build landing-page HTTP client: {source}")]
    ClientBuild {
        /// Builder error.
        #[source]
        source: reqwest::Error,
    },

    /// Network-level failure (DNS, connection refused, TLS).
    #[error("error fetching page {url}: {source}")]
    PageFetch {
        /// Landing-page URL.
        url: String,
        /// Underlying request error.
        #[source]
        source: reqwest::Error,
    },

    /// The page did not respond within the page timeout.
    #[error("timeout fetching page {url}")]
    Timeout {
        /// Landing-page URL.
        url: String,
    },

    /// The page body could not be read as text.
    #[error("error reading page body {url}: {source}")]
    Body {
        /// Landing-page URL.
        url: String,
        /// Underlying body error.
        #[source]
        source: reqwest::Error,
    },
}

impl ResolveError {
    /// Classifies a request error as a timeout or a generic fetch failure.
    pub fn request(url: impl Into<String>, source: reqwest::Error) -> Self {
        let url = url.into();
        if source.is_timeout() {
            Self::Timeout { url }
        } else {
            Self::PageFetch { url, source }
        }
    }

    /// Creates a body read error.
    pub fn body(url: impl Into<String>, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            return Self::Timeout { url: url.into() };
        }
        Self::Body {
            url: url.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_display_names_url() {
        let err = ResolveError::Timeout {
            url: "https://fuckingfast.co/abc".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("timeout"), "Expected 'timeout' in: {msg}");
        assert!(msg.contains("https://fuckingfast.co/abc"), "Expected URL in: {msg}");
    }
}
