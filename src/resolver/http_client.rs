//! HTTP client construction for landing-page requests.
//!
//! Landing pages are small HTML documents, so the client carries a total
//! request timeout (connect through body) rather than a read-inactivity one.

use std::sync::Arc;

use reqwest::Client;
use reqwest::cookie::Jar;

use crate::config::DownloaderConfig;

use super::ResolveError;

/// Builds the client used to load landing pages.
///
/// When `cookie_jar` is given, cookies a landing page sets are stored there so
/// the following direct-download request can present them.
///
/// # Errors
///
/// Returns [`ResolveError::ClientBuild`] when the TLS backend or builder fails.
pub fn build_page_client(
    config: &DownloaderConfig,
    cookie_jar: Option<Arc<Jar>>,
) -> Result<Client, ResolveError> {
    let mut builder = Client::builder()
        .timeout(config.page_timeout)
        .user_agent(config.user_agent.as_str())
        .gzip(true);
    if let Some(jar) = cookie_jar {
        builder = builder.cookie_provider(jar);
    }
    builder
        .build()
        .map_err(|source| ResolveError::ClientBuild { source })
}
