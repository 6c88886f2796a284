//! One link, end to end: resolve, fetch, name, write.
//!
//! [`DownloadWorker::process_one`] never returns an error. Whatever stops the
//! pipeline is logged and captured in the [`DownloadOutcome`].

use std::path::{Path, PathBuf};
use std::sync::Arc;

use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use reqwest::cookie::Jar;
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, info, instrument, warn};

use super::client::{FetchedResponse, HttpClient};
use super::engine::EngineError;
use super::error::DownloadError;
use super::filename::{derive_filename, resolve_unique_path};
use super::outcome::DownloadOutcome;
use crate::config::DownloaderConfig;
use crate::resolver::{LinkResolver, ResolvedTarget};

/// Processes single links. Cheap to clone; clones share HTTP connection
/// pools and the cookie jar.
#[derive(Debug, Clone)]
pub struct DownloadWorker {
    resolver: LinkResolver,
    client: HttpClient,
    output_dir: PathBuf,
}

impl DownloadWorker {
    /// Builds the resolver and fetch clients for `config`.
    ///
    /// Both clients share one cookie jar, so cookies set by a landing page
    /// accompany the direct-download request.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::ClientBuild`] if either HTTP client fails to build.
    pub fn new(config: &DownloaderConfig) -> Result<Self, EngineError> {
        let jar = Arc::new(Jar::default());
        let resolver = LinkResolver::new(config, Some(Arc::clone(&jar)))
            .map_err(|e| EngineError::ClientBuild(e.to_string()))?;
        let client = HttpClient::new(config, Some(jar))
            .map_err(|e| EngineError::ClientBuild(e.to_string()))?;
        Ok(Self {
            resolver,
            client,
            output_dir: config.output_dir.clone(),
        })
    }

    /// Destination directory for written files.
    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Downloads `original_url` and reports how it went.
    #[instrument(skip(self), fields(url = %original_url))]
    pub async fn process_one(&self, original_url: &str) -> DownloadOutcome {
        let target = self.resolver.resolve_target(original_url).await;
        let resolved_url = target.as_ref().map(|t| t.url.clone());

        match self.download(original_url, target.as_ref()).await {
            Ok(path) => {
                info!("Finished: {}", path.display());
                DownloadOutcome::succeeded(original_url, resolved_url, path)
            }
            Err(e) => {
                warn!(kind = %e.kind(), "Failed: {original_url} - {e}");
                DownloadOutcome::failed(original_url, resolved_url, &e)
            }
        }
    }

    async fn download(
        &self,
        original_url: &str,
        target: Option<&ResolvedTarget>,
    ) -> Result<PathBuf, DownloadError> {
        let response = match target {
            Some(target) => {
                self.client
                    .fetch(&target.url, Some(target.referer()))
                    .await?
            }
            None => {
                debug!("no direct link found, fetching original url");
                self.client.fetch(original_url, None).await?
            }
        };

        let filename = derive_filename(response.headers(), response.effective_url());
        let path = resolve_unique_path(&self.output_dir, &filename).await;
        info!("Downloading: {original_url} -> {}", path.display());

        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
            .map_err(|e| DownloadError::io(path.clone(), e))?;

        match write_response(file, response, &path).await {
            Ok(written) => {
                debug!(bytes = written, path = %path.display(), "file written");
                Ok(path)
            }
            Err(e) => {
                debug!(path = %path.display(), "removing partial file after error");
                let _ = tokio::fs::remove_file(&path).await;
                Err(e)
            }
        }
    }
}

async fn write_response(
    file: File,
    response: FetchedResponse,
    path: &Path,
) -> Result<u64, DownloadError> {
    stream_to_file(file, response.into_chunks(), path).await
}

/// Writes every non-empty chunk to `file`, returning the bytes written.
async fn stream_to_file<S>(file: File, chunks: S, path: &Path) -> Result<u64, DownloadError>
where
    S: Stream<Item = Result<Bytes, DownloadError>>,
{
    let mut writer = BufWriter::new(file);
    let mut chunks = std::pin::pin!(chunks);
    let mut bytes_written: u64 = 0;

    while let Some(chunk) = chunks.next().await {
        let chunk = chunk?;
        if chunk.is_empty() {
            continue;
        }
        writer
            .write_all(&chunk)
            .await
            .map_err(|e| DownloadError::io(path, e))?;
        bytes_written += chunk.len() as u64;
    }

    writer
        .flush()
        .await
        .map_err(|e| DownloadError::io(path, e))?;

    Ok(bytes_written)
}
