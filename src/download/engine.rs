//! Dispatcher running download workers concurrently over the link list.
//!
//! This module provides the [`DownloadEngine`] which coordinates concurrent
//! downloads using a semaphore-based concurrency control pattern.
//!
//! # Example
//!
//! ```no_run
//! use ff_downloader_core::config::DownloaderConfig;
//! use ff_downloader_core::download::DownloadEngine;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let engine = DownloadEngine::new(DownloaderConfig::new("./downloads").with_workers(4))?;
//! let links = vec!["https://fuckingfast.co/abc123".to_string()];
//! let summary = engine.run_all(&links).await?;
//! println!("Completed: {}, Failed: {}", summary.completed(), summary.failed());
//! # Ok(())
//! # }
//! ```

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::path::PathBuf;
use std::sync::Arc;

use futures_util::FutureExt;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, instrument, warn};

use super::outcome::DownloadOutcome;
use super::worker::DownloadWorker;
use crate::config::{ConfigError, DownloaderConfig};

/// Error type for download engine operations.
///
/// Only setup can fail; individual link failures end up in
/// [`DownloadOutcome`]s instead.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration rejected by [`DownloaderConfig::validate`].
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// An HTTP client could not be built.
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(String),

    /// The destination directory could not be created.
    #[error("failed to create output directory {path}: {source}")]
    OutputDir {
        /// Directory that could not be created.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Semaphore was closed unexpectedly.
    #[error("semaphore closed unexpectedly")]
    SemaphoreClosed,
}

/// Outcomes of one [`DownloadEngine::run_all`] call, in completion order.
///
/// Counts are computed from the collected outcomes after every task has
/// finished; workers never share counters.
#[derive(Debug, Default)]
pub struct RunSummary {
    outcomes: Vec<DownloadOutcome>,
}

impl RunSummary {
    /// Wraps a list of outcomes.
    #[must_use]
    pub fn new(outcomes: Vec<DownloadOutcome>) -> Self {
        Self { outcomes }
    }

    /// All outcomes, in the order their workers finished.
    #[must_use]
    pub fn outcomes(&self) -> &[DownloadOutcome] {
        &self.outcomes
    }

    /// Number of links whose file was written.
    #[must_use]
    pub fn completed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    /// Number of links that failed.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.total() - self.completed()
    }

    /// Number of links processed.
    #[must_use]
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    /// Failed outcomes only.
    pub fn failures(&self) -> impl Iterator<Item = &DownloadOutcome> {
        self.outcomes.iter().filter(|o| !o.is_success())
    }
}

/// Fixed-size pool running [`DownloadWorker`]s over a list of links.
///
/// # Concurrency Model
///
/// - Each link runs in its own Tokio task
/// - A semaphore permit is acquired before spawning, so at most `workers`
///   links are in flight and the rest wait for a free slot
/// - Permits are released automatically when a task finishes (RAII)
/// - No ordering is imposed on completion
#[derive(Debug)]
pub struct DownloadEngine {
    semaphore: Arc<Semaphore>,
    workers: usize,
    worker: DownloadWorker,
}

impl DownloadEngine {
    /// Creates an engine for `config`.
    ///
    /// Validates the configuration and builds the HTTP clients shared by all
    /// tasks.
    ///
    /// # Errors
    ///
    /// - [`EngineError::Config`] for an invalid configuration
    /// - [`EngineError::ClientBuild`] if an HTTP client cannot be built
    #[instrument(level = "debug", skip(config), fields(workers = config.workers))]
    pub fn new(config: DownloaderConfig) -> Result<Self, EngineError> {
        config.validate()?;
        let worker = DownloadWorker::new(&config)?;
        Ok(Self::with_worker(config.workers, worker))
    }

    /// Creates an engine around a prebuilt worker.
    ///
    /// `workers` is clamped to at least one slot.
    #[must_use]
    pub fn with_worker(workers: usize, worker: DownloadWorker) -> Self {
        let workers = workers.max(1);
        debug!(workers, output_dir = %worker.output_dir().display(), "creating download engine");
        Self {
            semaphore: Arc::new(Semaphore::new(workers)),
            workers,
            worker,
        }
    }

    /// Returns the configured pool size.
    #[must_use]
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Creates the destination directory if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::OutputDir`] if the directory cannot be created.
    pub async fn prepare_output_dir(&self) -> Result<(), EngineError> {
        let dir = self.worker.output_dir();
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|source| EngineError::OutputDir {
                path: dir.to_path_buf(),
                source,
            })
    }

    /// Processes every link and waits for all of them to finish.
    ///
    /// Each link is handled by exactly one task. A failing link never
    /// affects the others.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::OutputDir`] if the destination directory cannot
    /// be created, or [`EngineError::SemaphoreClosed`] if the pool is closed.
    /// Individual download failures do NOT cause this method to error, and a
    /// link whose task panics is reported as [`FailureKind::Aborted`].
    ///
    /// [`FailureKind::Aborted`]: super::FailureKind::Aborted
    #[instrument(skip(self, links), fields(links = links.len()))]
    pub async fn run_all(&self, links: &[String]) -> Result<RunSummary, EngineError> {
        self.prepare_output_dir().await?;
        info!(workers = self.workers, "starting downloads");

        let mut tasks = JoinSet::new();
        for link in links {
            // Blocks while all slots are busy.
            let permit = self
                .semaphore
                .clone()
                .acquire_owned()
                .await
                .map_err(|_| EngineError::SemaphoreClosed)?;

            let worker = self.worker.clone();
            let link = link.clone();
            tasks.spawn(async move {
                let _permit = permit;
                guard_outcome(&link, worker.process_one(&link)).await
            });
        }

        debug!(task_count = tasks.len(), "waiting for downloads to complete");

        let mut outcomes = Vec::with_capacity(links.len());
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => warn!(error = %e, "download task cancelled"),
            }
        }

        let summary = RunSummary::new(outcomes);
        info!(
            completed = summary.completed(),
            failed = summary.failed(),
            total = summary.total(),
            "downloads finished"
        );
        Ok(summary)
    }
}

/// Runs one link's pipeline, turning a panic into an aborted outcome so the
/// link is still counted.
async fn guard_outcome<F>(link: &str, pipeline: F) -> DownloadOutcome
where
    F: Future<Output = DownloadOutcome>,
{
    match AssertUnwindSafe(pipeline).catch_unwind().await {
        Ok(outcome) => outcome,
        Err(_) => {
            warn!("Failed: {link} - download task panicked");
            DownloadOutcome::aborted(link, "download task panicked")
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::download::{DownloadError, FailureKind};

    fn ok(url: &str) -> DownloadOutcome {
        DownloadOutcome::succeeded(url, None, PathBuf::from("/tmp/f"))
    }

    fn failed(url: &str) -> DownloadOutcome {
        DownloadOutcome::failed(url, None, &DownloadError::http_status(url, 404))
    }

    #[test]
    fn test_engine_new_rejects_invalid_workers() {
        let result = DownloadEngine::new(DownloaderConfig::new("out").with_workers(0));
        assert!(matches!(
            result,
            Err(EngineError::Config(ConfigError::InvalidWorkers { value: 0 }))
        ));
    }

    #[test]
    fn test_engine_new_valid_workers() {
        let engine = DownloadEngine::new(DownloaderConfig::new("out").with_workers(4)).unwrap();
        assert_eq!(engine.workers(), 4);
    }

    #[test]
    fn test_run_summary_counts() {
        let summary = RunSummary::new(vec![ok("a"), failed("b"), ok("c")]);
        assert_eq!(summary.completed(), 2);
        assert_eq!(summary.failed(), 1);
        assert_eq!(summary.total(), 3);
        let failures: Vec<_> = summary.failures().map(|o| o.original_url.as_str()).collect();
        assert_eq!(failures, vec!["b"]);
    }

    #[test]
    fn test_run_summary_default_is_empty() {
        let summary = RunSummary::default();
        assert_eq!(summary.total(), 0);
        assert_eq!(summary.failed(), 0);
    }

    #[tokio::test]
    async fn test_run_all_empty_list_creates_output_dir() {
        let temp = tempfile::TempDir::new().unwrap();
        let out = temp.path().join("nested").join("out");
        let engine = DownloadEngine::new(DownloaderConfig::new(&out)).unwrap();

        let summary = engine.run_all(&[]).await.unwrap();

        assert_eq!(summary.total(), 0);
        assert!(out.is_dir());
    }

    #[tokio::test]
    async fn test_guard_outcome_passes_result_through() {
        let outcome = guard_outcome("a", async { ok("a") }).await;
        assert!(outcome.is_success());
    }

    #[tokio::test]
    async fn test_guard_outcome_panic_becomes_aborted_failure() {
        let outcome = guard_outcome("https://fuckingfast.co/boom", async {
            if outcome_should_panic() {
                panic!("worker bug");
            }
            ok("unreachable")
        })
        .await;

        assert_eq!(outcome.original_url, "https://fuckingfast.co/boom");
        assert_eq!(
            outcome.error.as_ref().map(|e| e.kind),
            Some(FailureKind::Aborted)
        );
        let summary = RunSummary::new(vec![ok("a"), outcome]);
        assert_eq!(summary.total(), 2);
        assert_eq!(summary.failed(), 1);
    }

    fn outcome_should_panic() -> bool {
        true
    }

    #[test]
    fn test_engine_error_display() {
        let msg = EngineError::Config(ConfigError::InvalidWorkers { value: 0 }).to_string();
        assert!(msg.contains("invalid configuration"));
        assert!(msg.contains("worker count 0"));
    }
}
