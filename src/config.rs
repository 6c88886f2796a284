//! Run configuration shared by the dispatcher, workers, resolver and fetcher.
//!
//! A [`DownloaderConfig`] is built once (defaults, then file config, then CLI
//! flags) and handed to [`DownloadEngine`](crate::download::DownloadEngine)
//! at construction. Nothing in the library reads process-wide settings.

use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

use crate::user_agent;

/// Default number of concurrent download workers.
pub const DEFAULT_WORKERS: usize = 4;

/// Minimum allowed worker count.
pub const MIN_WORKERS: usize = 1;

/// Maximum allowed worker count.
pub const MAX_WORKERS: usize = 100;

/// Total timeout for loading a landing page (15 seconds).
pub const PAGE_TIMEOUT_SECS: u64 = 15;

/// Connect and per-read timeout for the file download (30 seconds).
pub const FETCH_TIMEOUT_SECS: u64 = 30;

/// Host serving the direct-download links.
pub const DEFAULT_DIRECT_HOST: &str = "fuckingfast.co";

/// Path segment that marks a URL as a direct download.
pub const DEFAULT_DIRECT_SEGMENT: &str = "/dl/";

/// Directory name used under the user's Downloads folder.
pub const DEFAULT_OUTPUT_DIR_NAME: &str = "FF_downloader";

/// Invalid configuration values.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Worker count outside the supported range.
    #[error("invalid worker count {value}: must be between {MIN_WORKERS} and {MAX_WORKERS}")]
    InvalidWorkers {
        /// The rejected value.
        value: usize,
    },

    /// A timeout of zero would fail every request immediately.
    #[error("invalid {field}: timeout must be greater than zero")]
    ZeroTimeout {
        /// Name of the offending field.
        field: &'static str,
    },

    /// A required text setting was empty.
    #[error("invalid {field}: value must not be empty")]
    Empty {
        /// Name of the offending field.
        field: &'static str,
    },
}

/// Explicit configuration for one download run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloaderConfig {
    /// Destination directory for downloaded files.
    pub output_dir: PathBuf,
    /// Number of links processed concurrently.
    pub workers: usize,
    /// User-Agent sent with every request.
    pub user_agent: String,
    /// Total timeout for landing-page requests.
    pub page_timeout: Duration,
    /// Connect and read-inactivity timeout for file requests.
    pub fetch_timeout: Duration,
    /// Host (optionally with port) whose URLs count as direct downloads.
    pub direct_host: String,
    /// Path segment identifying a direct-download URL, e.g. `/dl/`.
    pub direct_segment: String,
}

impl DownloaderConfig {
    /// Creates a configuration writing into `output_dir` with default settings.
    #[must_use]
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            workers: DEFAULT_WORKERS,
            user_agent: user_agent::DEFAULT_USER_AGENT.to_string(),
            page_timeout: Duration::from_secs(PAGE_TIMEOUT_SECS),
            fetch_timeout: Duration::from_secs(FETCH_TIMEOUT_SECS),
            direct_host: DEFAULT_DIRECT_HOST.to_string(),
            direct_segment: DEFAULT_DIRECT_SEGMENT.to_string(),
        }
    }

    /// Sets the worker count.
    #[must_use]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Sets the User-Agent header value.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Sets the landing-page timeout.
    #[must_use]
    pub fn with_page_timeout(mut self, timeout: Duration) -> Self {
        self.page_timeout = timeout;
        self
    }

    /// Sets the file download timeout.
    #[must_use]
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    /// Sets the host whose `/dl/` links are extracted from landing pages.
    #[must_use]
    pub fn with_direct_host(mut self, host: impl Into<String>) -> Self {
        self.direct_host = host.into();
        self
    }

    /// Sets the path segment marking direct-download URLs.
    #[must_use]
    pub fn with_direct_segment(mut self, segment: impl Into<String>) -> Self {
        self.direct_segment = segment.into();
        self
    }

    /// Returns the destination directory.
    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Checks every value against its allowed range.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_WORKERS..=MAX_WORKERS).contains(&self.workers) {
            return Err(ConfigError::InvalidWorkers {
                value: self.workers,
            });
        }
        if self.page_timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout {
                field: "page_timeout",
            });
        }
        if self.fetch_timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout {
                field: "fetch_timeout",
            });
        }
        if self.user_agent.trim().is_empty() {
            return Err(ConfigError::Empty {
                field: "user_agent",
            });
        }
        if self.direct_host.trim().is_empty() {
            return Err(ConfigError::Empty {
                field: "direct_host",
            });
        }
        if self.direct_segment.trim().is_empty() {
            return Err(ConfigError::Empty {
                field: "direct_segment",
            });
        }
        Ok(())
    }
}

/// Resolves the default destination directory.
///
/// `$HOME/Downloads/FF_downloader` (or `%USERPROFILE%` on Windows), falling
/// back to `./FF_downloader` when no home directory is set.
#[must_use]
pub fn default_output_dir() -> PathBuf {
    let home = ["HOME", "USERPROFILE"].iter().find_map(|name| {
        std::env::var_os(name).filter(|value| !value.is_empty())
    });
    match home {
        Some(home) => PathBuf::from(home)
            .join("Downloads")
            .join(DEFAULT_OUTPUT_DIR_NAME),
        None => PathBuf::from(DEFAULT_OUTPUT_DIR_NAME),
    }
}
