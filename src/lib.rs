//! FF Downloader Core Library
//!
//! Resolves a list of landing-page URLs into direct-download links and
//! retrieves each file concurrently into a destination directory.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`resolver`] - Landing page to direct-download URL resolution
//! - [`download`] - Fetching, filename derivation, per-link worker, dispatcher
//! - [`config`] - Explicit run configuration
//! - [`links`] - Links-file reading with first-run template creation
//!
//! Data flows dispatcher -> worker -> resolver -> fetcher -> filename -> disk.

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod download;
pub mod links;
pub mod resolver;
pub mod user_agent;

// Re-export commonly used types
pub use config::{ConfigError, DEFAULT_WORKERS, DownloaderConfig, default_output_dir};
pub use download::{
    DownloadEngine, DownloadError, DownloadOutcome, DownloadWorker, EngineError, FailureKind,
    HttpClient, RunSummary,
};
pub use links::{DEFAULT_LINKS_FILE, LinksError, read_links};
pub use resolver::{LinkResolver, ResolveError, ResolvedTarget};
