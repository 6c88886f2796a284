//! Fetching resolved links and streaming them to disk.
//!
//! This module provides the per-link pipeline and the dispatcher that runs it
//! concurrently over the link list.
//!
//! # Features
//!
//! - Streaming downloads (memory-efficient for large files)
//! - Filename from Content-Disposition or the effective URL
//! - Collision-safe naming (`file (1).txt`, `file (2).txt`, ...)
//! - Fixed-size worker pool, one task per link
//! - Per-link failures reported as [`DownloadOutcome`]s, never propagated
//!
//! # Example
//!
//! ```no_run
//! use ff_downloader_core::config::DownloaderConfig;
//! use ff_downloader_core::download::DownloadWorker;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let worker = DownloadWorker::new(&DownloaderConfig::new("./downloads"))?;
//! let outcome = worker.process_one("https://fuckingfast.co/abc123").await;
//! println!("success: {}", outcome.is_success());
//! # Ok(())
//! # }
//! ```

mod client;
mod engine;
mod error;
pub mod filename;
mod outcome;
mod worker;

pub use client::{FetchedResponse, HttpClient};
pub use engine::{DownloadEngine, EngineError, RunSummary};
pub use error::DownloadError;
pub use outcome::{DownloadOutcome, FailureKind, OutcomeError};
pub use worker::DownloadWorker;
