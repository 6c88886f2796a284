//! Per-link result of the download pipeline.

use std::fmt;
use std::path::PathBuf;

use super::DownloadError;

/// Pipeline stage at which a link failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Network, timeout, non-success status or invalid URL while fetching.
    Fetch,
    /// Creating or writing the destination file.
    Write,
    /// The link's task stopped before producing a result.
    Aborted,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fetch => write!(f, "fetch"),
            Self::Write => write!(f, "write"),
            Self::Aborted => write!(f, "aborted"),
        }
    }
}

/// Why a link failed, flattened to a message for reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutcomeError {
    /// Failing stage.
    pub kind: FailureKind,
    /// Human-readable cause.
    pub message: String,
}

impl From<&DownloadError> for OutcomeError {
    fn from(error: &DownloadError) -> Self {
        Self {
            kind: error.kind(),
            message: error.to_string(),
        }
    }
}

impl fmt::Display for OutcomeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)
    }
}

/// Result of processing one link end to end.
///
/// Produced exactly once per input link and used only for reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadOutcome {
    /// Link as it appeared in the input.
    pub original_url: String,
    /// Direct URL found by the resolver, if any.
    pub resolved_url: Option<String>,
    /// Final file path on success.
    pub path: Option<PathBuf>,
    /// Failure cause, `None` on success.
    pub error: Option<OutcomeError>,
}

impl DownloadOutcome {
    /// Creates a successful outcome.
    #[must_use]
    pub fn succeeded(
        original_url: impl Into<String>,
        resolved_url: Option<String>,
        path: PathBuf,
    ) -> Self {
        Self {
            original_url: original_url.into(),
            resolved_url,
            path: Some(path),
            error: None,
        }
    }

    /// Creates a failed outcome from the error that stopped the pipeline.
    #[must_use]
    pub fn failed(
        original_url: impl Into<String>,
        resolved_url: Option<String>,
        error: &DownloadError,
    ) -> Self {
        Self {
            original_url: original_url.into(),
            resolved_url,
            path: None,
            error: Some(OutcomeError::from(error)),
        }
    }

    /// Creates a failed outcome for a link whose task stopped unexpectedly.
    #[must_use]
    pub fn aborted(original_url: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            original_url: original_url.into(),
            resolved_url: None,
            path: None,
            error: Some(OutcomeError {
                kind: FailureKind::Aborted,
                message: message.into(),
            }),
        }
    }

    /// Returns true if the file was written completely.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}
