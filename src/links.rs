//! Reading the list of landing-page links.
//!
//! The links file holds one URL per line. Lines may carry a `- ` list marker,
//! blank lines are ignored. A missing file is the first-run case: a template
//! with one example entry is written and [`LinksError::InputMissing`] is
//! returned so the caller can stop without downloading anything.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, instrument};

/// Default links file name, relative to the working directory.
pub const DEFAULT_LINKS_FILE: &str = "links.txt";

/// Content written to a freshly created links file.
pub const LINKS_TEMPLATE: &str = "- https://fuckingfast.co/example.iso\n";

/// List-marker prefix stripped from entries.
const LIST_MARKER: &str = "- ";

/// Errors reading the links file.
#[derive(Debug, Error)]
pub enum LinksError {
    /// The links file did not exist; a template has been written in its place.
    #[error("no links file found at {path}; created an example, edit it and run again")]
    InputMissing {
        /// Path of the template that was created.
        path: PathBuf,
    },

    /// The links file exists but could not be read.
    #[error("failed to read links file {path}: {source}")]
    Read {
        /// Path of the links file.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The links file was missing and the template could not be written.
    #[error("failed to create example links file {path}: {source}")]
    TemplateWrite {
        /// Path where the template was to be written.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

/// Reads and parses the links file at `path`.
///
/// # Errors
///
/// - [`LinksError::InputMissing`] when the file is absent (template created)
/// - [`LinksError::TemplateWrite`] when the template cannot be created
/// - [`LinksError::Read`] when the file exists but cannot be read
#[instrument(fields(path = %path.display()))]
pub fn read_links(path: &Path) -> Result<Vec<String>, LinksError> {
    if !path.exists() {
        std::fs::write(path, LINKS_TEMPLATE).map_err(|source| LinksError::TemplateWrite {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("wrote links template");
        return Err(LinksError::InputMissing {
            path: path.to_path_buf(),
        });
    }

    let raw = std::fs::read_to_string(path).map_err(|source| LinksError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let links = parse_links(&raw);
    debug!(count = links.len(), "read links");
    Ok(links)
}

/// Parses links-file text into one entry per non-blank line.
#[must_use]
pub fn parse_links(raw: &str) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| match line.strip_prefix(LIST_MARKER) {
            Some(rest) => rest.trim().to_string(),
            None => line.to_string(),
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_links_strips_markers_and_blanks() {
        let raw = "- https://a.example/one\n\n   \nhttps://b.example/two\n  -   https://c.example/three  \n";
        assert_eq!(
            parse_links(raw),
            vec![
                "https://a.example/one",
                "https://b.example/two",
                "https://c.example/three",
            ]
        );
    }

    #[test]
    fn test_parse_links_keeps_dash_without_space() {
        assert_eq!(parse_links("-https://x.example"), vec!["-https://x.example"]);
    }

    #[test]
    fn test_parse_links_handles_crlf() {
        assert_eq!(
            parse_links("- https://a.example\r\nhttps://b.example\r\n"),
            vec!["https://a.example", "https://b.example"]
        );
    }

    #[test]
    fn test_read_links_existing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("links.txt");
        std::fs::write(&path, "- https://fuckingfast.co/abc\n").unwrap();

        let links = read_links(&path).unwrap();
        assert_eq!(links, vec!["https://fuckingfast.co/abc"]);
    }

    #[test]
    fn test_read_links_missing_file_creates_template() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("links.txt");

        let err = read_links(&path).unwrap_err();
        assert!(matches!(err, LinksError::InputMissing { .. }));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), LINKS_TEMPLATE);

        // The template itself parses to the example entry.
        let links = read_links(&path).unwrap();
        assert_eq!(links, vec!["https://fuckingfast.co/example.iso"]);
    }

    #[test]
    fn test_read_links_template_write_failure() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing-dir").join("links.txt");

        let err = read_links(&path).unwrap_err();
        assert!(matches!(err, LinksError::TemplateWrite { .. }));
    }
}
