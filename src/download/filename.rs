//! Filename derivation and collision-safe path resolution.
//!
//! Name priority: `Content-Disposition` (`filename*=` over `filename=`), then
//! the last path segment of the effective URL, then [`PLACEHOLDER_FILENAME`].
//! Every candidate is sanitized so it stays a single path component inside
//! the destination directory.

use std::path::{Component, Path, PathBuf};

use reqwest::header::{CONTENT_DISPOSITION, HeaderMap};
use tracing::debug;
use url::Url;

/// Name used when neither headers nor URL provide one.
pub const PLACEHOLDER_FILENAME: &str = "downloaded_file";

/// Derives the local filename for a response.
///
/// `effective_url` is the URL after redirects, not the one originally requested.
#[must_use]
pub fn derive_filename(headers: &HeaderMap, effective_url: &Url) -> String {
    let from_header = headers
        .get(CONTENT_DISPOSITION)
        .and_then(|value| value.to_str().ok())
        .and_then(parse_content_disposition);

    let name = from_header
        .or_else(|| filename_from_url(effective_url))
        .map(|name| sanitize_filename(&name))
        .filter(|name| !name.is_empty());

    name.unwrap_or_else(|| PLACEHOLDER_FILENAME.to_string())
}

/// Parses a Content-Disposition header value for a filename.
///
/// Handles:
/// - `attachment; filename*=UTF-8''na%C3%AFve.txt` (RFC 5987, preferred)
/// - `attachment; filename="example.iso"`
/// - `attachment; filename=example.iso`
#[must_use]
pub fn parse_content_disposition(header: &str) -> Option<String> {
    parse_extended_filename(header).or_else(|| parse_plain_filename(header))
}

fn parse_extended_filename(header: &str) -> Option<String> {
    let start = header.find("filename*=")? + "filename*=".len();
    let value = &header[start..];
    // charset'language'encoded_value
    let encoded = &value[value.find("''")? + 2..];
    let end = encoded.find(';').unwrap_or(encoded.len());
    let encoded = encoded[..end].trim().trim_matches('"');
    match urlencoding::decode(encoded) {
        Ok(decoded) if !decoded.is_empty() => Some(decoded.into_owned()),
        Ok(_) => None,
        Err(e) => {
            debug!(value = %encoded, error = %e, "undecodable filename*, trying filename=");
            None
        }
    }
}

fn parse_plain_filename(header: &str) -> Option<String> {
    let start = header.find("filename=")? + "filename=".len();
    let value = header[start..].trim();

    let name = match value.strip_prefix('"') {
        Some(quoted) => match quoted.find('"') {
            Some(end) => &quoted[..end],
            None => quoted.split(';').next().unwrap_or(quoted),
        },
        None => value.split(';').next().unwrap_or(value),
    };
    let name = name.trim().trim_matches('"');
    (!name.is_empty()).then(|| name.to_string())
}

/// Last non-empty path segment of `url`, percent-decoded.
fn filename_from_url(url: &Url) -> Option<String> {
    let last = url.path_segments()?.next_back()?;
    if last.is_empty() {
        return None;
    }
    let decoded = urlencoding::decode(last).map_or_else(
        |e| {
            debug!(segment = %last, error = %e, "URL decoding failed, using raw segment");
            last.to_string()
        },
        std::borrow::Cow::into_owned,
    );
    Some(decoded)
}

/// Sanitizes a filename for filesystem safety.
///
/// Path separators, characters invalid on common filesystems
/// (`/ \ : * ? " < > |`) and control characters become `_`. Names that are
/// themselves path components (`.`, `..`) have their dots replaced.
#[must_use]
pub fn sanitize_filename(name: &str) -> String {
    let sanitized: String = name
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    if is_safe_filename_segment(&sanitized) {
        sanitized
    } else {
        sanitized.replace('.', "_")
    }
}

fn is_safe_filename_segment(name: &str) -> bool {
    !Path::new(name).components().any(|component| {
        matches!(
            component,
            Component::CurDir | Component::ParentDir | Component::RootDir | Component::Prefix(_)
        )
    })
}

/// Splits `name` into stem and extension (extension keeps its dot).
///
/// Leading dots are part of the stem, so `.bashrc` has no extension.
#[must_use]
pub fn split_extension(name: &str) -> (&str, &str) {
    let body_start = name.len() - name.trim_start_matches('.').len();
    match name[body_start..].rfind('.') {
        Some(pos) => name.split_at(body_start + pos),
        None => (name, ""),
    }
}

/// Resolves a path in `dir` for `filename` that does not exist yet.
///
/// `file.txt` becomes `file (1).txt`, then `file (2).txt`, and so on. The
/// existence check and the later file creation are not atomic; two workers
/// picking the same name at once can still collide, and the loser's
/// create-new open then fails.
///
/// An existence check that errors counts as free; the create-new open
/// reports the real problem.
pub async fn resolve_unique_path(dir: &Path, filename: &str) -> PathBuf {
    let candidate = dir.join(filename);
    if !path_taken(&candidate).await {
        return candidate;
    }

    let (stem, ext) = split_extension(filename);
    let mut counter: u64 = 1;
    loop {
        let path = dir.join(format!("{stem} ({counter}){ext}"));
        if !path_taken(&path).await {
            return path;
        }
        counter += 1;
    }
}

async fn path_taken(path: &Path) -> bool {
    tokio::fs::try_exists(path).await.unwrap_or(false)
}
