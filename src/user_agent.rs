//! Default User-Agent sent to landing pages and file hosts.
//!
//! The file host serves landing pages and downloads to browsers only, so the
//! default identifies as desktop Chrome rather than as this tool.

/// Desktop Chrome User-Agent used when none is configured.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/115 Safari/537.36";
