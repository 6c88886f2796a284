//! Direct-link extraction from landing-page markup.
//!
//! Matching is textual: the host embeds its links in predictable script and
//! attribute text, so four regexes tried in a fixed priority order are enough.
//! The order is part of the resolution behaviour and must not change:
//!
//! 1. `window.open("https://<host>/dl/...")` (either quote style, matched)
//! 2. `href="https://<host>/dl/..."` (either quote style, matched)
//! 3. any bare `https://<host>/dl/...` in the body
//! 4. a quoted relative `/dl/...` path, joined against the page URL

use regex::Regex;
use url::Url;

/// Compiles a regex built from escaped configuration values.
///
/// # Panics
///
/// Panics if the pattern is invalid, which only happens on a programming error
/// since every dynamic part goes through [`regex::escape`].
fn compile_pattern(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid direct-link regex '{pattern}': {e}"))
}

/// Compiled extraction patterns for one direct-download host and segment.
#[derive(Debug, Clone)]
pub struct DirectLinkPatterns {
    window_open: Regex,
    href: Regex,
    bare_absolute: Regex,
    quoted_relative: Regex,
}

impl DirectLinkPatterns {
    /// Builds the four patterns for `host` (optionally `host:port`) and a
    /// path `segment` such as `/dl/`.
    #[must_use]
    pub fn new(host: &str, segment: &str) -> Self {
        let absolute = format!(
            r"https?://{}{}",
            regex::escape(host),
            regex::escape(segment)
        );
        let segment = regex::escape(segment);

        // The regex crate has no backreferences, so a matched quote pair is
        // spelled out as two alternatives with their own capture group.
        let window_open = compile_pattern(&format!(
            r#"window\.open\((?:"({absolute}[^"']+)"|'({absolute}[^"']+)')"#
        ));
        let href = compile_pattern(&format!(
            r#"href=(?:"({absolute}[^"']+)"|'({absolute}[^"']+)')"#
        ));
        let bare_absolute = compile_pattern(&format!(r#"({absolute}[^\s"'<>]+)"#));
        let quoted_relative = compile_pattern(&format!(r#"["']({segment}[^"']+)["']"#));

        Self {
            window_open,
            href,
            bare_absolute,
            quoted_relative,
        }
    }

    /// Returns the first direct link found in `body`, trying each pattern in
    /// priority order. Relative matches are joined against `page_url`.
    #[must_use]
    pub fn extract(&self, body: &str, page_url: &str) -> Option<String> {
        first_group(&self.window_open, body)
            .or_else(|| first_group(&self.href, body))
            .or_else(|| first_group(&self.bare_absolute, body))
            .or_else(|| {
                let relative = first_group(&self.quoted_relative, body)?;
                join_relative(page_url, &relative)
            })
    }
}

/// Returns the first participating capture group of the first match.
fn first_group(regex: &Regex, body: &str) -> Option<String> {
    let caps = regex.captures(body)?;
    caps.iter()
        .skip(1)
        .flatten()
        .next()
        .map(|m| m.as_str().to_string())
}

fn join_relative(page_url: &str, relative: &str) -> Option<String> {
    let base = Url::parse(page_url).ok()?;
    base.join(relative).ok().map(String::from)
}
