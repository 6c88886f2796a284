//! CLI output formatting and display helpers.

use ff_downloader_core::RunSummary;

/// Message when the links file holds no entries.
pub const NO_LINKS_MESSAGE: &str = "No links to download.";

/// Returns terminal width from COLUMNS, or 80 if unset/invalid.
pub fn terminal_width() -> usize {
    std::env::var("COLUMNS")
        .ok()
        .and_then(|value| value.parse::<usize>().ok())
        .filter(|width| *width >= 20)
        .unwrap_or(80)
}

/// Truncates text to at most `width` chars, appending ellipsis if truncated.
pub fn truncate_to_width(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    match width {
        0 => String::new(),
        1 => "…".to_string(),
        _ => {
            let mut output: String = text.chars().take(width - 1).collect();
            output.push('…');
            output
        }
    }
}

/// Renders the end-of-run summary: counts, then one line per failed link.
pub(crate) fn render_summary_lines(summary: &RunSummary, width: usize) -> Vec<String> {
    let mut lines = vec![format!(
        "Done: {} downloaded, {} failed ({} total)",
        summary.completed(),
        summary.failed(),
        summary.total()
    )];

    if summary.failed() > 0 {
        lines.push("Failed links:".to_string());
        for outcome in summary.failures() {
            let cause = outcome
                .error
                .as_ref()
                .map_or_else(|| "unknown".to_string(), ToString::to_string);
            lines.push(truncate_to_width(
                &format!("- {} {cause}", outcome.original_url),
                width,
            ));
        }
    }

    lines
}

/// Prints the end-of-run summary to stdout.
pub(crate) fn print_run_summary(summary: &RunSummary) {
    for line in render_summary_lines(summary, terminal_width()) {
        println!("{line}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ff_downloader_core::{DownloadError, DownloadOutcome};
    use std::path::PathBuf;

    #[test]
    fn test_truncate_to_width_short_text_unchanged() {
        assert_eq!(truncate_to_width("abc", 10), "abc");
    }

    #[test]
    fn test_truncate_to_width_long_text_gets_ellipsis() {
        assert_eq!(truncate_to_width("abcdef", 4), "abc…");
        assert_eq!(truncate_to_width("abcdef", 1), "…");
        assert_eq!(truncate_to_width("abcdef", 0), "");
    }

    #[test]
    fn test_render_summary_all_succeeded() {
        let summary = RunSummary::new(vec![DownloadOutcome::succeeded(
            "https://fuckingfast.co/a",
            None,
            PathBuf::from("/tmp/a.iso"),
        )]);
        let lines = render_summary_lines(&summary, 80);
        assert_eq!(lines, vec!["Done: 1 downloaded, 0 failed (1 total)"]);
    }

    #[test]
    fn test_render_summary_lists_failures_with_cause() {
        let summary = RunSummary::new(vec![
            DownloadOutcome::succeeded("https://fuckingfast.co/a", None, PathBuf::from("/tmp/a")),
            DownloadOutcome::failed(
                "https://fuckingfast.co/b",
                None,
                &DownloadError::http_status("https://fuckingfast.co/b", 404),
            ),
        ]);
        let lines = render_summary_lines(&summary, 200);
        assert_eq!(lines[0], "Done: 1 downloaded, 1 failed (2 total)");
        assert_eq!(lines[1], "Failed links:");
        assert!(lines[2].starts_with("- https://fuckingfast.co/b [fetch]"));
        assert!(lines[2].contains("404"));
    }
}
