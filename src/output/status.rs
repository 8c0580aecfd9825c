//! Status report of the indexed content
//!
//! This module gathers what the UI shows about the current site content:
//! how many URLs are indexed, when they were last refreshed, a short
//! preview of the text, and the latest refresh runs.

use crate::crawler::{CrawlResult, StopReason};
use crate::storage::{RunRecord, RunStatus};
use chrono::{DateTime, Utc};

/// Number of characters shown in the content preview
pub const PREVIEW_CHARS: usize = 500;

/// Snapshot of the session's state for display
#[derive(Debug, Clone)]
pub struct StatusReport {
    /// The configured seed URL
    pub seed_url: String,

    /// URLs dequeued by the crawl that produced the content
    pub pages_indexed: usize,

    /// URLs that were skipped because their fetch failed
    pub pages_failed: usize,

    /// Size of the aggregated text, in characters
    pub text_chars: usize,

    /// When the content was produced (`None` if nothing is indexed yet)
    pub refreshed_at: Option<DateTime<Utc>>,

    pub stop: Option<StopReason>,

    /// Leading part of the aggregated text
    pub preview: String,

    /// Memoized answers currently held
    pub cached_responses: usize,

    /// Most recent refresh runs first
    pub recent_runs: Vec<RunRecord>,
}

impl StatusReport {
    /// Builds a report from the current content, if any
    pub fn new(
        seed_url: &str,
        content: Option<&CrawlResult>,
        cached_responses: usize,
        recent_runs: Vec<RunRecord>,
    ) -> Self {
        match content {
            Some(result) => Self {
                seed_url: seed_url.to_string(),
                pages_indexed: result.pages_visited(),
                pages_failed: result.failures.len(),
                text_chars: result.aggregated_text.chars().count(),
                refreshed_at: Some(result.finished_at),
                stop: Some(result.stop),
                preview: preview(&result.aggregated_text, PREVIEW_CHARS),
                cached_responses,
                recent_runs,
            },
            None => Self {
                seed_url: seed_url.to_string(),
                pages_indexed: 0,
                pages_failed: 0,
                text_chars: 0,
                refreshed_at: None,
                stop: None,
                preview: String::new(),
                cached_responses,
                recent_runs,
            },
        }
    }

    pub fn has_content(&self) -> bool {
        self.refreshed_at.is_some()
    }
}

/// First `max_chars` characters of `text`, trimmed, with an ellipsis if cut
pub fn preview(text: &str, max_chars: usize) -> String {
    let trimmed = text.trim();
    let mut chars = trimmed.char_indices();
    match chars.nth(max_chars) {
        Some((cut, _)) => format!("{}...", &trimmed[..cut]),
        None => trimmed.to_string(),
    }
}

/// Formats a status report for the terminal
pub fn format_status(report: &StatusReport) -> String {
    let mut out = String::new();

    out.push_str("=== Site Status ===\n\n");
    out.push_str(&format!("Seed URL: {}\n", report.seed_url));

    match report.refreshed_at {
        Some(at) => {
            out.push_str(&format!("Pages indexed: {}\n", report.pages_indexed));
            out.push_str(&format!("Pages skipped: {}\n", report.pages_failed));
            out.push_str(&format!("Text size: {} chars\n", report.text_chars));
            out.push_str(&format!(
                "Last refreshed: {}\n",
                at.format("%Y-%m-%d %H:%M:%S UTC")
            ));
            if let Some(stop) = report.stop {
                out.push_str(&format!("Crawl stop reason: {}\n", stop.to_db_string()));
            }
        }
        None => out.push_str("No content indexed yet\n"),
    }
    out.push_str(&format!("Cached answers: {}\n", report.cached_responses));

    if !report.recent_runs.is_empty() {
        out.push_str("\nRecent refresh runs:\n");
        for run in &report.recent_runs {
            let detail = match run.status {
                RunStatus::Completed => format!(
                    "{} pages, {} skipped, {}",
                    run.pages_visited,
                    run.pages_failed,
                    run.stop_reason.map(|s| s.to_db_string()).unwrap_or("-")
                ),
                RunStatus::Failed => run.error_message.clone().unwrap_or_default(),
                RunStatus::Running => "in progress".to_string(),
            };
            out.push_str(&format!(
                "  #{} {} [{}] {}\n",
                run.id,
                run.started_at,
                run.status.to_db_string(),
                detail
            ));
        }
    }

    if !report.preview.is_empty() {
        out.push_str("\nContent preview:\n");
        out.push_str(&report.preview);
        out.push('\n');
    }

    out
}

/// Prints a status report to stdout
pub fn print_status(report: &StatusReport) {
    print!("{}", format_status(report));
}
