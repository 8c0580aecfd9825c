//! Markdown export of the indexed content
//!
//! This module renders the current crawl as a markdown document: run
//! metadata, the visited URLs, skipped pages and one section per page.

use crate::crawler::{section_header, CrawlResult};
use crate::output::OutputResult;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes the markdown export of `result` to `output_path`
///
/// # Arguments
///
/// * `result` - The crawl to export
/// * `output_path` - Path where the markdown file should be written
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote the export
/// * `Err(OutputError)` - Failed to write the file
pub fn write_markdown_export(result: &CrawlResult, output_path: &Path) -> OutputResult<()> {
    let markdown = format_markdown_export(result);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Splits the aggregated text back into `(url, text)` sections
///
/// Sections are located by their headers in visit order; URLs without a
/// section (failed fetches) are skipped.
pub fn page_sections(result: &CrawlResult) -> Vec<(&str, &str)> {
    let text = result.aggregated_text.as_str();

    let mut starts: Vec<(&str, usize, usize)> = Vec::new();
    let mut cursor = 0;
    for url in &result.visited {
        let header = section_header(url);
        if let Some(offset) = text[cursor..].find(&header) {
            let header_start = cursor + offset;
            let body_start = header_start + header.len();
            starts.push((url.as_str(), header_start, body_start));
            cursor = body_start;
        }
    }

    starts
        .iter()
        .enumerate()
        .map(|(i, (url, _, body_start))| {
            let body_end = starts
                .get(i + 1)
                .map(|(_, next_header, _)| *next_header)
                .unwrap_or(text.len());
            (*url, &text[*body_start..body_end])
        })
        .collect()
}

/// Formats a crawl as markdown
pub fn format_markdown_export(result: &CrawlResult) -> String {
    let mut md = String::new();

    md.push_str("# Site Content Export\n\n");

    md.push_str("## Crawl Information\n\n");
    md.push_str(&format!("- **Seed URL**: {}\n", result.seed));
    md.push_str(&format!("- **Started**: {}\n", result.started_at.to_rfc3339()));
    md.push_str(&format!("- **Finished**: {}\n", result.finished_at.to_rfc3339()));
    md.push_str(&format!("- **Stop Reason**: {}\n", result.stop.to_db_string()));
    md.push_str(&format!("- **Pages Visited**: {}\n", result.pages_visited()));
    md.push_str(&format!("- **Pages Skipped**: {}\n\n", result.failures.len()));

    if !result.visited.is_empty() {
        md.push_str("## Visited URLs\n\n");
        for (i, url) in result.visited.iter().enumerate() {
            md.push_str(&format!("{}. {}\n", i + 1, url));
        }
        md.push('\n');
    }

    if !result.failures.is_empty() {
        md.push_str("## Skipped Pages\n\n");
        md.push_str("| URL | Reason |\n");
        md.push_str("|-----|--------|\n");
        for failure in &result.failures {
            md.push_str(&format!(
                "| {} | {} |\n",
                failure.url,
                failure.reason.replace('|', "\\|")
            ));
        }
        md.push('\n');
    }

    let sections = page_sections(result);
    if !sections.is_empty() {
        md.push_str("## Content\n\n");
        for (url, text) in sections {
            md.push_str(&format!("### {}\n\n", url));
            if text.is_empty() {
                md.push_str("_No paragraph text._\n\n");
            } else {
                md.push_str(text);
                md.push_str("\n\n");
            }
        }
    }

    md
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::{CrawlFailure, StopReason};
    use chrono::Utc;

    fn sample() -> CrawlResult {
        let now = Utc::now();
        CrawlResult {
            seed: "https://example.gov/".to_string(),
            aggregated_text: format!(
                "{}Home text{}{}Page B",
                section_header("https://example.gov/"),
                section_header("https://example.gov/a"),
                section_header("https://example.gov/b"),
            ),
            visited: vec![
                "https://example.gov/".to_string(),
                "https://example.gov/a".to_string(),
                "https://example.gov/b".to_string(),
                "https://example.gov/broken".to_string(),
            ],
            failures: vec![CrawlFailure {
                url: "https://example.gov/broken".to_string(),
                reason: "HTTP 500".to_string(),
            }],
            stop: StopReason::Exhausted,
            started_at: now,
            finished_at: now,
        }
    }

    #[test]
    fn test_page_sections() {
        let result = sample();
        let sections = page_sections(&result);
        assert_eq!(
            sections,
            vec![
                ("https://example.gov/", "Home text"),
                ("https://example.gov/a", ""),
                ("https://example.gov/b", "Page B"),
            ]
        );
    }

    #[test]
    fn test_format_markdown_export() {
        let md = format_markdown_export(&sample());

        assert!(md.starts_with("# Site Content Export"));
        assert!(md.contains("- **Pages Visited**: 4"));
        assert!(md.contains("4. https://example.gov/broken"));
        assert!(md.contains("| https://example.gov/broken | HTTP 500 |"));
        assert!(md.contains("### https://example.gov/b\n\nPage B"));
        assert!(md.contains("_No paragraph text._"));
    }

    #[test]
    fn test_write_markdown_export() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.md");

        write_markdown_export(&sample(), &path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("Home text"));
    }
}
