//! Output module for reporting on the indexed content
//!
//! This module handles:
//! - The status report shown by `status` and `:status`
//! - Exporting the current crawl as markdown

mod markdown;
mod status;

pub use markdown::{format_markdown_export, page_sections, write_markdown_export};
pub use status::{format_status, preview, print_status, StatusReport, PREVIEW_CHARS};

use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;
