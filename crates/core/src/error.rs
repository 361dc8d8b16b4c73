//! Error types for wolstudy operations.
//!
//! This module defines the main error type [`WolError`] which represents
//! all possible errors that can occur while fetching articles, resolving
//! citations, talking to the chat-completion API and writing run artifacts.
//!
//! # Example
//!
//! ```rust
//! use wolstudy_core::{WolError, Result};
//!
//! fn require_title(title: &str) -> Result<&str> {
//!     if title.is_empty() {
//!         return Err(WolError::MissingElement("#p2".to_string()));
//!     }
//!     Ok(title)
//! }
//! ```

use std::path::PathBuf;
use thiserror::Error;

use crate::citation::CitationData;

/// Main error type for scraping and solving operations.
#[derive(Error, Debug)]
pub enum WolError {
    /// HTTP request errors from reqwest.
    ///
    /// This variant wraps network errors, DNS failures, connection issues,
    /// and other HTTP-related problems.
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Request timeout.
    ///
    /// Returned when an HTTP request exceeds the configured timeout duration.
    #[error("Request timed out after {timeout} seconds")]
    Timeout { timeout: u64 },

    /// Invalid URL provided.
    ///
    /// Returned when a URL cannot be parsed, is malformed or does not point
    /// at the expected host.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// HTML parsing errors, usually an invalid CSS selector.
    #[error("Failed to parse HTML: {0}")]
    HtmlParseError(String),

    /// A required element was not present in the page.
    #[error("Element not found: {0}")]
    MissingElement(String),

    /// The reference lookup endpoint answered with something unexpected.
    #[error("Reference lookup failed for {href}: {reason}")]
    Lookup { href: String, reason: String },

    /// The tooltip surface was used out of order.
    ///
    /// Only one tooltip can be open at a time, and it has to be open before
    /// it can be read or closed.
    #[error("Tooltip error: {0}")]
    Tooltip(String),

    /// Citation resolution stopped part way through a container.
    ///
    /// `partial` holds the citations resolved before the failure, with the
    /// annotated text built from them.
    #[error("Citation resolution aborted after {} citation(s): {reason}", partial.tooltip_citations.len())]
    PartialCitations { partial: Box<CitationData>, reason: String },

    /// The chat-completion API returned an error or an unusable answer.
    #[error("Chat completion failed: {0}")]
    Chat(String),

    /// JSON (de)serialization errors.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// File not found.
    ///
    /// Returned when attempting to read a file that doesn't exist.
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// File write errors.
    ///
    /// Wraps standard I/O errors for file operations.
    #[error("Failed to write to file: {0}")]
    WriteError(#[from] std::io::Error),

    /// Configuration errors, such as a missing API key.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type alias for WolError.
///
/// This is a convenience alias for `std::result::Result<T, WolError>`.
pub type Result<T> = std::result::Result<T, WolError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = WolError::InvalidUrl("not a url".to_string());
        assert!(err.to_string().contains("Invalid URL"));
    }

    #[test]
    fn test_timeout_error() {
        let err = WolError::Timeout { timeout: 30 };
        assert!(err.to_string().contains("30"));
    }

    #[test]
    fn test_partial_citations_error_counts_resolved() {
        let partial = CitationData::from_citations("Juan 3:16".to_string(), Vec::new());
        let err = WolError::PartialCitations { partial: Box::new(partial), reason: "tooltip never opened".into() };
        let message = err.to_string();
        assert!(message.contains("0 citation(s)"));
        assert!(message.contains("tooltip never opened"));
    }

    #[test]
    fn test_lookup_error_mentions_href() {
        let err = WolError::Lookup { href: "/es/wol/bc/r4/lp-s/1".into(), reason: "empty items".into() };
        assert!(err.to_string().contains("/es/wol/bc/r4/lp-s/1"));
    }
}
