//! Error types for the extraction pipeline.

use thiserror::Error;

/// Result type alias for readability operations
pub type Result<T> = std::result::Result<T, ReadabilityError>;

/// Fatal conditions reported to the caller.
///
/// Heuristics that simply fail to match are never errors; a short result only
/// makes the extractor retry with relaxed settings.
#[derive(Error, Debug)]
pub enum ReadabilityError {
    /// Markup is empty or could not be turned into a document
    #[error("Failed to parse HTML: {0}")]
    ParseError(String),

    /// Page URL is not an absolute http(s) URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Document has no `<body>`, or the body is empty
    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    /// Element count is above the configured maximum
    #[error("Maximum element limit exceeded: {0}")]
    MaxElementsExceeded(usize),

    /// Every attempt produced an article without text
    #[error("No article content found in document")]
    NoContentFound,
}
