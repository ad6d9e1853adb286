//! # readability-core
//!
//! Extract the main article from a web page, in the manner of Firefox Reader View.
//!
//! ## Overview
//!
//! Given an HTML document, readability-core finds the block of markup that holds
//! the article, strips navigation, advertising and other boilerplate around it,
//! and returns cleaned HTML together with plain text and basic metadata: title,
//! byline, excerpt and text direction.
//!
//! ## Key Features
//!
//! - **Content Extraction**: Scores paragraphs and their ancestors to pick the article root
//! - **Retry Strategy**: Relaxes its heuristics step by step when too little text is found
//! - **Metadata Extraction**: Title, author and description from `<title>` and `<meta>` tags
//! - **URL Resolution**: Relative links and image sources become absolute given a page URL
//! - **Pre-flight Check**: Cheap test of whether a page is worth extracting at all
//!
//! ## Basic Usage
//!
//! ```rust,no_run
//! use readability_core::{Readability, ReadabilityOptions};
//!
//! let html = r#"<html><body><article><h1>Title</h1><p>Content...</p></article></body></html>"#;
//! let url = "https://example.com/article";
//!
//! let options = ReadabilityOptions::default();
//! let readability = Readability::new(html, Some(url), Some(options)).unwrap();
//!
//! if let Ok(article) = readability.parse() {
//!     println!("Title: {:?}", article.title);
//!     println!("Content: {}", article.content);
//!     println!("Author: {:?}", article.byline);
//! }
//! ```
//!
//! ## Advanced Usage
//!
//! ### Custom Options
//!
//! ```rust,no_run
//! use readability_core::{Readability, ReadabilityOptions};
//!
//! let html = "<html>...</html>";
//!
//! let options = ReadabilityOptions::builder()
//!     .char_threshold(300)
//!     .nb_top_candidates(10)
//!     .keep_classes(true)
//!     .build();
//!
//! let readability = Readability::new(html, None, Some(options)).unwrap();
//! let article = readability.parse();
//! ```
//!
//! ### Pre-flight Check
//!
//! Use [`is_probably_readerable`] to quickly check if a document is likely to be parseable
//! before doing the full parse:
//!
//! ```rust,no_run
//! use readability_core::is_probably_readerable;
//!
//! let html = "<html>...</html>";
//!
//! if is_probably_readerable(html, None) {
//!     // Proceed with full parsing
//! } else {
//!     // Skip parsing or use alternative strategy
//! }
//! ```
//!
//! ## Error Handling
//!
//! ```rust,no_run
//! use readability_core::{Readability, ReadabilityError};
//!
//! let html = "<html>...</html>";
//! let url = "not a valid url";
//!
//! match Readability::new(html, Some(url), None).and_then(Readability::parse) {
//!     Ok(article) => println!("Extracted {} characters", article.length),
//!     Err(ReadabilityError::InvalidUrl(url)) => eprintln!("Invalid URL: {}", url),
//!     Err(ReadabilityError::NoContentFound) => eprintln!("Nothing to extract"),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```
//!
//! ## Logging
//!
//! With [`ReadabilityOptions::debug`] set, every stage of the pipeline emits
//! `tracing` events at debug level. Install any `tracing` subscriber to see them.
//!
//! ## Algorithm
//!
//! Scripts, styles and comments are removed and runs of `<br>` are folded into
//! paragraphs. The body is then walked once: hidden and unlikely nodes are dropped,
//! the byline is picked up, and text-bearing `<div>`s become paragraphs. Each
//! paragraph scores its parent and grandparent by length and comma count; the
//! best-scoring ancestor, adjusted for link density, becomes the article root,
//! and qualifying siblings join it. Finally the article is stripped of
//! presentational attributes, junk elements and low-quality containers. When the
//! result is too short, the whole process reruns on a fresh copy of the document
//! with one heuristic switched off.

macro_rules! log_debug {
    ($enabled:expr, $($arg:tt)*) => {
        if $enabled {
            tracing::debug!($($arg)*);
        }
    };
}

mod article;
mod cleaner;
mod constants;
mod content_extractor;
mod dom;
mod dom_utils;
mod error;
mod metadata;
mod options;
mod post_processor;
mod readability;
mod readerable;
mod scoring;
mod serializable_node;
mod utils;

// Public exports
pub use article::Article;
pub use error::{ReadabilityError, Result};
pub use options::{ReadabilityOptions, ReadabilityOptionsBuilder};
pub use readability::Readability;
pub use readerable::{is_probably_readerable, ReaderableOptions};
