//! Article data structure representing the parsed output.
//!
//! ## Example
//!
//! ```rust,no_run
//! use readability_core::Readability;
//!
//! let html = std::fs::read_to_string("article.html").unwrap();
//! let readability = Readability::new(&html, Some("https://example.com"), None).unwrap();
//!
//! let article = readability.parse().unwrap();
//! println!("Title: {:?}", article.title);
//! println!("Length: {} characters", article.length);
//! println!("Author: {:?}", article.byline);
//! println!("HTML: {}", article.content);
//! ```

use serde::{Deserialize, Serialize};

/// A successfully extracted article.
///
/// Strings are whitespace-normalized: every run of two or more whitespace
/// characters is collapsed into a single space.
///
/// ## Serialization
///
/// ```rust
/// use readability_core::Article;
///
/// let article = Article {
///     title: Some("Hello".to_string()),
///     content: "<div>Hello world</div>".to_string(),
///     text_content: "Hello world".to_string(),
///     length: 11,
///     ..Article::default()
/// };
/// let json = serde_json::to_string(&article).unwrap();
/// assert!(json.contains("\"length\":11"));
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Article {
    /// Title from the `<title>` heuristic, else `og:title`, else `twitter:title`.
    pub title: Option<String>,

    /// Author line found in the page body, else the `author` meta tag.
    pub byline: Option<String>,

    /// Text direction (`dir` attribute) of the article root or its nearest
    /// ancestor that declares one.
    pub dir: Option<String>,

    /// Cleaned HTML of the article.
    ///
    /// The outer element is `<div id="readability-content">`, wrapping a
    /// `<div id="readability-page-1" class="page">`. Links and images point
    /// at absolute URIs when a page URL was given.
    pub content: String,

    /// Plain text of [`content`](Article::content), trimmed.
    pub text_content: String,

    /// Length of [`text_content`](Article::text_content) in characters.
    pub length: usize,

    /// Meta description, else the text of the first non-empty paragraph.
    pub excerpt: Option<String>,
}
