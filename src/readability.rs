//! Main Readability struct and parse implementation.
//!
//! This module contains the primary [`Readability`] struct which runs the
//! extraction pipeline end to end:
//!
//! 1. Guard against oversized documents.
//! 2. Read metadata from the raw document.
//! 3. Strip scripts, styles and comments and fold `<br>` runs.
//! 4. Extract the article, relaxing heuristics until enough text is found.
//! 5. Resolve URIs, strip classes and normalize whitespace in the output.
//!
//! ## Example
//!
//! ```rust,no_run
//! use readability_core::Readability;
//!
//! let html = std::fs::read_to_string("article.html")?;
//! let url = "https://example.com/article";
//!
//! let readability = Readability::new(&html, Some(url), None)?;
//! let article = readability.parse()?;
//!
//! println!("Title: {:?}", article.title);
//! println!("Author: {:?}", article.byline);
//! println!("Content length: {} chars", article.length);
//! std::fs::write("output.html", &article.content)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use crate::{
    article::Article,
    cleaner::{clean_article_content, first_paragraph_text, prep_document},
    content_extractor::{grab_article, ArticleContent},
    dom::Document,
    dom_utils::get_inner_text,
    error::{ReadabilityError, Result},
    metadata::get_article_metadata,
    options::ReadabilityOptions,
    utils::{char_len, normalize_space, parse_http_url},
};
use scraper::Html;
use url::Url;

/// The main Readability parser.
///
/// ## Lifecycle
///
/// Construct an instance with [`Readability::new()`], then call
/// [`parse()`](Readability::parse), which consumes it and returns the
/// [`Article`].
///
/// ## Example
///
/// ```rust
/// use readability_core::{Readability, ReadabilityOptions};
///
/// let paragraph = "The committee met on Tuesday, and after a long debate, it agreed on a plan. ";
/// let html = format!(
///     "<html><head><title>Town Plan Approved - Daily Courier</title></head>\
///      <body><article><p>{}</p><p>{}</p></article></body></html>",
///     paragraph.repeat(4),
///     paragraph.repeat(4),
/// );
///
/// let options = ReadabilityOptions::builder().char_threshold(100).build();
/// let readability = Readability::new(&html, None, Some(options))?;
/// let article = readability.parse()?;
///
/// assert_eq!(article.title.as_deref(), Some("Town Plan Approved"));
/// assert!(article.text_content.starts_with("The committee met"));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct Readability {
    /// The HTML document being parsed (raw, for metadata extraction)
    document: Html,

    /// Base URL for resolving relative links
    page_url: Option<Url>,

    /// Configuration options
    options: ReadabilityOptions,
}

impl Readability {
    /// Create a new Readability instance
    ///
    /// # Arguments
    /// * `html` - The HTML content to parse
    /// * `url` - Optional page URL, used to resolve relative links
    /// * `options` - Optional configuration options
    ///
    /// # Errors
    /// [`ReadabilityError::ParseError`] for blank markup and
    /// [`ReadabilityError::InvalidUrl`] when `url` is not an absolute http(s) URL.
    pub fn new(html: &str, url: Option<&str>, options: Option<ReadabilityOptions>) -> Result<Self> {
        if html.trim().is_empty() {
            return Err(ReadabilityError::ParseError("document is empty".to_string()));
        }

        let page_url = url
            .map(|u| parse_http_url(u).ok_or_else(|| ReadabilityError::InvalidUrl(u.to_string())))
            .transpose()?;

        Ok(Self {
            document: Html::parse_document(html),
            page_url,
            options: options.unwrap_or_default(),
        })
    }

    /// Parse the document and extract article content
    ///
    /// # Errors
    /// * [`ReadabilityError::MaxElementsExceeded`] when the document has more
    ///   elements than `max_elems_to_parse`.
    /// * [`ReadabilityError::InvalidDocument`] when there is no `<body>` or it is empty.
    /// * [`ReadabilityError::NoContentFound`] when no attempt produced any text.
    pub fn parse(self) -> Result<Article> {
        let debug = self.options.debug;
        let mut doc = Document::from_html(&self.document);

        let element_count = doc.element_count();
        let max = self.options.max_elems_to_parse;
        if max > 0 && element_count > max {
            return Err(ReadabilityError::MaxElementsExceeded(element_count));
        }

        let metadata = get_article_metadata(&self.document);
        log_debug!(debug, "metadata: {:?}", metadata);

        prep_document(&mut doc);

        let title = metadata.title.clone().unwrap_or_default();
        let mut byline = None;
        let ArticleContent {
            document: mut article_doc,
            content,
            dir,
            ..
        } = grab_article(&doc, &self.options, &title, &mut byline)?;

        clean_article_content(&mut article_doc, content, self.page_url.as_ref(), &self.options);

        let excerpt = metadata
            .excerpt
            .or_else(|| first_paragraph_text(&article_doc, content))
            .map(|excerpt| normalize_space(&excerpt));

        let text_content = get_inner_text(&article_doc, content, true);
        let length = char_len(&text_content);
        let html = normalize_space(&article_doc.outer_html(content));
        log_debug!(debug, "extracted article with {} characters", length);

        Ok(Article {
            title: metadata
                .title
                .map(|title| normalize_space(&title))
                .filter(|title| !title.is_empty()),
            byline: byline
                .or(metadata.byline)
                .map(|byline| normalize_space(byline.trim()))
                .filter(|byline| !byline.is_empty()),
            dir,
            content: html,
            text_content,
            length,
            excerpt,
        })
    }
}
