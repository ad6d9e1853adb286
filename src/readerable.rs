//! Quick readability check without full parsing.
//!
//! This module provides the [`is_probably_readerable`] function, a cheap
//! pre-flight check that guesses whether a document has an article worth
//! extracting, without scoring or mutating anything.
//!
//! ## Use Case
//!
//! Filter out pages that are unlikely to contain article content, saving the
//! cost of a full parse:
//!
//! ```rust
//! use readability_core::{is_probably_readerable, Readability};
//!
//! let html = "<html><body><p>Not much here</p></body></html>";
//!
//! if is_probably_readerable(html, None) {
//!     let readability = Readability::new(html, None, None).unwrap();
//!     if let Ok(article) = readability.parse() {
//!         println!("Extracted {} characters", article.length);
//!     }
//! } else {
//!     println!("Not an article page, skipping parse");
//! }
//! ```

use crate::constants::REGEXPS;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;

static CONTENT_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("p, pre, article").expect("valid content selector"));
static BR_IN_DIV_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div > br").expect("valid br selector"));

/// Options for the readability pre-flight check.
///
/// ## Example
///
/// ```rust
/// use readability_core::{is_probably_readerable, ReaderableOptions};
///
/// let html = "<html><body><p>Short</p></body></html>";
///
/// let options = ReaderableOptions {
///     min_content_length: 200,
///     min_score: 30.0,
/// };
///
/// assert!(!is_probably_readerable(html, Some(options)));
/// ```
#[derive(Debug, Clone)]
pub struct ReaderableOptions {
    /// Nodes with less trimmed text than this do not count.
    ///
    /// Default: `140`
    pub min_content_length: usize,

    /// Accumulated score above which the page is considered readerable.
    ///
    /// Default: `20.0`
    pub min_score: f64,
}

impl Default for ReaderableOptions {
    fn default() -> Self {
        Self {
            min_content_length: 140,
            min_score: 20.0,
        }
    }
}

fn is_visible(element: &ElementRef<'_>) -> bool {
    let value = element.value();
    let hidden_by_style = value
        .attr("style")
        .is_some_and(|style| REGEXPS.display_none.is_match(style));
    !hidden_by_style && value.attr("hidden").is_none() && value.attr("aria-hidden") != Some("true")
}

fn looks_unlikely(element: &ElementRef<'_>) -> bool {
    let value = element.value();
    let match_string = format!(
        "{} {}",
        value.attr("class").unwrap_or_default(),
        value.attr("id").unwrap_or_default()
    );
    REGEXPS.unlikely_candidates.is_match(&match_string)
        && !REGEXPS.ok_maybe_its_a_candidate.is_match(&match_string)
}

fn inside_list_item(element: &ElementRef<'_>) -> bool {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .any(|ancestor| ancestor.value().name() == "li")
}

/// Quick check to determine if a document is likely to be readerable.
///
/// Visible `<p>`, `<pre>` and `<article>` elements, plus `<div>`s that break
/// text with `<br>`, each add `sqrt(length - min_content_length)` for their
/// trimmed text length. Nodes inside list items or with unlikely class/id
/// names are skipped. Returns `true` as soon as the total exceeds
/// `min_score`.
///
/// ```rust
/// use readability_core::is_probably_readerable;
///
/// let article_html = format!(
///     "<html><body><article><p>{}</p><p>{}</p></article></body></html>",
///     "A sentence that keeps going. ".repeat(12),
///     "Another sentence, also long. ".repeat(12),
/// );
/// assert!(is_probably_readerable(&article_html, None));
///
/// let non_article_html = "<html><body><p>Short</p></body></html>";
/// assert!(!is_probably_readerable(non_article_html, None));
/// ```
pub fn is_probably_readerable(html: &str, options: Option<ReaderableOptions>) -> bool {
    let options = options.unwrap_or_default();
    let document = Html::parse_document(html);

    let mut seen = HashSet::new();
    let nodes = document
        .select(&CONTENT_SELECTOR)
        .chain(
            document
                .select(&BR_IN_DIV_SELECTOR)
                .filter_map(|br| br.parent().and_then(ElementRef::wrap)),
        )
        .filter(|node| seen.insert(node.id()));

    let mut score = 0.0;
    for node in nodes {
        if !is_visible(&node) || looks_unlikely(&node) || inside_list_item(&node) {
            continue;
        }

        let text = node.text().collect::<String>();
        let text_len = text.trim().chars().count();
        if text_len < options.min_content_length {
            continue;
        }

        score += ((text_len - options.min_content_length) as f64).sqrt();
        if score > options.min_score {
            return true;
        }
    }

    false
}
