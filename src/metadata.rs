//! Metadata extraction from `<meta>` tags and the document title.

use crate::constants::{REGEXPS, TITLE_COLONS, TITLE_SEPARATORS};
use crate::utils::char_len;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashMap;

static META_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("meta").expect("valid meta selector"));
static TITLE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("title").expect("valid title selector"));
static HEADING_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("h1, h2").expect("valid heading selector"));
static H1_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("h1").expect("valid h1 selector"));

/// Metadata extracted from the document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Metadata {
    pub title: Option<String>,
    pub byline: Option<String>,
    pub excerpt: Option<String>,
}

/// Read title, excerpt and author from the document head.
///
/// Title comes from [`get_article_title`], then `og:title`, then
/// `twitter:title`. Excerpt prefers `description` over `og:description` over
/// `twitter:description`. The last `author` meta tag seeds the byline.
pub fn get_article_metadata(document: &Html) -> Metadata {
    let mut values: HashMap<String, String> = HashMap::new();
    let mut metadata = Metadata::default();

    for meta in document.select(&META_SELECTOR) {
        let element = meta.value();
        let name = element.attr("name").unwrap_or_default();
        let property = element.attr("property").unwrap_or_default();
        let content = element.attr("content").unwrap_or_default().trim();

        if name.eq_ignore_ascii_case("author") || property.eq_ignore_ascii_case("author") {
            metadata.byline = Some(content.to_string()).filter(|byline| !byline.is_empty());
        }

        let key = if REGEXPS.meta_name.is_match(name) {
            name
        } else if REGEXPS.meta_property.is_match(property) {
            property
        } else {
            continue;
        };

        if !content.is_empty() {
            let key = key
                .to_lowercase()
                .chars()
                .filter(|ch| !ch.is_whitespace())
                .collect::<String>();
            values.insert(key, content.to_string());
        }
    }

    metadata.excerpt = ["description", "og:description", "twitter:description"]
        .iter()
        .find_map(|key| values.get(*key).cloned());

    metadata.title = get_article_title(document).or_else(|| {
        ["og:title", "twitter:title"]
            .iter()
            .find_map(|key| values.get(*key).cloned())
    });

    metadata
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Best guess at the article title from `<title>`, trimming site names.
///
/// Returns `None` when the document has no usable `<title>` text.
pub fn get_article_title(document: &Html) -> Option<String> {
    let original = document
        .select(&TITLE_SELECTOR)
        .next()
        .map(element_text)
        .filter(|title| !title.is_empty())?;

    let separator = original.rfind(TITLE_SEPARATORS);
    let mut title = original.clone();

    if let Some(index) = separator {
        let (head, tail) = split_around(&original, index);
        title = if char_len(head) < 3 || char_len(tail) > char_len(head) {
            tail.to_string()
        } else {
            head.to_string()
        };
    } else if original.contains(TITLE_COLONS) {
        let heading_matches = document
            .select(&HEADING_SELECTOR)
            .any(|heading| element_text(heading) == original);

        if !heading_matches {
            title = title_around_colons(&original);
        }
    } else {
        let length = char_len(&original);
        if !(15..=150).contains(&length) {
            let h1s: Vec<_> = document.select(&H1_SELECTOR).collect();
            if let [h1] = h1s.as_slice() {
                title = element_text(*h1);
            }
        }
    }

    let length = char_len(&title);
    // Very short results are only kept when they are what's left of a split.
    if length < 4
        && (separator.is_none() || char_len(&original).saturating_sub(2) != length)
    {
        title = original;
    }

    Some(title)
}

/// Trimmed text before and after the character at byte `index`.
fn split_around(text: &str, index: usize) -> (&str, &str) {
    let separator_len = text[index..].chars().next().map_or(1, char::len_utf8);
    (text[..index].trim(), text[index + separator_len..].trim())
}

fn title_around_colons(original: &str) -> String {
    let (Some(first), Some(last)) = (original.find(TITLE_COLONS), original.rfind(TITLE_COLONS))
    else {
        return original.to_string();
    };

    let (_, after_last) = split_around(original, last);
    if char_len(after_last) < 3 {
        let (_, after_first) = split_around(original, first);
        return after_first.to_string();
    }

    let (before_first, _) = split_around(original, first);
    if char_len(before_first) > 5 {
        original.to_string()
    } else {
        after_last.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn title_of(html: &str) -> Option<String> {
        get_article_title(&Html::parse_document(html))
    }

    #[test]
    fn test_meta_tag_extraction() {
        let html = r#"
            <html>
                <head>
                    <meta property="og:title" content="OG Title" />
                    <meta name="author" content="Jane Smith" />
                    <meta property="og:description" content="OG Description" />
                    <meta name="twitter:description" content="Twitter Description" />
                </head>
            </html>
        "#;

        let metadata = get_article_metadata(&Html::parse_document(html));

        assert_eq!(metadata.title, Some("OG Title".to_string()));
        assert_eq!(metadata.byline, Some("Jane Smith".to_string()));
        assert_eq!(metadata.excerpt, Some("OG Description".to_string()));
    }

    #[test]
    fn test_description_beats_social_descriptions() {
        let html = r#"
            <html><head>
                <meta name="twitter:description" content="Twitter" />
                <meta property="og:description" content="OG" />
                <meta name="Description" content="  Plain  " />
            </head></html>
        "#;

        let metadata = get_article_metadata(&Html::parse_document(html));
        assert_eq!(metadata.excerpt, Some("Plain".to_string()));
    }

    #[test]
    fn test_title_element_beats_meta_titles() {
        let html = r#"
            <html><head>
                <title>A Sufficiently Long Document Title</title>
                <meta name="twitter:title" content="Twitter Title" />
                <meta property="og:title" content="OG Title" />
            </head></html>
        "#;

        let metadata = get_article_metadata(&Html::parse_document(html));
        assert_eq!(metadata.title, Some("A Sufficiently Long Document Title".to_string()));
    }

    #[test]
    fn test_twitter_title_is_last_resort() {
        let html = r#"<html><head><meta name="twitter:title" content="Twitter Title" /></head></html>"#;
        let metadata = get_article_metadata(&Html::parse_document(html));
        assert_eq!(metadata.title, Some("Twitter Title".to_string()));
    }

    #[test]
    fn test_last_author_meta_wins() {
        let html = r#"
            <html><head>
                <meta name="author" content="First Writer" />
                <meta property="author" content="Second Writer" />
            </head></html>
        "#;

        let metadata = get_article_metadata(&Html::parse_document(html));
        assert_eq!(metadata.byline, Some("Second Writer".to_string()));
    }

    #[test]
    fn test_title_separator_keeps_longer_side() {
        assert_eq!(
            title_of("<title>Breaking News - Example Times</title>"),
            Some("Breaking News".to_string())
        );
        assert_eq!(
            title_of("<title>Site | How the river changed the town</title>"),
            Some("How the river changed the town".to_string())
        );
        assert_eq!(
            title_of("<title>Go » Package Docs</title>"),
            Some("Package Docs".to_string())
        );
        assert_eq!(
            title_of("<title>AB | C</title>"),
            Some("AB | C".to_string())
        );
    }

    #[test]
    fn test_title_colon_handling() {
        assert_eq!(
            title_of("<title>News: Big storm hits the coast</title>"),
            Some("Big storm hits the coast".to_string())
        );
        assert_eq!(
            title_of("<title>Everything we know so far: Storm</title>"),
            Some("Everything we know so far: Storm".to_string())
        );
        assert_eq!(
            title_of(
                "<title>Review: A long film</title><body><h2>Review: A long film</h2></body>"
            ),
            Some("Review: A long film".to_string())
        );
    }

    #[test]
    fn test_title_falls_back_to_single_h1() {
        assert_eq!(
            title_of("<title>Home</title><body><h1>The Real Headline</h1></body>"),
            Some("The Real Headline".to_string())
        );
        assert_eq!(
            title_of("<title>Home</title><body><h1>One</h1><h1>Two</h1></body>"),
            Some("Home".to_string())
        );
    }

    #[test]
    fn test_missing_title() {
        assert_eq!(title_of("<html><head></head><body></body></html>"), None);
    }
}
