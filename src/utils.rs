//! Small text helpers.

use crate::constants::REGEXPS;
use url::Url;

/// Collapse every run of two or more whitespace characters into one space.
pub fn normalize_space(text: &str) -> String {
    REGEXPS.normalize.replace_all(text, " ").into_owned()
}

/// Length in characters, not bytes.
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Number of ASCII and full-width commas.
pub fn comma_count(text: &str) -> usize {
    text.chars().filter(|&ch| ch == ',' || ch == '，').count()
}

/// Parse `value` as an absolute http(s) URL.
pub fn parse_http_url(value: &str) -> Option<Url> {
    Url::parse(value)
        .ok()
        .filter(|url| matches!(url.scheme(), "http" | "https"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_space_keeps_single_spaces() {
        assert_eq!(normalize_space("a  b\n\n c d"), "a b c d");
    }

    #[test]
    fn counts_both_comma_kinds() {
        assert_eq!(comma_count("a, b，c,"), 3);
    }

    #[test]
    fn char_len_counts_multibyte() {
        assert_eq!(char_len("日本語"), 3);
    }

    #[test]
    fn only_http_urls_are_accepted() {
        assert_eq!(
            parse_http_url("https://example.com/a").map(|url| url.path().to_string()),
            Some("/a".to_string())
        );
        assert!(parse_http_url("ftp://example.com").is_none());
        assert!(parse_http_url("not a url").is_none());
    }
}
