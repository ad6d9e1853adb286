//! Regular expressions, tag tables and numeric defaults shared by the pipeline.

use once_cell::sync::Lazy;
use regex::Regex;

/// Default minimum article length, in characters.
pub const DEFAULT_CHAR_THRESHOLD: usize = 500;

/// Default number of candidates kept while picking the article root.
pub const DEFAULT_N_TOP_CANDIDATES: usize = 5;

/// Class name that always survives class stripping.
pub const CLASS_TO_PRESERVE: &str = "page";

/// Number of close-scoring candidates needed before their shared ancestor is considered.
pub const MINIMUM_TOP_CANDIDATES: usize = 3;

/// Score given to an initialized node whose natural score is exactly zero.
pub const UNSCORED_EPSILON: f64 = -0.00001;

pub const DEFAULT_TAGS_TO_SCORE: &[&str] = &["section", "h2", "h3", "h4", "h5", "h6", "p", "td", "pre"];

/// Children that keep a `<div>` from being turned into a `<p>`.
pub const DIV_TO_P_ELEMS: &[&str] = &[
    "a", "blockquote", "dl", "div", "img", "ol", "p", "pre", "table", "ul", "select",
];

/// Containers dropped by the scoring walk when they hold no text.
pub const EMPTY_CONTAINER_TAGS: &[&str] = &[
    "div", "section", "header", "h1", "h2", "h3", "h4", "h5", "h6",
];

// canvas, iframe, svg and video are phrasing content too, but they tend to be
// stripped later, so they are left out here.
pub const PHRASING_ELEMS: &[&str] = &[
    "abbr", "audio", "b", "bdo", "br", "button", "cite", "code", "data", "datalist", "dfn", "em",
    "embed", "i", "img", "input", "kbd", "label", "mark", "math", "meter", "noscript", "object",
    "output", "progress", "q", "ruby", "samp", "script", "select", "small", "span", "strong", "sub",
    "sup", "textarea", "time", "var", "wbr",
];

pub const PRESENTATIONAL_ATTRIBUTES: &[&str] = &[
    "align",
    "background",
    "bgcolor",
    "border",
    "cellpadding",
    "cellspacing",
    "frame",
    "hspace",
    "rules",
    "style",
    "valign",
    "vspace",
];

pub const DEPRECATED_SIZE_ATTRIBUTE_ELEMS: &[&str] = &["table", "th", "td", "hr", "pre"];

pub const DATA_TABLE_DESCENDANTS: &[&str] = &["col", "colgroup", "tfoot", "thead", "th"];

/// Elements that may carry an embedded video.
pub const EMBEDDED_ELEMS: &[&str] = &["object", "embed", "iframe"];

/// Siblings of these kinds are retagged to `<div>` when merged into the article.
pub const ALTER_TO_DIV_TAGS: &[&str] = &["div", "article", "section", "p"];

/// Tags whose presence keeps an otherwise empty `<p>` alive.
pub const PARAGRAPH_MEDIA_TAGS: &[&str] = &["img", "embed", "object", "iframe"];

pub const TITLE_SEPARATORS: &[char] = &['|', '-', '\\', '/', '>', '»'];

pub const TITLE_COLONS: &[char] = &[':', '：'];

/// Compiled patterns used across the pipeline.
pub struct Regexps {
    pub unlikely_candidates: Regex,
    pub ok_maybe_its_a_candidate: Regex,
    pub positive: Regex,
    pub negative: Regex,
    pub byline: Regex,
    pub videos: Regex,
    pub share_elements: Regex,
    pub display_none: Regex,
    pub normalize: Regex,
    pub sentence_end: Regex,
    pub meta_name: Regex,
    pub meta_property: Regex,
}

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("built-in pattern must compile")
}

pub static REGEXPS: Lazy<Regexps> = Lazy::new(|| Regexps {
    unlikely_candidates: compile(
        r"(?i)banner|breadcrumbs|combx|comment|community|cover-wrap|disqus|extra|foot|header|legends|menu|related|remark|replies|rss|shoutbox|sidebar|skyscraper|social|sponsor|supplemental|ad-break|agegate|pagination|pager|popup|yom-remote",
    ),
    ok_maybe_its_a_candidate: compile(r"(?i)and|article|body|column|main|shadow|app|container"),
    positive: compile(
        r"(?i)article|body|content|entry|hentry|h-entry|main|page|pagination|post|text|blog|story",
    ),
    negative: compile(
        r"(?i)hidden|^hid$| hid$| hid |^hid |banner|combx|comment|com-|contact|foot|footer|footnote|masthead|media|meta|outbrain|promo|related|scroll|share|shoutbox|sidebar|skyscraper|sponsor|shopping|tags|tool|widget",
    ),
    byline: compile(r"(?i)byline|author|dateline|writtenby|p-author"),
    videos: compile(
        r"(?i)//(www\.)?(dailymotion|youtube|youtube-nocookie|player\.vimeo|v\.youku|v\.qq)\.com",
    ),
    share_elements: compile(r"(?i)share"),
    display_none: compile(r"(?i)display\s*:\s*none"),
    normalize: compile(r"\s{2,}"),
    sentence_end: compile(r"\.( |$)"),
    meta_name: compile(r"(?i)^\s*((twitter)\s*:\s*)?(description|title)\s*$"),
    meta_property: compile(r"(?i)^\s*og\s*:\s*(description|title)\s*$"),
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unlikely_candidates_match_sidebars() {
        assert!(REGEXPS.unlikely_candidates.is_match("sidebar-related "));
        assert!(!REGEXPS.ok_maybe_its_a_candidate.is_match("sidebar-related "));
        assert!(REGEXPS.ok_maybe_its_a_candidate.is_match("main-column"));
    }

    #[test]
    fn video_hosts_are_recognized() {
        assert!(REGEXPS.videos.is_match("https://www.youtube.com/embed/abc"));
        assert!(REGEXPS.videos.is_match("//player.vimeo.com/video/1"));
        assert!(!REGEXPS.videos.is_match("https://example.com/video.mp4"));
    }

    #[test]
    fn meta_keys_accept_prefixes() {
        assert!(REGEXPS.meta_name.is_match("twitter:description"));
        assert!(REGEXPS.meta_name.is_match(" Title "));
        assert!(REGEXPS.meta_property.is_match("og : title"));
        assert!(!REGEXPS.meta_property.is_match("og:site_name"));
    }
}
