//! Content scoring: the node-classifying walk and score propagation.
//!
//! The walk visits every element of `<body>` once in document order. Along the
//! way it drops hidden nodes, the byline, unlikely candidates and empty
//! containers, turns text-only `<div>`s into paragraphs, and collects the
//! nodes worth scoring. Each of those then spreads its score over up to three
//! ancestors, which become the candidates for the article root.

use crate::constants::{
    DEFAULT_TAGS_TO_SCORE, EMPTY_CONTAINER_TAGS, REGEXPS, UNSCORED_EPSILON,
};
use crate::dom::{Document, NodeId};
use crate::dom_utils::{
    get_inner_text, get_link_density, get_next_node, has_child_block_element,
    has_single_tag_inside_element, is_phrasing_content, is_probably_visible, is_whitespace,
    match_string, remove_and_get_next,
};
use crate::utils::{char_len, comma_count};
use bitflags::bitflags;
use std::collections::HashMap;

bitflags! {
    /// Heuristics that the retry loop switches off one at a time.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Flags: u8 {
        const STRIP_UNLIKELYS = 0b001;
        const WEIGHT_CLASSES = 0b010;
        const CLEAN_CONDITIONALLY = 0b100;
    }
}

/// Order in which failed attempts relax the heuristics.
pub const RELAXATION_ORDER: [Flags; 3] = [
    Flags::STRIP_UNLIKELYS,
    Flags::WEIGHT_CLASSES,
    Flags::CLEAN_CONDITIONALLY,
];

/// Content scores keyed by node handle.
///
/// A node without an entry has never been scored, which is different from a
/// node scored to zero.
#[derive(Debug, Clone, Default)]
pub struct ScoreTable {
    scores: HashMap<NodeId, f64>,
}

impl ScoreTable {
    pub fn get(&self, id: NodeId) -> Option<f64> {
        self.scores.get(&id).copied()
    }

    /// Score of `id`, treating "never scored" as zero.
    pub fn score(&self, id: NodeId) -> f64 {
        self.get(id).unwrap_or(0.0)
    }

    pub fn is_initialized(&self, id: NodeId) -> bool {
        self.scores.contains_key(&id)
    }

    pub fn set(&mut self, id: NodeId, score: f64) {
        self.scores.insert(id, score);
    }

    pub fn add(&mut self, id: NodeId, delta: f64) {
        *self.scores.entry(id).or_insert(0.0) += delta;
    }
}

/// +/-25 for positive and negative hints in `class`, and again in `id`.
///
/// Always zero once [`Flags::WEIGHT_CLASSES`] is off.
pub fn get_class_weight(doc: &Document, id: NodeId, flags: Flags) -> f64 {
    if !flags.contains(Flags::WEIGHT_CLASSES) {
        return 0.0;
    }

    let mut weight = 0.0;
    for attr in ["class", "id"] {
        if let Some(value) = doc.attr(id, attr).filter(|value| !value.is_empty()) {
            if REGEXPS.negative.is_match(value) {
                weight -= 25.0;
            }
            if REGEXPS.positive.is_match(value) {
                weight += 25.0;
            }
        }
    }
    weight
}

fn tag_base_score(tag: &str) -> f64 {
    match tag {
        "div" => 5.0,
        "pre" | "td" | "blockquote" => 3.0,
        "address" | "ol" | "ul" | "dl" | "dd" | "dt" | "li" | "form" => -3.0,
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "th" => -5.0,
        _ => 0.0,
    }
}

/// Give `id` its starting score from tag semantics and class/id weight.
pub fn initialize_node(doc: &Document, scores: &mut ScoreTable, id: NodeId, flags: Flags) {
    let base = doc.tag_name(id).map(tag_base_score).unwrap_or(0.0);
    let score = base + get_class_weight(doc, id, flags);
    scores.set(id, if score == 0.0 { UNSCORED_EPSILON } else { score });
}

fn is_valid_byline(text: &str) -> bool {
    let length = char_len(text.trim());
    length > 0 && length < 100
}

/// Single pre-order walk over `body`, returning the nodes to score.
///
/// The first byline-looking element is recorded into `byline` and removed;
/// once `byline` is set, later attempts leave such elements in place.
pub fn collect_elements_to_score(
    doc: &mut Document,
    body: NodeId,
    flags: Flags,
    byline: &mut Option<String>,
    debug: bool,
) -> Vec<NodeId> {
    let strip_unlikely = flags.contains(Flags::STRIP_UNLIKELYS);
    let mut elements_to_score = Vec::new();
    let mut current = doc.element_children(body).into_iter().next();

    while let Some(node) = current {
        if !doc.contains(body, node) {
            break;
        }

        let match_string = match_string(doc, node);
        let tag = doc.tag_name(node).unwrap_or_default().to_string();

        if !is_probably_visible(doc, node) {
            log_debug!(debug, "removing hidden node: {}", match_string);
            current = remove_and_get_next(doc, node);
            continue;
        }

        if byline.is_none() {
            let text = doc.text(node);
            let looks_like_byline = doc.attr(node, "rel") == Some("author")
                || REGEXPS.byline.is_match(&match_string);
            if looks_like_byline && is_valid_byline(&text) {
                log_debug!(debug, "found byline in <{}>: {}", tag, text.trim());
                *byline = Some(text.trim().to_string());
                current = remove_and_get_next(doc, node);
                continue;
            }
        }

        if strip_unlikely
            && !match_string.trim().is_empty()
            && REGEXPS.unlikely_candidates.is_match(&match_string)
            && !REGEXPS.ok_maybe_its_a_candidate.is_match(&match_string)
            && tag != "body"
            && tag != "a"
        {
            log_debug!(debug, "removing unlikely candidate: {}", match_string);
            current = remove_and_get_next(doc, node);
            continue;
        }

        if EMPTY_CONTAINER_TAGS.contains(&tag.as_str()) && doc.text(node).trim().is_empty() {
            current = remove_and_get_next(doc, node);
            continue;
        }

        if DEFAULT_TAGS_TO_SCORE.contains(&tag.as_str()) {
            elements_to_score.push(node);
        }

        if tag == "div" {
            wrap_phrasing_runs(doc, node);

            if has_single_tag_inside_element(doc, node, "p") && get_link_density(doc, node) < 0.25 {
                if let Some(paragraph) = doc.element_children(node).into_iter().next() {
                    doc.replace_with(node, paragraph);
                    elements_to_score.push(paragraph);
                    current = get_next_node(doc, paragraph, false);
                    continue;
                }
            } else if !has_child_block_element(doc, node) {
                doc.set_tag_name(node, "p");
                elements_to_score.push(node);
            }
        }

        current = get_next_node(doc, node, false);
    }

    elements_to_score
}

/// Group consecutive phrasing children of a `<div>` into synthetic `<p>`s.
fn wrap_phrasing_runs(doc: &mut Document, div: NodeId) {
    let mut paragraph: Option<NodeId> = None;

    for child in doc.children(div).to_vec() {
        if is_phrasing_content(doc, child) {
            match paragraph {
                Some(p) => doc.append_child(p, child),
                None if !is_whitespace(doc, child) => {
                    let p = doc.create_element("p");
                    doc.replace_with(child, p);
                    doc.append_child(p, child);
                    paragraph = Some(p);
                }
                None => {}
            }
        } else if let Some(p) = paragraph.take() {
            while let Some(last) = doc.last_child(p).filter(|&last| is_whitespace(doc, last)) {
                doc.detach(last);
            }
        }
    }
}

/// Score every collected node and propagate to its ancestors.
///
/// Returns the candidates in the order they were first touched.
pub fn score_elements(
    doc: &Document,
    elements: &[NodeId],
    flags: Flags,
    scores: &mut ScoreTable,
) -> Vec<NodeId> {
    let mut candidates = Vec::new();

    for &element in elements {
        if doc.parent(element).is_none() {
            continue;
        }

        let inner_text = get_inner_text(doc, element, true);
        let text_length = char_len(&inner_text);
        if text_length < 25 {
            continue;
        }

        let ancestors = doc.ancestors(element, 3);
        if ancestors.is_empty() {
            continue;
        }

        let content_score =
            1.0 + comma_count(&inner_text) as f64 + ((text_length / 100) as f64).min(3.0);

        for (level, &ancestor) in ancestors.iter().enumerate() {
            // The root element has no element parent and is never a candidate.
            if !doc.parent(ancestor).is_some_and(|parent| doc.is_element(parent)) {
                continue;
            }

            if !scores.is_initialized(ancestor) {
                initialize_node(doc, scores, ancestor, flags);
                candidates.push(ancestor);
            }

            let divider = match level {
                0 => 1.0,
                1 => 2.0,
                _ => level as f64 * 3.0,
            };
            scores.add(ancestor, content_score / divider);
        }
    }

    candidates
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(doc: &Document) -> NodeId {
        doc.body().unwrap()
    }

    fn walk(doc: &mut Document, flags: Flags) -> (Vec<NodeId>, Option<String>) {
        let body = body(doc);
        let mut byline = None;
        let elements = collect_elements_to_score(doc, body, flags, &mut byline, false);
        (elements, byline)
    }

    #[test]
    fn class_weight_counts_class_and_id_separately() {
        let doc = Document::parse(
            "<body><div class=\"article\" id=\"sidebar\">x</div><div class=\"post\" id=\"main\">y</div></body>",
        );
        let divs = doc.elements_by_tag(doc.root(), "div");
        assert_eq!(get_class_weight(&doc, divs[0], Flags::all()), 0.0);
        assert_eq!(get_class_weight(&doc, divs[1], Flags::all()), 50.0);
        assert_eq!(get_class_weight(&doc, divs[1], Flags::STRIP_UNLIKELYS), 0.0);
    }

    #[test]
    fn zero_score_is_distinguished_from_unscored() {
        let doc = Document::parse("<body><span>x</span><div>y</div></body>");
        let span = doc.elements_by_tag(doc.root(), "span")[0];
        let div = doc.elements_by_tag(doc.root(), "div")[0];
        let mut scores = ScoreTable::default();

        assert_eq!(scores.get(span), None);
        initialize_node(&doc, &mut scores, span, Flags::all());
        initialize_node(&doc, &mut scores, div, Flags::all());

        assert_eq!(scores.get(span), Some(UNSCORED_EPSILON));
        assert_eq!(scores.get(div), Some(5.0));
    }

    #[test]
    fn byline_is_recorded_and_removed() {
        let mut doc = Document::parse(
            "<body><p class=\"byline\">By Jane Doe</p><p>Body text that is long enough to count.</p></body>",
        );
        let (_, byline) = walk(&mut doc, Flags::all());
        assert_eq!(byline.as_deref(), Some("By Jane Doe"));
        assert_eq!(doc.elements_by_tag(doc.root(), "p").len(), 1);
    }

    #[test]
    fn existing_byline_is_not_replaced() {
        let mut doc = Document::parse("<body><span rel=\"author\">Someone Else</span></body>");
        let body = body(&doc);
        let mut byline = Some("First Author".to_string());
        collect_elements_to_score(&mut doc, body, Flags::all(), &mut byline, false);
        assert_eq!(byline.as_deref(), Some("First Author"));
        assert_eq!(doc.elements_by_tag(doc.root(), "span").len(), 1);
    }

    #[test]
    fn unlikely_candidates_depend_on_flag() {
        let html = "<body><div class=\"sidebar-related\"><p>Thirty characters of text here</p></div></body>";

        let mut strict = Document::parse(html);
        walk(&mut strict, Flags::all());
        assert!(strict.elements_by_tag(strict.root(), "p").is_empty());

        let mut relaxed = Document::parse(html);
        walk(&mut relaxed, Flags::all() - Flags::STRIP_UNLIKELYS);
        assert_eq!(relaxed.elements_by_tag(relaxed.root(), "p").len(), 1);
    }

    #[test]
    fn ok_maybe_pattern_rescues_candidates() {
        let mut doc =
            Document::parse("<body><div class=\"sidebar main-column\"><p>Kept text</p><p>More</p></div></body>");
        walk(&mut doc, Flags::all());
        assert_eq!(doc.elements_by_tag(doc.root(), "div").len(), 1);
    }

    #[test]
    fn hidden_and_empty_nodes_are_removed() {
        let mut doc = Document::parse(
            "<body><p hidden>secret</p><section>  </section><h2></h2><p>visible</p></body>",
        );
        walk(&mut doc, Flags::all());
        assert_eq!(doc.inner_html(body(&doc)), "<p>visible</p>");
    }

    #[test]
    fn div_with_single_paragraph_is_unwrapped() {
        let mut doc = Document::parse("<body><div><p>Only paragraph</p></div></body>");
        let (elements, _) = walk(&mut doc, Flags::all());
        let p = doc.elements_by_tag(doc.root(), "p")[0];
        assert_eq!(doc.inner_html(body(&doc)), "<p>Only paragraph</p>");
        assert!(elements.contains(&p));
    }

    #[test]
    fn text_only_div_becomes_paragraph() {
        let mut doc = Document::parse("<body><div>Just <b>inline</b> text</div></body>");
        let (elements, _) = walk(&mut doc, Flags::all());
        assert_eq!(doc.inner_html(body(&doc)), "<p>Just <b>inline</b> text</p>");
        assert_eq!(elements.len(), 1);
    }

    #[test]
    fn phrasing_runs_are_wrapped_next_to_blocks() {
        let mut doc =
            Document::parse("<body><div>Lead text <em>here</em> <ul><li>item</li></ul>tail</div></body>");
        walk(&mut doc, Flags::all());
        assert_eq!(
            doc.inner_html(body(&doc)),
            "<div><p>Lead text <em>here</em></p><ul><li>item</li></ul><p>tail</p></div>"
        );
    }

    #[test]
    fn scores_propagate_with_level_dividers() {
        let text = "word, ".repeat(20);
        let mut doc = Document::parse(&format!(
            "<body><article><main><div><p>{text}</p><p>x</p></div></main></article></body>"
        ));
        let (elements, _) = walk(&mut doc, Flags::all());
        let mut scores = ScoreTable::default();
        let candidates = score_elements(&doc, &elements, Flags::all(), &mut scores);

        let div = doc.elements_by_tag(doc.root(), "div")[0];
        let main = doc.elements_by_tag(doc.root(), "main")[0];
        let article = doc.elements_by_tag(doc.root(), "article")[0];
        assert_eq!(candidates, vec![div, main, article]);

        // 119 characters after trimming, 20 commas: 1 + 20 + 1.
        let paragraph_score = 22.0;
        assert!((scores.score(div) - (5.0 + paragraph_score)).abs() < 1e-9);
        assert!((scores.score(main) - (UNSCORED_EPSILON + paragraph_score / 2.0)).abs() < 1e-9);
        assert!((scores.score(article) - (UNSCORED_EPSILON + paragraph_score / 6.0)).abs() < 1e-9);
    }

    #[test]
    fn short_paragraphs_are_not_scored() {
        let mut doc = Document::parse("<body><div><p>short</p><p>also short</p></div></body>");
        let (elements, _) = walk(&mut doc, Flags::all());
        let mut scores = ScoreTable::default();
        assert!(score_elements(&doc, &elements, Flags::all(), &mut scores).is_empty());
    }
}
