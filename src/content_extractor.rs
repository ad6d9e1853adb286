//! Main content extraction: candidate selection, article assembly and the
//! retry loop that relaxes heuristics until enough text comes out.
//!
//! Each attempt works on its own clone of the preprocessed document:
//!
//! 1. Walk and score the body ([`crate::scoring`]).
//! 2. Rescale candidate scores by link density and keep the best N.
//! 3. Resolve the article root: fall back to a synthetic wrapper around the
//!    whole body, promote a shared ancestor of several close candidates, climb
//!    to a better-scoring parent, and skip only-child wrappers.
//! 4. Gather the root and its qualifying siblings into a new container.
//! 5. Sanitize the container ([`crate::post_processor`]).
//!
//! An attempt whose text is shorter than the configured threshold disables
//! the next flag in [`RELAXATION_ORDER`] and starts over. When no flag is left,
//! the longest attempt wins.

use crate::constants::{ALTER_TO_DIV_TAGS, MINIMUM_TOP_CANDIDATES, REGEXPS};
use crate::dom::{Document, NodeId};
use crate::dom_utils::{get_inner_text, get_link_density, text_direction};
use crate::error::{ReadabilityError, Result};
use crate::options::ReadabilityOptions;
use crate::post_processor::{prep_article, CleanContext};
use crate::scoring::{
    collect_elements_to_score, initialize_node, score_elements, Flags, ScoreTable,
    RELAXATION_ORDER,
};
use crate::utils::char_len;

/// Result of one extraction attempt.
#[derive(Debug, Clone)]
pub struct ArticleContent {
    /// The attempt's copy of the document. `content` lives in it, detached.
    pub document: Document,
    /// The `<div id="readability-content">` container.
    pub content: NodeId,
    /// Characters of trimmed, whitespace-normalized text in `content`.
    pub text_length: usize,
    /// Text direction of the article root.
    pub dir: Option<String>,
}

/// Run extraction attempts against a preprocessed document.
///
/// `byline` carries the byline found by the scoring walk across attempts; once
/// set, later attempts leave byline-looking elements in the tree.
pub fn grab_article(
    pristine: &Document,
    options: &ReadabilityOptions,
    title: &str,
    byline: &mut Option<String>,
) -> Result<ArticleContent> {
    let body = pristine
        .body()
        .ok_or_else(|| ReadabilityError::InvalidDocument("no <body> element".to_string()))?;
    if pristine.element_children(body).is_empty() && pristine.text(body).trim().is_empty() {
        return Err(ReadabilityError::InvalidDocument(
            "<body> element is empty".to_string(),
        ));
    }

    let mut flags = Flags::all();
    let mut relaxations = RELAXATION_ORDER.iter();
    let mut attempts: Vec<ArticleContent> = Vec::with_capacity(RELAXATION_ORDER.len() + 1);

    loop {
        log_debug!(options.debug, "starting extraction attempt with flags {:?}", flags);
        let attempt = run_attempt(pristine, body, flags, options, title, byline);

        if attempt.text_length >= options.char_threshold {
            return Ok(attempt);
        }

        log_debug!(
            options.debug,
            "attempt produced {} characters, below threshold of {}",
            attempt.text_length,
            options.char_threshold
        );
        attempts.push(attempt);

        match relaxations.next() {
            Some(&flag) => flags.remove(flag),
            None => break,
        }
    }

    let best = best_attempt(attempts).ok_or(ReadabilityError::NoContentFound)?;
    log_debug!(options.debug, "using best attempt with {} characters", best.text_length);
    Ok(best)
}

/// Longest attempt with any text at all. Ties go to the latest attempt.
fn best_attempt(attempts: Vec<ArticleContent>) -> Option<ArticleContent> {
    attempts
        .into_iter()
        .reduce(|best, next| {
            if next.text_length >= best.text_length {
                next
            } else {
                best
            }
        })
        .filter(|best| best.text_length > 0)
}

fn run_attempt(
    pristine: &Document,
    body: NodeId,
    flags: Flags,
    options: &ReadabilityOptions,
    title: &str,
    byline: &mut Option<String>,
) -> ArticleContent {
    let mut doc = pristine.clone();
    let mut scores = ScoreTable::default();

    let elements = collect_elements_to_score(&mut doc, body, flags, byline, options.debug);
    let candidates = score_elements(&doc, &elements, flags, &mut scores);
    let top_candidates = select_top_candidates(
        &doc,
        &candidates,
        &mut scores,
        options.top_candidate_limit(),
        options.debug,
    );

    let (top_candidate, created) =
        resolve_top_candidate(&mut doc, body, &top_candidates, &mut scores, flags);
    let dir = text_direction(&doc, top_candidate);

    let content = assemble_article(&mut doc, top_candidate, &scores, options.debug);

    let ctx = CleanContext {
        scores: &scores,
        flags,
        title,
        debug: options.debug,
    };
    prep_article(&mut doc, content, &ctx);
    wrap_page(&mut doc, content, top_candidate, created);

    let text_length = char_len(&get_inner_text(&doc, content, true));

    ArticleContent {
        document: doc,
        content,
        text_length,
        dir,
    }
}

/// Rescale every candidate by `1 - link density` and keep the best `limit`,
/// highest first.
fn select_top_candidates(
    doc: &Document,
    candidates: &[NodeId],
    scores: &mut ScoreTable,
    limit: usize,
    debug: bool,
) -> Vec<NodeId> {
    let mut top: Vec<NodeId> = Vec::with_capacity(limit + 1);

    for &candidate in candidates {
        let score = scores.score(candidate) * (1.0 - get_link_density(doc, candidate));
        scores.set(candidate, score);
        log_debug!(
            debug,
            "candidate <{}> with score {:.3}",
            doc.tag_name(candidate).unwrap_or_default(),
            score
        );

        let position = top
            .iter()
            .position(|&other| score > scores.score(other))
            .unwrap_or(top.len());
        if position < limit {
            top.insert(position, candidate);
            top.truncate(limit);
        }
    }

    top
}

/// Pick the article root. The flag is set when a synthetic wrapper had to be
/// created around the whole body.
fn resolve_top_candidate(
    doc: &mut Document,
    body: NodeId,
    top_candidates: &[NodeId],
    scores: &mut ScoreTable,
    flags: Flags,
) -> (NodeId, bool) {
    let leader = match top_candidates.first() {
        Some(&leader) if leader != body => leader,
        _ => {
            let wrapper = doc.create_element("div");
            for child in doc.children(body).to_vec() {
                doc.append_child(wrapper, child);
            }
            doc.append_child(body, wrapper);
            initialize_node(doc, scores, wrapper, flags);
            return (wrapper, true);
        }
    };

    let mut top = find_shared_ancestor(doc, top_candidates, scores).unwrap_or(leader);
    if !scores.is_initialized(top) {
        initialize_node(doc, scores, top, flags);
    }

    top = climb_to_better_ancestor(doc, top, scores, flags);

    // Adjacent content usually sits next to the parent of an only child.
    while let Some(parent) = doc.parent(top).filter(|&parent| {
        doc.is_element(parent)
            && !doc.is_tag(parent, "body")
            && doc.element_children(parent).len() == 1
    }) {
        top = parent;
    }
    if !scores.is_initialized(top) {
        initialize_node(doc, scores, top, flags);
    }

    (top, false)
}

/// Ancestor of the leader shared by more than [`MINIMUM_TOP_CANDIDATES`] of
/// the close runners-up, if the score spread is that flat.
fn find_shared_ancestor(
    doc: &Document,
    top_candidates: &[NodeId],
    scores: &ScoreTable,
) -> Option<NodeId> {
    let leader = *top_candidates.first()?;
    let leader_score = scores.score(leader);
    if leader_score <= 0.0 {
        return None;
    }

    let ancestor_sets: Vec<Vec<NodeId>> = top_candidates
        .iter()
        .filter(|&&candidate| scores.score(candidate) / leader_score >= 0.75)
        .map(|&candidate| doc.ancestors(candidate, 0))
        .collect();
    if ancestor_sets.len() < MINIMUM_TOP_CANDIDATES {
        return None;
    }

    let mut current = doc.parent(leader);
    while let Some(ancestor) =
        current.filter(|&node| doc.is_element(node) && !doc.is_tag(node, "body"))
    {
        let sharing = ancestor_sets
            .iter()
            .filter(|ancestors| ancestors.contains(&ancestor))
            .count();
        if sharing > MINIMUM_TOP_CANDIDATES {
            return Some(ancestor);
        }
        current = doc.parent(ancestor);
    }

    None
}

/// Walk up from `top` while scores hold above a third of its score, switching
/// to the first ancestor that beats the previous one. Unscored ancestors are
/// initialized on the way.
fn climb_to_better_ancestor(
    doc: &Document,
    top: NodeId,
    scores: &mut ScoreTable,
    flags: Flags,
) -> NodeId {
    let mut last_score = scores.score(top);
    let threshold = last_score / 3.0;

    let mut current = doc.parent(top);
    while let Some(parent) =
        current.filter(|&node| doc.is_element(node) && !doc.is_tag(node, "body"))
    {
        if !scores.is_initialized(parent) {
            initialize_node(doc, scores, parent, flags);
        }

        let score = scores.score(parent);
        if score < threshold {
            break;
        }
        if score > last_score {
            return parent;
        }
        last_score = score;
        current = doc.parent(parent);
    }

    top
}

fn should_include_sibling(
    doc: &Document,
    sibling: NodeId,
    top: NodeId,
    scores: &ScoreTable,
    threshold: f64,
) -> bool {
    if sibling == top {
        return true;
    }

    let top_score = scores.score(top);
    let bonus = match doc.attr(top, "class") {
        Some(class) if !class.is_empty() && doc.attr(sibling, "class") == Some(class) => {
            top_score * 0.2
        }
        _ => 0.0,
    };
    if scores.score(sibling) + bonus >= threshold {
        return true;
    }

    if !doc.is_tag(sibling, "p") {
        return false;
    }

    let link_density = get_link_density(doc, sibling);
    let text = get_inner_text(doc, sibling, true);
    let length = char_len(&text);

    (length > 80 && link_density < 0.25)
        || (length > 0
            && length < 80
            && link_density == 0.0
            && REGEXPS.sentence_end.is_match(&text))
}

/// Move `top` and its qualifying siblings into a new detached container.
fn assemble_article(doc: &mut Document, top: NodeId, scores: &ScoreTable, debug: bool) -> NodeId {
    let content = doc.create_element("div");
    doc.set_attr(content, "id", "readability-content");

    let threshold = (scores.score(top) * 0.2).max(10.0);
    let siblings = match doc.parent(top) {
        Some(parent) => doc.element_children(parent),
        None => vec![top],
    };

    for sibling in siblings {
        if !should_include_sibling(doc, sibling, top, scores, threshold) {
            continue;
        }

        log_debug!(
            debug,
            "appending sibling <{}>",
            doc.tag_name(sibling).unwrap_or_default()
        );
        if doc
            .tag_name(sibling)
            .is_some_and(|tag| ALTER_TO_DIV_TAGS.contains(&tag))
        {
            doc.set_tag_name(sibling, "div");
        }
        doc.append_child(content, sibling);
    }

    content
}

/// Mark the first page of the article.
fn wrap_page(doc: &mut Document, content: NodeId, top: NodeId, created: bool) {
    if created {
        doc.set_attr(top, "id", "readability-page-1");
        doc.set_attr(top, "class", "page");
        return;
    }

    let page = doc.create_element("div");
    doc.set_attr(page, "id", "readability-page-1");
    doc.set_attr(page, "class", "page");
    for child in doc.children(content).to_vec() {
        doc.append_child(page, child);
    }
    doc.append_child(content, page);
}
