//! Read-only queries and walk helpers over the arena [`Document`].

use crate::constants::{DIV_TO_P_ELEMS, PHRASING_ELEMS, REGEXPS};
use crate::dom::{Document, NodeData, NodeId};
use crate::utils::{char_len, normalize_space};

/// Trimmed text of the subtree, optionally with whitespace runs collapsed.
pub fn get_inner_text(doc: &Document, id: NodeId, normalize: bool) -> String {
    let text = doc.text(id);
    let trimmed = text.trim();
    if normalize {
        normalize_space(trimmed)
    } else {
        trimmed.to_string()
    }
}

/// Share of the node's text that sits inside `<a>` elements.
pub fn get_link_density(doc: &Document, id: NodeId) -> f64 {
    let text_length = char_len(&get_inner_text(doc, id, true));
    if text_length == 0 {
        return 0.0;
    }

    let link_length: usize = doc
        .elements_by_tag(id, "a")
        .into_iter()
        .map(|link| char_len(&get_inner_text(doc, link, true)))
        .sum();

    link_length as f64 / text_length as f64
}

/// `class` and `id` joined by a space, the string the class/id patterns run against.
pub fn match_string(doc: &Document, id: NodeId) -> String {
    format!(
        "{} {}",
        doc.attr(id, "class").unwrap_or_default(),
        doc.attr(id, "id").unwrap_or_default()
    )
}

/// Whitespace-only text, or a `<br>`.
pub fn is_whitespace(doc: &Document, id: NodeId) -> bool {
    match doc.data(id) {
        NodeData::Text(text) => text.trim().is_empty(),
        NodeData::Element(element) => element.name() == "br",
        _ => false,
    }
}

/// Whether the node can sit inside a paragraph.
pub fn is_phrasing_content(doc: &Document, id: NodeId) -> bool {
    match doc.data(id) {
        NodeData::Text(_) => true,
        NodeData::Element(element) => {
            PHRASING_ELEMS.contains(&element.name())
                || (matches!(element.name(), "a" | "del" | "ins")
                    && doc
                        .children(id)
                        .iter()
                        .all(|&child| is_phrasing_content(doc, child)))
        }
        _ => false,
    }
}

/// Inline `display: none` or a `hidden` attribute.
pub fn is_probably_visible(doc: &Document, id: NodeId) -> bool {
    let hidden_by_style = doc
        .attr(id, "style")
        .is_some_and(|style| REGEXPS.display_none.is_match(style));
    !hidden_by_style && !doc.has_attr(id, "hidden")
}

/// Exactly one element child, named `tag`, and no non-blank text beside it.
pub fn has_single_tag_inside_element(doc: &Document, id: NodeId, tag: &str) -> bool {
    let children = doc.element_children(id);
    if children.len() != 1 || !doc.is_tag(children[0], tag) {
        return false;
    }

    !doc.children(id).iter().any(|&child| match doc.data(child) {
        NodeData::Text(text) => !text.trim().is_empty(),
        _ => false,
    })
}

/// Whether any descendant is a block-level element.
pub fn has_child_block_element(doc: &Document, id: NodeId) -> bool {
    doc.children(id).iter().any(|&child| {
        doc.tag_name(child)
            .is_some_and(|name| DIV_TO_P_ELEMS.contains(&name))
            || has_child_block_element(doc, child)
    })
}

/// Walk up at most `max_depth` ancestors (`None` for unbounded) looking for `tag`.
pub fn has_ancestor_tag<F>(
    doc: &Document,
    id: NodeId,
    tag: &str,
    max_depth: Option<usize>,
    filter: F,
) -> bool
where
    F: Fn(NodeId) -> bool,
{
    let mut depth = 0;
    let mut current = doc.parent(id);
    while let Some(parent) = current {
        if max_depth.is_some_and(|max| depth >= max) {
            return false;
        }
        if doc.is_tag(parent, tag) && filter(parent) {
            return true;
        }
        current = doc.parent(parent);
        depth += 1;
    }
    false
}

/// Next element in a depth-first, pre-order walk.
///
/// With `ignore_self_and_kids` the subtree of `id` is skipped, which is what a
/// caller about to remove `id` needs.
pub fn get_next_node(doc: &Document, id: NodeId, ignore_self_and_kids: bool) -> Option<NodeId> {
    if !ignore_self_and_kids {
        if let Some(first) = doc.element_children(id).into_iter().next() {
            return Some(first);
        }
    }

    let mut current = Some(id);
    while let Some(node) = current {
        if let Some(sibling) = doc.next_element_sibling(node) {
            return Some(sibling);
        }
        current = doc.parent(node);
    }
    None
}

/// Detach `id` and return the node the walk should continue from.
pub fn remove_and_get_next(doc: &mut Document, id: NodeId) -> Option<NodeId> {
    let next = get_next_node(doc, id, true);
    doc.detach(id);
    next
}

/// First node at or after `start` that is neither blank text nor a comment.
pub fn next_significant_node(doc: &Document, start: Option<NodeId>) -> Option<NodeId> {
    let mut current = start;
    while let Some(node) = current {
        let skip = match doc.data(node) {
            NodeData::Text(text) => text.trim().is_empty(),
            NodeData::Comment(_) => true,
            _ => false,
        };
        if !skip {
            return Some(node);
        }
        current = doc.next_sibling(node);
    }
    None
}

/// `dir` of `id`, else of its nearest ancestor that sets one.
pub fn text_direction(doc: &Document, id: NodeId) -> Option<String> {
    std::iter::once(id)
        .chain(doc.ancestors(id, 0))
        .find_map(|node| {
            doc.attr(node, "dir")
                .map(str::trim)
                .filter(|dir| !dir.is_empty())
                .map(str::to_string)
        })
}
