//! Whole-document preprocessing and final article cleanup.
//!
//! [`prep_document`] runs once before extraction: it strips scripts, styles and
//! comments, turns `<font>` into `<span>`, and folds `<br>` runs into
//! paragraphs. [`clean_article_content`] runs once on the chosen article: it
//! rewrites links and images to absolute URIs and strips class attributes.

use crate::constants::CLASS_TO_PRESERVE;
use crate::dom::{Document, NodeId};
use crate::dom_utils::{get_inner_text, is_phrasing_content, is_whitespace, next_significant_node};
use crate::options::ReadabilityOptions;
use url::Url;

/// Prepare the document for scoring. Mutates the tree in place.
pub fn prep_document(doc: &mut Document) {
    let root = doc.root();

    for tag in ["script", "noscript", "style"] {
        for node in doc.elements_by_tag(root, tag) {
            doc.detach(node);
        }
    }

    remove_comments(doc);
    replace_brs(doc);

    for font in doc.elements_by_tag(root, "font") {
        doc.set_tag_name(font, "span");
    }
}

fn remove_comments(doc: &mut Document) {
    let comments: Vec<NodeId> = doc
        .descendants(doc.root())
        .into_iter()
        .filter(|&node| doc.is_comment(node))
        .collect();

    for comment in comments {
        doc.detach(comment);
    }
}

/// Replace two or more consecutive `<br>`s with a `<p>` that collects the
/// phrasing content following them.
///
/// `<div>foo<br>bar<br> <br><br>abc</div>` becomes
/// `<div>foo<br>bar<p> abc</p></div>`.
fn replace_brs(doc: &mut Document) {
    for br in doc.elements_by_tag(doc.root(), "br") {
        // Already removed as part of an earlier chain.
        if doc.parent(br).is_none() {
            continue;
        }

        let mut replaced = false;
        let mut next = next_significant_node(doc, doc.next_sibling(br));
        while let Some(node) = next.filter(|&node| doc.is_tag(node, "br")) {
            replaced = true;
            let following = doc.next_sibling(node);
            doc.detach(node);
            next = next_significant_node(doc, following);
        }

        if !replaced {
            continue;
        }

        let p = doc.create_element("p");
        doc.replace_with(br, p);

        let mut next = doc.next_sibling(p);
        while let Some(node) = next {
            // Another <br><br> ends this paragraph.
            if doc.is_tag(node, "br") {
                let after = next_significant_node(doc, doc.next_sibling(node));
                if after.is_some_and(|after| doc.is_tag(after, "br")) {
                    break;
                }
            }

            if !is_phrasing_content(doc, node) {
                break;
            }

            let sibling = doc.next_sibling(node);
            doc.append_child(p, node);
            next = sibling;
        }

        while let Some(last) = doc.last_child(p).filter(|&last| is_whitespace(doc, last)) {
            doc.detach(last);
        }

        if let Some(parent) = doc.parent(p).filter(|&parent| doc.is_tag(parent, "p")) {
            doc.set_tag_name(parent, "div");
        }
    }
}

/// Final touches on the extracted article: absolute URIs and class stripping.
pub fn clean_article_content(
    doc: &mut Document,
    article: NodeId,
    page_url: Option<&Url>,
    options: &ReadabilityOptions,
) {
    fix_relative_uris(doc, article, page_url);

    if !options.keep_classes {
        clean_classes(doc, article, &options.classes_to_preserve);
    }
}

/// Resolve `<a href>` and `<img src>` against the document base, and replace
/// `javascript:` links with their text.
fn fix_relative_uris(doc: &mut Document, article: NodeId, page_url: Option<&Url>) {
    let base = page_url.map(|page| {
        doc.elements_by_tag(doc.root(), "base")
            .into_iter()
            .find_map(|base| doc.attr(base, "href"))
            .map(str::trim)
            .filter(|href| !href.is_empty())
            .and_then(|href| page.join(href).ok())
            .unwrap_or_else(|| page.clone())
    });

    for link in doc.elements_by_tag(article, "a") {
        let Some(href) = doc.attr(link, "href").map(str::to_string) else {
            continue;
        };

        if href.trim_start().starts_with("javascript:") {
            let text = doc.text(link);
            let replacement = doc.create_text(&text);
            doc.replace_with(link, replacement);
        } else if let Some(absolute) = base.as_ref().and_then(|base| to_absolute_uri(base, &href)) {
            doc.set_attr(link, "href", &absolute);
        }
    }

    if let Some(base) = &base {
        for img in doc.elements_by_tag(article, "img") {
            let absolute = doc
                .attr(img, "src")
                .and_then(|src| to_absolute_uri(base, src));
            if let Some(absolute) = absolute {
                doc.set_attr(img, "src", &absolute);
            }
        }
    }
}

fn to_absolute_uri(base: &Url, uri: &str) -> Option<String> {
    let uri = uri.trim();
    if uri.is_empty() || uri.starts_with('#') {
        return None;
    }
    base.join(uri).ok().map(String::from)
}

/// Keep only preserved class names; drop the attribute when nothing is left.
fn clean_classes(doc: &mut Document, article: NodeId, preserve: &[String]) {
    let mut nodes = vec![article];
    nodes.extend(doc.find_all(article, |_| true));

    for node in nodes {
        let Some(class) = doc.attr(node, "class") else {
            continue;
        };

        let kept: Vec<&str> = class
            .split_whitespace()
            .filter(|name| *name == CLASS_TO_PRESERVE || preserve.iter().any(|keep| keep == name))
            .collect();

        if kept.is_empty() {
            doc.remove_attr(node, "class");
        } else {
            let kept = kept.join(" ");
            doc.set_attr(node, "class", &kept);
        }
    }
}

/// Plain text of the first `<p>` with content, used as a fallback excerpt.
pub fn first_paragraph_text(doc: &Document, article: NodeId) -> Option<String> {
    doc.elements_by_tag(article, "p")
        .into_iter()
        .map(|p| get_inner_text(doc, p, false))
        .find(|text| !text.is_empty())
}
