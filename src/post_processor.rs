//! Second-pass cleanup of the assembled article.
//!
//! [`prep_article`] strips presentational attributes, drops junk elements and
//! anything that looks "fishy" for its size, and collapses degenerate markup
//! such as single-cell layout tables. Tables that look like real tabular data
//! are marked first so the conditional pass leaves them alone.

use crate::constants::{
    DATA_TABLE_DESCENDANTS, DEPRECATED_SIZE_ATTRIBUTE_ELEMS, EMBEDDED_ELEMS,
    PARAGRAPH_MEDIA_TAGS, PRESENTATIONAL_ATTRIBUTES, REGEXPS,
};
use crate::dom::{Document, NodeId};
use crate::dom_utils::{
    get_inner_text, get_link_density, get_next_node, has_ancestor_tag,
    has_single_tag_inside_element, is_phrasing_content, match_string, next_significant_node,
    remove_and_get_next,
};
use crate::scoring::{get_class_weight, Flags, ScoreTable};
use crate::utils::{char_len, comma_count};
use std::collections::HashSet;

/// Everything the sanitizer needs to know about the current attempt.
pub struct CleanContext<'a> {
    pub scores: &'a ScoreTable,
    pub flags: Flags,
    pub title: &'a str,
    pub debug: bool,
}

/// Clean the article subtree rooted at `article` in place.
pub fn prep_article(doc: &mut Document, article: NodeId, ctx: &CleanContext<'_>) {
    clean_styles(doc, article);

    let data_tables = mark_data_tables(doc, article);

    clean_conditionally(doc, article, "form", &data_tables, ctx);
    clean_conditionally(doc, article, "fieldset", &data_tables, ctx);
    for tag in ["object", "embed", "h1", "footer", "link", "aside"] {
        clean(doc, article, tag);
    }

    // The article root itself is exempt even when its class mentions sharing.
    for child in doc.element_children(article) {
        clean_matched_nodes(doc, child);
    }

    remove_title_duplicate_h2(doc, article, ctx);

    for tag in ["iframe", "input", "textarea", "select", "button"] {
        clean(doc, article, tag);
    }
    clean_headers(doc, article, ctx);

    for tag in ["table", "ul", "div"] {
        clean_conditionally(doc, article, tag, &data_tables, ctx);
    }

    remove_empty_paragraphs(doc, article);
    remove_brs_before_paragraphs(doc, article);
    flatten_single_cell_tables(doc, article);
}

/// Drop `style` and presentational attributes, leaving `<svg>` subtrees untouched.
fn clean_styles(doc: &mut Document, id: NodeId) {
    let Some(tag) = doc.tag_name(id).map(str::to_string) else {
        return;
    };
    if tag == "svg" {
        return;
    }

    for attr in PRESENTATIONAL_ATTRIBUTES {
        doc.remove_attr(id, attr);
    }
    if DEPRECATED_SIZE_ATTRIBUTE_ELEMS.contains(&tag.as_str()) {
        doc.remove_attr(id, "width");
        doc.remove_attr(id, "height");
    }

    for child in doc.element_children(id) {
        clean_styles(doc, child);
    }
}

/// Tables under `article` that present tabular data rather than layout.
fn mark_data_tables(doc: &Document, article: NodeId) -> HashSet<NodeId> {
    doc.elements_by_tag(article, "table")
        .into_iter()
        .filter(|&table| is_data_table(doc, table))
        .collect()
}

fn is_data_table(doc: &Document, table: NodeId) -> bool {
    if doc.attr(table, "role") == Some("presentation") || doc.attr(table, "datatable") == Some("0")
    {
        return false;
    }
    if doc.has_attr(table, "summary") {
        return true;
    }

    let has_caption = doc
        .elements_by_tag(table, "caption")
        .first()
        .is_some_and(|&caption| !doc.children(caption).is_empty());
    if has_caption {
        return true;
    }

    let has_data_descendant = doc
        .find_all(table, |element| DATA_TABLE_DESCENDANTS.contains(&element.name()))
        .first()
        .is_some();
    if has_data_descendant || !doc.elements_by_tag(table, "table").is_empty() {
        return true;
    }

    let (rows, columns) = get_row_and_column_count(doc, table);
    if rows >= 10 || columns > 4 {
        return true;
    }
    rows * columns > 10
}

fn span_attr(doc: &Document, id: NodeId, name: &str) -> usize {
    doc.attr(id, name)
        .and_then(|value| value.trim().parse::<usize>().ok())
        .filter(|&span| span > 0)
        .unwrap_or(1)
}

/// Rows counted with `rowspan`, columns as the widest row counted with `colspan`.
fn get_row_and_column_count(doc: &Document, table: NodeId) -> (usize, usize) {
    let mut rows = 0;
    let mut columns = 0;

    for tr in doc.elements_by_tag(table, "tr") {
        rows += span_attr(doc, tr, "rowspan");

        let columns_in_row: usize = doc
            .elements_by_tag(tr, "td")
            .into_iter()
            .map(|cell| span_attr(doc, cell, "colspan"))
            .sum();
        columns = columns.max(columns_in_row);
    }

    (rows, columns)
}

fn is_video_embed(doc: &Document, id: NodeId) -> bool {
    let attribute_values = doc
        .attrs(id)
        .iter()
        .map(|(_, value)| value.as_str())
        .collect::<Vec<_>>()
        .join("|");

    REGEXPS.videos.is_match(&attribute_values) || REGEXPS.videos.is_match(&doc.inner_html(id))
}

/// Remove every `tag` element under `article`, sparing embedded videos.
fn clean(doc: &mut Document, article: NodeId, tag: &str) {
    let is_embed = EMBEDDED_ELEMS.contains(&tag);

    for node in doc.elements_by_tag(article, tag) {
        if !doc.contains(article, node) {
            continue;
        }
        if is_embed && is_video_embed(doc, node) {
            continue;
        }
        doc.detach(node);
    }
}

/// Remove descendants of `root` whose class/id mentions sharing widgets.
fn clean_matched_nodes(doc: &mut Document, root: NodeId) {
    let end = get_next_node(doc, root, true);
    let mut next = get_next_node(doc, root, false);

    while let Some(node) = next {
        if Some(node) == end || !doc.contains(root, node) {
            break;
        }
        if REGEXPS.share_elements.is_match(&match_string(doc, node)) {
            next = remove_and_get_next(doc, node);
        } else {
            next = get_next_node(doc, node, false);
        }
    }
}

/// A lone `<h2>` that restates the title is dropped.
fn remove_title_duplicate_h2(doc: &mut Document, article: NodeId, ctx: &CleanContext<'_>) {
    let headings = doc.elements_by_tag(article, "h2");
    let [heading] = headings.as_slice() else {
        return;
    };

    let title_length = char_len(ctx.title);
    if title_length == 0 {
        return;
    }

    let heading_text = doc.text(*heading);
    let similarity = (char_len(&heading_text) as f64 - title_length as f64) / title_length as f64;
    if similarity.abs() >= 0.5 {
        return;
    }

    let titles_match = if similarity > 0.0 {
        heading_text.contains(ctx.title)
    } else {
        ctx.title.contains(heading_text.as_str())
    };
    if titles_match {
        log_debug!(ctx.debug, "removing h2 that duplicates the title");
        doc.detach(*heading);
    }
}

fn clean_headers(doc: &mut Document, article: NodeId, ctx: &CleanContext<'_>) {
    for tag in ["h1", "h2"] {
        for heading in doc.elements_by_tag(article, tag) {
            if get_class_weight(doc, heading, ctx.flags) < 0.0 {
                log_debug!(ctx.debug, "removing header with low class weight: {}", match_string(doc, heading));
                doc.detach(heading);
            }
        }
    }
}

/// Remove `tag` elements that look like boilerplate for their size.
fn clean_conditionally(
    doc: &mut Document,
    article: NodeId,
    tag: &str,
    data_tables: &HashSet<NodeId>,
    ctx: &CleanContext<'_>,
) {
    if !ctx.flags.contains(Flags::CLEAN_CONDITIONALLY) {
        return;
    }

    let is_list = tag == "ul" || tag == "ol";

    // Deepest first, so removing a node never invalidates a pending one.
    for node in doc.elements_by_tag(article, tag).into_iter().rev() {
        if !doc.contains(article, node) {
            continue;
        }
        if data_tables.contains(&node)
            || has_ancestor_tag(doc, node, "table", None, |table| data_tables.contains(&table))
        {
            continue;
        }

        if is_fishy(doc, node, is_list, ctx) {
            log_debug!(ctx.debug, "cleaning conditionally: <{}> {}", tag, match_string(doc, node));
            doc.detach(node);
        }
    }
}

fn is_fishy(doc: &Document, node: NodeId, is_list: bool, ctx: &CleanContext<'_>) -> bool {
    let score = ctx.scores.score(node) + get_class_weight(doc, node, ctx.flags);
    if score < 0.0 {
        return true;
    }

    let text = get_inner_text(doc, node, true);
    if comma_count(&text) >= 10 {
        return false;
    }

    let paragraphs = doc.elements_by_tag(node, "p").len();
    let images = doc.elements_by_tag(node, "img").len();
    let list_items = doc.elements_by_tag(node, "li").len();
    let inputs = doc.elements_by_tag(node, "input").len();
    let videos = doc
        .find_all(node, |element| EMBEDDED_ELEMS.contains(&element.name()))
        .into_iter()
        .filter(|&embed| is_video_embed(doc, embed))
        .count();

    let link_density = get_link_density(doc, node);
    let content_length = char_len(&text);

    (images > 1
        && (paragraphs as f64 / images as f64) < 0.5
        && !has_ancestor_tag(doc, node, "figure", Some(3), |_| true))
        || (!is_list && list_items > paragraphs)
        || inputs > paragraphs / 3
        || (!is_list && content_length < 25 && (images == 0 || images > 2))
        || (!is_list && score < 25.0 && link_density > 0.2)
        || (score >= 25.0 && link_density > 0.5)
        || (videos == 1 && content_length < 75)
        || videos > 1
}

fn remove_empty_paragraphs(doc: &mut Document, article: NodeId) {
    for p in doc.elements_by_tag(article, "p") {
        let has_media = doc
            .find_all(p, |element| PARAGRAPH_MEDIA_TAGS.contains(&element.name()))
            .first()
            .is_some();
        if !has_media && doc.text(p).trim().is_empty() {
            doc.detach(p);
        }
    }
}

fn remove_brs_before_paragraphs(doc: &mut Document, article: NodeId) {
    for br in doc.elements_by_tag(article, "br") {
        let next = next_significant_node(doc, doc.next_sibling(br));
        if next.is_some_and(|next| doc.is_tag(next, "p")) {
            doc.detach(br);
        }
    }
}

/// Replace `table > tbody > tr > td` chains holding a single cell with that cell.
fn flatten_single_cell_tables(doc: &mut Document, article: NodeId) {
    for table in doc.elements_by_tag(article, "table") {
        if !doc.contains(article, table) {
            continue;
        }

        let body = if has_single_tag_inside_element(doc, table, "tbody") {
            doc.element_children(table)[0]
        } else {
            table
        };
        if !has_single_tag_inside_element(doc, body, "tr") {
            continue;
        }

        let row = doc.element_children(body)[0];
        if !has_single_tag_inside_element(doc, row, "td") {
            continue;
        }

        let cell = doc.element_children(row)[0];
        let all_phrasing = doc
            .children(cell)
            .iter()
            .all(|&child| is_phrasing_content(doc, child));
        doc.set_tag_name(cell, if all_phrasing { "p" } else { "div" });
        doc.replace_with(table, cell);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(doc: &Document) -> NodeId {
        doc.elements_by_tag(doc.root(), "article")[0]
    }

    fn prep(html: &str, flags: Flags, title: &str) -> String {
        let mut doc = Document::parse(html);
        let article = article(&doc);
        let scores = ScoreTable::default();
        let ctx = CleanContext {
            scores: &scores,
            flags,
            title,
            debug: false,
        };
        prep_article(&mut doc, article, &ctx);
        doc.inner_html(article)
    }

    fn fishy(html: &str, is_list: bool, score: f64) -> bool {
        let doc = Document::parse(html);
        let node = doc.find_all(doc.root(), |element| element.attr("id") == Some("n"))[0];
        let mut scores = ScoreTable::default();
        scores.set(node, score);
        let ctx = CleanContext {
            scores: &scores,
            flags: Flags::all(),
            title: "",
            debug: false,
        };
        is_fishy(&doc, node, is_list, &ctx)
    }

    const PROSE: &str = "Readers came for the story, stayed for the detail, and left with a better sense of the town, its people, its history, its food, its weather, its politics, and its hopes.";

    #[test]
    fn strips_presentational_attributes_outside_svg() {
        let html = "<body><article><table width=\"10\" border=\"1\"><tr><td style=\"x\">a</td><td>b</td></tr></table><svg style=\"s\"><rect width=\"3\"></rect></svg></article></body>";
        let mut doc = Document::parse(html);
        let article = article(&doc);
        clean_styles(&mut doc, article);
        assert_eq!(
            doc.inner_html(article),
            "<table><tbody><tr><td>a</td><td>b</td></tr></tbody></table><svg style=\"s\"><rect width=\"3\"></rect></svg>"
        );
    }

    #[test]
    fn detects_data_tables() {
        let html = "<body><article>\
            <table id=\"a\" summary=\"s\"><tr><td>x</td></tr></table>\
            <table id=\"b\" role=\"presentation\" summary=\"s\"><tr><td>x</td></tr></table>\
            <table id=\"c\"><thead><tr><td>x</td></tr></thead></table>\
            <table id=\"d\"><tr><td>1</td><td>2</td><td>3</td><td>4</td><td>5</td></tr></table>\
            <table id=\"e\"><tr><td>1</td><td>2</td></tr></table>\
            </article></body>";
        let doc = Document::parse(html);
        let data = mark_data_tables(&doc, article(&doc));
        let ids: Vec<_> = doc
            .elements_by_tag(doc.root(), "table")
            .into_iter()
            .filter(|table| data.contains(table))
            .filter_map(|table| doc.attr(table, "id"))
            .collect();
        assert_eq!(ids, vec!["a", "c", "d"]);
    }

    #[test]
    fn row_and_column_counts_honor_spans() {
        let doc = Document::parse(
            "<body><table><tr rowspan=\"2\"><td colspan=\"3\">a</td><td>b</td></tr><tr><td>c</td></tr></table></body>",
        );
        let table = doc.elements_by_tag(doc.root(), "table")[0];
        assert_eq!(get_row_and_column_count(&doc, table), (3, 4));
    }

    #[test]
    fn removes_junk_tags_but_keeps_video_embeds() {
        let html = "<body><article><p>Text</p><aside>side</aside><footer>foot</footer>\
            <iframe src=\"https://www.youtube.com/embed/x\"></iframe><iframe src=\"https://ads.example.com\"></iframe>\
            <button>Buy</button></article></body>";
        let out = prep(html, Flags::all() - Flags::CLEAN_CONDITIONALLY, "");
        assert_eq!(
            out,
            "<p>Text</p><iframe src=\"https://www.youtube.com/embed/x\"></iframe>"
        );
    }

    #[test]
    fn removes_share_widgets_below_top_level() {
        let html = format!(
            "<body><article><div class=\"share-top\"><p>{PROSE}</p><div class=\"share-buttons\">Share</div></div></article></body>"
        );
        let out = prep(&html, Flags::all() - Flags::CLEAN_CONDITIONALLY, "");
        assert_eq!(out, format!("<div class=\"share-top\"><p>{PROSE}</p></div>"));
    }

    #[test]
    fn removes_h2_that_repeats_title() {
        let html = "<body><article><h2>Breaking News Today</h2><p>Body</p></article></body>";
        let out = prep(html, Flags::empty(), "Breaking News");
        assert_eq!(out, "<p>Body</p>");

        let unrelated = "<body><article><h2>Background</h2><p>Body</p></article></body>";
        let out = prep(unrelated, Flags::empty(), "Breaking News");
        assert_eq!(out, "<h2>Background</h2><p>Body</p>");
    }

    #[test]
    fn removes_negatively_weighted_headers() {
        let html = "<body><article><h2 class=\"comment-header\">Comments</h2><p>Body</p></article></body>";
        assert_eq!(prep(html, Flags::WEIGHT_CLASSES, ""), "<p>Body</p>");
        assert_eq!(
            prep(html, Flags::empty(), ""),
            "<h2 class=\"comment-header\">Comments</h2><p>Body</p>"
        );
    }

    #[test]
    fn conditionally_removes_link_blocks_and_keeps_prose() {
        let html = format!(
            "<body><article><div><p>{PROSE}</p></div>\
            <div><a href=\"/a\">First related link</a> <a href=\"/b\">Second related link</a></div>\
            <div>tiny</div></article></body>"
        );
        let out = prep(&html, Flags::all(), "");
        assert_eq!(out, format!("<div><p>{PROSE}</p></div>"));

        let kept = prep(&html, Flags::all() - Flags::CLEAN_CONDITIONALLY, "");
        assert!(kept.contains("First related link"));
        assert!(kept.contains("tiny"));
    }

    #[test]
    fn data_tables_survive_conditional_cleaning() {
        let html = "<body><article><table summary=\"scores\"><tr><td>1</td><td>2</td></tr></table>\
            <table><tr><td><a href=\"/x\">nav</a></td><td>y</td></tr></table></article></body>";
        let out = prep(html, Flags::all(), "");
        assert_eq!(
            out,
            "<table summary=\"scores\"><tbody><tr><td>1</td><td>2</td></tr></tbody></table>"
        );
    }

    #[test]
    fn removes_empty_paragraphs_and_brs_before_paragraphs() {
        let html = "<body><article><p> </p><p><img src=\"a.png\"></p>text<br> <p>after</p></article></body>";
        let out = prep(html, Flags::empty(), "");
        assert_eq!(out, "<p><img src=\"a.png\"></p>text <p>after</p>");
    }

    #[test]
    fn single_cell_tables_collapse() {
        let html = "<body><article><table><tbody><tr><td>Hello</td></tr></tbody></table>\
            <table><tr><td><p>Block</p></td></tr></table></article></body>";
        let mut doc = Document::parse(html);
        let article = article(&doc);
        flatten_single_cell_tables(&mut doc, article);
        assert_eq!(doc.inner_html(article), "<p>Hello</p><div><p>Block</p></div>");
    }

    #[test]
    fn single_cell_table_collapses_without_conditional_cleaning() {
        let html = "<body><article><table><tbody><tr><td>Hello</td></tr></tbody></table></article></body>";
        assert_eq!(
            prep(html, Flags::all() - Flags::CLEAN_CONDITIONALLY, ""),
            "<p>Hello</p>"
        );
    }

    #[test]
    fn image_heavy_blocks_are_fishy_outside_figures() {
        let three = format!("<body><div id=\"n\"><p>{PROSE}</p><img><img><img></div></body>");
        assert!(fishy(&three, false, 0.0));

        let two = format!("<body><div id=\"n\"><p>{PROSE}</p><img><img></div></body>");
        assert!(!fishy(&two, false, 0.0));

        let in_figure =
            format!("<body><figure><div id=\"n\"><p>{PROSE}</p><img><img><img></div></figure></body>");
        assert!(!fishy(&in_figure, false, 0.0));
    }

    #[test]
    fn more_list_items_than_paragraphs_is_fishy_outside_lists() {
        let html = format!(
            "<body><div id=\"n\"><p>{PROSE}</p><ul><li>one</li><li>two</li></ul></div></body>"
        );
        assert!(fishy(&html, false, 0.0));
        assert!(!fishy(&html, true, 0.0));
    }

    #[test]
    fn inputs_outnumbering_a_third_of_paragraphs_is_fishy() {
        let paragraphs = format!("<p>{PROSE}</p><p>More words.</p><p>Even more words.</p>");
        let one = format!("<body><div id=\"n\">{paragraphs}<input></div></body>");
        assert!(!fishy(&one, false, 0.0));

        let two = format!("<body><div id=\"n\">{paragraphs}<input><input></div></body>");
        assert!(fishy(&two, false, 0.0));

        let form = format!("<body><div id=\"n\"><p>{PROSE}</p><input></div></body>");
        assert!(fishy(&form, false, 0.0));
    }

    #[test]
    fn video_embeds_with_little_text_are_fishy() {
        let embed = "<iframe src=\"https://www.youtube.com/embed/x\"></iframe>";

        let captioned = format!(
            "<body><div id=\"n\"><p>A short caption for the embedded clip below.</p>{embed}</div></body>"
        );
        assert!(fishy(&captioned, false, 0.0));

        let long = format!("<body><div id=\"n\"><p>{PROSE}</p>{embed}</div></body>");
        assert!(!fishy(&long, false, 0.0));

        let several = format!("<body><div id=\"n\"><p>{PROSE}</p>{embed}{embed}</div></body>");
        assert!(fishy(&several, false, 0.0));
    }

    #[test]
    fn high_scores_still_fall_to_heavy_linking() {
        let heavy = "<body><div id=\"n\"><p>Some words that are not a link at all.</p>\
            <a href=\"/a\">Further reading on the tram extension</a> \
            <a href=\"/b\">Background on the council vote and its history</a></div></body>";
        assert!(fishy(heavy, false, 30.0));

        let light = "<body><div id=\"n\"><p>Some words that are not a link at all.</p>\
            <a href=\"/a\">Further reading</a></div></body>";
        assert!(!fishy(light, false, 30.0));
        assert!(fishy(light, false, 10.0));
    }

    #[test]
    fn nested_tables_mark_their_container_as_data() {
        let html = "<body><article><table id=\"outer\"><tr><td>\
            <table id=\"inner\"><tr><td><a href=\"/x\">nav</a></td><td>y</td></tr></table>\
            </td></tr></table></article></body>";
        let doc = Document::parse(html);
        let data = mark_data_tables(&doc, article(&doc));
        let ids: Vec<_> = data.iter().filter_map(|&table| doc.attr(table, "id")).collect();
        assert_eq!(ids, vec!["outer"]);

        let out = prep(html, Flags::all(), "");
        assert!(out.contains("id=\"inner\""));
        assert!(out.contains("nav"));
    }
}
