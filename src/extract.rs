use scraper::{ElementRef, Html};
use ego_tree::NodeRef;
use scraper::node::Node;

use crate::report::{HeadingStructure, TagCounts};

/// Tags whose subtrees carry no textual content and would corrupt word
/// counts downstream.
const NON_CONTENT_TAGS: [&str; 3] = ["script", "style", "noscript"];

#[derive(Debug)]
pub struct Extraction {
    pub content: String,
    pub tag_counts: Option<TagCounts>,
}

/// Flatten a document into whitespace-normalized text, optionally counting
/// structural tags. script/style/noscript subtrees are dropped before text
/// extraction; the tag counts are taken against the tags that remain.
pub fn extract(raw_markup: &str, want_tag_counts: bool) -> Extraction {
    let document = Html::parse_document(raw_markup);

    let mut text = String::new();
    collect_text(document.tree.root(), &mut text);

    let tag_counts = want_tag_counts.then(|| count_tags(&document));

    Extraction {
        content: normalize_whitespace(&text),
        tag_counts,
    }
}

/// Walk h1/h2/h3 elements in document order, trimming each heading's text
/// and dropping empty headings.
pub fn extract_headings(raw_markup: &str) -> HeadingStructure {
    let document = Html::parse_document(raw_markup);
    let mut headings = HeadingStructure::default();

    for node in document.root_element().descendants() {
        let Some(element) = ElementRef::wrap(node) else {
            continue;
        };
        let level = match element.value().name() {
            "h1" => &mut headings.h1,
            "h2" => &mut headings.h2,
            "h3" => &mut headings.h3,
            _ => continue,
        };

        let text = normalize_whitespace(&element.text().collect::<Vec<_>>().join(" "));
        if !text.is_empty() {
            level.push(text);
        }
    }

    headings
}

fn collect_text(node: NodeRef<'_, Node>, out: &mut String) {
    match node.value() {
        Node::Element(element) if NON_CONTENT_TAGS.contains(&element.name()) => return,
        Node::Text(text) => {
            out.push(' ');
            out.push_str(&text.text);
        }
        _ => {}
    }

    for child in node.children() {
        collect_text(child, out);
    }
}

fn count_tags(document: &Html) -> TagCounts {
    let mut counts = TagCounts::default();
    for node in document.tree.nodes() {
        let Node::Element(element) = node.value() else {
            continue;
        };
        match element.name() {
            "h1" => counts.h1 += 1,
            "h2" => counts.h2 += 1,
            "p" => counts.p += 1,
            "div" => counts.div += 1,
            "span" => counts.span += 1,
            _ => {}
        }
    }
    counts
}

/// Collapse whitespace runs to single spaces and trim the ends.
fn normalize_whitespace(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}
