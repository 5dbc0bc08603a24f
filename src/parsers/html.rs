use crate::parsers::text;
use scraper::node::Node;
use scraper::{Html, Selector};
use std::sync::LazyLock;

static ANCHOR_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("valid anchor selector"));

/// Elements that never hold brochure-worthy text
const NON_CONTENT_ELEMENTS: &[&str] = &[
    "script", "style", "noscript", "iframe", "header", "footer", "nav", "aside", "form", "button",
    "input", "select", "textarea",
];

/// Containers whose anchors are not real navigation
const NON_NAVIGATION_ELEMENTS: &[&str] = &["script", "style", "noscript", "iframe", "template"];

/// Link schemes that never lead to a page
const SKIPPED_SCHEMES: &[&str] = &["mailto:", "tel:", "javascript:"];

/// Extracts readable text from an HTML page.
///
/// Non-content elements are dropped, each remaining text run becomes a
/// line, blank lines disappear and a line identical to the previous
/// emitted line is skipped.
pub fn clean(html: &str) -> String {
    let doc = Html::parse_document(html);
    let raw = collect_text(&doc, NON_CONTENT_ELEMENTS, "\n");
    let cleaned = text::collapse_lines(&raw);

    ::log::debug!("Cleaned text: {} characters", cleaned.chars().count());
    cleaned
}

/// Extracts the `href` of every anchor that can lead to another page.
///
/// Empty targets, bare fragments and `mailto:`/`tel:`/`javascript:` links
/// are skipped. The returned links are raw (possibly relative).
pub fn extract_links(html: &str) -> Vec<String> {
    let doc = Html::parse_document(html);

    let links = doc
        .select(&ANCHOR_SELECTOR)
        .filter(|anchor| {
            !anchor.ancestors().any(|node| {
                matches!(node.value(), Node::Element(e) if NON_NAVIGATION_ELEMENTS.contains(&e.name()))
            })
        })
        .filter_map(|anchor| anchor.value().attr("href"))
        .map(str::trim)
        .filter(|href| is_followable(href))
        .map(str::to_string)
        .collect::<Vec<String>>();

    ::log::debug!("Extracted {} links from HTML", links.len());
    links
}

fn is_followable(href: &str) -> bool {
    if href.is_empty() || href.starts_with('#') {
        return false;
    }
    let lower = href.to_ascii_lowercase();
    !SKIPPED_SCHEMES
        .iter()
        .any(|scheme| lower.starts_with(scheme))
}

/// Concatenates every text node of `doc` that is not inside one of `skip`,
/// joining runs with `separator`.
pub(crate) fn collect_text(doc: &Html, skip: &[&str], separator: &str) -> String {
    let mut runs: Vec<&str> = Vec::new();

    for node in doc.tree.root().descendants() {
        let Node::Text(run) = node.value() else {
            continue;
        };

        let hidden = node.ancestors().any(|ancestor| {
            matches!(ancestor.value(), Node::Element(e) if skip.contains(&e.name()))
        });
        if !hidden {
            runs.push(&**run);
        }
    }

    runs.join(separator)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_links_skips_non_navigation() {
        let html = r##"
            <html><body>
              <a href="/about">About</a>
              <a href="">Empty</a>
              <a href="   ">Blank</a>
              <a href="#top">Top</a>
              <a href="mailto:hi@e.com">Mail</a>
              <a href="TEL:+34123">Call</a>
              <a href="javascript:void(0)">Menu</a>
              <a href="https://e.com/careers">Jobs</a>
              <a name="anchor-only">No href</a>
              <a href=" contact ">Contact</a>
            </body></html>
        "##;
        let links = extract_links(html);
        assert_eq!(links, vec!["/about", "https://e.com/careers", "contact"]);
    }

    #[test]
    fn test_collect_text_skips_elements() {
        let doc = Html::parse_document(
            "<html><body><p>Keep</p><script>var x = 1;</script><nav>Menu</nav></body></html>",
        );
        let text = collect_text(&doc, &["script"], "|");
        assert!(text.contains("Keep"));
        assert!(text.contains("Menu"));
        assert!(!text.contains("var x"));
    }
}
