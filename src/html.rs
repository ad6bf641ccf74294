//! DOM helpers over stored page HTML.

use scraper::{Html, Node, Selector};

/// Every `href` value on the page, in document order.
pub fn anchor_hrefs(html: &str) -> Vec<String> {
    anchors(html).into_iter().map(|(href, _)| href).collect()
}

/// `(href, visible text)` for every anchor carrying an href.
pub fn anchors(html: &str) -> Vec<(String, String)> {
    let doc = Html::parse_document(html);
    let sel = Selector::parse("a[href]").unwrap();
    doc.select(&sel)
        .filter_map(|a| {
            let href = a.value().attr("href")?;
            let text = a.text().collect::<Vec<_>>().join(" ");
            Some((href.to_string(), text))
        })
        .collect()
}

/// Visible text of the first element matching `selector`, or `None` if the
/// selector matches nothing. Script and style subtrees inside the element
/// are dropped; whitespace collapses to single spaces.
pub fn select_first_text(html: &str, selector: &Selector) -> Option<String> {
    let doc = Html::parse_document(html);
    let element = doc.select(selector).next()?;

    let mut out = String::new();
    for node in element.descendants() {
        if let Node::Text(text) = node.value() {
            let hidden = node.ancestors().any(|a| match a.value() {
                Node::Element(e) => matches!(e.name(), "script" | "style"),
                _ => false,
            });
            if !hidden {
                out.push_str(text);
                out.push(' ');
            }
        }
    }
    Some(collapse_ws(&out))
}

fn collapse_ws(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

// ── Tests ──
