//! Listing resolution: category href -> product links.

use std::collections::HashSet;

use scraper::{Html, Selector};
use tracing::debug;

use crate::error::ScrapeError;
use crate::keys;
use crate::store::PageStore;

/// Containers that identify one product card on a listing page.
const CARD_SELECTOR: &str = "li.product, div.product, article.product";

/// Find every product link a category's listing pages contain.
///
/// The category href becomes a substring pattern over stored keys; if that
/// matches nothing, a `category_`-stripped variant is tried, which recovers
/// listings stored under a `product-category` naming convention. Each card
/// contributes its identifier attribute and first anchor href; the result is
/// deduplicated across all matched pages. Zero matches is an empty result,
/// not an error.
pub fn product_links(
    store: &PageStore,
    category_href: &str,
) -> Result<Vec<(String, String)>, ScrapeError> {
    let pattern = keys::match_fragment(category_href);
    let mut matched = store.find_by_pattern(&pattern)?;
    if matched.is_empty() {
        if let Some(fallback) = keys::strip_category_prefix(&pattern) {
            debug!("no keys match {:?}, retrying with {:?}", pattern, fallback);
            matched = store.find_by_pattern(&fallback)?;
        }
    }

    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for key in matched {
        let html = match store.load(&key) {
            Ok(html) => html,
            Err(_) => continue,
        };
        for pair in product_cards(&html) {
            if seen.insert(pair.clone()) {
                out.push(pair);
            }
        }
    }
    Ok(out)
}

/// `(identifier, href)` for each product card on one listing page. Cards
/// without an anchor are skipped; cards without an id attribute fall back to
/// the href as identifier.
fn product_cards(html: &str) -> Vec<(String, String)> {
    let doc = Html::parse_document(html);
    let card_sel = Selector::parse(CARD_SELECTOR).unwrap();
    let anchor_sel = Selector::parse("a[href]").unwrap();

    let mut out = Vec::new();
    for card in doc.select(&card_sel) {
        let Some(anchor) = card.select(&anchor_sel).next() else {
            continue;
        };
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let id = card
            .value()
            .attr("id")
            .or_else(|| card.value().attr("data-product-id"))
            .unwrap_or(href);
        out.push((id.to_string(), href.to_string()));
    }
    out
}

// ── Tests ──
