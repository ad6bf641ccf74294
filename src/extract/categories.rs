//! Category discovery from the homepage navigation.

use std::collections::HashSet;

use crate::config::SiteConfig;
use crate::error::ScrapeError;
use crate::html;
use crate::keys;
use crate::store::{Manifest, PageStore};

/// Substrings that mark an anchor as pointing at a category page.
const CATEGORY_MARKERS: &[&str] = &["/category/", "product-category"];

/// A category as discovered from the homepage nav. `name` is normalized
/// display text; `href` is the raw anchor value, kept verbatim because it
/// seeds the listing pattern match later.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Category {
    pub name: String,
    pub href: String,
}

/// Scan the stored homepage for category links.
///
/// Deduplication is by the `(name, href)` pair: the same display name under
/// two hrefs yields two categories, since each href can resolve to a
/// different set of listing pages. A missing homepage is fatal — nothing
/// downstream can run without it.
pub fn resolve(
    config: &SiteConfig,
    store: &PageStore,
    manifest: &Manifest,
) -> Result<Vec<Category>, ScrapeError> {
    let homepage = config.homepage_url();
    let key = manifest
        .key_for(&homepage)
        .map(str::to_string)
        .unwrap_or_else(|| keys::page_key(&homepage));
    let html = store.load(&key)?;

    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for (href, text) in html::anchors(&html) {
        if !CATEGORY_MARKERS.iter().any(|m| href.contains(m)) {
            continue;
        }
        let name = crate::normalize::normalize(&text);
        if name.is_empty() {
            continue;
        }
        let pair = (name.clone(), href.clone());
        if seen.insert(pair) {
            out.push(Category { name, href });
        }
    }
    Ok(out)
}

// ── Tests ──
