//! Product detail extraction: price and description from stored pages.

use scraper::Selector;
use tracing::warn;

use crate::config::SiteConfig;
use crate::error::ScrapeError;
use crate::html;
use crate::keys;
use crate::normalize::normalize;
use crate::store::{Manifest, PageStore};

/// One extracted product. `title` is a cleaned form of the product link.
#[derive(Debug, Clone)]
pub struct ProductRecord {
    pub category: String,
    pub title: String,
    pub price: f64,
    pub description: String,
}

/// Marker class carried by the price element.
const PRICE_SELECTOR: &str = r#"[class*="price"]"#;

/// Containers tried, in order, for the main description text.
const CONTENT_SELECTORS: &[&str] = &["main", "article", "#content", ".entry-content", ".content"];

/// Build the full record for one product link within a category.
pub fn extract(
    config: &SiteConfig,
    store: &PageStore,
    manifest: &Manifest,
    category: &str,
    href: &str,
) -> ProductRecord {
    ProductRecord {
        category: category.to_string(),
        title: title_from_link(href),
        price: price(store, href),
        description: description(config, store, manifest, href),
    }
}

/// Derive a display title from a product href: last path segment, separators
/// to spaces, normalized.
pub fn title_from_link(href: &str) -> String {
    let trimmed = href
        .trim_end_matches('/')
        .trim_end_matches("index.html")
        .trim_end_matches('/');
    let slug = trimmed.rsplit('/').next().unwrap_or(trimmed);
    normalize(&slug.replace(['-', '_'], " "))
}

/// Look up the product's page by suffix-anchored key match and read its
/// price. Ambiguity is logged and resolved to the first key in sorted
/// order; a missing page or unparsable price yields zero.
pub fn price(store: &PageStore, href: &str) -> f64 {
    let suffix = keys::product_key_suffix(href);
    let candidates: Vec<String> = match store.keys() {
        Ok(keys) => keys.into_iter().filter(|k| k.ends_with(&suffix)).collect(),
        Err(_) => return 0.0,
    };
    let Some(key) = candidates.first() else {
        return 0.0;
    };
    if candidates.len() > 1 {
        let ambiguous = ScrapeError::AmbiguousMatch {
            pattern: suffix.clone(),
            count: candidates.len(),
        };
        warn!("{}; using {}", ambiguous, key);
    }
    let Ok(page) = store.load(key) else {
        return 0.0;
    };
    let sel = Selector::parse(PRICE_SELECTOR).unwrap();
    match html::select_first_text(&page, &sel) {
        Some(text) => clean_price(&text),
        None => 0.0,
    }
}

/// Strip a scraped price down to its numeric value. Everything that is not
/// a digit or decimal point is dropped; an empty or non-numeric remainder
/// normalizes to zero rather than erroring.
pub fn clean_price(raw: &str) -> f64 {
    let digits: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    digits.parse::<f64>().unwrap_or(0.0)
}

/// Render a price the way the reports carry it: whole values without a
/// fractional part.
pub fn format_price(price: f64) -> String {
    if price.fract() == 0.0 {
        format!("{}", price as i64)
    } else {
        format!("{}", price)
    }
}

/// Load the product's description text. The href is rewritten into the
/// canonical page URL (drop `index.html`, remap `../..` onto the downloads
/// root, prefix the origin), resolved through the manifest when possible,
/// and the first content container's visible text is returned. Any miss
/// yields an empty string; this never errors.
pub fn description(
    config: &SiteConfig,
    store: &PageStore,
    manifest: &Manifest,
    href: &str,
) -> String {
    let url = canonical_product_url(config, href);
    let key = manifest
        .key_for(&url)
        .map(str::to_string)
        .unwrap_or_else(|| keys::page_key(&url));
    let Ok(page) = store.load(&key) else {
        return String::new();
    };
    for selector in CONTENT_SELECTORS {
        let sel = Selector::parse(selector).unwrap();
        if let Some(text) = html::select_first_text(&page, &sel) {
            return text;
        }
    }
    String::new()
}

fn canonical_product_url(config: &SiteConfig, href: &str) -> String {
    let trimmed = href.trim();
    let trimmed = trimmed.strip_suffix("index.html").unwrap_or(trimmed);
    if let Some(rest) = trimmed.strip_prefix("../..") {
        return format!("{}{}", config.downloads_root(), rest);
    }
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        return trimmed.to_string();
    }
    if let Some(rest) = trimmed.strip_prefix('/') {
        return format!("{}/{}", config.origin_trimmed(), rest);
    }
    format!("{}/{}", config.origin_trimmed(), trimmed)
}

// ── Tests ──
