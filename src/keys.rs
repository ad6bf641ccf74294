//! URL <-> storage key codec.
//!
//! `page_key` names a saved page at crawl time; `match_fragment` derives a
//! permissive substring pattern from an href at extraction time. The contract
//! between the two is loose on purpose: a fragment pattern finds pages by
//! partial correspondence, which tolerates the mix of relative and absolute
//! href forms a real site emits. A fragment that matches nothing is treated
//! as "no page", never an error.

/// Extension appended to every storage key.
pub const KEY_EXT: &str = ".html";

/// Derive the storage key a crawled URL is saved under.
///
/// Deterministic and pure: strip the scheme, flatten `/` to `_`, trim
/// trailing separators, append the key extension.
pub fn page_key(url: &str) -> String {
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .unwrap_or(url);
    let flat = rest.replace('/', "_");
    format!("{}{}", flat.trim_end_matches('_'), KEY_EXT)
}

/// Derive a substring pattern from an href or URL fragment.
///
/// Applies the same flattening as [`page_key`] but drops the extension and
/// additionally strips `index.html` and any leading `../` segments, so that
/// relative listing hrefs still land inside the keys produced at crawl time.
pub fn match_fragment(href: &str) -> String {
    let mut rest = href
        .strip_prefix("https://")
        .or_else(|| href.strip_prefix("http://"))
        .unwrap_or(href);
    while let Some(stripped) = rest.strip_prefix("../") {
        rest = stripped;
    }
    let rest = rest.strip_suffix("index.html").unwrap_or(rest);
    rest.replace('/', "_").trim_matches('_').to_string()
}

/// Variant of a listing pattern with the `category_` naming convention
/// removed. Listing pages are sometimes stored under a `product-category`
/// path that the nav href does not carry; stripping the prefix lets the
/// substring match recover them.
pub fn strip_category_prefix(pattern: &str) -> Option<String> {
    pattern
        .strip_prefix("category_")
        .map(|rest| rest.to_string())
}

/// Suffix-anchored pattern for resolving a product href to its exact page.
///
/// Stricter than [`match_fragment`]: the caller matches this against the
/// *end* of stored keys, so two products whose slugs share a prefix do not
/// collide.
pub fn product_key_suffix(href: &str) -> String {
    format!("{}{}", match_fragment(href), KEY_EXT)
}

// ── Tests ──
