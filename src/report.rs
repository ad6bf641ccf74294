//! Per-category aggregation and the derived CSV exports.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::Result;
use tracing::info;

use crate::config::SiteConfig;
use crate::extract::categories::Category;
use crate::extract::products::{format_price, ProductRecord};

/// Aggregated view of one category, recomputed fully each run.
#[derive(Debug, Clone)]
pub struct CategorySummary {
    pub category: String,
    pub item_count: usize,
    pub mean_price: f64,
    pub max_price: f64,
    pub min_price: f64,
    /// All titles tied at the maximum price, comma-joined.
    pub max_price_items: String,
    /// All titles tied at the minimum price, comma-joined.
    pub min_price_items: String,
    /// Top keywords over the category's descriptions, as `word(count)`.
    pub top_keywords: String,
}

/// Roll product records up into one summary per distinct category name, in
/// first-discovered order. A category reachable through several hrefs is
/// one name here and gets a single row over all of its products. Names with
/// zero products still get a row, with zeroed prices and empty item/keyword
/// fields.
pub fn summarize(
    config: &SiteConfig,
    categories: &[Category],
    records: &[ProductRecord],
) -> Vec<CategorySummary> {
    let mut names: Vec<&str> = Vec::new();
    for cat in categories {
        if !names.iter().any(|n| *n == cat.name) {
            names.push(&cat.name);
        }
    }
    names
        .iter()
        .map(|name| {
            let group: Vec<&ProductRecord> =
                records.iter().filter(|r| r.category == *name).collect();
            summarize_one(config, name, &group)
        })
        .collect()
}

fn summarize_one(config: &SiteConfig, name: &str, group: &[&ProductRecord]) -> CategorySummary {
    if group.is_empty() {
        return CategorySummary {
            category: name.to_string(),
            item_count: 0,
            mean_price: 0.0,
            max_price: 0.0,
            min_price: 0.0,
            max_price_items: String::new(),
            min_price_items: String::new(),
            top_keywords: String::new(),
        };
    }

    let sum: f64 = group.iter().map(|r| r.price).sum();
    let max = group.iter().map(|r| r.price).fold(f64::MIN, f64::max);
    let min = group.iter().map(|r| r.price).fold(f64::MAX, f64::min);

    let titles_at = |value: f64| -> String {
        group
            .iter()
            .filter(|r| r.price == value)
            .map(|r| r.title.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    };

    let descriptions: Vec<&str> = group.iter().map(|r| r.description.as_str()).collect();

    CategorySummary {
        category: name.to_string(),
        item_count: group.len(),
        mean_price: round2(sum / group.len() as f64),
        max_price: round2(max),
        min_price: round2(min),
        max_price_items: titles_at(max),
        min_price_items: titles_at(min),
        top_keywords: top_keywords(config, &descriptions),
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Count keyword frequency over a category's descriptions: lowercase
/// alphabetic runs of length >= 3, stopwords removed, top-N by count with
/// ties broken by first-encountered order.
fn top_keywords(config: &SiteConfig, descriptions: &[&str]) -> String {
    let mut order: Vec<(String, usize)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for text in descriptions {
        let lower = text.to_lowercase();
        for token in lower.split(|c: char| !c.is_alphabetic()) {
            if token.chars().count() < 3 || config.stopwords.contains(token) {
                continue;
            }
            match index.get(token) {
                Some(&i) => order[i].1 += 1,
                None => {
                    index.insert(token.to_string(), order.len());
                    order.push((token.to_string(), 1));
                }
            }
        }
    }

    // Stable sort keeps first-encountered order among equal counts.
    order.sort_by(|a, b| b.1.cmp(&a.1));
    order.truncate(config.top_keywords);
    order
        .into_iter()
        .map(|(word, count)| format!("{}({})", word, count))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Write the three derived CSVs: per-product rows, price summaries, and
/// keyword summaries.
pub fn write_reports(
    out_dir: &Path,
    records: &[ProductRecord],
    summaries: &[CategorySummary],
) -> Result<()> {
    fs::create_dir_all(out_dir)?;

    let mut products = csv::Writer::from_path(out_dir.join("products.csv"))?;
    products.write_record(["category", "title", "price"])?;
    for r in records {
        products.write_record([r.category.as_str(), r.title.as_str(), &format_price(r.price)])?;
    }
    products.flush()?;

    let mut prices = csv::Writer::from_path(out_dir.join("price_summary.csv"))?;
    prices.write_record(["category", "mean", "max", "min", "max_items", "min_items"])?;
    for s in summaries {
        prices.write_record([
            s.category.as_str(),
            &format_price(s.mean_price),
            &format_price(s.max_price),
            &format_price(s.min_price),
            s.max_price_items.as_str(),
            s.min_price_items.as_str(),
        ])?;
    }
    prices.flush()?;

    let mut keywords = csv::Writer::from_path(out_dir.join("keywords.csv"))?;
    keywords.write_record(["category", "top_keywords"])?;
    for s in summaries {
        keywords.write_record([s.category.as_str(), s.top_keywords.as_str()])?;
    }
    keywords.flush()?;

    info!("reports written to {}", out_dir.display());
    Ok(())
}

/// Compact console table over the summaries.
pub fn print_summaries(summaries: &[CategorySummary]) {
    println!(
        "{:<24} | {:>5} | {:>8} | {:>8} | {:>8} | {:<32}",
        "Category", "Items", "Mean", "Max", "Min", "Top keywords"
    );
    println!("{}", "-".repeat(98));
    for s in summaries {
        println!(
            "{:<24} | {:>5} | {:>8} | {:>8} | {:>8} | {:<32}",
            truncate(&s.category, 24),
            s.item_count,
            format_price(s.mean_price),
            format_price(s.max_price),
            format_price(s.min_price),
            truncate(&s.top_keywords, 32),
        );
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max).collect();
        format!("{}...", truncated)
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    fn record(category: &str, title: &str, price: f64, description: &str) -> ProductRecord {
        ProductRecord {
            category: category.to_string(),
            title: title.to_string(),
            price,
            description: description.to_string(),
        }
    }

    fn category(name: &str) -> Category {
        Category {
            name: name.to_string(),
            href: format!("/category/{}/", name),
        }
    }

    fn config() -> SiteConfig {
        SiteConfig::new("https://example.xyz/")
    }

    #[test]
    fn price_stats_with_tied_extrema() {
        let cats = vec![category("widgets")];
        let records = vec![
            record("widgets", "plain", 10.0, ""),
            record("widgets", "deluxe", 20.0, ""),
            record("widgets", "premium", 20.0, ""),
            record("widgets", "budget", 5.0, ""),
        ];
        let s = &summarize(&config(), &cats, &records)[0];
        assert_eq!(s.mean_price, 13.75);
        assert_eq!(s.max_price, 20.0);
        assert_eq!(s.max_price_items, "deluxe, premium");
        assert_eq!(s.min_price, 5.0);
        assert_eq!(s.min_price_items, "budget");
    }

    #[test]
    fn categories_sharing_a_name_summarize_once() {
        let cats = vec![
            Category {
                name: "widgets".to_string(),
                href: "/category/widgets/".to_string(),
            },
            Category {
                name: "widgets".to_string(),
                href: "/product-category/widgets/".to_string(),
            },
        ];
        let records = vec![
            record("widgets", "plain", 10.0, ""),
            record("widgets", "deluxe", 20.0, ""),
        ];
        let summaries = summarize(&config(), &cats, &records);
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].item_count, 2);
        assert_eq!(summaries[0].mean_price, 15.0);
    }

    #[test]
    fn empty_category_reports_zero_not_error() {
        let cats = vec![category("empty")];
        let s = &summarize(&config(), &cats, &[])[0];
        assert_eq!(s.item_count, 0);
        assert_eq!(s.mean_price, 0.0);
        assert_eq!(s.max_price_items, "");
        assert_eq!(s.top_keywords, "");
    }

    #[test]
    fn keywords_filter_and_rank() {
        let cats = vec![category("widgets")];
        let records = vec![
            record("widgets", "a", 1.0, "Editable layered mockup, fully editable layers."),
            record("widgets", "b", 2.0, "Layered PSD mockup for the editable era."),
        ];
        let s = &summarize(&config(), &cats, &records)[0];
        // editable: 3; layered and mockup tie at 2 and keep first-seen
        // order; stopwords ("for", "the") and short tokens are excluded.
        assert_eq!(
            s.top_keywords,
            "editable(3), layered(2), mockup(2), fully(1), layers(1)"
        );
    }

    #[test]
    fn keyword_count_is_configurable() {
        let cats = vec![category("w")];
        let records = vec![record("w", "a", 1.0, "alpha beta gamma alpha beta alpha")];
        let cfg = config().with_top_keywords(2);
        let s = &summarize(&cfg, &cats, &records)[0];
        assert_eq!(s.top_keywords, "alpha(3), beta(2)");
    }

    #[test]
    fn csv_reports_are_written() {
        let dir = tempfile::tempdir().unwrap();
        let cats = vec![category("widgets")];
        let records = vec![record("widgets", "blue widget", 29.99, "nice widget")];
        let summaries = summarize(&config(), &cats, &records);
        write_reports(dir.path(), &records, &summaries).unwrap();

        let products = fs::read_to_string(dir.path().join("products.csv")).unwrap();
        assert!(products.contains("widgets,blue widget,29.99"));
        let prices = fs::read_to_string(dir.path().join("price_summary.csv")).unwrap();
        assert!(prices.starts_with("category,mean,max,min,max_items,min_items"));
        assert!(fs::read_to_string(dir.path().join("keywords.csv"))
            .unwrap()
            .contains("widgets"));
    }
}
