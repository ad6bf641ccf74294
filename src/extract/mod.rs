//! Extraction pipeline over an already-populated page store.
//!
//! Pure batch phase: categories from the homepage, listing pages per
//! category, product details per link, then the aggregate summaries. A
//! failing category or product contributes an empty slice to the whole,
//! never an abort; only the homepage lookup is fatal.

pub mod categories;
pub mod listings;
pub mod products;

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use tracing::{info, warn};

use crate::config::SiteConfig;
use crate::report::{self, CategorySummary};
use crate::store::PageStore;
use categories::Category;
use products::ProductRecord;

pub struct AnalysisReport {
    pub categories: Vec<Category>,
    pub products: Vec<ProductRecord>,
    pub summaries: Vec<CategorySummary>,
}

/// Run the full extraction pipeline.
pub fn run(config: &SiteConfig, store: &PageStore) -> Result<AnalysisReport> {
    let manifest = store.load_manifest()?;
    let cats = categories::resolve(config, store, &manifest)?;
    info!("discovered {} categories", cats.len());

    let pb = ProgressBar::new(cats.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} categories")?
            .progress_chars("=> "),
    );

    // Each category reads a disjoint slice of the store; the store itself is
    // read-only in this phase.
    let per_category: Vec<Vec<ProductRecord>> = cats
        .par_iter()
        .map(|cat| {
            let links = match listings::product_links(store, &cat.href) {
                Ok(links) => links,
                Err(e) => {
                    warn!("listing resolution failed for {}: {}", cat.name, e);
                    Vec::new()
                }
            };
            let records = links
                .iter()
                .map(|(_, href)| products::extract(config, store, &manifest, &cat.name, href))
                .collect();
            pb.inc(1);
            records
        })
        .collect();
    pb.finish_and_clear();

    let products: Vec<ProductRecord> = per_category.into_iter().flatten().collect();
    info!("extracted {} products", products.len());

    let summaries = report::summarize(config, &cats, &products);
    Ok(AnalysisReport {
        categories: cats,
        products,
        summaries,
    })
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::page_key;

    fn fixture(name: &str) -> String {
        std::fs::read_to_string(format!("tests/fixtures/{}.html", name)).unwrap()
    }

    /// Seed a store the way a finished crawl would have left it.
    fn crawled_store(dir: &tempfile::TempDir) -> (SiteConfig, PageStore) {
        let config = SiteConfig::new("https://example.xyz/").with_data_dir(dir.path().join("pages"));
        let store = PageStore::open(config.data_dir.clone());
        store.reset().unwrap();
        for (url, name) in [
            ("https://example.xyz/index.html", "homepage"),
            ("https://example.xyz/category/widgets/", "listing_widgets"),
            ("https://example.xyz/downloads/blue-widget/", "product_blue_widget"),
            ("https://example.xyz/downloads/red-widget/", "product_red_widget"),
        ] {
            store.save(&page_key(url), &fixture(name)).unwrap();
        }
        (config, store)
    }

    #[test]
    fn full_pipeline_over_crawled_store() {
        let dir = tempfile::tempdir().unwrap();
        let (config, store) = crawled_store(&dir);
        let report = run(&config, &store).unwrap();

        assert_eq!(report.categories.len(), 2);
        assert_eq!(report.products.len(), 2);

        let widgets = report
            .summaries
            .iter()
            .find(|s| s.category == "Widgets")
            .unwrap();
        assert_eq!(widgets.item_count, 2);
        assert_eq!(widgets.mean_price, 15.0);
        assert_eq!(widgets.max_price, 20.0);
        assert_eq!(widgets.max_price_items, "red widget");
        assert_eq!(widgets.min_price_items, "blue widget");
        assert!(widgets.top_keywords.contains("editable"));

        // Gadgets has no listing pages: empty contribution, not an error.
        let gadgets = report
            .summaries
            .iter()
            .find(|s| s.category == "Gadgets")
            .unwrap();
        assert_eq!(gadgets.item_count, 0);
        assert_eq!(gadgets.top_keywords, "");
        assert_eq!(gadgets.max_price_items, "");
    }

    #[test]
    fn missing_homepage_aborts_analysis() {
        let dir = tempfile::tempdir().unwrap();
        let config = SiteConfig::new("https://example.xyz/").with_data_dir(dir.path().join("pages"));
        let store = PageStore::open(config.data_dir.clone());
        store.reset().unwrap();
        assert!(run(&config, &store).is_err());
    }
}
