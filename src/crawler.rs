//! Breadth-first crawl engine.
//!
//! Classic layered BFS over one FIFO queue and one visited set. Fetches
//! inside a layer run concurrently behind a semaphore, streaming results to
//! a single receiver that saves pages as they arrive; link extraction only
//! happens once the whole layer has drained, because link discovery decides
//! the next layer's membership. The seed is fetched for its links but never
//! persisted.

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::{mpsc, Semaphore};
use tracing::{info, warn};

use crate::config::SiteConfig;
use crate::fetch::Fetch;
use crate::html;
use crate::keys;
use crate::store::{Manifest, PageStore};

/// Crawl totals reported after completion.
#[derive(Debug, Default)]
pub struct CrawlStats {
    /// URLs actually fetched (seed included).
    pub fetched: usize,
    /// Pages persisted to the store.
    pub saved: usize,
    /// Per-URL fetch failures (logged, skipped, never retried).
    pub errors: usize,
    /// Distinct URLs ever entered into the visited set.
    pub discovered: usize,
    /// URLs left on the frontier when the depth wall was hit.
    pub frontier_left: usize,
    /// Number of layers processed.
    pub layers: usize,
}

struct FetchOutcome {
    url: String,
    html: Option<String>,
}

pub struct Crawler {
    config: SiteConfig,
    store: PageStore,
    fetcher: Arc<dyn Fetch>,
}

impl Crawler {
    pub fn new(config: SiteConfig, store: PageStore, fetcher: Arc<dyn Fetch>) -> Self {
        Self {
            config,
            store,
            fetcher,
        }
    }

    /// Run one full crawl from the configured origin. The store is wiped
    /// first; the manifest is written once the frontier is exhausted or the
    /// depth wall is reached.
    pub async fn crawl(&self) -> Result<CrawlStats> {
        self.store.reset()?;

        let seed = self.config.origin.clone();
        let mut visited: HashSet<String> = HashSet::new();
        visited.insert(seed.clone());
        let mut queue: VecDeque<String> = VecDeque::new();
        queue.push_back(seed.clone());

        let mut manifest = Manifest::default();
        let mut stats = CrawlStats::default();
        let mut depth = 0usize;

        loop {
            let layer: Vec<String> = queue.drain(..).collect();
            info!("crawling depth {} ({} urls)", depth, layer.len());

            let pages = self.fetch_layer(&layer, &mut manifest, &mut stats).await?;

            // Layer barrier: only now does link discovery extend the queue.
            for (_, html) in &pages {
                for href in html::anchor_hrefs(html) {
                    if let Some(url) = self.resolve_href(&href) {
                        if visited.insert(url.clone()) {
                            queue.push_back(url);
                        }
                    }
                }
            }

            stats.layers += 1;
            depth += 1;
            if queue.is_empty() || depth > self.config.max_depth {
                break;
            }
        }

        self.store.save_manifest(&manifest)?;

        stats.discovered = visited.len();
        stats.frontier_left = queue.len();
        info!(
            "crawl done: {} layers, {} fetched, {} saved, {} errors, {} discovered, {} left on frontier",
            stats.layers, stats.fetched, stats.saved, stats.errors, stats.discovered, stats.frontier_left
        );
        Ok(stats)
    }

    /// Fetch every URL of one layer concurrently, saving pages as results
    /// stream in. Returns the fetched documents for link extraction.
    async fn fetch_layer(
        &self,
        layer: &[String],
        manifest: &mut Manifest,
        stats: &mut CrawlStats,
    ) -> Result<Vec<(String, String)>> {
        let semaphore = Arc::new(Semaphore::new(self.config.concurrency.max(1)));
        let (tx, mut rx) = mpsc::channel::<FetchOutcome>(self.config.concurrency.max(1) * 2);

        for url in layer {
            let fetcher = Arc::clone(&self.fetcher);
            let sem = Arc::clone(&semaphore);
            let tx = tx.clone();
            let url = url.clone();
            tokio::spawn(async move {
                let Ok(_permit) = sem.acquire().await else {
                    return;
                };
                let html = match fetcher.fetch(&url).await {
                    Ok(html) => Some(html),
                    Err(e) => {
                        warn!("{}", e);
                        None
                    }
                };
                let _ = tx.send(FetchOutcome { url, html }).await;
            });
        }
        // Close our end so rx drains once all tasks finish.
        drop(tx);

        let pb = ProgressBar::new(layer.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40} {pos}/{len} ({per_sec})")?
                .progress_chars("=> "),
        );

        let mut pages = Vec::with_capacity(layer.len());
        while let Some(outcome) = rx.recv().await {
            stats.fetched += 1;
            pb.inc(1);
            match outcome.html {
                Some(html) => {
                    if outcome.url != self.config.origin {
                        let key = keys::page_key(&outcome.url);
                        match self.store.save(&key, &html) {
                            Ok(()) => {
                                manifest.record(&outcome.url, &key);
                                stats.saved += 1;
                            }
                            Err(e) => warn!("failed to save {}: {}", outcome.url, e),
                        }
                    }
                    pages.push((outcome.url, html));
                }
                None => stats.errors += 1,
            }
        }
        pb.finish_and_clear();

        Ok(pages)
    }

    /// Resolve an href to an absolute same-origin URL, or discard it.
    /// Root-relative hrefs are joined onto the origin; absolute hrefs must
    /// already contain the origin; everything else is out of scope.
    fn resolve_href(&self, href: &str) -> Option<String> {
        if href.is_empty() {
            return None;
        }
        if let Some(rest) = href.strip_prefix('/') {
            return Some(format!("{}/{}", self.config.origin_trimmed(), rest));
        }
        if href.contains(self.config.origin_trimmed()) {
            return Some(href.to_string());
        }
        None
    }
}

// ── Tests ──
