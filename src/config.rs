//! Site configuration threaded through every component.

use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

/// Words excluded from keyword frequency summaries.
const DEFAULT_STOPWORDS: &[&str] = &[
    "the", "and", "for", "with", "you", "your", "this", "that", "are", "was",
    "from", "have", "has", "will", "can", "our", "all", "not", "but", "its",
    "any", "may", "use", "more", "one", "out", "get", "how", "who", "what",
    "when", "where", "which", "their", "them", "they", "been", "being", "also",
    "into", "over", "such", "than", "then", "there", "these", "those", "about",
    "free", "download", "downloads",
];

/// Everything the crawl and extraction phases need to know about the target
/// site. Built once in `main` and passed by reference; no component reads
/// global state.
#[derive(Debug, Clone)]
pub struct SiteConfig {
    /// Site origin, e.g. `https://shop.example/`. Links outside it are
    /// ignored.
    pub origin: String,
    /// Deepest BFS layer to fetch; layer 0 is the seed alone.
    pub max_depth: usize,
    /// Flat directory holding one file per crawled page.
    pub data_dir: PathBuf,
    /// Directory the CSV reports are written to.
    pub out_dir: PathBuf,
    /// Keywords reported per category.
    pub top_keywords: usize,
    /// Tokens excluded from keyword summaries.
    pub stopwords: HashSet<String>,
    /// Per-URL fetch timeout.
    pub fetch_timeout: Duration,
    /// Parallel fetches within one BFS layer.
    pub concurrency: usize,
}

impl SiteConfig {
    pub fn new(origin: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            max_depth: 10,
            data_dir: PathBuf::from("html_files"),
            out_dir: PathBuf::from("reports"),
            top_keywords: 5,
            stopwords: DEFAULT_STOPWORDS.iter().map(|w| w.to_string()).collect(),
            fetch_timeout: Duration::from_secs(30),
            concurrency: 10,
        }
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    pub fn with_out_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.out_dir = dir.into();
        self
    }

    pub fn with_top_keywords(mut self, n: usize) -> Self {
        self.top_keywords = n;
        self
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Origin without its trailing slash, for joining relative hrefs.
    pub fn origin_trimmed(&self) -> &str {
        self.origin.trim_end_matches('/')
    }

    /// The URL the homepage is reachable under from the rest of the site.
    /// Category resolution loads this page's key directly, since the seed
    /// itself is never persisted.
    pub fn homepage_url(&self) -> String {
        format!("{}/index.html", self.origin_trimmed())
    }

    /// Root that `../..`-relative product hrefs resolve under.
    pub fn downloads_root(&self) -> String {
        format!("{}/downloads", self.origin_trimmed())
    }
}
