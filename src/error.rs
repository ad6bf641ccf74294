//! Error types for the crawl and extraction seams.
//!
//! Only the seams carry typed errors; command-level code uses `anyhow`.
//! Price parse failures never surface here: a malformed price normalizes to
//! zero by contract.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScrapeError {
    /// Network or render failure for a single URL. Logged and skipped by the
    /// crawl; never aborts the run.
    #[error("fetch failed for {url}: {message}")]
    Fetch { url: String, message: String },

    /// An expected stored page is absent. Fatal only for the homepage lookup
    /// in category resolution; everywhere else it degrades to an empty
    /// result.
    #[error("no stored page for key {0}")]
    PageNotFound(String),

    /// More than one stored page matched a supposed-unique pattern. The
    /// first key in lexicographic order is used.
    #[error("{count} stored pages match pattern {pattern}")]
    AmbiguousMatch { pattern: String, count: usize },

    #[error("page store I/O: {0}")]
    Io(#[from] std::io::Error),
}
