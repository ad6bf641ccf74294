//! Fetch collaborator: URL -> rendered HTML.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::ScrapeError;

/// The crawl engine's view of the network. Implemented over reqwest in
/// production and over canned fixtures in tests.
#[async_trait]
pub trait Fetch: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String, ScrapeError>;
}

pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Build the HTTP client. Failure here is the crawl's one fatal
    /// initialization error.
    pub fn new(timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("shopscan/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String, ScrapeError> {
        let err = |e: reqwest::Error| ScrapeError::Fetch {
            url: url.to_string(),
            message: e.to_string(),
        };
        let response = self.client.get(url).send().await.map_err(err)?;
        let response = response.error_for_status().map_err(err)?;
        response.text().await.map_err(err)
    }
}
