//! HTTP client for listing pages, detail pages and binary assets.

use anyhow::{Context, Result};
use reqwest::{Client, Response};
use std::time::Duration;
use tracing::debug;

use super::error::FetchError;
use crate::config::FetcherSettings;

#[derive(Clone)]
pub struct PageFetcher {
    client: Client,
}

impl PageFetcher {
    /// Create a new fetcher.
    ///
    /// # Arguments
    /// * `settings` - User agent and per-request timeout
    pub fn new(settings: &FetcherSettings) -> Result<Self> {
        let client = Client::builder()
            .user_agent(settings.user_agent.as_str())
            .timeout(Duration::from_secs(settings.timeout_sec))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }

    /// Fetch a document and return its body as text.
    pub async fn fetch_page(&self, url: &str) -> Result<String, FetchError> {
        let response = self.send(url).await?;
        response
            .text()
            .await
            .map_err(|e| FetchError::transport(url, e))
    }

    /// Send the request and check the status, leaving the body unread so the
    /// caller can stream it.
    pub async fn fetch_stream(&self, url: &str) -> Result<Response, FetchError> {
        self.send(url).await
    }

    async fn send(&self, url: &str) -> Result<Response, FetchError> {
        debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::transport(url, e))?;

        if !response.status().is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: response.status(),
            });
        }
        Ok(response)
    }
}
