// src/services/fetcher.rs

//! Listing page fetcher.
//!
//! One GET per listing page, no caching. Dropping the returned future
//! cancels the request.

use async_trait::async_trait;
use reqwest::Client;
use url::Url;

use crate::error::{AppError, Result};
use crate::models::UpstreamConfig;
use crate::utils::http::create_async_client;
use crate::utils::url::events_url;

/// Source of raw listing page markup.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch listing page `page` (1-based) for an optional location.
    async fn fetch_page(&self, location: Option<&str>, page: u32) -> Result<String>;
}

/// Fetches listing pages from the ticketing site over HTTP.
pub struct HttpPageFetcher {
    client: Client,
    base_url: Url,
    body_excerpt_len: usize,
}

impl HttpPageFetcher {
    /// Create a fetcher for the site rooted at `base_url`.
    pub fn new(client: Client, base_url: Url) -> Self {
        Self {
            client,
            base_url,
            body_excerpt_len: 512,
        }
    }

    /// Create a fetcher with its own client built from upstream settings.
    pub fn from_config(config: &UpstreamConfig) -> Result<Self> {
        let client = create_async_client(config)?;
        Ok(Self::new(client, config.base_url()?).with_body_excerpt_len(config.body_excerpt_len))
    }

    /// Limit how much of an error body is kept in [`AppError::UpstreamHttp`].
    pub fn with_body_excerpt_len(mut self, len: usize) -> Self {
        self.body_excerpt_len = len;
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch_page(&self, location: Option<&str>, page: u32) -> Result<String> {
        let url = events_url(&self.base_url, location, Some(page));
        log::debug!("Fetching listing page {}", url);

        let response = self.client.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            // The status decides the error; the body is only context
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::upstream(
                status.as_u16(),
                &body,
                self.body_excerpt_len,
            ));
        }

        Ok(response.text().await?)
    }
}
