//! Content client for the upstream catalog API
//!
//! Typed accessors for every upstream endpoint. Each call is revalidated on a
//! per-endpoint freshness window and degrades to a sentinel (`None`, an empty
//! list or the default value) on failure, so no page ever sees an error.

pub mod cache;

use std::sync::Arc;
use std::time::Duration;

use reqwest::{header, Client, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::config::Config;
use crate::constants::{endpoints, MIN_SEARCH_LEN, SITEMAP_TIMEOUT};
use crate::models::{
    AdConfig, AnimeDetails, CatalogItem, CatalogPage, FilterOption, FilterState, HeroItem,
    SeoData, SitemapEntry, Taxonomy,
};

pub use cache::{Freshness, ResponseCache};

/// Bodies kept per freshness window
const CACHE_CAPACITY: u64 = 1_000;

/// Errors that can occur while talking to the upstream API
#[derive(Error, Debug)]
pub enum ClientError {
    /// HTTP client could not be constructed
    #[error("Failed to build HTTP client: {0}")]
    BuildError(String),

    /// Network-related errors (connection refused, DNS failure, etc.)
    #[error("Failed to connect to server: {0}")]
    NetworkError(String),

    /// Request exceeded its deadline
    #[error("Request timed out")]
    Timeout,

    /// HTTP 404
    #[error("Resource not found")]
    NotFound,

    /// Any other non-2xx status
    #[error("Server returned status {0}")]
    HttpError(u16),

    /// Body could not be read or decoded into the expected shape
    #[error("Failed to decode response body: {0}")]
    DecodeError(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ClientError::Timeout
        } else if e.is_connect() {
            ClientError::NetworkError("Failed to connect to server".to_string())
        } else if e.is_decode() || e.is_body() {
            ClientError::DecodeError(e.to_string())
        } else {
            ClientError::NetworkError(e.to_string())
        }
    }
}

/// HTTP client for the upstream content API
#[derive(Clone)]
pub struct ContentClient {
    http: Client,
    base_url: Option<String>,
    per_page: u32,
    cache: ResponseCache,
}

impl ContentClient {
    /// Create a client from the application configuration
    pub fn new(config: &Config) -> Result<Self, ClientError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| ClientError::BuildError(e.to_string()))?;

        Ok(Self {
            http,
            base_url: config.api_url.clone(),
            per_page: config.per_page,
            cache: ResponseCache::new(CACHE_CAPACITY),
        })
    }

    /// Whether an upstream base address is configured
    pub fn is_configured(&self) -> bool {
        self.base_url.is_some()
    }

    /// Base address or a logged configuration error
    fn base(&self, operation: &str) -> Option<&str> {
        match self.base_url.as_deref() {
            Some(base) => Some(base),
            None => {
                error!("[CONFIG_ERROR] API_URL is not defined; {} returns nothing", operation);
                None
            }
        }
    }

    /// Fetch and decode a JSON document, going through the response cache
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        window: Freshness,
        deadline: Option<Duration>,
    ) -> Result<T, ClientError> {
        if let Some(body) = self.cache.get(window, url).await {
            return serde_json::from_str(&body).map_err(|e| ClientError::DecodeError(e.to_string()));
        }

        let mut request = self
            .http
            .get(url)
            .header(header::ACCEPT, "application/json");
        if let Some(deadline) = deadline {
            request = request.timeout(deadline);
        }

        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Err(ClientError::NotFound);
        }
        if !status.is_success() {
            return Err(ClientError::HttpError(status.as_u16()));
        }

        let body = response.text().await?;
        let value = serde_json::from_str(&body).map_err(|e| ClientError::DecodeError(e.to_string()))?;

        self.cache.insert(window, url, Arc::from(body)).await;
        Ok(value)
    }

    /// Hero carousel entries
    pub async fn hero_items(&self) -> Option<Vec<HeroItem>> {
        let base = self.base("hero_items")?;
        match self.get_json(&endpoints::hero(base), Freshness::Hero, None).await {
            Ok(items) => Some(items),
            Err(e) => {
                error!("[API_ERROR] Failed to fetch hero items: {}", e);
                None
            }
        }
    }

    /// One catalog page at the configured page size
    pub async fn catalog_page(&self, page: u32, filters: &FilterState) -> Option<CatalogPage> {
        self.catalog_page_sized(page, self.per_page, filters).await
    }

    /// One catalog page at an explicit page size
    pub async fn catalog_page_sized(
        &self,
        page: u32,
        per_page: u32,
        filters: &FilterState,
    ) -> Option<CatalogPage> {
        let base = self.base("catalog_page")?;
        let url = endpoints::animes(base, page.max(1), per_page, &filters.query_pairs());
        match self.get_json(&url, Freshness::Catalog, None).await {
            Ok(page) => Some(page),
            Err(e) => {
                error!("[API_ERROR] Failed to fetch catalog page {}: {}", page, e);
                None
            }
        }
    }

    /// Anime record with its SEO bag.
    ///
    /// The two fetches run concurrently. A 404 on the record yields `None`;
    /// a failing SEO fetch only leaves `seo` empty.
    pub async fn anime_details(&self, slug: &str) -> Option<AnimeDetails> {
        let base = self.base("anime_details")?;
        let details_url = endpoints::anime(base, slug);
        let seo_url = endpoints::seo_meta(base, slug);

        let (details, seo) = tokio::join!(
            self.get_json::<AnimeDetails>(&details_url, Freshness::Catalog, None),
            self.get_json::<SeoData>(&seo_url, Freshness::Catalog, None),
        );

        let mut details = match details {
            Ok(details) => details,
            Err(ClientError::NotFound) => {
                debug!("Anime not found: {}", slug);
                return None;
            }
            Err(e) => {
                error!("[API_ERROR] Failed to fetch anime details for {}: {}", slug, e);
                return None;
            }
        };

        match seo {
            Ok(seo) => details.seo = Some(seo),
            Err(e) => warn!("SEO data unavailable for {}: {}", slug, e),
        }

        Some(details)
    }

    /// SEO bag for a taxonomy archive page
    pub async fn archive_seo(&self, taxonomy: &str, slug: &str) -> Option<SeoData> {
        let base = self.base("archive_seo")?;
        self.seo(&endpoints::archive_seo(base, taxonomy, slug), "archive").await
    }

    /// SEO bag for the home page
    pub async fn homepage_seo(&self) -> Option<SeoData> {
        let base = self.base("homepage_seo")?;
        self.seo(&endpoints::homepage_seo(base), "homepage").await
    }

    /// SEO bag for a post-type archive page
    pub async fn post_type_archive_seo(&self, post_type: &str) -> Option<SeoData> {
        let base = self.base("post_type_archive_seo")?;
        self.seo(&endpoints::post_type_archive_seo(base, post_type), "post type archive")
            .await
    }

    async fn seo(&self, url: &str, kind: &str) -> Option<SeoData> {
        match self.get_json(url, Freshness::Catalog, None).await {
            Ok(seo) => Some(seo),
            Err(e) => {
                warn!("Failed to fetch {} SEO data: {}", kind, e);
                None
            }
        }
    }

    /// Full-text search.
    ///
    /// Queries shorter than the minimum length (after trimming) resolve to an
    /// empty list without touching the network. Results are never cached.
    pub async fn search(&self, query: &str) -> Option<Vec<CatalogItem>> {
        let base = self.base("search")?;
        let query = query.trim();
        if query.chars().count() < MIN_SEARCH_LEN {
            return Some(Vec::new());
        }

        match self.get_json(&endpoints::search(base, query), Freshness::Uncached, None).await {
            Ok(items) => Some(items),
            Err(e) => {
                error!("[API_ERROR] Search failed for {:?}: {}", query, e);
                None
            }
        }
    }

    /// Vocabulary of a filter taxonomy; empty on failure
    pub async fn filter_options(&self, taxonomy: Taxonomy) -> Vec<FilterOption> {
        let Some(base) = self.base("filter_options") else {
            return Vec::new();
        };
        match self.get_json(&endpoints::filters(base, taxonomy), Freshness::Daily, None).await {
            Ok(options) => options,
            Err(e) => {
                error!("[API_ERROR] Failed to fetch {} options: {}", taxonomy, e);
                Vec::new()
            }
        }
    }

    /// Ad placement configuration
    pub async fn ad_placements(&self) -> Option<AdConfig> {
        let base = self.base("ad_placements")?;
        match self.get_json(&endpoints::placements(base), Freshness::Ads, None).await {
            Ok(ads) => Some(ads),
            Err(e) => {
                error!("[API_ERROR] Failed to fetch ad placements: {}", e);
                None
            }
        }
    }

    /// Sitemap feed, bounded by a hard timeout; empty on failure
    pub async fn sitemap_feed(&self) -> Vec<SitemapEntry> {
        let Some(base) = self.base("sitemap_feed") else {
            return Vec::new();
        };
        match self
            .get_json(&endpoints::sitemap(base), Freshness::Daily, Some(SITEMAP_TIMEOUT))
            .await
        {
            Ok(entries) => entries,
            Err(e) => {
                error!("[SITEMAP_ERROR] Failed to fetch sitemap data: {}", e);
                Vec::new()
            }
        }
    }
}
