//! Response cache for the content client
//!
//! One in-memory Moka cache per freshness window, keyed by request URL. Only
//! bodies that decoded successfully are stored, so failures and 404s are
//! always retried on the next call.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;

use crate::constants::freshness;

/// Freshness window an upstream call is revalidated on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Freshness {
    /// Hero carousel (10 minutes)
    Hero,
    /// Catalog pages, details and SEO metadata (1 hour)
    Catalog,
    /// Ad placements (5 minutes)
    Ads,
    /// Filter vocabularies and sitemap feed (1 day)
    Daily,
    /// Never cached (search)
    Uncached,
}

impl Freshness {
    /// Windows that keep a cache of their own
    const CACHED: [Freshness; 4] = [
        Freshness::Hero,
        Freshness::Catalog,
        Freshness::Ads,
        Freshness::Daily,
    ];

    pub fn window(&self) -> Option<Duration> {
        match self {
            Freshness::Hero => Some(freshness::HERO),
            Freshness::Catalog => Some(freshness::CATALOG),
            Freshness::Ads => Some(freshness::ADS),
            Freshness::Daily => Some(freshness::DAILY),
            Freshness::Uncached => None,
        }
    }
}

/// Raw response bodies grouped by freshness window
#[derive(Clone)]
pub struct ResponseCache {
    buckets: HashMap<Freshness, Cache<String, Arc<str>>>,
}

impl ResponseCache {
    /// Create a cache holding at most `max_capacity` bodies per window
    pub fn new(max_capacity: u64) -> Self {
        let buckets = Freshness::CACHED
            .into_iter()
            .filter_map(|window| {
                let ttl = window.window()?;
                let cache = moka::future::CacheBuilder::new(max_capacity)
                    .time_to_live(ttl)
                    .build();
                Some((window, cache))
            })
            .collect();

        Self { buckets }
    }

    /// Cached body for a URL, if still fresh
    pub async fn get(&self, window: Freshness, url: &str) -> Option<Arc<str>> {
        let bucket = self.buckets.get(&window)?;
        let body = bucket.get(url).await;
        if body.is_some() {
            tracing::debug!(url = %url, "Response cache hit");
        }
        body
    }

    /// Store a body that decoded successfully
    pub async fn insert(&self, window: Freshness, url: &str, body: Arc<str>) {
        if let Some(bucket) = self.buckets.get(&window) {
            bucket.insert(url.to_string(), body).await;
        }
    }
}
