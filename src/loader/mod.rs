//! Incremental list loader
//!
//! Page-by-page accumulation of a filtered catalog. The loader itself is a
//! synchronous state machine: callers obtain a [`PageRequest`] from it, run
//! the fetch however they like, and hand the result back with
//! [`CatalogLoader::complete`]. Requests carry a generation so a completion
//! that arrives after a filter reset is ignored.

pub mod interleave;

use std::future::Future;

use crate::client::ContentClient;
use crate::models::{CatalogItem, CatalogPage, FilterState};

pub use interleave::{interleave, GridCell};

/// Source of catalog pages
pub trait PageSource: Send + Sync {
    /// Fetch one page; `None` on any failure
    fn fetch_page(
        &self,
        page: u32,
        filters: &FilterState,
    ) -> impl Future<Output = Option<CatalogPage>> + Send;
}

impl PageSource for ContentClient {
    async fn fetch_page(&self, page: u32, filters: &FilterState) -> Option<CatalogPage> {
        self.catalog_page(page, filters).await
    }
}

/// Why no further page will be requested
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExhaustReason {
    /// The last fetched page was the last one upstream
    LastPage,
    /// A page came back with no items
    Empty,
    /// The fetch failed
    Failed,
}

/// Lifecycle of the loader
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Idle,
    Loading,
    Exhausted(ExhaustReason),
}

/// A page fetch handed out by the loader
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub filters: FilterState,
    generation: u64,
}

/// Accumulates catalog pages for one filter state
#[derive(Debug, Clone)]
pub struct CatalogLoader {
    state: LoadState,
    items: Vec<CatalogItem>,
    page: u32,
    total_pages: u32,
    filters: FilterState,
    generation: u64,
}

impl CatalogLoader {
    /// Loader with nothing fetched yet
    pub fn new(filters: FilterState) -> Self {
        Self {
            state: LoadState::Idle,
            items: Vec::new(),
            page: 0,
            total_pages: 0,
            filters,
            generation: 0,
        }
    }

    /// Loader seeded with a server-fetched first page
    pub fn from_first_page(filters: FilterState, first: Option<CatalogPage>) -> Self {
        let mut loader = Self::new(filters);
        let request = loader.reset(loader.filters.clone());
        loader.complete(&request, first);
        loader
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    pub fn items(&self) -> &[CatalogItem] {
        &self.items
    }

    /// Last successfully loaded page (0 before the first one)
    pub fn current_page(&self) -> u32 {
        self.page
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn is_loading(&self) -> bool {
        self.state == LoadState::Loading
    }

    /// Whether another page may still be requested
    pub fn has_more(&self) -> bool {
        !matches!(self.state, LoadState::Exhausted(_))
    }

    /// Discard everything and request page 1 of `filters`.
    ///
    /// Any request still in flight becomes stale.
    pub fn reset(&mut self, filters: FilterState) -> PageRequest {
        self.generation += 1;
        self.filters = filters;
        self.items.clear();
        self.page = 0;
        self.total_pages = 0;
        self.state = LoadState::Loading;
        self.request(1)
    }

    /// Request the next page; `None` while loading or once exhausted
    pub fn begin_next(&mut self) -> Option<PageRequest> {
        if self.state != LoadState::Idle {
            return None;
        }
        self.state = LoadState::Loading;
        Some(self.request(self.page + 1))
    }

    /// Scroll trigger: requests the next page when within `threshold` of the bottom
    pub fn on_scroll(&mut self, distance_to_bottom: u32, threshold: u32) -> Option<PageRequest> {
        if distance_to_bottom > threshold {
            return None;
        }
        self.begin_next()
    }

    fn request(&self, page: u32) -> PageRequest {
        PageRequest {
            page,
            filters: self.filters.clone(),
            generation: self.generation,
        }
    }

    /// Apply the outcome of a request. Returns `false` for stale completions.
    pub fn complete(&mut self, request: &PageRequest, result: Option<CatalogPage>) -> bool {
        if request.generation != self.generation || self.state != LoadState::Loading {
            tracing::debug!(page = request.page, "Ignoring stale page completion");
            return false;
        }

        match result {
            None => {
                self.state = LoadState::Exhausted(ExhaustReason::Failed);
            }
            Some(page) if page.items.is_empty() => {
                self.state = LoadState::Exhausted(ExhaustReason::Empty);
            }
            Some(page) => {
                let last = page.is_last();
                if request.page == 1 {
                    self.items = page.items;
                } else {
                    self.items.extend(page.items);
                }
                self.page = request.page;
                self.total_pages = page.total_pages;
                self.state = if last {
                    LoadState::Exhausted(ExhaustReason::LastPage)
                } else {
                    LoadState::Idle
                };
            }
        }
        true
    }

    /// Reset to `filters` and fetch page 1 from `source`
    pub async fn load_first<S: PageSource>(&mut self, source: &S, filters: FilterState) -> LoadState {
        let request = self.reset(filters);
        let result = source.fetch_page(request.page, &request.filters).await;
        self.complete(&request, result);
        self.state
    }

    /// Fetch the next page from `source` if one may be requested
    pub async fn load_more<S: PageSource>(&mut self, source: &S) -> Option<LoadState> {
        let request = self.begin_next()?;
        let result = source.fetch_page(request.page, &request.filters).await;
        self.complete(&request, result);
        Some(self.state)
    }
}

#[cfg(test)]
pub(crate) mod fakes {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::*;

    /// In-memory page source recording every call
    #[derive(Default)]
    pub struct FakePages {
        pages: HashMap<u32, CatalogPage>,
        calls: Mutex<Vec<(u32, FilterState)>>,
    }

    impl FakePages {
        /// `total` pages of `per_page` items each
        pub fn uniform(total: u32, per_page: usize) -> Self {
            let pages = (1..=total)
                .map(|page| {
                    let items = (0..per_page)
                        .map(|i| {
                            let id = u64::from(page) * 1_000 + i as u64;
                            CatalogItem {
                                id,
                                title: format!("Anime {}", id),
                                slug: format!("anime-{}", id),
                                cover_image: None,
                                media_type: None,
                            }
                        })
                        .collect();
                    (
                        page,
                        CatalogPage {
                            items,
                            current_page: page,
                            total_pages: total,
                        },
                    )
                })
                .collect();
            Self {
                pages,
                calls: Mutex::new(Vec::new()),
            }
        }

        pub fn calls(&self) -> Vec<(u32, FilterState)> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl PageSource for FakePages {
        async fn fetch_page(&self, page: u32, filters: &FilterState) -> Option<CatalogPage> {
            self.calls.lock().unwrap().push((page, filters.clone()));
            self.pages.get(&page).cloned()
        }
    }
}
