//! Search-as-you-type session
//!
//! Keystrokes are debounced; queries shorter than the minimum length clear
//! the results without a network call.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::client::ContentClient;
use crate::constants::{MIN_SEARCH_LEN, SEARCH_DEBOUNCE};
use crate::debounce::Debouncer;
use crate::models::CatalogItem;

/// Anything that can answer a search query
pub trait Searcher: Send + Sync {
    /// Matching items; `None` on failure
    fn search(&self, query: &str) -> impl Future<Output = Option<Vec<CatalogItem>>> + Send;
}

impl Searcher for ContentClient {
    async fn search(&self, query: &str) -> Option<Vec<CatalogItem>> {
        ContentClient::search(self, query).await
    }
}

/// State of the results panel
#[derive(Debug, Clone, PartialEq)]
pub enum SearchState {
    /// Nothing (long enough) typed yet
    Idle,
    Loading { query: String },
    Results { query: String, items: Vec<CatalogItem> },
    Failed { query: String },
}

/// Handle to a running search box. Dropping it stops pending searches.
pub struct SearchSession {
    debouncer: Debouncer<String>,
    state: watch::Receiver<SearchState>,
    task: JoinHandle<()>,
}

impl SearchSession {
    pub fn spawn<S: Searcher + 'static>(searcher: Arc<S>) -> Self {
        Self::with_delay(searcher, SEARCH_DEBOUNCE)
    }

    pub fn with_delay<S: Searcher + 'static>(searcher: Arc<S>, delay: Duration) -> Self {
        let (debouncer, mut settled) = Debouncer::<String>::new(delay);
        let (tx, state) = watch::channel(SearchState::Idle);

        let task = tokio::spawn(async move {
            while let Some(query) = settled.recv().await {
                let query = query.trim().to_string();
                if query.chars().count() < MIN_SEARCH_LEN {
                    tx.send_replace(SearchState::Idle);
                    continue;
                }

                tx.send_replace(SearchState::Loading {
                    query: query.clone(),
                });
                let next = match searcher.search(&query).await {
                    Some(items) => SearchState::Results { query, items },
                    None => SearchState::Failed { query },
                };
                tx.send_replace(next);
            }
        });

        Self {
            debouncer,
            state,
            task,
        }
    }

    /// Current contents of the search box
    pub fn set_query(&self, query: impl Into<String>) {
        self.debouncer.push(query.into());
    }

    pub fn state(&self) -> SearchState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SearchState> {
        self.state.clone()
    }
}

impl Drop for SearchSession {
    fn drop(&mut self) {
        self.task.abort();
    }
}
