//! Filterable grid session
//!
//! Owns a [`CatalogLoader`] for one mounted grid. Filter changes are debounced
//! before they reset pagination; scroll events request the next page. Fetches
//! run concurrently with event handling so scroll bursts during a load are
//! simply ignored by the loader.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, warn};

use crate::constants::{FILTER_DEBOUNCE, SCROLL_THRESHOLD_PX};
use crate::debounce::Debouncer;
use crate::loader::{CatalogLoader, LoadState, PageRequest, PageSource};
use crate::models::{CatalogItem, CatalogPage, FilterState};

/// Tuning of a grid session
#[derive(Debug, Clone, Copy)]
pub struct GridOptions {
    pub debounce: Duration,
    pub scroll_threshold: u32,
}

impl Default for GridOptions {
    fn default() -> Self {
        Self {
            debounce: FILTER_DEBOUNCE,
            scroll_threshold: SCROLL_THRESHOLD_PX,
        }
    }
}

/// Published state of the grid
#[derive(Debug, Clone, PartialEq)]
pub struct GridSnapshot {
    pub state: LoadState,
    pub items: Vec<CatalogItem>,
    pub page: u32,
    pub filters: FilterState,
}

impl GridSnapshot {
    fn of(loader: &CatalogLoader) -> Self {
        Self {
            state: loader.state(),
            items: loader.items().to_vec(),
            page: loader.current_page(),
            filters: loader.filters().clone(),
        }
    }
}

enum GridEvent {
    FiltersChanged(FilterState),
    NearBottom(u32),
}

/// Handle to a running grid. Dropping it unmounts the grid.
pub struct GridSession {
    events: mpsc::UnboundedSender<GridEvent>,
    snapshots: watch::Receiver<GridSnapshot>,
    task: JoinHandle<()>,
}

impl GridSession {
    /// Mount a grid: page 1 of `filters` is requested right away
    pub fn spawn<S>(source: Arc<S>, filters: FilterState, options: GridOptions) -> Self
    where
        S: PageSource + 'static,
    {
        let (events, events_rx) = mpsc::unbounded_channel();
        let mut loader = CatalogLoader::new(FilterState::default());
        let first = loader.reset(filters);
        let (tx, snapshots) = watch::channel(GridSnapshot::of(&loader));
        let task = tokio::spawn(run(source, loader, first, options, events_rx, tx));
        Self {
            events,
            snapshots,
            task,
        }
    }

    /// Report a filter change; applied after the debounce delay
    pub fn set_filters(&self, filters: FilterState) {
        self.send(GridEvent::FiltersChanged(filters));
    }

    /// Report the distance (px) between the viewport and the grid bottom
    pub fn near_bottom(&self, distance: u32) {
        self.send(GridEvent::NearBottom(distance));
    }

    fn send(&self, event: GridEvent) {
        if self.events.send(event).is_err() {
            debug!("Grid session already stopped");
        }
    }

    pub fn snapshot(&self) -> GridSnapshot {
        self.snapshots.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<GridSnapshot> {
        self.snapshots.clone()
    }
}

impl Drop for GridSession {
    fn drop(&mut self) {
        self.task.abort();
    }
}

type Fetched = (PageRequest, Option<CatalogPage>);

fn spawn_fetch<S: PageSource + 'static>(
    fetches: &mut JoinSet<Fetched>,
    source: &Arc<S>,
    request: PageRequest,
) {
    let source = Arc::clone(source);
    fetches.spawn(async move {
        let result = source.fetch_page(request.page, &request.filters).await;
        (request, result)
    });
}

async fn run<S: PageSource + 'static>(
    source: Arc<S>,
    mut loader: CatalogLoader,
    first: PageRequest,
    options: GridOptions,
    mut events: mpsc::UnboundedReceiver<GridEvent>,
    tx: watch::Sender<GridSnapshot>,
) {
    let (debouncer, mut settled) = Debouncer::new(options.debounce);
    let mut fetches = JoinSet::new();
    spawn_fetch(&mut fetches, &source, first.clone());
    let mut in_flight = Some(first);

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Some(GridEvent::FiltersChanged(filters)) => debouncer.push(filters),
                Some(GridEvent::NearBottom(distance)) => {
                    if let Some(request) = loader.on_scroll(distance, options.scroll_threshold) {
                        debug!(page = request.page, "Loading next grid page");
                        spawn_fetch(&mut fetches, &source, request.clone());
                        in_flight = Some(request);
                        tx.send_replace(GridSnapshot::of(&loader));
                    }
                }
                None => break,
            },
            Some(filters) = settled.recv() => {
                if filters == *loader.filters() {
                    continue;
                }
                let request = loader.reset(filters);
                debug!("Filters changed, reloading grid from page 1");
                spawn_fetch(&mut fetches, &source, request.clone());
                in_flight = Some(request);
                tx.send_replace(GridSnapshot::of(&loader));
            },
            Some(joined) = fetches.join_next(), if !fetches.is_empty() => {
                let (request, result) = match joined {
                    Ok(fetched) => fetched,
                    Err(e) => {
                        warn!("Grid page fetch aborted: {}", e);
                        match in_flight.clone() {
                            Some(request) => (request, None),
                            None => continue,
                        }
                    }
                };
                if loader.complete(&request, result) {
                    in_flight = None;
                    tx.send_replace(GridSnapshot::of(&loader));
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::fakes::FakePages;
    use crate::loader::ExhaustReason;
    use tokio::time::sleep;

    async fn settle(rx: &mut watch::Receiver<GridSnapshot>) -> GridSnapshot {
        rx.wait_for(|s| s.state != LoadState::Loading)
            .await
            .unwrap()
            .clone()
    }

    #[tokio::test(start_paused = true)]
    async fn test_mount_loads_first_page() {
        let source = Arc::new(FakePages::uniform(2, 24));
        let session = GridSession::spawn(source.clone(), FilterState::default(), GridOptions::default());
        let mut rx = session.subscribe();

        let snapshot = settle(&mut rx).await;
        assert_eq!(snapshot.state, LoadState::Idle);
        assert_eq!(snapshot.items.len(), 24);
        assert_eq!(snapshot.page, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_scroll_appends_until_exhausted() {
        let source = Arc::new(FakePages::uniform(2, 24));
        let session = GridSession::spawn(source.clone(), FilterState::default(), GridOptions::default());
        let mut rx = session.subscribe();
        settle(&mut rx).await;

        session.near_bottom(900);
        session.near_bottom(300);
        session.near_bottom(100);
        sleep(Duration::from_millis(10)).await;
        let snapshot = settle(&mut rx).await;

        assert_eq!(snapshot.items.len(), 48);
        assert_eq!(snapshot.state, LoadState::Exhausted(ExhaustReason::LastPage));
        let pages: Vec<u32> = source.calls().into_iter().map(|(page, _)| page).collect();
        assert_eq!(pages, vec![1, 2]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_filter_burst_triggers_one_reload() {
        let source = Arc::new(FakePages::uniform(3, 24));
        let session = GridSession::spawn(source.clone(), FilterState::default(), GridOptions::default());
        let mut rx = session.subscribe();
        settle(&mut rx).await;

        session.set_filters(FilterState::with_types(["tv"]));
        sleep(Duration::from_millis(100)).await;
        session.set_filters(FilterState::with_types(["ova"]));
        sleep(Duration::from_millis(100)).await;
        session.set_filters(FilterState::with_types(["movie"]));
        sleep(Duration::from_millis(600)).await;

        let snapshot = settle(&mut rx).await;
        assert_eq!(snapshot.filters, FilterState::with_types(["movie"]));
        assert_eq!(snapshot.page, 1);

        let calls = source.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1], (1, FilterState::with_types(["movie"])));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_first_page_is_exhausted() {
        let source = Arc::new(FakePages::default());
        let session = GridSession::spawn(source, FilterState::default(), GridOptions::default());
        let mut rx = session.subscribe();

        let snapshot = settle(&mut rx).await;
        assert!(snapshot.items.is_empty());
        assert_eq!(snapshot.state, LoadState::Exhausted(ExhaustReason::Failed));
    }
}
