//! Request lifecycle shared by [`crate::DiscoveryStore`] and
//! [`crate::NearbyListSheet`].
//!
//! A `Pager` owns the page source, the coordinator, the mutable state and the
//! snapshot channel. Every state write happens through [`Pager::update`],
//! which publishes a fresh snapshot before releasing the lock.
//!
//! Lock order is coordinator, then state. Completions write state from inside
//! [`crate::Ticket::apply_if_current`]; nothing calls the coordinator while
//! holding the state lock.

use std::sync::Arc;
use std::time::Duration;

use loocator_core::Listing;
use parking_lot::Mutex;
use tokio::sync::watch;

use crate::coordinator::{QueryCoordinator, Ticket};
use crate::pagination::Paginated;
use crate::source::PageSource;

/// Coordinator key for the single result stream a pager manages.
pub(crate) const RESULTS_KEY: &str = "results";

/// Which spinner a page-1 load drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Spinner {
    Loading,
    Refreshing,
}

/// State a pager can load pages into.
pub(crate) trait PagedState: Send + 'static {
    type Item: Listing + Clone + std::fmt::Debug + Send + Sync + 'static;
    type Query: Send + Sync;
    type Snapshot: Clone + Send + Sync + 'static;

    fn results(&self) -> &Paginated<Self::Item>;
    fn results_mut(&mut self) -> &mut Paginated<Self::Item>;
    /// Query for `page` in the current context, `None` if there is nothing to
    /// search for yet.
    fn query_for(&self, page: u32) -> Option<Self::Query>;
    fn snapshot(&self) -> Self::Snapshot;
}

pub(crate) struct Pager<S, C: PagedState> {
    source: S,
    coordinator: QueryCoordinator<&'static str>,
    state: Mutex<C>,
    snapshots: watch::Sender<C::Snapshot>,
}

impl<S, C> Pager<S, C>
where
    S: PageSource<Query = C::Query, Item = C::Item>,
    C: PagedState,
{
    pub(crate) fn new(source: S, state: C) -> Self {
        let (snapshots, _) = watch::channel(state.snapshot());
        Self {
            source,
            coordinator: QueryCoordinator::new(),
            state: Mutex::new(state),
            snapshots,
        }
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<C::Snapshot> {
        self.snapshots.subscribe()
    }

    pub(crate) fn snapshot(&self) -> C::Snapshot {
        self.snapshots.borrow().clone()
    }

    /// Mutates the state under its lock and publishes the result.
    pub(crate) fn update<R>(&self, mutate: impl FnOnce(&mut C) -> R) -> R {
        let mut state = self.state.lock();
        let out = mutate(&mut state);
        self.snapshots.send_replace(state.snapshot());
        out
    }

    /// Reads the state without publishing.
    pub(crate) fn read<R>(&self, read: impl FnOnce(&C) -> R) -> R {
        read(&self.state.lock())
    }

    /// Schedules a page-1 load after `delay`, replacing any pending one.
    pub(crate) fn schedule_first(self: &Arc<Self>, delay: Duration) {
        let pager = Arc::clone(self);
        self.coordinator
            .schedule(RESULTS_KEY, delay, move |ticket| async move {
                pager.load_first(ticket, Spinner::Loading).await;
            });
    }

    /// Loads page 1 immediately, superseding anything pending or in flight.
    pub(crate) async fn run_first(&self, spinner: Spinner) {
        let _ = self
            .coordinator
            .run_now(RESULTS_KEY, |ticket| self.load_first(ticket, spinner))
            .await;
    }

    /// Loads the following page. No-op while a request is running or a
    /// page-1 load is pending, and once the last page has been loaded.
    pub(crate) async fn fetch_next(&self) {
        let ready = self.read(|state| {
            let results = state.results();
            !results.is_busy() && results.has_more()
        });
        if !ready || self.coordinator.is_scheduled(&RESULTS_KEY) {
            return;
        }
        let _ = self
            .coordinator
            .run_now(RESULTS_KEY, |ticket| self.load_next(ticket))
            .await;
    }

    /// Cancels pending and in-flight work and empties the results.
    pub(crate) fn clear(&self) {
        self.coordinator.cancel(&RESULTS_KEY);
        self.update(|state| state.results_mut().clear());
    }

    pub(crate) fn cancel_all(&self) {
        self.coordinator.cancel_all();
    }

    async fn load_first(&self, ticket: Ticket<&'static str>, spinner: Spinner) {
        let query = ticket.apply_if_current(|| {
            self.update(|state| {
                let query = state.query_for(1)?;
                let results = state.results_mut();
                results.loading = spinner == Spinner::Loading;
                results.refreshing = spinner == Spinner::Refreshing;
                results.error = None;
                Some(query)
            })
        });
        let Some(Some(query)) = query else {
            return;
        };

        tracing::debug!(generation = ticket.generation(), ?spinner, "loading first page");
        let result = self.source.fetch_page(&query).await;

        ticket.apply_if_current(|| {
            self.update(|state| {
                let results = state.results_mut();
                results.loading = false;
                results.refreshing = false;
                match result {
                    Ok(page) => {
                        tracing::debug!(
                            items = page.items.len(),
                            total = page.total,
                            "first page applied"
                        );
                        results.replace(page);
                    }
                    Err(error) => {
                        tracing::warn!(%error, "first page request failed");
                        results.fail_first(error.user_message());
                    }
                }
            });
        });
    }

    async fn load_next(&self, ticket: Ticket<&'static str>) {
        let query = ticket.apply_if_current(|| {
            self.update(|state| {
                let next_page = state.results().page + 1;
                let query = state.query_for(next_page)?;
                let results = state.results_mut();
                results.loading = true;
                results.error = None;
                Some((next_page, query))
            })
        });
        let Some(Some((page, query))) = query else {
            return;
        };

        tracing::debug!(generation = ticket.generation(), page, "loading next page");
        let result = self.source.fetch_page(&query).await;

        ticket.apply_if_current(|| {
            self.update(|state| {
                let results = state.results_mut();
                results.loading = false;
                match result {
                    Ok(next) => results.append(page, next),
                    Err(error) => {
                        tracing::warn!(%error, page, "next page request failed");
                        results.error = Some(error.user_message());
                    }
                }
            });
        });
    }
}
