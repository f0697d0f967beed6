//! Bottom sheet listing toilets around a tapped point.
//!
//! Independent of the map store: it searches a fixed radius around its
//! anchor, keeps its own filters and pagination, and does nothing while
//! closed.

use std::sync::Arc;

use loocator_api::NearbyQuery;
use loocator_core::{GeoPoint, Listing, SearchFilters};
use tokio::sync::watch;

use crate::pagination::Paginated;
use crate::pager::{PagedState, Pager, Spinner};
use crate::settings::NearbySettings;
use crate::source::PageSource;

/// Published view of the sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct NearbySnapshot<T> {
    pub open: bool,
    pub anchor: Option<GeoPoint>,
    pub filters: SearchFilters,
    pub radius_km: f64,
    pub items: Vec<T>,
    pub page: u32,
    pub per_page: u32,
    pub total: u64,
    pub has_more: bool,
    pub loading: bool,
    pub refreshing: bool,
    pub error: Option<String>,
}

struct SheetState<T> {
    settings: NearbySettings,
    open: bool,
    anchor: Option<GeoPoint>,
    filters: SearchFilters,
    results: Paginated<T>,
}

impl<T> PagedState for SheetState<T>
where
    T: Listing + Clone + std::fmt::Debug + Send + Sync + 'static,
{
    type Item = T;
    type Query = NearbyQuery;
    type Snapshot = NearbySnapshot<T>;

    fn results(&self) -> &Paginated<T> {
        &self.results
    }

    fn results_mut(&mut self) -> &mut Paginated<T> {
        &mut self.results
    }

    fn query_for(&self, page: u32) -> Option<NearbyQuery> {
        if !self.open {
            return None;
        }
        Some(NearbyQuery {
            anchor: self.anchor?,
            radius_km: self.settings.radius_km,
            filters: self.filters.clone(),
            page,
            per_page: self.settings.per_page,
        })
    }

    fn snapshot(&self) -> NearbySnapshot<T> {
        NearbySnapshot {
            open: self.open,
            anchor: self.anchor,
            filters: self.filters.clone(),
            radius_km: self.settings.radius_km,
            items: self.results.items.clone(),
            page: self.results.page,
            per_page: self.results.per_page,
            total: self.results.total,
            has_more: self.results.has_more(),
            loading: self.results.loading,
            refreshing: self.results.refreshing,
            error: self.results.error.clone(),
        }
    }
}

/// "Toilets near here" list over a [`PageSource`].
///
/// Dropping the sheet cancels its pending timer and in-flight request.
pub struct NearbyListSheet<S>
where
    S: PageSource<Query = NearbyQuery>,
{
    pager: Arc<Pager<S, SheetState<S::Item>>>,
    settings: NearbySettings,
}

impl<S> std::fmt::Debug for NearbyListSheet<S>
where
    S: PageSource<Query = NearbyQuery>,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NearbyListSheet")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl<S> NearbyListSheet<S>
where
    S: PageSource<Query = NearbyQuery>,
{
    #[must_use]
    pub fn new(source: S, settings: NearbySettings) -> Self {
        let state = SheetState {
            settings: settings.clone(),
            open: false,
            anchor: None,
            filters: SearchFilters::default(),
            results: Paginated::new(settings.per_page),
        };
        Self {
            pager: Arc::new(Pager::new(source, state)),
            settings,
        }
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<NearbySnapshot<S::Item>> {
        self.pager.subscribe()
    }

    #[must_use]
    pub fn snapshot(&self) -> NearbySnapshot<S::Item> {
        self.pager.snapshot()
    }

    /// Opens the sheet on `anchor` and loads the first page around it.
    ///
    /// Reopening on a new anchor replaces the previous results. Non-finite
    /// anchors are ignored.
    pub async fn open(&self, anchor: GeoPoint) {
        if !anchor.is_finite() {
            tracing::warn!(?anchor, "ignoring non-finite nearby anchor");
            return;
        }
        self.pager.update(|state| {
            state.open = true;
            state.anchor = Some(anchor);
            state.results.clear();
        });
        self.pager.run_first(Spinner::Loading).await;
    }

    /// Closes the sheet, cancelling outstanding work and dropping results.
    pub fn close(&self) {
        self.pager.clear();
        self.pager.update(|state| {
            state.open = false;
            state.anchor = None;
        });
    }

    /// Replaces the filters. While open, schedules a page-1 reload when they
    /// actually changed.
    pub fn set_filters(&self, filters: SearchFilters) {
        let reload = self.pager.update(|state| {
            let changed = state.filters.stable_key() != filters.stable_key();
            state.filters = filters;
            state.open && changed
        });
        if reload {
            self.pager.schedule_first(self.settings.debounce);
        }
    }

    pub async fn fetch_next(&self) {
        self.pager.fetch_next().await;
    }

    pub async fn refresh(&self) {
        self.pager.run_first(Spinner::Refreshing).await;
    }
}

impl<S> Drop for NearbyListSheet<S>
where
    S: PageSource<Query = NearbyQuery>,
{
    fn drop(&mut self) {
        self.pager.cancel_all();
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::testing::{config, settle, FakeSource};

    type Source = FakeSource<NearbyQuery>;

    fn sheet(total: u64) -> (NearbyListSheet<Source>, Source) {
        let source = FakeSource::new(total);
        let sheet = NearbyListSheet::new(source.clone(), NearbySettings::from_config(&config()));
        (sheet, source)
    }

    fn oran() -> GeoPoint {
        GeoPoint::new(35.6971, -0.6308)
    }

    #[tokio::test(start_paused = true)]
    async fn open_loads_first_page_with_fixed_radius() {
        let (sheet, source) = sheet(30);
        sheet.open(oran()).await;

        let queries = source.queries();
        assert_eq!(queries.len(), 1);
        assert_eq!(queries[0].anchor, oran());
        assert!((queries[0].radius_km - 5.0).abs() < f64::EPSILON);
        assert_eq!(queries[0].page, 1);

        let snapshot = sheet.snapshot();
        assert!(snapshot.open);
        assert_eq!(snapshot.items.len(), 20);
        assert!(snapshot.has_more);
    }

    #[tokio::test(start_paused = true)]
    async fn filters_only_refetch_while_open() {
        let (sheet, source) = sheet(30);

        sheet.set_filters(SearchFilters {
            is_free: Some(true),
            ..SearchFilters::default()
        });
        settle().await;
        assert!(source.queries().is_empty());

        sheet.open(oran()).await;
        assert_eq!(source.queries()[0].filters.is_free, Some(true));
        assert!(sheet.snapshot().items.iter().all(|t| t.is_free));

        sheet.set_filters(SearchFilters::default());
        settle().await;
        let queries = source.queries();
        assert_eq!(queries.len(), 2);
        assert_eq!(queries[1].filters.is_free, None);
        assert!(sheet.snapshot().items.iter().all(|t| t.id < 1000));
    }

    #[tokio::test(start_paused = true)]
    async fn unchanged_filters_do_not_reload() {
        let (sheet, source) = sheet(30);
        sheet.set_filters(SearchFilters {
            amenities: vec!["wheelchair".into(), "baby change".into()],
            ..SearchFilters::default()
        });
        sheet.open(oran()).await;
        sheet.fetch_next().await;

        sheet.set_filters(SearchFilters {
            amenities: vec!["baby change".into(), "wheelchair".into()],
            ..SearchFilters::default()
        });
        settle().await;

        assert_eq!(source.queries().len(), 2);
        assert_eq!(sheet.snapshot().items.len(), 30);
    }

    #[tokio::test(start_paused = true)]
    async fn paging_follows_store_rules() {
        let (sheet, source) = sheet(30);
        sheet.open(oran()).await;

        sheet.fetch_next().await;
        let snapshot = sheet.snapshot();
        assert_eq!(snapshot.items.len(), 30);
        assert!(!snapshot.has_more);

        sheet.fetch_next().await;
        assert_eq!(source.queries().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn close_cancels_in_flight_and_ignores_late_results() {
        let (sheet, source) = sheet(30);
        source.delay_next([Duration::from_millis(500)]);

        let probe = async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            assert!(sheet.snapshot().loading);
            sheet.close();
        };
        tokio::join!(sheet.open(oran()), probe);
        settle().await;

        let snapshot = sheet.snapshot();
        assert!(!snapshot.open);
        assert!(snapshot.items.is_empty());
        assert!(!snapshot.loading);

        sheet.refresh().await;
        sheet.fetch_next().await;
        assert_eq!(source.queries().len(), 1, "closed sheet makes no requests");
    }

    #[tokio::test(start_paused = true)]
    async fn reopening_replaces_results() {
        let (sheet, source) = sheet(3);
        sheet.open(oran()).await;
        let algiers = GeoPoint::new(36.7538, 3.0588);
        sheet.open(algiers).await;

        assert_eq!(source.queries().len(), 2);
        let snapshot = sheet.snapshot();
        assert_eq!(snapshot.anchor, Some(algiers));
        assert_eq!(snapshot.items.len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn refresh_reports_failure_without_dropping_items() {
        let (sheet, source) = sheet(3);
        sheet.open(oran()).await;
        source.fail_next([true]);

        sheet.refresh().await;
        let snapshot = sheet.snapshot();
        assert_eq!(snapshot.items.len(), 3);
        assert!(!snapshot.refreshing);
        assert!(snapshot.error.is_some());
    }
}
