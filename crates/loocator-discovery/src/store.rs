//! Search context and paginated results behind the map and list views.
//!
//! A [`DiscoveryStore`] tracks the selected area, filters, search center and
//! viewport. Context changes that alter the [`QueryKey`] schedule exactly one
//! debounced page-1 fetch; later pages append with id dedup. State is
//! published to subscribers through a `watch` channel after every mutation.

use std::sync::Arc;

use loocator_api::SearchQuery;
use loocator_core::geo::{radius_km_for_region, region_from_center};
use loocator_core::region::{has_moved_enough, region_from_area, sanitize_region};
use loocator_core::{AdministrativeArea, Region, SearchCenter, SearchFilters};
use tokio::sync::watch;

use crate::pagination::Paginated;
use crate::pager::{PagedState, Pager, Spinner};
use crate::query_key::QueryKey;
use crate::settings::DiscoverySettings;
use crate::source::PageSource;

/// Published view of a store.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscoverySnapshot<T> {
    pub selected_area: Option<AdministrativeArea>,
    pub filters: SearchFilters,
    pub center: Option<SearchCenter>,
    pub region: Region,
    pub items: Vec<T>,
    pub page: u32,
    pub per_page: u32,
    pub total: u64,
    pub has_more: bool,
    pub loading: bool,
    pub refreshing: bool,
    pub error: Option<String>,
}

struct DiscoveryState<T> {
    settings: DiscoverySettings,
    selected_area: Option<AdministrativeArea>,
    filters: SearchFilters,
    center: Option<SearchCenter>,
    region: Region,
    /// Viewport the current search center was taken from.
    search_region: Option<Region>,
    /// Key of the last scheduled page-1 fetch.
    last_key: Option<QueryKey>,
    results: Paginated<T>,
}

impl<T> DiscoveryState<T> {
    fn query_key(&self) -> QueryKey {
        QueryKey::new(
            self.selected_area.as_ref().map(|area| area.id),
            &self.filters,
            self.center.as_ref(),
        )
    }

    /// Moves the search center to `region` and remembers it as the baseline
    /// for the movement threshold.
    fn recenter_on(&mut self, region: Region, radius_km: f64) {
        self.region = region;
        self.center = Some(SearchCenter::new(
            region.latitude,
            region.longitude,
            radius_km,
        ));
        self.search_region = Some(region);
    }
}

impl<T> PagedState for DiscoveryState<T>
where
    T: loocator_core::Listing + Clone + std::fmt::Debug + Send + Sync + 'static,
{
    type Item = T;
    type Query = SearchQuery;
    type Snapshot = DiscoverySnapshot<T>;

    fn results(&self) -> &Paginated<T> {
        &self.results
    }

    fn results_mut(&mut self) -> &mut Paginated<T> {
        &mut self.results
    }

    fn query_for(&self, page: u32) -> Option<SearchQuery> {
        Some(SearchQuery {
            area_id: self.selected_area.as_ref().map(|area| area.id),
            center: self.center,
            filters: self.filters.clone(),
            page,
            per_page: self.settings.per_page,
            sort: self.settings.sort.clone(),
            order: self.settings.order,
            use_bbox: self.settings.use_bbox,
            with_distance: self.settings.with_distance,
        })
    }

    fn snapshot(&self) -> DiscoverySnapshot<T> {
        DiscoverySnapshot {
            selected_area: self.selected_area.clone(),
            filters: self.filters.clone(),
            center: self.center,
            region: self.region,
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

/// Map or list discovery state over a [`PageSource`].
///
/// Dropping the store cancels its pending timer and in-flight request.
pub struct DiscoveryStore<S>
where
    S: PageSource<Query = SearchQuery>,
{
    pager: Arc<Pager<S, DiscoveryState<S::Item>>>,
    settings: DiscoverySettings,
}

impl<S> std::fmt::Debug for DiscoveryStore<S>
where
    S: PageSource<Query = SearchQuery>,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscoveryStore")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl<S> DiscoveryStore<S>
where
    S: PageSource<Query = SearchQuery>,
{
    /// Creates an idle store whose viewport covers the configured default
    /// center. No request is made until a fetch or context change.
    #[must_use]
    pub fn new(source: S, settings: DiscoverySettings) -> Self {
        let center = settings.default_center;
        let region = region_from_center(center.lat, center.lng, settings.default_radius_km);
        let state = DiscoveryState {
            settings: settings.clone(),
            selected_area: None,
            filters: SearchFilters::default(),
            center: None,
            region,
            search_region: None,
            last_key: None,
            results: Paginated::new(settings.per_page),
        };
        Self {
            pager: Arc::new(Pager::new(source, state)),
            settings,
        }
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<DiscoverySnapshot<S::Item>> {
        self.pager.subscribe()
    }

    #[must_use]
    pub fn snapshot(&self) -> DiscoverySnapshot<S::Item> {
        self.pager.snapshot()
    }

    /// Schedules a debounced page-1 fetch for the current context.
    ///
    /// Calls within the debounce window collapse into one request built from
    /// the context at the time the timer fires.
    pub fn fetch_first(&self) {
        self.pager.update(|state| state.last_key = Some(state.query_key()));
        self.pager.schedule_first(self.settings.debounce);
    }

    /// Loads the page after the last one loaded and appends it.
    pub async fn fetch_next(&self) {
        self.pager.fetch_next().await;
    }

    /// Reloads page 1 right away behind the pull-to-refresh spinner.
    pub async fn refresh(&self) {
        self.pager.update(|state| state.last_key = Some(state.query_key()));
        self.pager.run_first(Spinner::Refreshing).await;
    }

    /// Cancels outstanding work and empties the results. The search context
    /// is kept; the next context change refetches even if its key matches.
    pub fn clear(&self) {
        self.pager.clear();
        self.pager.update(|state| state.last_key = None);
    }

    /// Replaces the filters wholesale.
    pub fn set_filters(&self, filters: SearchFilters) {
        self.change_context(|state| state.filters = filters);
    }

    /// Selects an administrative area, or clears the selection with `None`.
    ///
    /// An area with a center or bounding box recenters the store on it; one
    /// without geometry only changes the `area_id` filter.
    pub fn select_area(&self, area: Option<AdministrativeArea>) {
        self.change_context(|state| {
            if let Some(selected) = &area {
                if let Some(region) = region_from_area(selected) {
                    let radius_km = selected
                        .center()
                        .and(selected.default_radius_km)
                        .filter(|r| r.is_finite() && *r > 0.0)
                        .unwrap_or_else(|| radius_km_for_region(&region));
                    state.recenter_on(region, radius_km);
                }
            }
            state.selected_area = area;
        });
    }

    /// Searches around an explicit point, e.g. the user's location.
    ///
    /// Non-finite centers are ignored.
    pub fn set_center(&self, center: SearchCenter) {
        if !center.is_finite() {
            tracing::warn!(?center, "ignoring non-finite search center");
            return;
        }
        self.change_context(|state| {
            let candidate = region_from_center(center.point.lat, center.point.lng, center.radius_km);
            let region = sanitize_region(&candidate, &state.region);
            state.region = region;
            state.center = Some(center);
            state.search_region = Some(region);
        });
    }

    /// Feeds a camera change from the map.
    ///
    /// The viewport always follows the camera; the search center only moves
    /// once the viewport has drifted past the refetch threshold from where the
    /// current center was taken. Non-finite regions are ignored.
    pub fn on_region_change(&self, region: Region) {
        if !region.is_finite() {
            tracing::warn!(?region, "ignoring non-finite camera region");
            return;
        }
        let threshold = self.settings.refetch_threshold;
        self.change_context(|state| {
            let next = sanitize_region(&region, &state.region);
            let moved = state
                .search_region
                .is_none_or(|last| has_moved_enough(&last, &next, &threshold));
            if moved {
                state.recenter_on(next, radius_km_for_region(&next));
            } else {
                state.region = next;
            }
        });
    }

    /// Applies a context mutation and schedules a page-1 fetch if the query
    /// key changed.
    fn change_context(&self, mutate: impl FnOnce(&mut DiscoveryState<S::Item>)) {
        let changed = self.pager.update(|state| {
            mutate(state);
            let key = state.query_key();
            if state.last_key.as_ref() == Some(&key) {
                return None;
            }
            state.last_key = Some(key.clone());
            Some(key)
        });
        if let Some(key) = changed {
            tracing::debug!(%key, debounce = ?self.settings.debounce, "search context changed");
            self.pager.schedule_first(self.settings.debounce);
        }
    }
}

impl<S> Drop for DiscoveryStore<S>
where
    S: PageSource<Query = SearchQuery>,
{
    fn drop(&mut self) {
        self.pager.cancel_all();
    }
}

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;
