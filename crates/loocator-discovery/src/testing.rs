//! Scripted in-memory page sources for store and sheet tests.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use loocator_api::{NearbyQuery, ResultPage, SearchError, SearchQuery};
use loocator_core::{AppConfig, Environment, Marker, Toilet};
use parking_lot::Mutex;

use crate::source::PageSource;

pub(crate) fn config() -> AppConfig {
    AppConfig {
        env: Environment::Test,
        api_base_url: "http://localhost:9".to_string(),
        log_level: "debug".to_string(),
        request_timeout_secs: 5,
        user_agent: "loocator-test/0.1".to_string(),
        map_debounce_ms: 350,
        list_debounce_ms: 0,
        refetch_min_distance_m: 300.0,
        refetch_delta_ratio: 0.25,
        list_per_page: 20,
        marker_per_page: 500,
        nearby_radius_km: 5.0,
        default_center_lat: 36.7538,
        default_center_lng: 3.0588,
        default_radius_km: 30.0,
    }
}

/// Lets every pending timer and request run to completion. Tests using it
/// must run with paused time.
pub(crate) async fn settle() {
    tokio::time::sleep(Duration::from_secs(5)).await;
}

struct Script<Q> {
    total: u64,
    queries: Mutex<Vec<Q>>,
    delays: Mutex<VecDeque<Duration>>,
    failures: Mutex<VecDeque<bool>>,
}

/// Serves `total` sequential ids in pages, recording every query.
///
/// Responses are offset by 1000 when the query asks for free toilets only,
/// so tests can tell which context a page was loaded for.
pub(crate) struct FakeSource<Q> {
    script: Arc<Script<Q>>,
}

impl<Q> Clone for FakeSource<Q> {
    fn clone(&self) -> Self {
        Self {
            script: Arc::clone(&self.script),
        }
    }
}

impl<Q: Clone> FakeSource<Q> {
    pub(crate) fn new(total: u64) -> Self {
        Self {
            script: Arc::new(Script {
                total,
                queries: Mutex::new(Vec::new()),
                delays: Mutex::new(VecDeque::new()),
                failures: Mutex::new(VecDeque::new()),
            }),
        }
    }

    /// Delays for the next calls, in call order. Calls beyond the list
    /// respond immediately.
    pub(crate) fn delay_next(&self, delays: impl IntoIterator<Item = Duration>) {
        self.script.delays.lock().extend(delays);
    }

    /// Outcomes for the next calls, in call order: `true` fails with a 503.
    pub(crate) fn fail_next(&self, failures: impl IntoIterator<Item = bool>) {
        self.script.failures.lock().extend(failures);
    }

    pub(crate) fn queries(&self) -> Vec<Q> {
        self.script.queries.lock().clone()
    }

    async fn respond<T>(
        &self,
        query: &Q,
        page: u32,
        per_page: u32,
        free_only: bool,
        make: impl Fn(i64) -> T,
    ) -> Result<ResultPage<T>, SearchError> {
        self.script.queries.lock().push(query.clone());
        let delay = self.script.delays.lock().pop_front();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.script.failures.lock().pop_front().unwrap_or(false) {
            return Err(SearchError::Status {
                status: 503,
                url: "http://localhost:9/toilets".to_string(),
            });
        }

        let base: i64 = if free_only { 1000 } else { 0 };
        let start = u64::from(page.saturating_sub(1)) * u64::from(per_page);
        let end = (u64::from(page) * u64::from(per_page)).min(self.script.total);
        let items = (start..end)
            .map(|n| make(base + i64::try_from(n).unwrap() + 1))
            .collect();
        Ok(ResultPage {
            items,
            page,
            per_page,
            total: self.script.total,
        })
    }
}

pub(crate) fn marker(id: i64) -> Marker {
    Marker {
        id,
        lat: 36.75,
        lng: 3.05,
        is_free: id >= 1000,
        distance_km: None,
    }
}

pub(crate) fn toilet(id: i64) -> Toilet {
    Toilet {
        id,
        name: format!("Toilet {id}"),
        address: None,
        lat: 36.76,
        lng: 3.06,
        is_free: id >= 1000,
        access_method: None,
        pricing_model: None,
        price: None,
        rating: None,
        reviews_count: 0,
        amenities: Vec::new(),
        category: None,
        distance_km: Some(0.5),
    }
}

#[async_trait]
impl PageSource for FakeSource<SearchQuery> {
    type Query = SearchQuery;
    type Item = Marker;

    async fn fetch_page(&self, query: &SearchQuery) -> Result<ResultPage<Marker>, SearchError> {
        let free_only = query.filters.is_free == Some(true);
        self.respond(query, query.page, query.per_page, free_only, marker)
            .await
    }
}

#[async_trait]
impl PageSource for FakeSource<NearbyQuery> {
    type Query = NearbyQuery;
    type Item = Toilet;

    async fn fetch_page(&self, query: &NearbyQuery) -> Result<ResultPage<Toilet>, SearchError> {
        let free_only = query.filters.is_free == Some(true);
        self.respond(query, query.page, query.per_page, free_only, toilet)
            .await
    }
}
