//! Where pages come from.
//!
//! Stores are generic over [`PageSource`] so they can run against the HTTP
//! client in the app and against scripted in-memory sources in tests.

use std::sync::Arc;

use async_trait::async_trait;
use loocator_api::{NearbyQuery, ResultPage, SearchClient, SearchError, SearchQuery};
use loocator_core::{Listing, Marker, Toilet};

/// Fetches one page of listings for a query.
#[async_trait]
pub trait PageSource: Send + Sync + 'static {
    type Query: Send + Sync;
    type Item: Listing + Clone + std::fmt::Debug + Send + Sync + 'static;

    async fn fetch_page(&self, query: &Self::Query)
        -> Result<ResultPage<Self::Item>, SearchError>;
}

/// Map markers from `toilets/map`.
#[derive(Debug, Clone)]
pub struct MarkerFeed(pub Arc<SearchClient>);

#[async_trait]
impl PageSource for MarkerFeed {
    type Query = SearchQuery;
    type Item = Marker;

    async fn fetch_page(&self, query: &SearchQuery) -> Result<ResultPage<Marker>, SearchError> {
        self.0.search_markers(query).await
    }
}

/// Full records from `toilets`.
#[derive(Debug, Clone)]
pub struct ListingFeed(pub Arc<SearchClient>);

#[async_trait]
impl PageSource for ListingFeed {
    type Query = SearchQuery;
    type Item = Toilet;

    async fn fetch_page(&self, query: &SearchQuery) -> Result<ResultPage<Toilet>, SearchError> {
        self.0.search_toilets(query).await
    }
}

/// Records around an anchor point from `toilets/nearby`.
#[derive(Debug, Clone)]
pub struct NearbyFeed(pub Arc<SearchClient>);

#[async_trait]
impl PageSource for NearbyFeed {
    type Query = NearbyQuery;
    type Item = Toilet;

    async fn fetch_page(&self, query: &NearbyQuery) -> Result<ResultPage<Toilet>, SearchError> {
        self.0.nearby(query).await
    }
}
