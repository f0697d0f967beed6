//! Page-number pagination state shared by the discovery store and the nearby
//! sheet.
//!
//! Items accumulate across pages in server order. Merging is keyed by
//! [`Listing::listing_id`]: the first occurrence of an id wins, so a record
//! that shifts between pages while the user scrolls is never shown twice and
//! `items` only ever grows between page-1 loads.

use std::collections::HashSet;

use loocator_api::ResultPage;
use loocator_core::{Listing, ListingId};

/// Accumulated results plus the request flags a list view renders.
#[derive(Debug, Clone, PartialEq)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub per_page: u32,
    pub total: u64,
    pub loading: bool,
    pub refreshing: bool,
    pub error: Option<String>,
    /// Set when the last page-1 load failed: `items` belong to an older
    /// search, so no further page may be appended to them.
    pub stale: bool,
}

impl<T: Listing> Paginated<T> {
    #[must_use]
    pub fn new(per_page: u32) -> Self {
        Self {
            items: Vec::new(),
            page: 1,
            per_page,
            total: 0,
            loading: false,
            refreshing: false,
            error: None,
            stale: false,
        }
    }

    /// `page * per_page < total`, and never while the items are stale.
    #[must_use]
    pub fn has_more(&self) -> bool {
        !self.stale && u64::from(self.page) * u64::from(self.per_page) < self.total
    }

    /// True while either spinner is showing.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.loading || self.refreshing
    }

    /// Replaces the items with a freshly loaded first page.
    pub fn replace(&mut self, result: ResultPage<T>) {
        self.items.clear();
        merge_unique(&mut self.items, result.items);
        self.page = result.page.max(1);
        self.per_page = result.per_page;
        self.total = result.total;
        self.error = None;
        self.stale = false;
    }

    /// Keeps the items on screen but closes paging until page 1 loads.
    pub fn fail_first(&mut self, message: String) {
        self.error = Some(message);
        self.stale = true;
    }

    /// Appends the requested `page`, skipping ids already present. The page
    /// counter follows the request, not the server's echo.
    pub fn append(&mut self, page: u32, result: ResultPage<T>) {
        merge_unique(&mut self.items, result.items);
        self.page = page;
        self.per_page = result.per_page;
        self.total = result.total;
        self.error = None;
    }

    /// Drops all results and resets paging; keeps `per_page`.
    pub fn clear(&mut self) {
        self.items.clear();
        self.page = 1;
        self.total = 0;
        self.loading = false;
        self.refreshing = false;
        self.error = None;
        self.stale = false;
    }
}

/// Appends `incoming` to `existing` in order, skipping any item whose id is
/// already present in either.
pub fn merge_unique<T: Listing>(existing: &mut Vec<T>, incoming: Vec<T>) {
    let mut seen: HashSet<ListingId> = existing.iter().map(Listing::listing_id).collect();
    existing.reserve(incoming.len());
    for item in incoming {
        if seen.insert(item.listing_id()) {
            existing.push(item);
        }
    }
}
