//! Query-string construction for the search endpoints.
//!
//! Parameter names and encodings are part of the backend contract:
//!
//! | Field | Parameter |
//! |-------|-----------|
//! | center | `lat`, `lng`, `radius` (km); suppresses `area_id` |
//! | area (no center) | `area_id` |
//! | `is_free` | `is_free=true\|false` |
//! | `access_method` / `pricing_model` | same name, omitted when unset |
//! | `min_rating` | `min_rating` |
//! | `amenities` / `categories` | repeated `amenities[]` / `categories[]`, omitted when empty |
//! | paging | `page`, `perPage`, `sort`, `order` |
//! | toggles | `use_bbox`, `with_distance` when set |

use loocator_core::{GeoPoint, SearchCenter, SearchFilters};

pub const DEFAULT_SORT: &str = "distance";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

/// Parameters for the viewport/area search endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchQuery {
    pub area_id: Option<i64>,
    pub center: Option<SearchCenter>,
    pub filters: SearchFilters,
    pub page: u32,
    pub per_page: u32,
    pub sort: String,
    pub order: SortOrder,
    pub use_bbox: Option<bool>,
    pub with_distance: Option<bool>,
}

impl SearchQuery {
    #[must_use]
    pub fn new(page: u32, per_page: u32) -> Self {
        Self {
            area_id: None,
            center: None,
            filters: SearchFilters::default(),
            page,
            per_page,
            sort: DEFAULT_SORT.to_string(),
            order: SortOrder::default(),
            use_bbox: None,
            with_distance: None,
        }
    }

    /// Query-string pairs in a stable order.
    #[must_use]
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        match self.center.filter(SearchCenter::is_finite) {
            // A precise center wins: intersecting "near X" with "inside area Y"
            // empties the result when the user has panned out of the area.
            Some(center) => push_center(&mut pairs, center.point, center.radius_km),
            None => {
                if let Some(area_id) = self.area_id {
                    pairs.push(("area_id", area_id.to_string()));
                }
            }
        }
        push_filters(&mut pairs, &self.filters);
        push_paging(&mut pairs, self.page, self.per_page, &self.sort, self.order);
        if let Some(use_bbox) = self.use_bbox {
            pairs.push(("use_bbox", use_bbox.to_string()));
        }
        if let Some(with_distance) = self.with_distance {
            pairs.push(("with_distance", with_distance.to_string()));
        }
        pairs
    }
}

/// Parameters for the anchor-based "near this point" endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct NearbyQuery {
    pub anchor: GeoPoint,
    pub radius_km: f64,
    pub filters: SearchFilters,
    pub page: u32,
    pub per_page: u32,
}

impl NearbyQuery {
    #[must_use]
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        push_center(&mut pairs, self.anchor, self.radius_km);
        push_filters(&mut pairs, &self.filters);
        push_paging(
            &mut pairs,
            self.page,
            self.per_page,
            DEFAULT_SORT,
            SortOrder::Asc,
        );
        pairs.push(("with_distance", "true".to_string()));
        pairs
    }
}

fn push_center(pairs: &mut Vec<(&'static str, String)>, point: GeoPoint, radius_km: f64) {
    pairs.push(("lat", point.lat.to_string()));
    pairs.push(("lng", point.lng.to_string()));
    pairs.push(("radius", radius_km.to_string()));
}

fn push_filters(pairs: &mut Vec<(&'static str, String)>, filters: &SearchFilters) {
    if let Some(is_free) = filters.is_free {
        pairs.push(("is_free", is_free.to_string()));
    }
    if let Some(access) = non_blank(filters.access_method.as_deref()) {
        pairs.push(("access_method", access.to_string()));
    }
    if let Some(pricing) = non_blank(filters.pricing_model.as_deref()) {
        pairs.push(("pricing_model", pricing.to_string()));
    }
    if let Some(rating) = filters.min_rating.filter(|r| r.is_finite()) {
        pairs.push(("min_rating", rating.to_string()));
    }
    for amenity in filters.amenities.iter().filter_map(|a| non_blank(Some(a.as_str()))) {
        pairs.push(("amenities[]", amenity.to_string()));
    }
    for category in filters.categories.iter().filter_map(|c| non_blank(Some(c.as_str()))) {
        pairs.push(("categories[]", category.to_string()));
    }
}

fn push_paging(
    pairs: &mut Vec<(&'static str, String)>,
    page: u32,
    per_page: u32,
    sort: &str,
    order: SortOrder,
) {
    pairs.push(("page", page.max(1).to_string()));
    pairs.push(("perPage", per_page.max(1).to_string()));
    pairs.push(("sort", sort.to_string()));
    pairs.push(("order", order.as_str().to_string()));
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}
