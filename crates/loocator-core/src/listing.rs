//! Result records returned by the search endpoints.

use serde::{Deserialize, Serialize};

pub type ListingId = i64;

/// Anything that can appear in a paginated result list.
pub trait Listing {
    fn listing_id(&self) -> ListingId;
}

/// Minimal point record for map rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub id: ListingId,
    #[serde(deserialize_with = "crate::de::f64_required")]
    pub lat: f64,
    #[serde(deserialize_with = "crate::de::f64_required")]
    pub lng: f64,
    #[serde(default)]
    pub is_free: bool,
    #[serde(default, deserialize_with = "crate::de::f64_opt")]
    pub distance_km: Option<f64>,
}

impl Listing for Marker {
    fn listing_id(&self) -> ListingId {
        self.id
    }
}

/// Full record used by list views.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Toilet {
    pub id: ListingId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(deserialize_with = "crate::de::f64_required")]
    pub lat: f64,
    #[serde(deserialize_with = "crate::de::f64_required")]
    pub lng: f64,
    #[serde(default)]
    pub is_free: bool,
    #[serde(default)]
    pub access_method: Option<String>,
    #[serde(default)]
    pub pricing_model: Option<String>,
    #[serde(default, deserialize_with = "crate::de::f64_opt")]
    pub price: Option<f64>,
    #[serde(default, alias = "avg_rating", deserialize_with = "crate::de::f64_opt")]
    pub rating: Option<f64>,
    #[serde(default)]
    pub reviews_count: u32,
    #[serde(default)]
    pub amenities: Vec<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "crate::de::f64_opt")]
    pub distance_km: Option<f64>,
}

impl Listing for Toilet {
    fn listing_id(&self) -> ListingId {
        self.id
    }
}
