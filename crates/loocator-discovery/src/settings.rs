use std::time::Duration;

use loocator_api::query::DEFAULT_SORT;
use loocator_api::SortOrder;
use loocator_core::{AppConfig, GeoPoint, RefetchThreshold};

/// Tuning for one [`crate::DiscoveryStore`].
#[derive(Debug, Clone, PartialEq)]
pub struct DiscoverySettings {
    pub per_page: u32,
    /// Quiet period before a context change triggers a page-1 fetch.
    pub debounce: Duration,
    pub use_bbox: Option<bool>,
    pub with_distance: Option<bool>,
    pub sort: String,
    pub order: SortOrder,
    pub refetch_threshold: RefetchThreshold,
    pub default_center: GeoPoint,
    pub default_radius_km: f64,
}

impl DiscoverySettings {
    /// Marker search behind the map: large pages, bounding-box search, and a
    /// debounce long enough to swallow a pan gesture.
    #[must_use]
    pub fn map(config: &AppConfig) -> Self {
        Self {
            per_page: config.marker_per_page,
            debounce: Duration::from_millis(config.map_debounce_ms),
            use_bbox: Some(true),
            with_distance: None,
            ..Self::base(config)
        }
    }

    /// Full-record list search: regular pages with distances, no debounce.
    #[must_use]
    pub fn list(config: &AppConfig) -> Self {
        Self {
            per_page: config.list_per_page,
            debounce: Duration::from_millis(config.list_debounce_ms),
            use_bbox: None,
            with_distance: Some(true),
            ..Self::base(config)
        }
    }

    fn base(config: &AppConfig) -> Self {
        Self {
            per_page: config.list_per_page,
            debounce: Duration::ZERO,
            use_bbox: None,
            with_distance: None,
            sort: DEFAULT_SORT.to_string(),
            order: SortOrder::Asc,
            refetch_threshold: config.refetch_threshold(),
            default_center: config.default_center(),
            default_radius_km: config.default_radius_km,
        }
    }
}

/// Tuning for the [`crate::NearbyListSheet`].
#[derive(Debug, Clone, PartialEq)]
pub struct NearbySettings {
    pub per_page: u32,
    /// Fixed search radius around the anchor, independent of the map zoom.
    pub radius_km: f64,
    pub debounce: Duration,
}

impl NearbySettings {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            per_page: config.list_per_page,
            radius_km: config.nearby_radius_km,
            debounce: Duration::from_millis(config.list_debounce_ms),
        }
    }
}
