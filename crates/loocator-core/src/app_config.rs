use crate::geo::GeoPoint;
use crate::region::RefetchThreshold;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub api_base_url: String,
    pub log_level: String,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub map_debounce_ms: u64,
    pub list_debounce_ms: u64,
    pub refetch_min_distance_m: f64,
    pub refetch_delta_ratio: f64,
    pub list_per_page: u32,
    pub marker_per_page: u32,
    pub nearby_radius_km: f64,
    pub default_center_lat: f64,
    pub default_center_lng: f64,
    pub default_radius_km: f64,
}

impl AppConfig {
    #[must_use]
    pub fn refetch_threshold(&self) -> RefetchThreshold {
        RefetchThreshold {
            min_distance_m: self.refetch_min_distance_m,
            delta_ratio: self.refetch_delta_ratio,
        }
    }

    #[must_use]
    pub fn default_center(&self) -> GeoPoint {
        GeoPoint::new(self.default_center_lat, self.default_center_lng)
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // The base URL may embed basic-auth credentials or a staging token.
        let redacted_base = match self.api_base_url.split_once('@') {
            Some((_, host)) => format!("[redacted]@{host}"),
            None => self.api_base_url.clone(),
        };
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("api_base_url", &redacted_base)
            .field("log_level", &self.log_level)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("map_debounce_ms", &self.map_debounce_ms)
            .field("list_debounce_ms", &self.list_debounce_ms)
            .field("refetch_min_distance_m", &self.refetch_min_distance_m)
            .field("refetch_delta_ratio", &self.refetch_delta_ratio)
            .field("list_per_page", &self.list_per_page)
            .field("marker_per_page", &self.marker_per_page)
            .field("nearby_radius_km", &self.nearby_radius_km)
            .field("default_center_lat", &self.default_center_lat)
            .field("default_center_lng", &self.default_center_lng)
            .field("default_radius_km", &self.default_radius_km)
            .finish()
    }
}
