mod app_config;
pub mod area;
mod config;
mod de;
pub mod filters;
pub mod geo;
pub mod listing;
pub mod logging;
pub mod region;

pub use app_config::{AppConfig, Environment};
pub use area::{AdministrativeArea, BoundingBox, LocalizedNames};
pub use config::{load_app_config, load_app_config_from_env};
pub use filters::SearchFilters;
pub use geo::{GeoPoint, SearchCenter};
pub use listing::{Listing, ListingId, Marker, Toilet};
pub use region::{RefetchThreshold, Region};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
