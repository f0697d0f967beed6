//! Distance and viewport-span conversions.
//!
//! Uses the flat "111 km per degree" approximation the map widgets expect,
//! with the longitude span widened by `1 / cos(latitude)` so a viewport built
//! for a radius covers roughly the same ground east-west as north-south.

use serde::{Deserialize, Serialize};

use crate::region::Region;

/// Kilometers per degree of latitude (and of longitude at the equator).
pub const KM_PER_DEGREE: f64 = 111.0;

pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Below this `cos(latitude)` the longitude conversion falls back to the
/// latitude conversion.
const POLE_COS_EPSILON: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    #[must_use]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    #[must_use]
    pub fn is_finite(self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }
}

/// A geographic search origin with its radius.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SearchCenter {
    pub point: GeoPoint,
    pub radius_km: f64,
}

impl SearchCenter {
    #[must_use]
    pub const fn new(lat: f64, lng: f64, radius_km: f64) -> Self {
        Self {
            point: GeoPoint::new(lat, lng),
            radius_km,
        }
    }

    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.point.is_finite() && self.radius_km.is_finite()
    }
}

#[must_use]
pub fn km_to_lat_delta(km: f64) -> f64 {
    km / KM_PER_DEGREE
}

#[must_use]
pub fn km_to_lng_delta(km: f64, at_latitude: f64) -> f64 {
    let denominator = KM_PER_DEGREE * at_latitude.to_radians().cos();
    if denominator.abs() < KM_PER_DEGREE * POLE_COS_EPSILON {
        return km / KM_PER_DEGREE;
    }
    km / denominator
}

/// Builds a viewport centered on `(lat, lng)` whose span is the diameter of a
/// `radius_km` circle.
#[must_use]
pub fn region_from_center(lat: f64, lng: f64, radius_km: f64) -> Region {
    let diameter = radius_km * 2.0;
    Region {
        latitude: lat,
        longitude: lng,
        latitude_delta: km_to_lat_delta(diameter),
        longitude_delta: km_to_lng_delta(diameter, lat),
    }
}

/// Search radius covering a viewport: half of its larger visible span.
///
/// Inverse of [`region_from_center`] for square viewports.
#[must_use]
pub fn radius_km_for_region(region: &Region) -> f64 {
    let lat_km = region.latitude_delta * KM_PER_DEGREE;
    let cos = region.latitude.to_radians().cos();
    let lng_km = if cos.abs() < POLE_COS_EPSILON {
        region.longitude_delta * KM_PER_DEGREE
    } else {
        region.longitude_delta * KM_PER_DEGREE * cos
    };
    lat_km.max(lng_km) / 2.0
}

/// Great-circle distance in meters.
#[must_use]
pub fn haversine_m(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
    let h = h.clamp(0.0, 1.0);

    2.0 * EARTH_RADIUS_M * h.sqrt().asin()
}
