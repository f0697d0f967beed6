//! Map viewport ("region") normalisation.
//!
//! Every viewport that reaches a store goes through [`sanitize_region`] or
//! [`region_from_area`] first, so NaN or out-of-range values from the platform
//! map widget never propagate into query parameters.

use serde::{Deserialize, Serialize};

use crate::area::AdministrativeArea;
use crate::geo::{haversine_m, region_from_center, GeoPoint};

pub const MIN_LATITUDE: f64 = -85.0;
pub const MAX_LATITUDE: f64 = 85.0;
pub const MIN_LONGITUDE: f64 = -179.999;
pub const MAX_LONGITUDE: f64 = 179.999;
pub const MIN_DELTA: f64 = 0.0008;
pub const MAX_DELTA: f64 = 60.0;

/// Delta bounds for viewports derived from an administrative area.
pub const AREA_MIN_DELTA: f64 = 0.002;
pub const AREA_MAX_DELTA: f64 = 40.0;

/// Radius used when an area has a center but no usable default radius.
pub const DEFAULT_AREA_RADIUS_KM: f64 = 30.0;

/// Bounding-box padding factor (20 % on each axis) and minimum span.
const BBOX_PADDING: f64 = 1.2;
const BBOX_MIN_SPAN: f64 = 0.05;

pub const MIN_ZOOM: u8 = 2;
pub const MAX_ZOOM: u8 = 18;
const TILE_SIZE_PX: f64 = 256.0;

/// A map camera: center plus visible span in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Region {
    pub latitude: f64,
    pub longitude: f64,
    pub latitude_delta: f64,
    pub longitude_delta: f64,
}

impl Region {
    #[must_use]
    pub fn center(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }

    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.latitude_delta.is_finite()
            && self.longitude_delta.is_finite()
    }
}

/// "Has the viewport moved enough to refetch" tuning.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RefetchThreshold {
    /// Center displacement, in meters, above which a refetch is due.
    pub min_distance_m: f64,
    /// Relative change of either delta above which a refetch is due.
    pub delta_ratio: f64,
}

impl Default for RefetchThreshold {
    fn default() -> Self {
        Self {
            min_distance_m: 300.0,
            delta_ratio: 0.25,
        }
    }
}

/// Clamps `candidate` into the valid viewport ranges.
///
/// Returns `previous` unchanged when any field of `candidate` is not finite.
#[must_use]
pub fn sanitize_region(candidate: &Region, previous: &Region) -> Region {
    if !candidate.is_finite() {
        return *previous;
    }
    Region {
        latitude: candidate.latitude.clamp(MIN_LATITUDE, MAX_LATITUDE),
        longitude: candidate.longitude.clamp(MIN_LONGITUDE, MAX_LONGITUDE),
        latitude_delta: candidate.latitude_delta.clamp(MIN_DELTA, MAX_DELTA),
        longitude_delta: candidate.longitude_delta.clamp(MIN_DELTA, MAX_DELTA),
    }
}

/// Derives the viewport for a selected administrative area.
///
/// Prefers the area's center and default radius, then its bounding box.
/// Returns `None` when the area carries neither.
#[must_use]
pub fn region_from_area(area: &AdministrativeArea) -> Option<Region> {
    if let Some(center) = area.center() {
        let radius_km = area
            .default_radius_km
            .filter(|r| r.is_finite() && *r > 0.0)
            .unwrap_or(DEFAULT_AREA_RADIUS_KM);
        let lat = center.lat.clamp(MIN_LATITUDE, MAX_LATITUDE);
        let lng = center.lng.clamp(MIN_LONGITUDE, MAX_LONGITUDE);
        let region = region_from_center(lat, lng, radius_km);
        return Some(Region {
            latitude_delta: region.latitude_delta.clamp(AREA_MIN_DELTA, AREA_MAX_DELTA),
            longitude_delta: region.longitude_delta.clamp(AREA_MIN_DELTA, AREA_MAX_DELTA),
            ..region
        });
    }

    let bbox = area.bounding_box()?;
    let span = |min: f64, max: f64| {
        ((max - min).abs() * BBOX_PADDING)
            .max(BBOX_MIN_SPAN)
            .clamp(AREA_MIN_DELTA, AREA_MAX_DELTA)
    };
    Some(Region {
        latitude: ((bbox.min_lat + bbox.max_lat) / 2.0).clamp(MIN_LATITUDE, MAX_LATITUDE),
        longitude: ((bbox.min_lng + bbox.max_lng) / 2.0).clamp(MIN_LONGITUDE, MAX_LONGITUDE),
        latitude_delta: span(bbox.min_lat, bbox.max_lat),
        longitude_delta: span(bbox.min_lng, bbox.max_lng),
    })
}

/// Slippy-map zoom level showing `lon_delta` degrees across a screen
/// `screen_width_px` wide. For camera APIs that take a zoom instead of a span.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn zoom_for_longitude_delta(lon_delta: f64, screen_width_px: f64) -> u8 {
    if !lon_delta.is_finite() || !screen_width_px.is_finite() || screen_width_px <= 0.0 {
        return MIN_ZOOM;
    }
    let span = lon_delta.clamp(0.0005, 360.0);
    let zoom = (360.0 * (screen_width_px / TILE_SIZE_PX) / span).log2().round();
    zoom.clamp(f64::from(MIN_ZOOM), f64::from(MAX_ZOOM)) as u8
}

/// Whether `next` differs from the last fetched viewport by more than
/// camera jitter.
#[must_use]
pub fn has_moved_enough(last: &Region, next: &Region, threshold: &RefetchThreshold) -> bool {
    if haversine_m(last.center(), next.center()) > threshold.min_distance_m {
        return true;
    }
    let changed = |before: f64, after: f64| {
        before > 0.0 && ((after - before).abs() / before) > threshold.delta_ratio
    };
    changed(last.latitude_delta, next.latitude_delta)
        || changed(last.longitude_delta, next.longitude_delta)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::area::{AdministrativeArea, LocalizedNames};
    use crate::geo::km_to_lat_delta;

    fn approx(a: f64, b: f64, eps: f64) -> bool {
        (a - b).abs() < eps
    }

    fn valid() -> Region {
        Region {
            latitude: 36.75,
            longitude: 3.04,
            latitude_delta: 0.5,
            longitude_delta: 0.6,
        }
    }

    fn area(id: i64) -> AdministrativeArea {
        AdministrativeArea {
            id,
            code: "16".to_string(),
            number: 16,
            names: LocalizedNames {
                en: Some("Algiers".to_string()),
                fr: Some("Alger".to_string()),
                ar: Some("الجزائر".to_string()),
            },
            center_lat: None,
            center_lng: None,
            default_radius_km: None,
            min_lat: None,
            max_lat: None,
            min_lng: None,
            max_lng: None,
        }
    }

    // -----------------------------------------------------------------------
    // sanitize_region
    // -----------------------------------------------------------------------

    #[test]
    fn sanitize_returns_in_range_input_unmodified() {
        let previous = Region {
            latitude: 0.0,
            longitude: 0.0,
            latitude_delta: 1.0,
            longitude_delta: 1.0,
        };
        assert_eq!(sanitize_region(&valid(), &previous), valid());
    }

    #[test]
    fn sanitize_rejects_any_non_finite_field() {
        let previous = valid();
        let candidates = [
            Region {
                latitude: f64::NAN,
                ..valid()
            },
            Region {
                longitude: f64::INFINITY,
                ..valid()
            },
            Region {
                latitude_delta: f64::NAN,
                ..valid()
            },
            Region {
                longitude_delta: f64::NEG_INFINITY,
                ..valid()
            },
        ];
        for candidate in candidates {
            let out = sanitize_region(&candidate, &previous);
            assert_eq!(out, previous, "candidate {candidate:?} must be rejected");
        }
    }

    #[test]
    fn sanitize_clamps_out_of_range_fields() {
        let candidate = Region {
            latitude: 89.0,
            longitude: -200.0,
            latitude_delta: 0.0,
            longitude_delta: 120.0,
        };
        let out = sanitize_region(&candidate, &valid());
        assert_eq!(out.latitude, MAX_LATITUDE);
        assert_eq!(out.longitude, MIN_LONGITUDE);
        assert_eq!(out.latitude_delta, MIN_DELTA);
        assert_eq!(out.longitude_delta, MAX_DELTA);
    }

    // -----------------------------------------------------------------------
    // region_from_area
    // -----------------------------------------------------------------------

    #[test]
    fn area_with_center_uses_default_radius() {
        let mut a = area(16);
        a.center_lat = Some(36.75);
        a.center_lng = Some(3.04);
        a.default_radius_km = Some(30.0);

        let region = region_from_area(&a).expect("center yields a region");
        assert!(approx(region.latitude, 36.75, 1e-12));
        assert!(approx(region.longitude, 3.04, 1e-12));
        assert!(approx(region.latitude_delta, km_to_lat_delta(60.0), 1e-9));
        assert!(approx(region.latitude_delta, 0.54, 0.001));
        let expected_lng = 60.0 / (111.0 * 36.75_f64.to_radians().cos());
        assert!(approx(region.longitude_delta, expected_lng, 1e-9));
    }

    #[test]
    fn area_center_without_radius_defaults_to_thirty_km() {
        let mut a = area(16);
        a.center_lat = Some(36.7525);
        a.center_lng = Some(3.04197);
        a.default_radius_km = Some(f64::NAN);

        let region = region_from_area(&a).unwrap();
        assert!(approx(region.latitude_delta, km_to_lat_delta(60.0), 1e-9));
    }

    #[test]
    fn area_center_deltas_are_clamped() {
        let mut a = area(1);
        a.center_lat = Some(27.0);
        a.center_lng = Some(2.0);
        a.default_radius_km = Some(5_000.0);

        let region = region_from_area(&a).unwrap();
        assert_eq!(region.latitude_delta, AREA_MAX_DELTA);
        assert_eq!(region.longitude_delta, AREA_MAX_DELTA);
    }

    #[test]
    fn area_with_only_bbox_pads_by_twenty_percent() {
        let mut a = area(31);
        a.min_lat = Some(35.0);
        a.max_lat = Some(36.0);
        a.min_lng = Some(-1.0);
        a.max_lng = Some(0.0);

        let region = region_from_area(&a).unwrap();
        assert!(approx(region.latitude, 35.5, 1e-12));
        assert!(approx(region.longitude, -0.5, 1e-12));
        assert!(approx(region.latitude_delta, 1.2, 1e-12));
        assert!(approx(region.longitude_delta, 1.2, 1e-12));
    }

    #[test]
    fn tiny_bbox_gets_minimum_span() {
        let mut a = area(2);
        a.min_lat = Some(36.0);
        a.max_lat = Some(36.001);
        a.min_lng = Some(3.0);
        a.max_lng = Some(3.0);

        let region = region_from_area(&a).unwrap();
        assert!(approx(region.latitude_delta, 0.05, 1e-12));
        assert!(approx(region.longitude_delta, 0.05, 1e-12));
    }

    #[test]
    fn area_without_geometry_is_none() {
        assert!(region_from_area(&area(3)).is_none());

        let mut partial = area(4);
        partial.center_lat = Some(36.0);
        partial.min_lat = Some(35.0);
        partial.max_lat = Some(f64::NAN);
        partial.min_lng = Some(1.0);
        partial.max_lng = Some(2.0);
        assert!(region_from_area(&partial).is_none());
    }

    // -----------------------------------------------------------------------
    // zoom_for_longitude_delta
    // -----------------------------------------------------------------------

    #[test]
    fn zoom_matches_tile_math() {
        // 256 px showing the whole world is zoom 0, clamped to 2.
        assert_eq!(zoom_for_longitude_delta(360.0, 256.0), MIN_ZOOM);
        // 1024 px (4 tiles) at 360/4/2^8 degrees -> 2^10 -> zoom 10.
        assert_eq!(zoom_for_longitude_delta(360.0 * 4.0 / 1024.0, 1024.0), 10);
    }

    #[test]
    fn zoom_is_clamped() {
        assert_eq!(zoom_for_longitude_delta(0.000_001, 1080.0), MAX_ZOOM);
        assert_eq!(zoom_for_longitude_delta(f64::NAN, 1080.0), MIN_ZOOM);
    }

    // -----------------------------------------------------------------------
    // has_moved_enough
    // -----------------------------------------------------------------------

    fn at(lat: f64, lng: f64) -> Region {
        Region {
            latitude: lat,
            longitude: lng,
            latitude_delta: 0.05,
            longitude_delta: 0.05,
        }
    }

    /// Degrees of latitude for `meters` on the haversine sphere.
    fn north_offset(meters: f64) -> f64 {
        (meters / crate::geo::EARTH_RADIUS_M).to_degrees()
    }

    #[test]
    fn small_pan_does_not_trigger_refetch() {
        let last = at(36.7538, 3.0588);
        let next = at(36.7538 + north_offset(250.0), 3.0588);
        assert!(!has_moved_enough(&last, &next, &RefetchThreshold::default()));
    }

    #[test]
    fn pan_beyond_threshold_triggers_refetch() {
        let last = at(36.7538, 3.0588);
        let next = at(36.7538 + north_offset(350.0), 3.0588);
        assert!(has_moved_enough(&last, &next, &RefetchThreshold::default()));
    }

    #[test]
    fn zoom_change_over_ratio_triggers_refetch() {
        let last = at(36.7538, 3.0588);
        let mut next = last;
        next.longitude_delta = 0.05 * 1.3;
        assert!(has_moved_enough(&last, &next, &RefetchThreshold::default()));

        next.longitude_delta = 0.05 * 1.2;
        assert!(!has_moved_enough(&last, &next, &RefetchThreshold::default()));
    }

    #[test]
    fn threshold_is_tunable() {
        let last = at(36.7538, 3.0588);
        let next = at(36.7538 + north_offset(250.0), 3.0588);
        let tight = RefetchThreshold {
            min_distance_m: 100.0,
            delta_ratio: 0.25,
        };
        assert!(has_moved_enough(&last, &next, &tight));
    }
}
