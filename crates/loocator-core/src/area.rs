//! Administrative areas ("wilayas") served by the taxonomy endpoint.

use serde::{Deserialize, Serialize};

use crate::geo::GeoPoint;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizedNames {
    #[serde(default)]
    pub en: Option<String>,
    #[serde(default)]
    pub fr: Option<String>,
    #[serde(default)]
    pub ar: Option<String>,
}

/// Axis-aligned bounds with every edge known to be finite.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

/// Reference data for one administrative area.
///
/// Geometry is optional on the wire: some areas carry a center and default
/// radius, some only a bounding box, some neither. Numeric fields accept JSON
/// numbers or numeric strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdministrativeArea {
    pub id: i64,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub number: u32,
    #[serde(default)]
    pub names: LocalizedNames,
    #[serde(default, deserialize_with = "crate::de::f64_opt")]
    pub center_lat: Option<f64>,
    #[serde(default, deserialize_with = "crate::de::f64_opt")]
    pub center_lng: Option<f64>,
    #[serde(default, deserialize_with = "crate::de::f64_opt")]
    pub default_radius_km: Option<f64>,
    #[serde(default, deserialize_with = "crate::de::f64_opt")]
    pub min_lat: Option<f64>,
    #[serde(default, deserialize_with = "crate::de::f64_opt")]
    pub max_lat: Option<f64>,
    #[serde(default, deserialize_with = "crate::de::f64_opt")]
    pub min_lng: Option<f64>,
    #[serde(default, deserialize_with = "crate::de::f64_opt")]
    pub max_lng: Option<f64>,
}

impl AdministrativeArea {
    /// The area's center when both coordinates are present and finite.
    #[must_use]
    pub fn center(&self) -> Option<GeoPoint> {
        let point = GeoPoint::new(self.center_lat?, self.center_lng?);
        point.is_finite().then_some(point)
    }

    /// The bounding box when all four edges are present and finite.
    #[must_use]
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        let bbox = BoundingBox {
            min_lat: self.min_lat?,
            max_lat: self.max_lat?,
            min_lng: self.min_lng?,
            max_lng: self.max_lng?,
        };
        [bbox.min_lat, bbox.max_lat, bbox.min_lng, bbox.max_lng]
            .iter()
            .all(|v| v.is_finite())
            .then_some(bbox)
    }

    /// Name in `locale` (`"en"`, `"fr"`, `"ar"`), falling back through
    /// en → fr → ar and finally the area code.
    #[must_use]
    pub fn display_name(&self, locale: &str) -> &str {
        let preferred = match locale {
            "fr" => self.names.fr.as_deref(),
            "ar" => self.names.ar.as_deref(),
            _ => self.names.en.as_deref(),
        };
        preferred
            .or(self.names.en.as_deref())
            .or(self.names.fr.as_deref())
            .or(self.names.ar.as_deref())
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(&self.code)
    }
}
