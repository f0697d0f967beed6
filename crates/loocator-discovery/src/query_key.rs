use loocator_core::{SearchCenter, SearchFilters};
use sha2::{Digest, Sha256};

/// Identity of a search context: two contexts with equal keys return the same
/// results, so a context change that keeps the key triggers no refetch.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey(String);

impl QueryKey {
    /// SHA-256 over `area_id || filters || lat || lng || radius`, with the
    /// center rounded to 5 decimal places (about a meter) and the radius
    /// exact. Hex-encoded.
    #[must_use]
    pub fn new(area_id: Option<i64>, filters: &SearchFilters, center: Option<&SearchCenter>) -> Self {
        let area = area_id.map(|id| id.to_string()).unwrap_or_default();
        let (lat, lng, radius) = center.map_or_else(
            || (String::new(), String::new(), String::new()),
            |c| {
                (
                    format!("{:.5}", c.point.lat),
                    format!("{:.5}", c.point.lng),
                    c.radius_km.to_string(),
                )
            },
        );
        let input = format!(
            "{area}\x00{}\x00{lat}\x00{lng}\x00{radius}",
            filters.stable_key()
        );
        Self(format!("{:x}", Sha256::digest(input.as_bytes())))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for QueryKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Twelve hex digits are plenty to tell keys apart in logs.
        f.write_str(&self.0[..12])
    }
}
