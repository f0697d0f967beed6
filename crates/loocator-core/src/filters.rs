use serde::{Deserialize, Serialize};

/// User-selected search filters. Replaced wholesale on every edit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchFilters {
    #[serde(default)]
    pub is_free: Option<bool>,
    #[serde(default)]
    pub access_method: Option<String>,
    #[serde(default)]
    pub pricing_model: Option<String>,
    #[serde(default)]
    pub min_rating: Option<f64>,
    #[serde(default)]
    pub amenities: Vec<String>,
    #[serde(default)]
    pub categories: Vec<String>,
}

impl SearchFilters {
    /// Canonical serialization used for deep comparison.
    ///
    /// Array order and duplicates do not matter; blank strings count as unset.
    #[must_use]
    pub fn stable_key(&self) -> String {
        let canonical = |values: &[String]| {
            let mut v: Vec<&str> = values
                .iter()
                .map(|s| s.trim())
                .filter(|s| !s.is_empty())
                .collect();
            v.sort_unstable();
            v.dedup();
            v.join(",")
        };
        let text = |value: &Option<String>| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .unwrap_or("")
                .to_owned()
        };
        format!(
            "free={}|access={}|pricing={}|rating={}|amenities={}|categories={}",
            self.is_free.map_or(String::new(), |b| b.to_string()),
            text(&self.access_method),
            text(&self.pricing_model),
            self.min_rating
                .filter(|r| r.is_finite())
                .map_or(String::new(), |r| r.to_string()),
            canonical(&self.amenities),
            canonical(&self.categories),
        )
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stable_key() == Self::default().stable_key()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stable_key_ignores_array_order_and_duplicates() {
        let a = SearchFilters {
            amenities: vec!["wifi".into(), "baby_change".into()],
            ..SearchFilters::default()
        };
        let b = SearchFilters {
            amenities: vec!["baby_change".into(), "wifi".into(), "wifi".into()],
            ..SearchFilters::default()
        };
        assert_eq!(a.stable_key(), b.stable_key());
    }

    #[test]
    fn stable_key_distinguishes_values() {
        let free = SearchFilters {
            is_free: Some(true),
            ..SearchFilters::default()
        };
        let paid = SearchFilters {
            is_free: Some(false),
            ..SearchFilters::default()
        };
        assert_ne!(free.stable_key(), paid.stable_key());
        assert_ne!(free.stable_key(), SearchFilters::default().stable_key());
    }

    #[test]
    fn blank_values_count_as_unset() {
        let blank = SearchFilters {
            access_method: Some("  ".into()),
            categories: vec![String::new()],
            ..SearchFilters::default()
        };
        assert!(blank.is_empty());
    }
}
