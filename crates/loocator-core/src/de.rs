//! Lenient field deserializers for loosely typed backend JSON.

use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(f64),
    Text(String),
}

/// Accepts `null`, a JSON number, or a numeric string. Unparseable strings
/// become `None`.
pub fn f64_opt<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<NumberOrString>::deserialize(deserializer)?;
    Ok(match raw {
        Some(NumberOrString::Number(n)) => Some(n),
        Some(NumberOrString::Text(s)) => s.trim().parse::<f64>().ok(),
        None => None,
    })
}

/// Like [`f64_opt`] but the value must be present, parseable and finite.
pub fn f64_required<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    match f64_opt(deserializer)? {
        Some(n) if n.is_finite() => Ok(n),
        _ => Err(serde::de::Error::custom("expected a finite number")),
    }
}
