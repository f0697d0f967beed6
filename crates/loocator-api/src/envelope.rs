//! `{ data: T[], meta?: { page?, perPage?, total? } }` response envelope.
//!
//! Parsing never fails: a missing or non-array `data` is an empty page, items
//! that do not decode are skipped, and absent `meta` fields fall back to what
//! was requested. When `total` is absent it is inferred from the items seen
//! so far, which ends pagination at the current page.

use serde::de::DeserializeOwned;
use serde_json::Value;

/// One page of results plus the pagination metadata the server reported.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultPage<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub per_page: u32,
    pub total: u64,
}

impl<T> ResultPage<T> {
    #[must_use]
    pub fn empty(page: u32, per_page: u32) -> Self {
        Self {
            items: Vec::new(),
            page,
            per_page,
            total: 0,
        }
    }

    /// `page * per_page < total`.
    #[must_use]
    pub fn has_more(&self) -> bool {
        u64::from(self.page) * u64::from(self.per_page) < self.total
    }
}

/// Decodes a page from a search response body.
pub(crate) fn parse_page<T: DeserializeOwned>(
    body: &Value,
    requested_page: u32,
    requested_per_page: u32,
    context: &str,
) -> ResultPage<T> {
    let Some(raw_items) = body.get("data").and_then(Value::as_array) else {
        tracing::warn!(context, "response has no data array, treating as empty page");
        return ResultPage::empty(requested_page, requested_per_page);
    };

    let items = decode_items(raw_items, context);

    let meta = body.get("meta");
    let page = meta_u32(meta, &["page", "current_page"]).unwrap_or(requested_page);
    let per_page = meta_u32(meta, &["perPage", "per_page"])
        .filter(|n| *n > 0)
        .unwrap_or(requested_per_page);
    let total = meta_u64(meta, &["total"]).unwrap_or_else(|| {
        let seen_before = u64::from(page.saturating_sub(1)) * u64::from(per_page);
        seen_before + raw_items.len() as u64
    });

    ResultPage {
        items,
        page,
        per_page,
        total,
    }
}

/// Decodes each element independently, skipping the ones that do not match.
pub(crate) fn decode_items<T: DeserializeOwned>(raw_items: &[Value], context: &str) -> Vec<T> {
    let mut skipped = 0usize;
    let items = raw_items
        .iter()
        .filter_map(|raw| match serde_json::from_value::<T>(raw.clone()) {
            Ok(item) => Some(item),
            Err(error) => {
                skipped += 1;
                tracing::debug!(context, %error, "skipping undecodable item");
                None
            }
        })
        .collect();
    if skipped > 0 {
        tracing::warn!(context, skipped, "skipped items that failed to decode");
    }
    items
}

fn meta_u64(meta: Option<&Value>, keys: &[&str]) -> Option<u64> {
    let meta = meta?;
    keys.iter().find_map(|key| match meta.get(*key)? {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    })
}

fn meta_u32(meta: Option<&Value>, keys: &[&str]) -> Option<u32> {
    meta_u64(meta, keys).and_then(|n| u32::try_from(n).ok())
}
