use serde_json::Value;

use crate::models::Market;

use super::fields::{lookup_bool, lookup_decimal, lookup_str, lookup_str_or};

const ID_KEYS: &[&str] = &["id", "marketId", "market_id", "conditionId", "condition_id"];
const QUESTION_KEYS: &[&str] = &["question", "title", "name"];
const SLUG_KEYS: &[&str] = &["slug", "marketSlug", "market_slug"];
const DESCRIPTION_KEYS: &[&str] = &["description"];
const END_DATE_KEYS: &[&str] = &["endDate", "end_date", "endDateIso", "end_date_iso"];
const IMAGE_KEYS: &[&str] = &["image", "icon"];
const LIQUIDITY_KEYS: &[&str] = &["liquidity", "liquidityNum"];
const VOLUME_KEYS: &[&str] = &["volume", "volumeNum"];
const TAG_LABEL_KEYS: &[&str] = &["label", "name", "slug"];

/// Keys naming the market when position/trade items carry it flat.
const EMBEDDED_ID_KEYS: &[&str] = &[
    "conditionId",
    "condition_id",
    "marketId",
    "market_id",
    "market",
];

/// Map any market payload to a [`Market`]. Never fails: missing or
/// malformed fields fall back to empty strings, `None`, or `active = true`.
pub fn normalize_market(raw: &Value) -> Market {
    Market {
        id: lookup_str_or(raw, ID_KEYS, ""),
        question: lookup_str_or(raw, QUESTION_KEYS, ""),
        slug: lookup_str_or(raw, SLUG_KEYS, ""),
        description: lookup_str(raw, DESCRIPTION_KEYS),
        end_date: lookup_str(raw, END_DATE_KEYS),
        image: lookup_str(raw, IMAGE_KEYS),
        tags: parse_tags(raw.get("tags")),
        liquidity: lookup_decimal(raw, LIQUIDITY_KEYS),
        volume: lookup_decimal(raw, VOLUME_KEYS),
        active: lookup_bool(raw, &["active"]).unwrap_or(true),
    }
}

/// Resolve the market a position or trade belongs to: a nested `market`
/// object when present, otherwise the item's own flat market fields.
pub fn embedded_market(item: &Value) -> Market {
    match item.get("market") {
        Some(nested @ Value::Object(_)) => normalize_market(nested),
        _ => {
            let mut market = normalize_market(item);
            market.id = lookup_str_or(item, EMBEDDED_ID_KEYS, "");
            market
        }
    }
}

fn parse_tags(raw: Option<&Value>) -> Vec<String> {
    let Some(Value::Array(items)) = raw else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|tag| match tag {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Object(_) => lookup_str(tag, TAG_LABEL_KEYS),
            _ => None,
        })
        .collect()
}
