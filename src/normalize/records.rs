use chrono::Utc;
use rust_decimal::Decimal;
use serde_json::Value;

use crate::models::{Position, Side, Trade};

use super::fields::{
    format_fixed6, lookup_bool, lookup_str, lookup_str_or, lookup_timestamp, parse_decimal,
};
use super::market::embedded_market;

const POSITION_ID_KEYS: &[&str] = &[
    "id",
    "positionId",
    "position_id",
    "asset",
    "assetId",
    "asset_id",
    "tokenId",
    "token_id",
];
const OUTCOME_KEYS: &[&str] = &["outcome", "outcomeName", "outcome_name"];
const QUANTITY_KEYS: &[&str] = &["size", "quantity", "amount", "shares"];
const PRICE_KEYS: &[&str] = &["price", "avgPrice", "avg_price", "averagePrice", "curPrice"];
const VALUE_KEYS: &[&str] = &["value", "currentValue", "current_value"];
const POSITION_TIME_KEYS: &[&str] = &[
    "timestamp",
    "updatedAt",
    "updated_at",
    "createdAt",
    "created_at",
    "time",
];

const TRADE_ID_KEYS: &[&str] = &["id", "tradeId", "trade_id"];
const TX_HASH_KEYS: &[&str] = &["transactionHash", "transaction_hash", "txHash", "tx_hash"];
const IS_BUY_KEYS: &[&str] = &["isBuy", "is_buy"];
const TRADE_TIME_KEYS: &[&str] = &[
    "timestamp",
    "matchTime",
    "match_time",
    "createdAt",
    "created_at",
    "time",
];
const USER_KEYS: &[&str] = &[
    "user",
    "userAddress",
    "user_address",
    "proxyWallet",
    "maker_address",
    "taker_address",
];

/// Normalize raw position items one-to-one, in order.
pub fn normalize_positions(items: &[Value]) -> Vec<Position> {
    items.iter().map(normalize_position).collect()
}

/// Normalize raw trade items one-to-one, in order. `user_address` fills
/// trades that do not name their user.
pub fn normalize_trades(items: &[Value], user_address: &str) -> Vec<Trade> {
    items
        .iter()
        .map(|item| normalize_trade(item, user_address))
        .collect()
}

pub fn normalize_position(item: &Value) -> Position {
    let quantity = lookup_str_or(item, QUANTITY_KEYS, "0");
    let price = lookup_str_or(item, PRICE_KEYS, "0");
    let value = lookup_str(item, VALUE_KEYS)
        .filter(|v| parse_decimal(v).is_some())
        .unwrap_or_else(|| position_value(&quantity, &price));

    Position {
        id: lookup_str_or(item, POSITION_ID_KEYS, ""),
        market: embedded_market(item),
        outcome: lookup_str_or(item, OUTCOME_KEYS, ""),
        quantity,
        price,
        value,
        timestamp: lookup_timestamp(item, POSITION_TIME_KEYS).unwrap_or_else(Utc::now),
    }
}

pub fn normalize_trade(item: &Value, user_address: &str) -> Trade {
    let transaction_hash = lookup_str(item, TX_HASH_KEYS);
    let id = lookup_str(item, TRADE_ID_KEYS)
        .or_else(|| transaction_hash.clone())
        .unwrap_or_default();

    Trade {
        id,
        market: embedded_market(item),
        outcome: lookup_str_or(item, OUTCOME_KEYS, ""),
        side: resolve_side(item),
        quantity: lookup_str_or(item, QUANTITY_KEYS, "0"),
        price: lookup_str_or(item, PRICE_KEYS, "0"),
        timestamp: lookup_timestamp(item, TRADE_TIME_KEYS).unwrap_or_else(Utc::now),
        transaction_hash,
        user_address: lookup_str_or(item, USER_KEYS, user_address),
    }
}

/// quantity × price at 6 decimals; "0" when either side is not a number.
pub fn position_value(quantity: &str, price: &str) -> String {
    match (parse_decimal(quantity), parse_decimal(price)) {
        (Some(q), Some(p)) => match q.checked_mul(p) {
            Some(v) => format_fixed6(v),
            None => "0".into(),
        },
        _ => "0".into(),
    }
}

/// Sum of position values at 6 decimals. Unparsable values count as zero.
pub fn total_value(positions: &[Position]) -> String {
    let total = positions
        .iter()
        .filter_map(|p| parse_decimal(&p.value))
        .fold(Decimal::ZERO, |acc, v| acc.saturating_add(v));
    format_fixed6(total)
}

fn resolve_side(item: &Value) -> Side {
    if let Some(side) = lookup_str(item, &["side"]).and_then(|s| Side::from_api_str(&s)) {
        return side;
    }
    match lookup_bool(item, IS_BUY_KEYS) {
        Some(true) => Side::Buy,
        _ => Side::Sell,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn value_is_computed_when_missing() {
        let pos = normalize_position(&json!({ "id": "p-1", "size": "10", "price": "2.5" }));
        assert_eq!(pos.value, "25.000000");
    }

    #[test]
    fn source_value_is_kept() {
        let pos = normalize_position(&json!({
            "id": "p-1", "size": "10", "price": "2.5", "currentValue": "24.9"
        }));
        assert_eq!(pos.value, "24.9");
    }

    #[test]
    fn non_numeric_source_value_is_not_kept() {
        let pos = normalize_position(&json!({ "value": "junk" }));
        assert_eq!(pos.value, "0.000000");

        let pos = normalize_position(&json!({ "size": "4", "price": "0.5", "value": "n/a" }));
        assert_eq!(pos.value, "2.000000");
    }

    #[test]
    fn huge_values_are_formatted_without_panicking() {
        let positions = normalize_positions(&[json!({ "value": "1e27" })]);
        assert_eq!(positions[0].value, "1e27");
        assert_eq!(
            total_value(&positions),
            "1000000000000000000000000000.000000"
        );

        let pos = normalize_position(&json!({ "size": "1e20", "price": "1e7" }));
        assert_eq!(pos.value, "1000000000000000000000000000.000000");
    }

    #[test]
    fn non_numeric_amounts_degrade_to_zero_value() {
        let pos = normalize_position(&json!({ "size": "lots", "price": "2.5" }));
        assert_eq!(pos.quantity, "lots");
        assert_eq!(pos.value, "0");
    }

    #[test]
    fn missing_fields_get_deterministic_defaults() {
        let before = Utc::now();
        let pos = normalize_position(&json!({}));
        assert_eq!(pos.id, "");
        assert_eq!(pos.outcome, "");
        assert_eq!(pos.quantity, "0");
        assert_eq!(pos.price, "0");
        assert_eq!(pos.value, "0.000000");
        assert!(pos.timestamp >= before);

        let trade = normalize_trade(&json!({}), "0xuser");
        assert_eq!(trade.id, "");
        assert_eq!(trade.quantity, "0");
        assert_eq!(trade.price, "0");
        assert_eq!(trade.user_address, "0xuser");
        assert!(trade.transaction_hash.is_none());
        assert!(trade.timestamp >= before);
    }

    #[test]
    fn alternate_position_keys() {
        let pos = normalize_position(&json!({
            "asset": "tok-1",
            "outcomeName": "Yes",
            "shares": 4,
            "avgPrice": "0.25",
            "updatedAt": 1_700_000_000,
        }));
        assert_eq!(pos.id, "tok-1");
        assert_eq!(pos.outcome, "Yes");
        assert_eq!(pos.quantity, "4");
        assert_eq!(pos.price, "0.25");
        assert_eq!(pos.value, "1.000000");
        assert_eq!(pos.timestamp.timestamp(), 1_700_000_000);
    }

    #[test]
    fn order_is_preserved_one_to_one() {
        let items = vec![json!({ "id": "a" }), json!(null), json!({ "id": "c" })];
        let positions = normalize_positions(&items);
        let ids: Vec<_> = positions.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "", "c"]);
    }

    #[test]
    fn side_from_explicit_field_or_flag() {
        let explicit = normalize_trade(&json!({ "side": "BUY", "isBuy": false }), "");
        assert_eq!(explicit.side, Side::Buy);

        let flagged = normalize_trade(&json!({ "isBuy": true }), "");
        assert_eq!(flagged.side, Side::Buy);

        let neither = normalize_trade(&json!({}), "");
        assert_eq!(neither.side, Side::Sell);
    }

    #[test]
    fn trade_id_falls_back_to_transaction_hash() {
        let trade = normalize_trade(&json!({ "transactionHash": "0xhash" }), "");
        assert_eq!(trade.id, "0xhash");
        assert_eq!(trade.transaction_hash.as_deref(), Some("0xhash"));
    }

    #[test]
    fn trade_user_from_payload_wins() {
        let trade = normalize_trade(&json!({ "proxyWallet": "0xother" }), "0xuser");
        assert_eq!(trade.user_address, "0xother");
    }

    #[test]
    fn total_value_sums_to_six_places() {
        let positions = normalize_positions(&[
            json!({ "size": "10", "price": "2.5" }),
            json!({ "value": "0.1234567" }),
            json!({ "value": "junk" }),
        ]);
        assert_eq!(total_value(&positions), "25.123457");
        assert_eq!(total_value(&[]), "0.000000");
    }
}
